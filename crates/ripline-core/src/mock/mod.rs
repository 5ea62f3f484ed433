//! Mock makemkvcon: emits protocol-valid transcripts from canned disc
//! profiles, including a deterministic mid-rip failure.

mod generator;
mod materialize;
mod profile;

pub use generator::{MockOptions, MockRipper, RipOutcome, TitleSelection};
pub use materialize::Materialize;
pub use profile::{DiscProfile, ProfileRegistry, TitleProfile, DEFAULT_PROFILE};
