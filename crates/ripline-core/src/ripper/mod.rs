//! Rip stage: run a protocol source, decode its transcript, and drive the
//! stage state through the dual-write adapter.

mod rip;
mod source;

pub use rip::{RipRequest, RipResult, Ripper};
pub use source::{MockRipSource, ProcessRipSource, RipSource};
