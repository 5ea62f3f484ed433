//! Progress tracking: turns `PRGV` records and title counters into a monotonic
//! 0-100 percentage, and gates persistence to strictly increasing values.

mod gate;
mod tracker;

pub use gate::{ProgressGate, ProgressSink};
pub use tracker::{percent_of, ProgressTracker};
