//! Stage state persistence.
//!
//! Every stage output directory carries a `.rip` marker directory holding
//! `metadata.json` and a one-word `status` file. That marker is the source of
//! truth for "is this done". When a database is configured each transition is
//! mirrored into the job store on a best-effort basis.

mod layout;
mod manager;
mod sink;
pub mod validate;

pub use layout::{
    read_metadata, read_status, state_dir, StageMetadata, ERROR_FILE, METADATA_FILE, STATE_DIR_NAME,
    STATUS_FILE,
};
pub use manager::StateManager;
pub use sink::{DbStateSink, FsStateSink, StateEvent, StateSink};
pub use validate::{validate_rip_dir, StateIssue};
