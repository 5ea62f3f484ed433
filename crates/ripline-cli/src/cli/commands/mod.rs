//! CLI command handlers, one file per command.

mod check;
mod completions;
mod files;
mod mock;
mod rip;
mod status;
mod transcode;
mod validate_state;

pub use check::run_check;
pub use completions::{run_completions, run_man};
pub use files::run_files;
pub use mock::{run_mock_info, run_mock_mkv, run_mock_profiles};
pub use rip::run_rip;
pub use status::run_status;
pub use transcode::run_transcode;
pub use validate_state::run_validate_state;
