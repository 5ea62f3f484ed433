pub mod config;
pub mod logging;

pub mod cancel;
pub mod mock;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod progress;
pub mod protocol;
pub mod ripper;
pub mod state;
pub mod store;
pub mod transcode;
