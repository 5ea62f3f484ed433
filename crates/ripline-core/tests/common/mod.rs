//! Shared fixtures: an on-disk pipeline database and mock rip sources.

#![allow(dead_code)]

use std::path::Path;

use ripline_core::mock::{Materialize, MockOptions, ProfileRegistry};
use ripline_core::ripper::MockRipSource;
use ripline_core::store::PipelineDb;

pub async fn open_db(dir: &Path) -> PipelineDb {
    PipelineDb::open_at(dir.join("pipeline.db"))
        .await
        .expect("open pipeline db")
}

/// Mock source that leaves empty placeholder files for every saved title.
pub fn placeholder_source(profile: &str) -> MockRipSource {
    let options = MockOptions {
        materialize: Materialize::Placeholder,
        ..MockOptions::default()
    };
    MockRipSource::new(ProfileRegistry::builtin(), profile, options)
}
