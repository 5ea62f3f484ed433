//! `ripline validate-state` – check a `.rip` directory without the database.

use anyhow::Result;
use ripline_core::state::{validate_rip_dir, METADATA_FILE, STATE_DIR_NAME};
use std::path::{Path, PathBuf};

/// Accepts the `.rip` directory itself or the stage directory containing it.
fn resolve(path: &Path) -> PathBuf {
    let nested = path.join(STATE_DIR_NAME);
    if !path.join(METADATA_FILE).exists() && nested.is_dir() {
        nested
    } else {
        path.to_path_buf()
    }
}

/// Prints PASS/FAIL; returns whether the directory is well-formed.
pub fn run_validate_state(path: &Path) -> Result<bool> {
    let dir = resolve(path);
    let issues = validate_rip_dir(&dir);
    if issues.is_empty() {
        println!("PASS: {} is valid", dir.display());
        return Ok(true);
    }
    println!("FAIL: State validation errors:");
    for issue in &issues {
        println!("  - {}", issue);
    }
    Ok(false)
}
