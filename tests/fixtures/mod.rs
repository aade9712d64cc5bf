//! Site file fixtures

use std::path::{Path, PathBuf};

/// Path to a site file under tests/fixtures/sites
pub fn site_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/sites")
        .join(name)
}
