#![allow(dead_code)]

use std::path::PathBuf;

pub use dagsched_test_utils::builders;
pub use dagsched_test_utils::init_tracing;
pub use dagsched_test_utils::reference;

/// Path to a fixture under `graphs/`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("graphs")
        .join(name)
}
