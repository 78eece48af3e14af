//! Shared helpers for directory tests.

#![allow(dead_code)]

use lpa_directory::InMemoryDirectory;
use lpa_types::Dn;

pub const FIXTURE: &str = include_str!("../fixtures/directory.ldif");

/// Installs a test-writer subscriber once; `RUST_LOG` controls the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A fresh directory loaded with the example tree.
pub fn example_directory() -> InMemoryDirectory {
    init_tracing();
    InMemoryDirectory::from_ldif(FIXTURE).unwrap()
}

pub fn dn(text: &str) -> Dn {
    Dn::parse(text).unwrap()
}
