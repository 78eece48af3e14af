//! Shared fixtures for entity tests.

#![allow(dead_code)]

use lpa_directory::InMemoryDirectory;
use lpa_mapping::DirectoryManager;
use lpa_types::Dn;

pub const FIXTURE: &str = include_str!("../fixtures/businesses.ldif");

pub const PULP_MILL: &str = "o=Pulp Mill.,ou=businesses,dc=example,dc=com";
pub const HAIR: &str = "o=Hair Styles By Jane,ou=businesses,dc=example,dc=com";
pub const ACME: &str = "o=Acme Widgets,ou=businesses,dc=example,dc=com";
pub const JDOE: &str = "uid=jdoe,ou=people,dc=example,dc=com";
pub const MANUFACTURING: &str = "cn=Manufacturing,ou=bus-categories,dc=example,dc=com";
pub const RETAIL: &str = "cn=Retail,ou=bus-categories,dc=example,dc=com";

/// Installs a test-writer subscriber once; `RUST_LOG` controls the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A manager over a fresh copy of the business directory.
pub fn manager() -> (DirectoryManager, InMemoryDirectory) {
    init_tracing();
    let directory = InMemoryDirectory::from_ldif(FIXTURE).unwrap();
    (DirectoryManager::new(directory.clone()), directory)
}

pub fn dn(text: &str) -> Dn {
    Dn::parse(text).unwrap()
}
