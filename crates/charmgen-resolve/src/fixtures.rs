//! Shared catalog fixture for unit tests.

use charmgen_core::CatalogConfig;

pub(crate) fn release1() -> CatalogConfig {
    CatalogConfig::parse(include_str!("../../../tests/fixtures/release1.toml")).unwrap()
}
