//! Shared helpers for integration tests.
//!
//! Each test binary compiles its own copy; not every binary uses every
//! helper.
#![allow(dead_code)]

pub mod catalog;
pub mod game_setup;
pub mod observers;

pub use catalog::{distinct_deck, standard_catalog, standard_deck};
pub use game_setup::*;
pub use observers::*;

/// Initialize test logging once per process.
pub fn init() {
    backend_test_support::test_logging::init();
}
