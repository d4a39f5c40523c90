//! Crate-internal test fixtures.

pub mod helpers;
