//! Test helper modules for integration tests

#![allow(dead_code)]

pub mod doubles;
pub mod simulated;

pub use doubles::*;
pub use simulated::*;
