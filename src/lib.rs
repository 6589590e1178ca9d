//! Stalk market library crate — re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is a headless host that runs the market
//! against the in-game clock. This library crate exposes the same modules so
//! that `tests/` integration tests can drive the systems without a window.

pub mod shared;
pub mod config;
pub mod calendar;
pub mod market;
pub mod save;
pub mod data;
