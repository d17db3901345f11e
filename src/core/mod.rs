//! Pure, deterministic logic for the deploy task.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod deployment;
pub mod image;
pub mod patch;
pub mod plan;
