//! Shared test utilities for quizcast integration tests.
//!
//! This module provides:
//! - `TestHarness` for an isolated project layout in a temp directory
//! - Builders for quiz records and a recording compositor double

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
