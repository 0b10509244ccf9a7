//! Common test utilities for AutoDeploy integration tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated test environment with temp directories
//! - Fixtures: Small repositories for each supported stack

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
