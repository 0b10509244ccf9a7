//! Terminal and JSON output for the CLI

pub mod json;
pub mod progress;
pub mod views;
