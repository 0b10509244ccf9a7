//! Infrastructure Layer
//!
//! Concrete implementations of domain ports and every piece of I/O:
//! processes, HTTP, the filesystem, and rendered IaC text.

pub mod fs;
pub mod health;
pub mod llm;
pub mod process;
pub mod remote;
pub mod run_output;
pub mod staging;
pub mod synth;
pub mod terraform;

pub use health::HttpHealthProbe;
pub use process::SystemCommandRunner;
pub use synth::{ArtifactSet, Synthesizer};
