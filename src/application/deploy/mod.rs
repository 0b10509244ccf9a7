//! Deploy Module
//!
//! Orchestrates one live deployment run.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`DeployOptions`, `Timing`, `CancelToken`)
//! - `result` - Stage failures (`DeployError`)
//! - `use_case` - Core use case logic (`DeployUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use autodeploy::application::deploy::{DeployOptions, DeployUseCase};
//!
//! let use_case = DeployUseCase::new(SystemCommandRunner::new(), HttpHealthProbe::new()?);
//! let record = use_case.execute(&DeployOptions::new(source, work_root), &profile, &plan);
//! ```

mod options;
mod result;
mod use_case;

pub use options::{CancelToken, DeployOptions, Timing};
pub use result::DeployError;
pub use use_case::{check_topology, DeployUseCase, PLACEHOLDER_LB_ADDRESS};

#[cfg(test)]
mod tests;
