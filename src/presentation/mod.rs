//! Presentation Layer
//!
//! Wiring between the CLI and the use cases.
//!
//! ## Structure
//!
//! - `factory` - Creates use cases with proper dependencies (dependency injection)
//!
//! ## Usage
//!
//! ```ignore
//! use autodeploy::presentation::factory;
//!
//! let analysis = factory::create_analysis_use_case(&config.backend);
//! let report = analysis.analyze(&root, description, None)?;
//! ```

pub mod factory;

pub use factory::{create_analysis_use_case, create_deploy_use_case};
