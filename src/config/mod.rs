//! Configuration
//!
//! Precedence, highest first:
//! 1. CLI flags
//! 2. Environment variables (`AUTODEPLOY_*`, provider and API keys)
//! 3. `--config <path>`, else `./autodeploy.toml`, else
//!    `~/.config/autodeploy/config.toml`
//! 4. Built-in defaults

mod loader;
mod types;

pub use loader::{with_env_overrides, ConfigWarning, PROJECT_CONFIG};
pub use types::{BackendConfig, BackendKind, Config, DeployConfig, GcpConfig};
