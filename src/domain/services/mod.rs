//! Domain Services
//!
//! Pure decision logic that operates on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod cost;
mod policy_engine;
mod rule_interpreter;

pub use cost::{CostEstimate, CostModel};
pub use policy_engine::PolicyEngine;
pub use rule_interpreter::{instance_size, RuleInterpreter};
