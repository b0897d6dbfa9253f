//! Shared kernel for the Atelier platform operator.
//!
//! Base types used across the conversion and reconciliation crates:
//! reconciliation states, checkpoint steps, correlation ids, the central
//! error taxonomy and the operator configuration.

pub mod config;
pub mod error;
pub mod ids;
pub mod states;

pub use config::{OperatorConfig, OperatorConfigBuilder};
pub use error::{OperatorError, Result};
pub use ids::CorrelationId;
pub use states::{OperatorStatus, StatusStep, StepPhase};
