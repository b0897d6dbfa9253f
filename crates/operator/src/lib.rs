//! Atelier Operator - reconciles cloud development environment resources.
//!
//! The operator watches the Atelier kinds (AppDefinition, Session,
//! Workspace), drives each through the NEW → HANDLING → {HANDLED, ERROR}
//! status machine, and provisions the real infrastructure behind them
//! (storage volumes, claims). It also serves the conversion webhook that
//! translates resources between wire schema versions.

pub mod client;
pub mod naming;
pub mod reconcile;
pub mod watcher;
pub mod web;

pub use client::{fake::FakeResourceClient, kube::KubeResourceClient, Mutation, ResourceClient};
pub use reconcile::{Operated, ReconcileHandler, ReconcileMachine, ReconcileOutcome};
pub use watcher::OperatorState;
