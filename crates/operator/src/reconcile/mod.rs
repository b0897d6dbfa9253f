//! Status-driven, idempotent reconciliation.

mod app_definition;
mod machine;
mod workspace;

pub use app_definition::AppDefinitionValidationHandler;
pub use machine::{ReconcileHandler, ReconcileMachine, ReconcileOutcome};
pub use workspace::WorkspaceStorageOrchestrator;

use atelier_model::{AppDefinition, Workspace};
use atelier_shared::OperatorStatus;
use kube::ResourceExt;

/// A resource kind reconciled through the operator status machine.
///
/// Gives the generic machine access to the decision state and diagnostic
/// message on the kind's status, creating the status object on first write.
pub trait Operated: ResourceExt + Clone + Send + Sync + 'static {
    fn operator_status(&self) -> OperatorStatus;

    fn operator_message(&self) -> Option<String>;

    fn set_operator_status(&mut self, status: OperatorStatus);

    fn set_operator_message(&mut self, message: String);
}

impl Operated for Workspace {
    fn operator_status(&self) -> OperatorStatus {
        self.status
            .as_ref()
            .map(|status| status.operator_status)
            .unwrap_or_default()
    }

    fn operator_message(&self) -> Option<String> {
        self.status
            .as_ref()
            .and_then(|status| status.operator_message.clone())
    }

    fn set_operator_status(&mut self, operator_status: OperatorStatus) {
        self.status.get_or_insert_with(Default::default).operator_status = operator_status;
    }

    fn set_operator_message(&mut self, message: String) {
        self.status.get_or_insert_with(Default::default).operator_message = Some(message);
    }
}

impl Operated for AppDefinition {
    fn operator_status(&self) -> OperatorStatus {
        self.status
            .as_ref()
            .map(|status| status.operator_status)
            .unwrap_or_default()
    }

    fn operator_message(&self) -> Option<String> {
        self.status
            .as_ref()
            .and_then(|status| status.operator_message.clone())
    }

    fn set_operator_status(&mut self, operator_status: OperatorStatus) {
        self.status.get_or_insert_with(Default::default).operator_status = operator_status;
    }

    fn set_operator_message(&mut self, message: String) {
        self.status.get_or_insert_with(Default::default).operator_message = Some(message);
    }
}
