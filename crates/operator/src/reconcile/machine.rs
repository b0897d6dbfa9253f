//! Generic reconciliation state machine.
//!
//! Wraps a per-kind handler and owns the crash-recovery policy. Reconcile
//! events are delivered at least once by the watch layer, so terminal
//! states short-circuit without re-running side effects; that is the
//! idempotence guarantee.

use async_trait::async_trait;
use atelier_shared::{CorrelationId, OperatorError, OperatorStatus, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::Operated;
use crate::client::ResourceClient;

/// Per-kind reconciliation logic invoked by the machine once a resource is
/// claimed (status HANDLING).
#[async_trait]
pub trait ReconcileHandler<K: Send + Sync>: Send + Sync {
    async fn handle(&self, correlation_id: &CorrelationId, resource: &K) -> Result<()>;

    /// Cascade cleanup of owned external resources when the Kubernetes
    /// object is deleted. Must tolerate already-absent objects.
    async fn cleanup(&self, correlation_id: &CorrelationId, resource: &K) -> Result<()> {
        let _ = (correlation_id, resource);
        Ok(())
    }
}

/// Outcome of one reconcile event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Handler ran to completion, resource is now HANDLED.
    Completed,
    /// Resource was already HANDLED; nothing ran.
    AlreadyHandled,
    /// Resource was already ERROR; nothing ran, manual recovery required.
    PreviouslyFailed,
    /// This attempt failed (handler error, interrupted previous attempt,
    /// or a status write failure).
    Failed,
}

impl ReconcileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ReconcileOutcome::Completed | ReconcileOutcome::AlreadyHandled
        )
    }
}

pub struct ReconcileMachine<K>
where
    K: Operated,
{
    kind: &'static str,
    client: Arc<dyn ResourceClient<K>>,
    handler: Arc<dyn ReconcileHandler<K>>,
}

impl<K> ReconcileMachine<K>
where
    K: Operated,
{
    pub fn new(
        kind: &'static str,
        client: Arc<dyn ResourceClient<K>>,
        handler: Arc<dyn ReconcileHandler<K>>,
    ) -> Self {
        Self {
            kind,
            client,
            handler,
        }
    }

    /// Process one reconcile event for a resource.
    ///
    /// Errors are absorbed here: a failing handler marks the resource
    /// ERROR and reports [`ReconcileOutcome::Failed`], it never propagates
    /// and so never takes down the shared control loop.
    pub async fn reconcile(&self, resource: &K) -> ReconcileOutcome {
        let name = resource.name_any();
        let correlation_id = CorrelationId::new();

        match resource.operator_status() {
            OperatorStatus::Handled => {
                debug!(kind = self.kind, name, "already handled, skipping");
                ReconcileOutcome::AlreadyHandled
            }
            OperatorStatus::Error => {
                debug!(
                    kind = self.kind,
                    name, "in terminal error state, skipping; manual recovery required"
                );
                ReconcileOutcome::PreviouslyFailed
            }
            OperatorStatus::Handling => {
                // The previous attempt crashed or was killed mid-flight.
                // Fail fast rather than resume: resuming safely needs
                // step-level idempotence, which is only guaranteed at the
                // StatusStep granularity inside an orchestrator, not at
                // whole-handler granularity.
                let previous = resource
                    .operator_message()
                    .unwrap_or_else(|| "unknown attempt".to_string());
                let interrupted = OperatorError::InterruptedHandling { previous };
                warn!(
                    kind = self.kind,
                    name,
                    correlation_id = %correlation_id,
                    "found resource mid-handling; previous attempt was interrupted"
                );
                self.finish(
                    &correlation_id,
                    &name,
                    OperatorStatus::Error,
                    format!("{interrupted} (detected by {correlation_id})"),
                )
                .await;
                ReconcileOutcome::Failed
            }
            OperatorStatus::New => self.run_handler(&correlation_id, &name, resource).await,
        }
    }

    async fn run_handler(
        &self,
        correlation_id: &CorrelationId,
        name: &str,
        resource: &K,
    ) -> ReconcileOutcome {
        info!(
            kind = self.kind,
            name,
            correlation_id = %correlation_id,
            "handling resource"
        );

        if let Err(err) = self
            .write_status(
                correlation_id,
                name,
                OperatorStatus::Handling,
                format!("handling by attempt {correlation_id}"),
            )
            .await
        {
            error!(
                kind = self.kind,
                name,
                correlation_id = %correlation_id,
                error = %err,
                "could not claim resource"
            );
            return ReconcileOutcome::Failed;
        }

        match self.handler.handle(correlation_id, resource).await {
            Ok(()) => {
                self.finish(
                    correlation_id,
                    name,
                    OperatorStatus::Handled,
                    format!("handled by attempt {correlation_id}"),
                )
                .await;
                info!(
                    kind = self.kind,
                    name,
                    correlation_id = %correlation_id,
                    "resource handled"
                );
                ReconcileOutcome::Completed
            }
            Err(err) => {
                error!(
                    kind = self.kind,
                    name,
                    correlation_id = %correlation_id,
                    error = %err,
                    "handler failed"
                );
                self.finish(
                    correlation_id,
                    name,
                    OperatorStatus::Error,
                    format!("{err} (attempt {correlation_id})"),
                )
                .await;
                ReconcileOutcome::Failed
            }
        }
    }

    /// Cascade cleanup on deletion of the Kubernetes object.
    pub async fn cleanup(&self, resource: &K) -> ReconcileOutcome {
        let name = resource.name_any();
        let correlation_id = CorrelationId::new();
        match self.handler.cleanup(&correlation_id, resource).await {
            Ok(()) => {
                info!(
                    kind = self.kind,
                    name,
                    correlation_id = %correlation_id,
                    "cleaned up owned resources"
                );
                ReconcileOutcome::Completed
            }
            Err(err) => {
                error!(
                    kind = self.kind,
                    name,
                    correlation_id = %correlation_id,
                    error = %err,
                    "cleanup failed"
                );
                ReconcileOutcome::Failed
            }
        }
    }

    async fn write_status(
        &self,
        correlation_id: &CorrelationId,
        name: &str,
        operator_status: OperatorStatus,
        message: String,
    ) -> Result<()> {
        self.client
            .update_status(
                correlation_id,
                name,
                Box::new(move |resource: &mut K| {
                    resource.set_operator_status(operator_status);
                    resource.set_operator_message(message.clone());
                }),
            )
            .await
            .map(|_| ())
    }

    /// Terminal status write; a failure here is logged but not propagated,
    /// the next reconcile event will observe the stale status and retry.
    async fn finish(
        &self,
        correlation_id: &CorrelationId,
        name: &str,
        operator_status: OperatorStatus,
        message: String,
    ) {
        if let Err(err) = self
            .write_status(correlation_id, name, operator_status, message)
            .await
        {
            error!(
                kind = self.kind,
                name,
                correlation_id = %correlation_id,
                error = %err,
                "could not record terminal status"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeResourceClient;
    use atelier_model::{Workspace, WorkspaceSpec, WorkspaceStatus};
    use kube::core::ObjectMeta;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        invocations: AtomicUsize,
        fail: bool,
    }

    impl CountingHandler {
        fn succeeding() -> Self {
            Self {
                invocations: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                invocations: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn invocations(&self) -> usize {
            self.invocations.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReconcileHandler<Workspace> for CountingHandler {
        async fn handle(
            &self,
            _correlation_id: &CorrelationId,
            _resource: &Workspace,
        ) -> Result<()> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(OperatorError::step("probe", "injected failure"));
            }
            Ok(())
        }
    }

    fn workspace(name: &str, status: Option<WorkspaceStatus>) -> Workspace {
        Workspace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("atelier".to_string()),
                ..Default::default()
            },
            spec: WorkspaceSpec {
                name: name.to_string(),
                label: None,
                app_definition: Some("ide-rust".to_string()),
                user: "alice".to_string(),
                storage: None,
                options: Default::default(),
            },
            status,
        }
    }

    fn machine(
        client: Arc<FakeResourceClient<Workspace>>,
        handler: Arc<CountingHandler>,
    ) -> ReconcileMachine<Workspace> {
        ReconcileMachine::new("Workspace", client, handler)
    }

    #[tokio::test]
    async fn test_new_resource_reaches_handled() {
        let client = Arc::new(FakeResourceClient::new());
        let handler = Arc::new(CountingHandler::succeeding());
        let resource = workspace("ws-a", None);
        client.insert(resource.clone());

        let outcome = machine(client.clone(), handler.clone())
            .reconcile(&resource)
            .await;

        assert_eq!(outcome, ReconcileOutcome::Completed);
        assert_eq!(handler.invocations(), 1);

        let stored = client.stored("ws-a").unwrap();
        assert_eq!(stored.operator_status(), OperatorStatus::Handled);
        assert!(stored.operator_message().is_some());

        // HANDLING was written before the handler ran, HANDLED after
        let phases: Vec<OperatorStatus> = client
            .status_history()
            .iter()
            .map(Operated::operator_status)
            .collect();
        assert_eq!(phases, vec![OperatorStatus::Handling, OperatorStatus::Handled]);
    }

    #[tokio::test]
    async fn test_handler_failure_is_absorbed_as_error_status() {
        let client = Arc::new(FakeResourceClient::new());
        let handler = Arc::new(CountingHandler::failing());
        let resource = workspace("ws-b", None);
        client.insert(resource.clone());

        let outcome = machine(client.clone(), handler.clone())
            .reconcile(&resource)
            .await;

        assert_eq!(outcome, ReconcileOutcome::Failed);
        let stored = client.stored("ws-b").unwrap();
        assert_eq!(stored.operator_status(), OperatorStatus::Error);
        let message = stored.operator_message().unwrap();
        assert!(message.contains("injected failure"));
    }

    #[tokio::test]
    async fn test_handled_resource_is_skipped_without_side_effects() {
        let client = Arc::new(FakeResourceClient::new());
        let handler = Arc::new(CountingHandler::succeeding());
        let resource = workspace(
            "ws-c",
            Some(WorkspaceStatus {
                operator_status: OperatorStatus::Handled,
                ..Default::default()
            }),
        );
        client.insert(resource.clone());
        let machine = machine(client.clone(), handler.clone());

        let first = machine.reconcile(&resource).await;
        let second = machine.reconcile(&resource).await;

        assert_eq!(first, ReconcileOutcome::AlreadyHandled);
        assert_eq!(second, ReconcileOutcome::AlreadyHandled);
        assert_eq!(handler.invocations(), 0);
        assert_eq!(client.mutation_count(), 0);
        assert_eq!(
            client.stored("ws-c").unwrap().operator_status(),
            OperatorStatus::Handled
        );
    }

    #[tokio::test]
    async fn test_error_resource_is_never_retried() {
        let client = Arc::new(FakeResourceClient::new());
        let handler = Arc::new(CountingHandler::succeeding());
        let resource = workspace(
            "ws-d",
            Some(WorkspaceStatus {
                operator_status: OperatorStatus::Error,
                operator_message: Some("earlier failure".to_string()),
                ..Default::default()
            }),
        );
        client.insert(resource.clone());

        let outcome = machine(client.clone(), handler.clone())
            .reconcile(&resource)
            .await;

        assert_eq!(outcome, ReconcileOutcome::PreviouslyFailed);
        assert_eq!(handler.invocations(), 0);
        assert_eq!(client.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_default_cleanup_is_a_noop_success() {
        let client = Arc::new(FakeResourceClient::new());
        // CountingHandler does not override cleanup
        let handler = Arc::new(CountingHandler::succeeding());
        let resource = workspace("ws-f", None);
        client.insert(resource.clone());

        let outcome = machine(client.clone(), handler.clone())
            .cleanup(&resource)
            .await;

        assert_eq!(outcome, ReconcileOutcome::Completed);
        assert_eq!(handler.invocations(), 0);
        assert_eq!(client.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_interrupted_handling_becomes_error_with_diagnostic() {
        let client = Arc::new(FakeResourceClient::new());
        let handler = Arc::new(CountingHandler::succeeding());
        let resource = workspace(
            "ws-e",
            Some(WorkspaceStatus {
                operator_status: OperatorStatus::Handling,
                operator_message: Some(
                    "handling by attempt 6f2e7f2a-0000-0000-0000-000000000000".to_string(),
                ),
                ..Default::default()
            }),
        );
        client.insert(resource.clone());

        let outcome = machine(client.clone(), handler.clone())
            .reconcile(&resource)
            .await;

        assert_eq!(outcome, ReconcileOutcome::Failed);
        // Never re-enters the handler
        assert_eq!(handler.invocations(), 0);

        let stored = client.stored("ws-e").unwrap();
        assert_eq!(stored.operator_status(), OperatorStatus::Error);
        let message = stored.operator_message().unwrap();
        assert!(!message.is_empty());
        assert!(message.contains("interrupted"));
        // Diagnostic names the original attempt
        assert!(message.contains("6f2e7f2a"));
    }
}
