//! End-to-end reconciliation flows against the in-memory resource client.

use std::sync::Arc;

use atelier_model::{
    AppDefinition, AppDefinitionSpec, Session, Workspace, WorkspaceSpec, WorkspaceStatus,
};
use atelier_operator::reconcile::{
    AppDefinitionValidationHandler, Operated, ReconcileMachine, ReconcileOutcome,
    WorkspaceStorageOrchestrator,
};
use atelier_operator::FakeResourceClient;
use atelier_shared::{OperatorConfig, OperatorStatus};
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};
use kube::core::ObjectMeta;

struct Cluster {
    workspaces: Arc<FakeResourceClient<Workspace>>,
    volumes: Arc<FakeResourceClient<PersistentVolume>>,
    claims: Arc<FakeResourceClient<PersistentVolumeClaim>>,
    sessions: Arc<FakeResourceClient<Session>>,
    machine: ReconcileMachine<Workspace>,
}

fn cluster() -> Cluster {
    let workspaces = Arc::new(FakeResourceClient::new());
    let volumes = Arc::new(FakeResourceClient::new());
    let claims = Arc::new(FakeResourceClient::new());
    let sessions = Arc::new(FakeResourceClient::new());
    let orchestrator = WorkspaceStorageOrchestrator::new(
        OperatorConfig::default(),
        workspaces.clone(),
        volumes.clone(),
        claims.clone(),
        sessions.clone(),
    );
    let machine = ReconcileMachine::new("Workspace", workspaces.clone(), Arc::new(orchestrator));
    Cluster {
        workspaces,
        volumes,
        claims,
        sessions,
        machine,
    }
}

fn workspace(name: &str, status: Option<WorkspaceStatus>) -> Workspace {
    Workspace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("atelier".to_string()),
            uid: Some(format!("{name}-uid")),
            ..Default::default()
        },
        spec: WorkspaceSpec {
            name: name.to_string(),
            label: Some("integration".to_string()),
            app_definition: Some("ide-rust".to_string()),
            user: "alice".to_string(),
            storage: None,
            options: Default::default(),
        },
        status,
    }
}

#[tokio::test]
async fn test_new_workspace_ends_handled_with_provisioned_storage() {
    let cluster = cluster();
    let ws = workspace("ws-a", None);
    cluster.workspaces.insert(ws.clone());

    let outcome = cluster.machine.reconcile(&ws).await;
    assert_eq!(outcome, ReconcileOutcome::Completed);

    let stored = cluster.workspaces.stored("ws-a").unwrap();
    assert_eq!(stored.operator_status(), OperatorStatus::Handled);
    assert_eq!(stored.spec.storage.as_deref(), Some("storage-ws-a"));
    assert!(cluster.volumes.stored("storage-ws-a").is_some());
    assert!(cluster.claims.stored("storage-ws-a").is_some());

    let status = stored.status.unwrap();
    assert!(status.volume_claim.unwrap().is_finished());
    assert!(status.volume_attach.unwrap().is_finished());
}

#[tokio::test]
async fn test_handled_workspace_performs_no_further_side_effects() {
    let cluster = cluster();
    let ws = workspace("ws-b", None);
    cluster.workspaces.insert(ws.clone());
    cluster.machine.reconcile(&ws).await;

    let volume_calls = cluster.volumes.mutation_count();
    let claim_calls = cluster.claims.mutation_count();
    let workspace_calls = cluster.workspaces.mutation_count();

    // Re-delivery of the event for the now-HANDLED object
    let stored = cluster.workspaces.stored("ws-b").unwrap();
    let outcome = cluster.machine.reconcile(&stored).await;

    assert_eq!(outcome, ReconcileOutcome::AlreadyHandled);
    assert_eq!(cluster.volumes.mutation_count(), volume_calls);
    assert_eq!(cluster.claims.mutation_count(), claim_calls);
    assert_eq!(cluster.workspaces.mutation_count(), workspace_calls);
}

#[tokio::test]
async fn test_step_failure_lands_in_error_without_rollback() {
    let cluster = cluster();
    let ws = workspace("ws-c", None);
    cluster.workspaces.insert(ws.clone());
    cluster.claims.fail_creates(true);

    let outcome = cluster.machine.reconcile(&ws).await;
    assert_eq!(outcome, ReconcileOutcome::Failed);

    let stored = cluster.workspaces.stored("ws-c").unwrap();
    assert_eq!(stored.operator_status(), OperatorStatus::Error);
    assert!(stored.operator_message().unwrap().contains("volumeAttach"));

    // The volume created before the failing step stays in place
    assert!(cluster.volumes.stored("storage-ws-c").is_some());
    assert!(cluster.claims.stored("storage-ws-c").is_none());

    // And the ERROR state is sticky across re-delivery
    let outcome = cluster.machine.reconcile(&stored).await;
    assert_eq!(outcome, ReconcileOutcome::PreviouslyFailed);
}

#[tokio::test]
async fn test_interrupted_handling_is_reported_not_resumed() {
    let cluster = cluster();
    let ws = workspace(
        "ws-d",
        Some(WorkspaceStatus {
            operator_status: OperatorStatus::Handling,
            operator_message: Some("handling by attempt earlier".to_string()),
            volume_claim: Some(atelier_shared::StatusStep::started()),
            volume_attach: None,
        }),
    );
    cluster.workspaces.insert(ws.clone());

    let outcome = cluster.machine.reconcile(&ws).await;
    assert_eq!(outcome, ReconcileOutcome::Failed);

    let stored = cluster.workspaces.stored("ws-d").unwrap();
    assert_eq!(stored.operator_status(), OperatorStatus::Error);
    let message = stored.operator_message().unwrap();
    assert!(!message.is_empty());

    // No volume was created on behalf of the dead attempt
    assert!(cluster.volumes.stored("storage-ws-d").is_none());
}

#[tokio::test]
async fn test_cleanup_cascade_is_idempotent() {
    let cluster = cluster();
    let ws = workspace("ws-e", None);
    cluster.workspaces.insert(ws.clone());
    cluster.machine.reconcile(&ws).await;

    let outcome = cluster.machine.cleanup(&ws).await;
    assert_eq!(outcome, ReconcileOutcome::Completed);
    assert!(cluster.volumes.stored("storage-ws-e").is_none());
    assert!(cluster.claims.stored("storage-ws-e").is_none());
    assert!(cluster.sessions.stored("ws-e-session").is_none());

    let outcome = cluster.machine.cleanup(&ws).await;
    assert_eq!(outcome, ReconcileOutcome::Completed);
}

#[tokio::test]
async fn test_invalid_app_definition_is_marked_error() {
    let client: Arc<FakeResourceClient<AppDefinition>> = Arc::new(FakeResourceClient::new());
    let machine = ReconcileMachine::new(
        "AppDefinition",
        client.clone(),
        Arc::new(AppDefinitionValidationHandler),
    );
    let definition = AppDefinition {
        metadata: ObjectMeta {
            name: Some("broken".to_string()),
            namespace: Some("atelier".to_string()),
            ..Default::default()
        },
        spec: AppDefinitionSpec {
            name: "broken".to_string(),
            image: String::new(),
            image_pull_policy: None,
            pull_secret: None,
            uid: None,
            port: 70000,
            ingressname: None,
            min_instances: None,
            max_instances: None,
            requests_memory: None,
            requests_cpu: None,
            limits_memory: None,
            limits_cpu: None,
            downlink_limit: None,
            uplink_limit: None,
            mount_path: None,
            timeout: None,
            options: Default::default(),
        },
        status: None,
    };
    client.insert(definition.clone());

    let outcome = machine.reconcile(&definition).await;
    assert_eq!(outcome, ReconcileOutcome::Failed);

    let stored = client.stored("broken").unwrap();
    assert_eq!(stored.operator_status(), OperatorStatus::Error);
    let message = stored.operator_message().unwrap();
    assert!(message.contains("image"));
    assert!(message.contains("port"));
}

#[tokio::test]
async fn test_valid_app_definition_is_marked_handled() {
    let client: Arc<FakeResourceClient<AppDefinition>> = Arc::new(FakeResourceClient::new());
    let machine = ReconcileMachine::new(
        "AppDefinition",
        client.clone(),
        Arc::new(AppDefinitionValidationHandler),
    );
    let definition = AppDefinition {
        metadata: ObjectMeta {
            name: Some("ide-rust".to_string()),
            namespace: Some("atelier".to_string()),
            ..Default::default()
        },
        spec: AppDefinitionSpec {
            name: "ide-rust".to_string(),
            image: "ghcr.io/atelier/ide-rust:1.0".to_string(),
            image_pull_policy: Some("IfNotPresent".to_string()),
            pull_secret: None,
            uid: Some(101),
            port: 3000,
            ingressname: None,
            min_instances: Some(0),
            max_instances: Some(5),
            requests_memory: Some("512Mi".to_string()),
            requests_cpu: Some("250m".to_string()),
            limits_memory: Some("1Gi".to_string()),
            limits_cpu: Some("500m".to_string()),
            downlink_limit: None,
            uplink_limit: None,
            mount_path: Some("/home/project".to_string()),
            timeout: Some(30),
            options: Default::default(),
        },
        status: None,
    };
    client.insert(definition.clone());

    let outcome = machine.reconcile(&definition).await;
    assert_eq!(outcome, ReconcileOutcome::Completed);
    assert_eq!(
        client.stored("ide-rust").unwrap().operator_status(),
        OperatorStatus::Handled
    );
}
