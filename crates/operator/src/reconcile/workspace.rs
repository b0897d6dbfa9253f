//! Workspace storage provisioning.
//!
//! The handler walks an ordered list of external side effects (create the
//! volume, create the claim, attach the claim to the spec) and checkpoints
//! progress into the workspace status before and after each one. A rerun
//! reads the checkpoints and the deterministic object names to skip what
//! already happened, so a crash between any two effects is recoverable
//! without duplicating objects.

use async_trait::async_trait;
use atelier_model::{Session, Workspace, WorkspaceStatus};
use atelier_shared::{CorrelationId, OperatorConfig, OperatorError, Result, StatusStep};
use k8s_openapi::api::core::v1::{
    HostPathVolumeSource, PersistentVolume, PersistentVolumeClaim, PersistentVolumeClaimSpec,
    PersistentVolumeSpec, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::core::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::machine::ReconcileHandler;
use crate::client::ResourceClient;
use crate::naming;

const STEP_VOLUME_CLAIM: &str = "volumeClaim";
const STEP_VOLUME_ATTACH: &str = "volumeAttach";

pub struct WorkspaceStorageOrchestrator {
    config: OperatorConfig,
    workspaces: Arc<dyn ResourceClient<Workspace>>,
    volumes: Arc<dyn ResourceClient<PersistentVolume>>,
    claims: Arc<dyn ResourceClient<PersistentVolumeClaim>>,
    sessions: Arc<dyn ResourceClient<Session>>,
}

impl WorkspaceStorageOrchestrator {
    pub fn new(
        config: OperatorConfig,
        workspaces: Arc<dyn ResourceClient<Workspace>>,
        volumes: Arc<dyn ResourceClient<PersistentVolume>>,
        claims: Arc<dyn ResourceClient<PersistentVolumeClaim>>,
        sessions: Arc<dyn ResourceClient<Session>>,
    ) -> Self {
        Self {
            config,
            workspaces,
            volumes,
            claims,
            sessions,
        }
    }

    /// Record a checkpoint on the workspace status. The checkpoint must be
    /// durable before the guarded side effect runs, so this propagates
    /// write failures instead of continuing.
    async fn checkpoint(
        &self,
        correlation_id: &CorrelationId,
        workspace_name: &str,
        step: &'static str,
        phase: StatusStep,
    ) -> Result<()> {
        debug!(
            workspace = workspace_name,
            step,
            phase = %phase,
            correlation_id = %correlation_id,
            "checkpoint"
        );
        self.workspaces
            .update_status(
                correlation_id,
                workspace_name,
                Box::new(move |workspace: &mut Workspace| {
                    let status = workspace.status.get_or_insert_with(WorkspaceStatus::default);
                    match step {
                        STEP_VOLUME_CLAIM => status.volume_claim = Some(phase),
                        _ => status.volume_attach = Some(phase),
                    }
                }),
            )
            .await
            .map(|_| ())
    }

    fn owner_reference(workspace: &Workspace) -> Option<OwnerReference> {
        let uid = workspace.metadata.uid.clone()?;
        Some(OwnerReference {
            api_version: format!("{}/{}", atelier_model::GROUP, atelier_model::workspace::STORED_VERSION),
            kind: atelier_model::workspace::KIND.to_string(),
            name: workspace.name_any(),
            uid,
            controller: Some(true),
            block_owner_deletion: Some(true),
        })
    }

    fn volume_for(&self, workspace_name: &str) -> PersistentVolume {
        let storage = naming::storage_name(workspace_name);
        let mut capacity = BTreeMap::new();
        capacity.insert(
            "storage".to_string(),
            Quantity(self.config.storage_size.clone()),
        );
        PersistentVolume {
            metadata: ObjectMeta {
                name: Some(storage.clone()),
                labels: Some(naming::owner_labels(&self.config, workspace_name)),
                ..Default::default()
            },
            spec: Some(PersistentVolumeSpec {
                capacity: Some(capacity),
                access_modes: Some(vec!["ReadWriteOnce".to_string()]),
                persistent_volume_reclaim_policy: Some("Retain".to_string()),
                storage_class_name: Some(self.config.storage_class_name.clone()),
                host_path: Some(HostPathVolumeSource {
                    path: format!("{}/{storage}", self.config.host_path_base),
                    type_: None,
                }),
                ..Default::default()
            }),
            status: None,
        }
    }

    fn claim_for(&self, workspace: &Workspace) -> PersistentVolumeClaim {
        let workspace_name = workspace.name_any();
        let storage = naming::storage_name(&workspace_name);
        let mut requests = BTreeMap::new();
        requests.insert(
            "storage".to_string(),
            Quantity(self.config.storage_size.clone()),
        );
        PersistentVolumeClaim {
            metadata: ObjectMeta {
                name: Some(storage.clone()),
                namespace: Some(self.config.namespace.clone()),
                labels: Some(naming::owner_labels(&self.config, &workspace_name)),
                owner_references: Self::owner_reference(workspace).map(|r| vec![r]),
                ..Default::default()
            },
            spec: Some(PersistentVolumeClaimSpec {
                access_modes: Some(vec!["ReadWriteOnce".to_string()]),
                storage_class_name: Some(self.config.storage_class_name.clone()),
                volume_name: Some(storage),
                resources: Some(VolumeResourceRequirements {
                    requests: Some(requests),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            status: None,
        }
    }

    async fn provision_volume(
        &self,
        correlation_id: &CorrelationId,
        workspace_name: &str,
    ) -> Result<()> {
        self.checkpoint(
            correlation_id,
            workspace_name,
            STEP_VOLUME_CLAIM,
            StatusStep::started(),
        )
        .await?;

        let storage = naming::storage_name(workspace_name);
        if self
            .volumes
            .has(&storage)
            .await
            .map_err(|e| OperatorError::step(STEP_VOLUME_CLAIM, e.to_string()))?
        {
            debug!(workspace = workspace_name, volume = storage, "volume already exists");
        } else {
            self.volumes
                .create(correlation_id, &self.volume_for(workspace_name))
                .await
                .map_err(|e| OperatorError::step(STEP_VOLUME_CLAIM, e.to_string()))?;
            info!(
                workspace = workspace_name,
                volume = storage,
                correlation_id = %correlation_id,
                "created persistent volume"
            );
        }

        self.checkpoint(
            correlation_id,
            workspace_name,
            STEP_VOLUME_CLAIM,
            StatusStep::finished(),
        )
        .await
    }

    async fn attach_claim(
        &self,
        correlation_id: &CorrelationId,
        workspace: &Workspace,
    ) -> Result<()> {
        let workspace_name = workspace.name_any();
        self.checkpoint(
            correlation_id,
            &workspace_name,
            STEP_VOLUME_ATTACH,
            StatusStep::started(),
        )
        .await?;

        let storage = naming::storage_name(&workspace_name);
        if self
            .claims
            .has(&storage)
            .await
            .map_err(|e| OperatorError::step(STEP_VOLUME_ATTACH, e.to_string()))?
        {
            debug!(workspace = %workspace_name, claim = storage, "claim already exists");
        } else {
            self.claims
                .create(correlation_id, &self.claim_for(workspace))
                .await
                .map_err(|e| OperatorError::step(STEP_VOLUME_ATTACH, e.to_string()))?;
            info!(
                workspace = %workspace_name,
                claim = storage,
                correlation_id = %correlation_id,
                "created persistent volume claim"
            );
        }

        self.checkpoint(
            correlation_id,
            &workspace_name,
            STEP_VOLUME_ATTACH,
            StatusStep::claimed(),
        )
        .await?;

        // Writing the claim name into the spec is itself a side effect and
        // sits between the claimed and finished checkpoints.
        self.workspaces
            .edit(
                correlation_id,
                &workspace_name,
                Box::new(move |workspace: &mut Workspace| {
                    workspace.spec.storage = Some(storage.clone());
                }),
            )
            .await
            .map_err(|e| OperatorError::step(STEP_VOLUME_ATTACH, e.to_string()))?;

        self.checkpoint(
            correlation_id,
            &workspace_name,
            STEP_VOLUME_ATTACH,
            StatusStep::finished(),
        )
        .await
    }
}

#[async_trait]
impl ReconcileHandler<Workspace> for WorkspaceStorageOrchestrator {
    async fn handle(&self, correlation_id: &CorrelationId, workspace: &Workspace) -> Result<()> {
        let workspace_name = workspace.name_any();
        self.provision_volume(correlation_id, &workspace_name).await?;
        self.attach_claim(correlation_id, workspace).await
    }

    /// Deletes the session, claim and volume owned by the workspace, in
    /// that order. Absent objects are skipped, a repeated cleanup is a
    /// no-op.
    async fn cleanup(&self, correlation_id: &CorrelationId, workspace: &Workspace) -> Result<()> {
        let workspace_name = workspace.name_any();
        let storage = naming::storage_name(&workspace_name);

        if self
            .sessions
            .delete(correlation_id, &naming::session_name(&workspace_name))
            .await?
        {
            info!(workspace = %workspace_name, correlation_id = %correlation_id, "deleted session");
        }
        if self.claims.delete(correlation_id, &storage).await? {
            info!(workspace = %workspace_name, claim = storage, correlation_id = %correlation_id, "deleted claim");
        }
        if self.volumes.delete(correlation_id, &storage).await? {
            info!(workspace = %workspace_name, volume = storage, correlation_id = %correlation_id, "deleted volume");
        }
        Ok(())
    }
}
