//! Hub representation of the Workspace kind.

use atelier_shared::{OperatorStatus, StatusStep};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::HashMap;

/// Canonical in-memory Workspace: union of every field present in any wire
/// version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceHub {
    pub metadata: ObjectMeta,
    pub spec: WorkspaceHubSpec,
    pub status: Option<WorkspaceHubStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceHubSpec {
    pub name: String,
    pub label: Option<String>,
    pub app_definition: Option<String>,
    pub user: String,
    /// Name of the storage volume backing the workspace. Written by the
    /// storage orchestrator once provisioning succeeds.
    pub storage: Option<String>,
    /// Present since v1beta4.
    pub options: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceHubStatus {
    pub operator_status: OperatorStatus,
    pub operator_message: Option<String>,
    pub volume_claim: Option<StatusStep>,
    pub volume_attach: Option<StatusStep>,
}
