//! Workspace wire schema `v1beta3`.

use atelier_shared::{OperatorStatus, Result, StatusStep};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::hub::{WorkspaceHub, WorkspaceHubSpec, WorkspaceHubStatus};
use crate::convert::{api_version, malformed, VersionAdapter};

pub const VERSION: &str = "v1beta3";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceV1beta3 {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: WorkspaceV1beta3Spec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkspaceV1beta3Status>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceV1beta3Spec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_definition: Option<String>,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceV1beta3Status {
    #[serde(default)]
    pub operator_status: OperatorStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_claim: Option<StatusStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_attach: Option<StatusStep>,
}

pub struct WorkspaceV1beta3Adapter;

impl VersionAdapter<WorkspaceHub> for WorkspaceV1beta3Adapter {
    fn version(&self) -> &'static str {
        VERSION
    }

    fn to_hub(&self, object: Value) -> Result<WorkspaceHub> {
        let object: WorkspaceV1beta3 = serde_json::from_value(object).map_err(malformed)?;
        Ok(WorkspaceHub {
            metadata: object.metadata,
            spec: WorkspaceHubSpec {
                name: object.spec.name,
                label: object.spec.label,
                app_definition: object.spec.app_definition,
                user: object.spec.user,
                storage: object.spec.storage,
                ..WorkspaceHubSpec::default()
            },
            status: object.status.map(|status| WorkspaceHubStatus {
                operator_status: status.operator_status,
                operator_message: status.operator_message,
                volume_claim: status.volume_claim,
                volume_attach: status.volume_attach,
            }),
        })
    }

    fn from_hub(&self, hub: &WorkspaceHub) -> Result<Value> {
        let object = WorkspaceV1beta3 {
            api_version: api_version(VERSION),
            kind: super::KIND.to_string(),
            metadata: hub.metadata.clone(),
            spec: WorkspaceV1beta3Spec {
                name: hub.spec.name.clone(),
                label: hub.spec.label.clone(),
                app_definition: hub.spec.app_definition.clone(),
                user: hub.spec.user.clone(),
                storage: hub.spec.storage.clone(),
            },
            status: hub.status.as_ref().map(|status| WorkspaceV1beta3Status {
                operator_status: status.operator_status,
                operator_message: status.operator_message.clone(),
                volume_claim: status.volume_claim,
                volume_attach: status.volume_attach,
            }),
        };
        serde_json::to_value(&object).map_err(malformed)
    }
}
