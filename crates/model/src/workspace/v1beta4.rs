//! Workspace wire schema `v1beta4`: the stored version the operator
//! reconciles. Adds free-form `options` to the spec.

use atelier_shared::{OperatorStatus, Result, StatusStep};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::hub::{WorkspaceHub, WorkspaceHubSpec, WorkspaceHubStatus};
use crate::convert::{malformed, VersionAdapter};

pub const VERSION: &str = "v1beta4";

/// A persistent user workspace backed by a storage volume.
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "atelier.io",
    version = "v1beta4",
    kind = "Workspace",
    namespaced,
    status = "WorkspaceStatus",
    shortname = "ws",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_definition: Option<String>,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub options: HashMap<String, String>,
}

/// Observed state. `operator_status` is the decision state; the two
/// `StatusStep` fields are the ordered progress log of the storage
/// provisioning task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStatus {
    #[serde(default)]
    pub operator_status: OperatorStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_claim: Option<StatusStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_attach: Option<StatusStep>,
}

pub struct WorkspaceV1beta4Adapter;

impl VersionAdapter<WorkspaceHub> for WorkspaceV1beta4Adapter {
    fn version(&self) -> &'static str {
        VERSION
    }

    fn to_hub(&self, object: Value) -> Result<WorkspaceHub> {
        let object: Workspace = serde_json::from_value(object).map_err(malformed)?;
        Ok(WorkspaceHub {
            metadata: object.metadata,
            spec: WorkspaceHubSpec {
                name: object.spec.name,
                label: object.spec.label,
                app_definition: object.spec.app_definition,
                user: object.spec.user,
                storage: object.spec.storage,
                options: object.spec.options,
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
        let object = Workspace {
            metadata: hub.metadata.clone(),
            spec: WorkspaceSpec {
                name: hub.spec.name.clone(),
                label: hub.spec.label.clone(),
                app_definition: hub.spec.app_definition.clone(),
                user: hub.spec.user.clone(),
                storage: hub.spec.storage.clone(),
                options: hub.spec.options.clone(),
            },
            status: hub.status.as_ref().map(|status| WorkspaceStatus {
                operator_status: status.operator_status,
                operator_message: status.operator_message.clone(),
                volume_claim: status.volume_claim,
                volume_attach: status.volume_attach,
            }),
        };
        serde_json::to_value(&object).map_err(malformed)
    }
}
