//! Session wire schema `v1beta7`: the stored version the operator
//! reconciles. Adds free-form launch `options` to the spec.

use atelier_shared::{OperatorStatus, Result};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::hub::{SessionHub, SessionHubSpec, SessionHubStatus};
use crate::convert::{malformed, VersionAdapter};

pub const VERSION: &str = "v1beta7";

/// A running IDE session for one user, instantiated from an AppDefinition.
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "atelier.io",
    version = "v1beta7",
    kind = "Session",
    namespaced,
    status = "SessionStatus",
    shortname = "ses",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct SessionSpec {
    pub name: String,
    pub app_definition: String,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub env_vars: HashMap<String, String>,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub env_vars_from_config_maps: Vec<String>,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub env_vars_from_secrets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub options: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    #[serde(default)]
    pub operator_status: OperatorStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<i64>,
}

pub struct SessionV1beta7Adapter;

impl VersionAdapter<SessionHub> for SessionV1beta7Adapter {
    fn version(&self) -> &'static str {
        VERSION
    }

    fn to_hub(&self, object: Value) -> Result<SessionHub> {
        let object: Session = serde_json::from_value(object).map_err(malformed)?;
        Ok(SessionHub {
            metadata: object.metadata,
            spec: SessionHubSpec {
                name: object.spec.name,
                app_definition: object.spec.app_definition,
                user: object.spec.user,
                workspace: object.spec.workspace,
                env_vars: object.spec.env_vars,
                env_vars_from_config_maps: object.spec.env_vars_from_config_maps,
                env_vars_from_secrets: object.spec.env_vars_from_secrets,
                session_secret: object.spec.session_secret,
                options: object.spec.options,
            },
            status: object.status.map(|status| SessionHubStatus {
                operator_status: status.operator_status,
                operator_message: status.operator_message,
                url: status.url,
                last_activity: status.last_activity,
            }),
        })
    }

    fn from_hub(&self, hub: &SessionHub) -> Result<Value> {
        let object = Session {
            metadata: hub.metadata.clone(),
            spec: SessionSpec {
                name: hub.spec.name.clone(),
                app_definition: hub.spec.app_definition.clone(),
                user: hub.spec.user.clone(),
                workspace: hub.spec.workspace.clone(),
                env_vars: hub.spec.env_vars.clone(),
                env_vars_from_config_maps: hub.spec.env_vars_from_config_maps.clone(),
                env_vars_from_secrets: hub.spec.env_vars_from_secrets.clone(),
                session_secret: hub.spec.session_secret.clone(),
                options: hub.spec.options.clone(),
            },
            status: hub.status.as_ref().map(|status| SessionStatus {
                operator_status: status.operator_status,
                operator_message: status.operator_message.clone(),
                url: status.url.clone(),
                last_activity: status.last_activity,
            }),
        };
        serde_json::to_value(&object).map_err(malformed)
    }
}
