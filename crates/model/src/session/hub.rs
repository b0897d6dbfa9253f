//! Hub representation of the Session kind.

use atelier_shared::OperatorStatus;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::HashMap;

/// Canonical in-memory Session: union of every field present in any wire
/// version. Version-dependent fields are optional; converting V → hub → V
/// is the identity for every field V defines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionHub {
    pub metadata: ObjectMeta,
    pub spec: SessionHubSpec,
    pub status: Option<SessionHubStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionHubSpec {
    pub name: String,
    pub app_definition: String,
    pub user: String,
    pub workspace: Option<String>,
    pub env_vars: HashMap<String, String>,
    pub env_vars_from_config_maps: Vec<String>,
    pub env_vars_from_secrets: Vec<String>,
    /// Present since v1beta6.
    pub session_secret: Option<String>,
    /// Present since v1beta7.
    pub options: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionHubStatus {
    pub operator_status: OperatorStatus,
    pub operator_message: Option<String>,
    pub url: Option<String>,
    /// Present since v1beta6. Epoch milliseconds of the last user activity.
    pub last_activity: Option<i64>,
}
