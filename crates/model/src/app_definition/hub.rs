//! Hub representation of the AppDefinition kind.

use atelier_shared::OperatorStatus;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::HashMap;

/// Canonical in-memory AppDefinition: union of every field present in any
/// wire version. Bandwidth limit fields are deprecated in newer versions
/// but retain their last known semantics here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppDefinitionHub {
    pub metadata: ObjectMeta,
    pub spec: AppDefinitionHubSpec,
    pub status: Option<AppDefinitionHubStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppDefinitionHubSpec {
    pub name: String,
    pub image: String,
    pub image_pull_policy: Option<String>,
    pub pull_secret: Option<String>,
    pub uid: Option<i64>,
    pub port: i32,
    pub ingressname: Option<String>,
    pub min_instances: Option<i32>,
    pub max_instances: Option<i32>,
    pub requests_memory: Option<String>,
    pub requests_cpu: Option<String>,
    pub limits_memory: Option<String>,
    pub limits_cpu: Option<String>,
    /// Downlink bandwidth limit in kbit/s.
    pub downlink_limit: Option<i32>,
    /// Uplink bandwidth limit in kbit/s.
    pub uplink_limit: Option<i32>,
    pub mount_path: Option<String>,
    /// Minutes of inactivity before a session is shut down.
    pub timeout: Option<i32>,
    /// Present since v1beta10.
    pub options: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppDefinitionHubStatus {
    pub operator_status: OperatorStatus,
    pub operator_message: Option<String>,
}
