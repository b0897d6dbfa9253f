//! AppDefinition wire schema `v1beta9`.

use atelier_shared::{OperatorStatus, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::hub::{AppDefinitionHub, AppDefinitionHubSpec, AppDefinitionHubStatus};
use crate::convert::{api_version, malformed, VersionAdapter};

pub const VERSION: &str = "v1beta9";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinitionV1beta9 {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: AppDefinitionV1beta9Spec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppDefinitionV1beta9Status>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinitionV1beta9Spec {
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<i64>,
    pub port: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingressname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_instances: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_instances: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downlink_limit: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uplink_limit: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinitionV1beta9Status {
    #[serde(default)]
    pub operator_status: OperatorStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_message: Option<String>,
}

pub struct AppDefinitionV1beta9Adapter;

impl VersionAdapter<AppDefinitionHub> for AppDefinitionV1beta9Adapter {
    fn version(&self) -> &'static str {
        VERSION
    }

    fn to_hub(&self, object: Value) -> Result<AppDefinitionHub> {
        let object: AppDefinitionV1beta9 = serde_json::from_value(object).map_err(malformed)?;
        Ok(AppDefinitionHub {
            metadata: object.metadata,
            spec: AppDefinitionHubSpec {
                name: object.spec.name,
                image: object.spec.image,
                image_pull_policy: object.spec.image_pull_policy,
                pull_secret: object.spec.pull_secret,
                uid: object.spec.uid,
                port: object.spec.port,
                ingressname: object.spec.ingressname,
                min_instances: object.spec.min_instances,
                max_instances: object.spec.max_instances,
                requests_memory: object.spec.requests_memory,
                requests_cpu: object.spec.requests_cpu,
                limits_memory: object.spec.limits_memory,
                limits_cpu: object.spec.limits_cpu,
                downlink_limit: object.spec.downlink_limit,
                uplink_limit: object.spec.uplink_limit,
                mount_path: object.spec.mount_path,
                timeout: object.spec.timeout,
                ..AppDefinitionHubSpec::default()
            },
            status: object.status.map(|status| AppDefinitionHubStatus {
                operator_status: status.operator_status,
                operator_message: status.operator_message,
            }),
        })
    }

    fn from_hub(&self, hub: &AppDefinitionHub) -> Result<Value> {
        let object = AppDefinitionV1beta9 {
            api_version: api_version(VERSION),
            kind: super::KIND.to_string(),
            metadata: hub.metadata.clone(),
            spec: AppDefinitionV1beta9Spec {
                name: hub.spec.name.clone(),
                image: hub.spec.image.clone(),
                image_pull_policy: hub.spec.image_pull_policy.clone(),
                pull_secret: hub.spec.pull_secret.clone(),
                uid: hub.spec.uid,
                port: hub.spec.port,
                ingressname: hub.spec.ingressname.clone(),
                min_instances: hub.spec.min_instances,
                max_instances: hub.spec.max_instances,
                requests_memory: hub.spec.requests_memory.clone(),
                requests_cpu: hub.spec.requests_cpu.clone(),
                limits_memory: hub.spec.limits_memory.clone(),
                limits_cpu: hub.spec.limits_cpu.clone(),
                downlink_limit: hub.spec.downlink_limit,
                uplink_limit: hub.spec.uplink_limit,
                mount_path: hub.spec.mount_path.clone(),
                timeout: hub.spec.timeout,
            },
            status: hub.status.as_ref().map(|status| AppDefinitionV1beta9Status {
                operator_status: status.operator_status,
                operator_message: status.operator_message.clone(),
            }),
        };
        serde_json::to_value(&object).map_err(malformed)
    }
}
