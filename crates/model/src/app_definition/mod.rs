//! The AppDefinition kind and its wire versions.

mod hub;
mod v1beta9;
mod v1beta10;

pub use hub::{AppDefinitionHub, AppDefinitionHubSpec, AppDefinitionHubStatus};
pub use v1beta9::{
    AppDefinitionV1beta9, AppDefinitionV1beta9Adapter, AppDefinitionV1beta9Spec,
    AppDefinitionV1beta9Status,
};
pub use v1beta10::{
    AppDefinition, AppDefinitionSpec, AppDefinitionStatus, AppDefinitionV1beta10Adapter,
};

use crate::convert::ConversionRouter;
use std::sync::Arc;

pub const KIND: &str = "AppDefinition";
pub const SUPPORTED_VERSIONS: &[&str] = &["v1beta9", "v1beta10"];
pub const STORED_VERSION: &str = v1beta10::VERSION;

/// Router with every AppDefinition adapter registered.
pub fn conversion_router() -> ConversionRouter<AppDefinitionHub> {
    ConversionRouter::new(
        KIND,
        vec![
            Arc::new(AppDefinitionV1beta9Adapter),
            Arc::new(AppDefinitionV1beta10Adapter),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v1beta9_object() -> serde_json::Value {
        json!({
            "apiVersion": "atelier.io/v1beta9",
            "kind": "AppDefinition",
            "metadata": {"name": "ide-rust", "namespace": "atelier"},
            "spec": {
                "name": "ide-rust",
                "image": "atelier/ide-rust:1.4",
                "imagePullPolicy": "IfNotPresent",
                "port": 3000,
                "minInstances": 0,
                "maxInstances": 25,
                "requestsMemory": "512Mi",
                "requestsCpu": "250m",
                "limitsMemory": "2Gi",
                "limitsCpu": "1000m",
                "downlinkLimit": 30000,
                "uplinkLimit": 30000,
                "timeout": 30
            },
            "status": {"operatorStatus": "HANDLED"}
        })
    }

    #[test]
    fn test_all_versions_registered() {
        conversion_router().expect_versions(SUPPORTED_VERSIONS).unwrap();
    }

    #[test]
    fn test_round_trip_v1beta9_is_identity() {
        let original: AppDefinitionV1beta9 =
            serde_json::from_value(v1beta9_object()).unwrap();
        let converted = conversion_router()
            .convert(v1beta9_object(), "v1beta9")
            .unwrap();
        let round_tripped: AppDefinitionV1beta9 = serde_json::from_value(converted).unwrap();
        assert_eq!(round_tripped, original);
    }

    #[test]
    fn test_round_trip_v1beta10_is_identity() {
        let object = json!({
            "apiVersion": "atelier.io/v1beta10",
            "kind": "AppDefinition",
            "metadata": {"name": "ide-go"},
            "spec": {
                "name": "ide-go",
                "image": "atelier/ide-go:2.0",
                "port": 3000,
                "options": {"monitorPort": "8081"}
            }
        });
        let original: AppDefinition = serde_json::from_value(object.clone()).unwrap();
        let converted = conversion_router().convert(object, "v1beta10").unwrap();
        let round_tripped: AppDefinition = serde_json::from_value(converted).unwrap();
        assert_eq!(round_tripped, original);
    }

    #[test]
    fn test_upgrade_keeps_deprecated_bandwidth_limits() {
        // downlink/uplink are deprecated in v1beta10 but still defined there;
        // the hub retains their last known semantics.
        let converted = conversion_router()
            .convert(v1beta9_object(), "v1beta10")
            .unwrap();
        let app: AppDefinition = serde_json::from_value(converted).unwrap();
        assert_eq!(app.spec.downlink_limit, Some(30000));
        assert_eq!(app.spec.uplink_limit, Some(30000));
        assert!(app.spec.options.is_empty());
    }

    #[test]
    fn test_downgrade_drops_options_only() {
        let object = json!({
            "apiVersion": "atelier.io/v1beta10",
            "kind": "AppDefinition",
            "metadata": {"name": "ide-go"},
            "spec": {
                "name": "ide-go",
                "image": "atelier/ide-go:2.0",
                "port": 3000,
                "maxInstances": 10,
                "options": {"k": "v"}
            }
        });
        let converted = conversion_router().convert(object, "v1beta9").unwrap();
        let spec = converted.get("spec").unwrap();
        assert!(spec.get("options").is_none());
        assert_eq!(spec.get("maxInstances").unwrap(), 10);
    }
}
