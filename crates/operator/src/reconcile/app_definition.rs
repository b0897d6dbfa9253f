//! AppDefinition admission-time validation.
//!
//! An AppDefinition carries no owned external objects, so handling it means
//! checking the template is usable before any session is launched from it.
//! A rejected definition lands in ERROR with a message naming every
//! violated constraint, so the author sees all problems at once.

use async_trait::async_trait;
use atelier_model::{AppDefinition, AppDefinitionSpec};
use atelier_shared::{CorrelationId, OperatorError, Result};
use kube::ResourceExt;
use tracing::debug;

use super::machine::ReconcileHandler;

const MAX_PORT: i32 = 65535;

pub struct AppDefinitionValidationHandler;

impl AppDefinitionValidationHandler {
    fn violations(spec: &AppDefinitionSpec) -> Vec<String> {
        let mut violations = Vec::new();

        if spec.image.trim().is_empty() {
            violations.push("image must not be empty".to_string());
        }
        if spec.port < 1 || spec.port > MAX_PORT {
            violations.push(format!("port {} is outside 1..=65535", spec.port));
        }
        if let Some(min) = spec.min_instances {
            if min < 0 {
                violations.push(format!("minInstances {min} is negative"));
            }
        }
        if let (Some(min), Some(max)) = (spec.min_instances, spec.max_instances) {
            if max < min {
                violations.push(format!(
                    "maxInstances {max} is smaller than minInstances {min}"
                ));
            }
        }
        if let Some(timeout) = spec.timeout {
            if timeout <= 0 {
                violations.push(format!("timeout {timeout} must be positive"));
            }
        }
        for (field, limit) in [
            ("downlinkLimit", spec.downlink_limit),
            ("uplinkLimit", spec.uplink_limit),
        ] {
            if let Some(limit) = limit {
                if limit < 0 {
                    violations.push(format!("{field} {limit} is negative"));
                }
            }
        }

        violations
    }
}

#[async_trait]
impl ReconcileHandler<AppDefinition> for AppDefinitionValidationHandler {
    async fn handle(
        &self,
        correlation_id: &CorrelationId,
        definition: &AppDefinition,
    ) -> Result<()> {
        let violations = Self::violations(&definition.spec);
        if violations.is_empty() {
            debug!(
                name = definition.name_any(),
                correlation_id = %correlation_id,
                "app definition accepted"
            );
            return Ok(());
        }
        Err(OperatorError::MalformedResource {
            message: violations.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ObjectMeta;

    fn definition(mutate: impl FnOnce(&mut AppDefinitionSpec)) -> AppDefinition {
        let mut spec = AppDefinitionSpec {
            name: "ide-rust".to_string(),
            image: "ghcr.io/atelier/ide-rust:1.0".to_string(),
            image_pull_policy: None,
            pull_secret: None,
            uid: None,
            port: 3000,
            ingressname: None,
            min_instances: Some(0),
            max_instances: Some(10),
            requests_memory: None,
            requests_cpu: None,
            limits_memory: None,
            limits_cpu: None,
            downlink_limit: None,
            uplink_limit: None,
            mount_path: None,
            timeout: Some(30),
            options: Default::default(),
        };
        mutate(&mut spec);
        AppDefinition {
            metadata: ObjectMeta {
                name: Some("ide-rust".to_string()),
                ..Default::default()
            },
            spec,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_valid_definition_is_accepted() {
        let handler = AppDefinitionValidationHandler;
        let result = handler
            .handle(&CorrelationId::new(), &definition(|_| {}))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_empty_image_is_rejected() {
        let handler = AppDefinitionValidationHandler;
        let err = handler
            .handle(
                &CorrelationId::new(),
                &definition(|spec| spec.image = "  ".to_string()),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("image"));
    }

    #[tokio::test]
    async fn test_all_violations_are_reported_together() {
        let handler = AppDefinitionValidationHandler;
        let err = handler
            .handle(
                &CorrelationId::new(),
                &definition(|spec| {
                    spec.port = 0;
                    spec.min_instances = Some(5);
                    spec.max_instances = Some(2);
                    spec.timeout = Some(-1);
                }),
            )
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("port"));
        assert!(message.contains("maxInstances"));
        assert!(message.contains("timeout"));
    }

    #[tokio::test]
    async fn test_negative_bandwidth_limits_are_rejected() {
        let handler = AppDefinitionValidationHandler;
        let err = handler
            .handle(
                &CorrelationId::new(),
                &definition(|spec| spec.downlink_limit = Some(-10)),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("downlinkLimit"));
    }
}
