//! Operator configuration.
//!
//! Explicitly constructed and passed down (never ambient global state), so
//! the reconciler core can be unit-tested against a fake resource client.

use crate::error::{OperatorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for the Atelier operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Namespace the operator watches and provisions into
    pub namespace: String,
    /// Storage class for workspace volumes
    pub storage_class_name: String,
    /// Requested capacity for workspace volumes (e.g. "250Mi")
    pub storage_size: String,
    /// Base directory for host-path backed volumes
    pub host_path_base: String,
    /// Base labels applied to every object the operator creates
    pub base_labels: HashMap<String, String>,
    /// How many times a conflicting status update is re-read and re-applied
    pub conflict_retry_limit: usize,
    /// Port of the conversion webhook server
    pub webhook_port: u16,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        let mut base_labels = HashMap::new();
        base_labels.insert("app".to_string(), "atelier".to_string());
        base_labels.insert("atelier.io/managed".to_string(), "true".to_string());

        Self {
            namespace: "atelier".to_string(),
            storage_class_name: "atelier-workspace".to_string(),
            storage_size: "250Mi".to_string(),
            host_path_base: "/var/lib/atelier/workspaces".to_string(),
            base_labels,
            conflict_retry_limit: 10,
            webhook_port: 8443,
        }
    }
}

impl OperatorConfig {
    pub fn builder() -> OperatorConfigBuilder {
        OperatorConfigBuilder::new()
    }

    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut builder = OperatorConfigBuilder::new();

        if let Ok(namespace) = std::env::var("ATELIER_NAMESPACE") {
            builder = builder.namespace(namespace);
        }

        if let Ok(storage_class) = std::env::var("ATELIER_STORAGE_CLASS") {
            builder = builder.storage_class_name(storage_class);
        }

        if let Ok(size) = std::env::var("ATELIER_STORAGE_SIZE") {
            builder = builder.storage_size(size);
        }

        if let Ok(base) = std::env::var("ATELIER_HOST_PATH_BASE") {
            builder = builder.host_path_base(base);
        }

        if let Ok(port) = std::env::var("ATELIER_WEBHOOK_PORT") {
            let port = port.parse().map_err(|_| OperatorError::InvalidConfig {
                message: format!("ATELIER_WEBHOOK_PORT is not a port number: {}", port),
            })?;
            builder = builder.webhook_port(port);
        }

        builder.build()
    }
}

/// Builder for [`OperatorConfig`].
pub struct OperatorConfigBuilder {
    config: OperatorConfig,
}

impl OperatorConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: OperatorConfig::default(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    pub fn storage_class_name(mut self, storage_class: impl Into<String>) -> Self {
        self.config.storage_class_name = storage_class.into();
        self
    }

    pub fn storage_size(mut self, size: impl Into<String>) -> Self {
        self.config.storage_size = size.into();
        self
    }

    pub fn host_path_base(mut self, base: impl Into<String>) -> Self {
        self.config.host_path_base = base.into();
        self
    }

    pub fn add_base_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.base_labels.insert(key.into(), value.into());
        self
    }

    pub fn conflict_retry_limit(mut self, limit: usize) -> Self {
        self.config.conflict_retry_limit = limit;
        self
    }

    pub fn webhook_port(mut self, port: u16) -> Self {
        self.config.webhook_port = port;
        self
    }

    pub fn build(self) -> Result<OperatorConfig> {
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<()> {
        if self.config.namespace.is_empty() {
            return Err(OperatorError::InvalidConfig {
                message: "namespace cannot be empty".to_string(),
            });
        }
        if self.config.storage_size.is_empty() {
            return Err(OperatorError::InvalidConfig {
                message: "storage size cannot be empty".to_string(),
            });
        }
        if self.config.conflict_retry_limit == 0 {
            return Err(OperatorError::InvalidConfig {
                message: "conflict retry limit must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for OperatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
