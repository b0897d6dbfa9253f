//! Multi-version conversion: adapter contract and the per-kind router.

use atelier_shared::{OperatorError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::GROUP;

/// Bidirectional, lossless mapping between one wire schema version and the
/// hub representation of a kind.
///
/// Both directions are total for well-formed input of the adapter's own
/// version and free of side effects. `to_hub` copies every field the
/// version defines into the hub; `from_hub` populates every field the
/// version defines and ignores hub fields that belong to other versions.
pub trait VersionAdapter<H>: Send + Sync {
    /// The wire version this adapter speaks, e.g. `v1beta5`.
    fn version(&self) -> &'static str;

    fn to_hub(&self, object: Value) -> Result<H>;

    fn from_hub(&self, hub: &H) -> Result<Value>;
}

/// Maps a serde failure on the conversion boundary to the taxonomy.
pub(crate) fn malformed(err: serde_json::Error) -> OperatorError {
    OperatorError::MalformedResource {
        message: err.to_string(),
    }
}

/// Reads the version segment out of an object's `apiVersion` field.
pub fn version_of(object: &Value) -> Result<&str> {
    let api_version = object
        .get("apiVersion")
        .and_then(Value::as_str)
        .ok_or_else(|| OperatorError::MalformedResource {
            message: "object has no apiVersion".to_string(),
        })?;
    Ok(api_version
        .rsplit_once('/')
        .map(|(_, version)| version)
        .unwrap_or(api_version))
}

/// Reads an object's `kind` field.
pub fn kind_of(object: &Value) -> Result<&str> {
    object
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| OperatorError::MalformedResource {
            message: "object has no kind".to_string(),
        })
}

/// Full `apiVersion` value for a version of the Atelier group.
pub fn api_version(version: &str) -> String {
    format!("{}/{}", GROUP, version)
}

/// Adapter registry for one kind, composing `source → hub → target`.
pub struct ConversionRouter<H> {
    kind: &'static str,
    adapters: HashMap<&'static str, Arc<dyn VersionAdapter<H>>>,
}

impl<H> ConversionRouter<H> {
    pub fn new(kind: &'static str, adapters: Vec<Arc<dyn VersionAdapter<H>>>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.version(), adapter))
            .collect();
        Self { kind, adapters }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Startup validation: every version the build is expected to serve
    /// must have a registered adapter. A missing adapter for a newly
    /// introduced version is caught here rather than at the first
    /// conversion request.
    pub fn expect_versions(&self, versions: &[&str]) -> Result<()> {
        for version in versions {
            if !self.adapters.contains_key(version) {
                return Err(OperatorError::UnsupportedVersion {
                    kind: self.kind.to_string(),
                    version: (*version).to_string(),
                });
            }
        }
        Ok(())
    }

    fn adapter(&self, version: &str) -> Result<&Arc<dyn VersionAdapter<H>>> {
        self.adapters
            .get(version)
            .ok_or_else(|| OperatorError::UnsupportedVersion {
                kind: self.kind.to_string(),
                version: version.to_string(),
            })
    }

    /// Convert a stored-version object to the requested target version.
    ///
    /// The source version is taken from the object's own `apiVersion`.
    /// Either side missing an adapter is a deployment error
    /// ([`OperatorError::UnsupportedVersion`]), never retried.
    pub fn convert(&self, object: Value, target_version: &str) -> Result<Value> {
        let source_version = version_of(&object)?.to_string();
        let target = self.adapter(target_version)?;
        let source = self.adapter(&source_version)?;
        let hub = source.to_hub(object)?;
        target.from_hub(&hub)
    }
}
