//! Deterministic names for the external objects owned by a workspace.
//!
//! Names are derived from the workspace identity, never random, so a
//! repeated reconciliation computes the same name and "already exists"
//! checks are meaningful idempotence guards rather than races.

use atelier_shared::OperatorConfig;
use std::collections::BTreeMap;

pub const WORKSPACE_LABEL: &str = "atelier.io/workspace";

/// Name of the storage volume (and claim) backing a workspace.
pub fn storage_name(workspace_name: &str) -> String {
    format!("storage-{workspace_name}")
}

/// Name of the session launched for a workspace.
pub fn session_name(workspace_name: &str) -> String {
    format!("{workspace_name}-session")
}

/// Labels applied to every object the operator creates for a workspace:
/// the configured base labels plus the owning workspace.
pub fn owner_labels(config: &OperatorConfig, workspace_name: &str) -> BTreeMap<String, String> {
    let mut labels: BTreeMap<String, String> = config
        .base_labels
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    labels.insert(WORKSPACE_LABEL.to_string(), workspace_name.to_string());
    labels
}
