//! Conversion webhook boundary: the externally reachable surface during
//! schema migration. Receives resource bytes plus a target version and
//! returns the converted bytes, or an `UnsupportedVersion` fault.

use atelier_shared::{OperatorError, Result};
use serde_json::Value;

use crate::app_definition::{self, AppDefinitionHub};
use crate::convert::{kind_of, ConversionRouter};
use crate::session::{self, SessionHub};
use crate::workspace::{self, WorkspaceHub};

/// Kind-dispatching conversion front end.
///
/// Construction is the single place version registration is validated: a
/// build missing an adapter for a served version fails at startup instead
/// of at the first conversion request.
pub struct ConversionService {
    app_definitions: ConversionRouter<AppDefinitionHub>,
    sessions: ConversionRouter<SessionHub>,
    workspaces: ConversionRouter<WorkspaceHub>,
}

impl ConversionService {
    pub fn new() -> Result<Self> {
        let app_definitions = app_definition::conversion_router();
        app_definitions.expect_versions(app_definition::SUPPORTED_VERSIONS)?;

        let sessions = session::conversion_router();
        sessions.expect_versions(session::SUPPORTED_VERSIONS)?;

        let workspaces = workspace::conversion_router();
        workspaces.expect_versions(workspace::SUPPORTED_VERSIONS)?;

        Ok(Self {
            app_definitions,
            sessions,
            workspaces,
        })
    }

    /// Convert a parsed object to the requested version.
    pub fn convert_value(&self, object: Value, target_version: &str) -> Result<Value> {
        match kind_of(&object)? {
            app_definition::KIND => self.app_definitions.convert(object, target_version),
            session::KIND => self.sessions.convert(object, target_version),
            workspace::KIND => self.workspaces.convert(object, target_version),
            other => Err(OperatorError::MalformedResource {
                message: format!("unknown kind {other}"),
            }),
        }
    }

    /// Convert raw resource bytes to the requested version.
    pub fn convert_bytes(&self, bytes: &[u8], target_version: &str) -> Result<Vec<u8>> {
        let object: Value =
            serde_json::from_slice(bytes).map_err(|e| OperatorError::MalformedResource {
                message: e.to_string(),
            })?;
        let converted = self.convert_value(object, target_version)?;
        serde_json::to_vec(&converted).map_err(|e| OperatorError::MalformedResource {
            message: e.to_string(),
        })
    }
}
