//! The Workspace kind and its wire versions.

mod hub;
mod v1beta3;
mod v1beta4;

pub use hub::{WorkspaceHub, WorkspaceHubSpec, WorkspaceHubStatus};
pub use v1beta3::{
    WorkspaceV1beta3, WorkspaceV1beta3Adapter, WorkspaceV1beta3Spec, WorkspaceV1beta3Status,
};
pub use v1beta4::{Workspace, WorkspaceSpec, WorkspaceStatus, WorkspaceV1beta4Adapter};

use crate::convert::ConversionRouter;
use std::sync::Arc;

pub const KIND: &str = "Workspace";
pub const SUPPORTED_VERSIONS: &[&str] = &["v1beta3", "v1beta4"];
pub const STORED_VERSION: &str = v1beta4::VERSION;

/// Router with every Workspace adapter registered.
pub fn conversion_router() -> ConversionRouter<WorkspaceHub> {
    ConversionRouter::new(
        KIND,
        vec![
            Arc::new(WorkspaceV1beta3Adapter),
            Arc::new(WorkspaceV1beta4Adapter),
        ],
    )
}
