//! The Session kind and its wire versions.

mod hub;
mod v1beta5;
mod v1beta6;
mod v1beta7;

pub use hub::{SessionHub, SessionHubSpec, SessionHubStatus};
pub use v1beta5::{SessionV1beta5, SessionV1beta5Adapter, SessionV1beta5Spec, SessionV1beta5Status};
pub use v1beta6::{SessionV1beta6, SessionV1beta6Adapter, SessionV1beta6Spec, SessionV1beta6Status};
pub use v1beta7::{Session, SessionSpec, SessionStatus, SessionV1beta7Adapter};

use crate::convert::ConversionRouter;
use std::sync::Arc;

pub const KIND: &str = "Session";
pub const SUPPORTED_VERSIONS: &[&str] = &["v1beta5", "v1beta6", "v1beta7"];
pub const STORED_VERSION: &str = v1beta7::VERSION;

/// Router with every Session adapter registered.
pub fn conversion_router() -> ConversionRouter<SessionHub> {
    ConversionRouter::new(
        KIND,
        vec![
            Arc::new(SessionV1beta5Adapter),
            Arc::new(SessionV1beta6Adapter),
            Arc::new(SessionV1beta7Adapter),
        ],
    )
}
