//! Resource kinds of the Atelier platform.
//!
//! Each kind (AppDefinition, Session, Workspace) has accumulated several
//! incompatible wire schema versions. A canonical hub representation per
//! kind carries the union of all fields ever present in any version; pure
//! per-version adapters map between one wire schema and the hub, and the
//! [`convert::ConversionRouter`] composes `source → hub → target` so any
//! stored version converts to any requested version without an N×N matrix.

pub mod app_definition;
pub mod convert;
pub mod serde_util;
pub mod session;
pub mod webhook;
pub mod workspace;

/// API group of all Atelier kinds.
pub const GROUP: &str = "atelier.io";

pub use convert::{ConversionRouter, VersionAdapter};
pub use webhook::ConversionService;

pub use app_definition::{AppDefinition, AppDefinitionSpec, AppDefinitionStatus};
pub use session::{Session, SessionSpec, SessionStatus};
pub use workspace::{Workspace, WorkspaceSpec, WorkspaceStatus};
