//! Shared data model for the Stacksmith scaffolding server.
//!
//! This crate carries the types that cross crate boundaries: the closed
//! capability set, detection snapshots, run reports, the error taxonomy, and
//! the request parameter structs whose derived schemas back the tool surface.

pub mod capability;
pub mod error;
pub mod params;
pub mod report;
pub mod state;

pub use capability::Capability;
pub use error::{ExecutionError, ScaffoldError, ValidationReport};
pub use params::{AddCapabilityParams, CreateProjectParams, PackageManager, ProjectStatusParams};
pub use report::{OperationFailure, RunReport};
pub use state::ProjectState;
