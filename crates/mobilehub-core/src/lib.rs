//! mobilehub-core
//!
//! Pure domain types for the AppSync backend feature: snapshot entities,
//! provider-identifier placeholders, and three-way diff marks.
//! No AWS SDK dependency; this is the shared vocabulary of the workspace.

pub mod diff;
pub mod error;
pub mod models;
pub mod placeholder;

pub use crate::diff::{DiffMark, Diffed};
pub use crate::error::CoreError;
pub use crate::models::snapshot::BackendSnapshot;
pub use crate::placeholder::{MappingTemplate, ProviderId};
