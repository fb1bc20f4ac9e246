//! mobilehub-storage
//!
//! Local snapshot persistence: the dev and current trees of a backend
//! feature, one JSON or text document per resource collection.

pub mod documents;
pub mod error;
pub mod layout;
pub mod manager;
pub mod state;

pub use crate::error::StorageError;
pub use crate::layout::ProjectLayout;
pub use crate::manager::ResourceManager;
