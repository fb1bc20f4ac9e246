//! Per-kind resource helpers.
//!
//! Each kind exposes the same verbs: `dress_for_dev_backend` strips
//! provider-only fields, `reconcile` pairs dev with current and marks every
//! pairing, `diff` keeps only the actionable ones, and the `construct_*`
//! functions project an entity onto the request shape the provider accepts.

pub mod api;
pub mod api_keys;
pub mod data_sources;
pub mod resolvers;
pub mod schema;
pub mod service_role;
pub mod tables;

use mobilehub_core::BackendSnapshot;

/// Dress every collection of a snapshot.
pub fn dress_snapshot(snapshot: BackendSnapshot) -> BackendSnapshot {
    BackendSnapshot {
        api: snapshot.api.map(api::dress_for_dev_backend),
        data_sources: snapshot
            .data_sources
            .into_iter()
            .map(data_sources::dress_for_dev_backend)
            .collect(),
        tables: snapshot
            .tables
            .into_iter()
            .map(tables::dress_for_dev_backend)
            .collect(),
        resolvers: snapshot
            .resolvers
            .into_iter()
            .map(resolvers::dress_for_dev_backend)
            .collect(),
        api_keys: api_keys::dress_for_dev_backend(snapshot.api_keys),
        schema: snapshot.schema.map(schema::dress_for_dev_backend),
    }
}

/// Eight hex characters, fresh per run, for physical names and role names.
pub fn random_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
