use serde::{Deserialize, Serialize};

use mobilehub_core::models::api::GraphqlApi;
use mobilehub_core::models::api_key::ApiKey;
use mobilehub_core::models::data_source::DataSource;
use mobilehub_core::models::resolver::Resolver;
use mobilehub_core::models::table::Table;
use mobilehub_core::{BackendSnapshot, DiffMark, Diffed};

use crate::addr::{EntityAddr, ResourceKind};
use crate::error::ProvisionerError;
use crate::helpers::{api, api_keys, data_sources, resolvers, schema, tables};

/// One actionable line of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub addr: EntityAddr,
    pub mark: DiffMark,
}

/// Per-kind diff results between dev and current. Collections hold only
/// actionable pairings.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    pub api: Diffed<GraphqlApi>,
    pub schema: DiffMark,
    pub tables: Vec<Diffed<Table>>,
    pub data_sources: Vec<Diffed<DataSource>>,
    pub resolvers: Vec<Diffed<Resolver>>,
    pub api_keys: Vec<Diffed<ApiKey>>,
}

/// Diff every resource kind of `dev` against `current`.
pub fn build_plan(
    dev: &BackendSnapshot,
    current: &BackendSnapshot,
) -> Result<UpdatePlan, ProvisionerError> {
    let dev_api = dev.require_api()?;
    Ok(UpdatePlan {
        api: api::diff(dev_api, current.api.as_ref()),
        schema: schema::diff(dev.schema.as_deref(), current.schema.as_deref()),
        tables: tables::diff(&dev.tables, &current.tables),
        data_sources: data_sources::diff(&dev.data_sources, &current.data_sources),
        resolvers: resolvers::diff(&dev.resolvers, &current.resolvers),
        api_keys: api_keys::diff(&dev.api_keys, &current.api_keys),
    })
}

impl UpdatePlan {
    pub fn has_changes(&self) -> bool {
        !self.entries().is_empty()
    }

    /// Flatten into display order: the order an update run executes in.
    pub fn entries(&self) -> Vec<PlanEntry> {
        let mut entries = Vec::new();
        let mut push = |kind, name: String, mark: DiffMark| {
            if mark.is_actionable() {
                entries.push(PlanEntry {
                    addr: EntityAddr::new(kind, name),
                    mark,
                });
            }
        };

        for t in &self.tables {
            push(ResourceKind::Table, t.entity().table_name.clone(), t.mark());
        }
        push(
            ResourceKind::Api,
            self.api.entity().name.to_string(),
            self.api.mark(),
        );
        push(ResourceKind::Schema, "schema".into(), self.schema);
        for d in &self.data_sources {
            push(ResourceKind::DataSource, d.entity().name.clone(), d.mark());
        }
        for r in &self.resolvers {
            push(ResourceKind::Resolver, resolvers::label(r.entity()), r.mark());
        }
        for k in &self.api_keys {
            push(ResourceKind::ApiKey, api_keys::label(k.entity()), k.mark());
        }
        entries
    }

    /// The first entity marked for deletion, if any.
    pub fn first_delete(&self) -> Option<PlanEntry> {
        self.entries()
            .into_iter()
            .find(|e| e.mark == DiffMark::Delete)
    }
}
