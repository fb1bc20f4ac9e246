use futures::future::try_join_all;

use mobilehub_core::models::api::GraphqlApi;
use mobilehub_core::models::api_key::ApiKey;
use mobilehub_core::models::data_source::DataSource;
use mobilehub_core::models::resolver::Resolver;
use mobilehub_core::models::table::Table;
use mobilehub_core::{BackendSnapshot, DiffMark, Diffed};
use mobilehub_storage::ResourceManager;

use super::{
    MintedRole, RunOptions, apply_roles, attach_policies, create_roles, create_tables, failed,
    persist, resolve_table_names,
};
use crate::addr::ResourceKind;
use crate::client::Clients;
use crate::error::ProvisionerError;
use crate::helpers::{api, api_keys, data_sources, random_suffix, resolvers, tables};
use crate::plan::{PlanEntry, UpdatePlan, build_plan};
use crate::wait::{wait_for_schema, wait_for_table};

/// What an update run changed, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub api_id: String,
    pub applied: Vec<PlanEntry>,
}

impl UpdateReport {
    pub fn count(&self, mark: DiffMark) -> usize {
        self.applied.iter().filter(|e| e.mark == mark).count()
    }
}

/// Reconcile the remote backend with the dev snapshot.
///
/// Only entities whose diff mark is create or update are touched. A dev
/// snapshot that drops an entity is rejected before any remote mutation.
pub async fn update(
    manager: &ResourceManager,
    clients: &Clients,
    options: &RunOptions,
) -> Result<UpdateReport, ProvisionerError> {
    let run = UpdateRun::load(manager)?;
    run.reject_deletes()?;

    let applied = run.plan.entries();
    if applied.is_empty() {
        tracing::info!(api_id = %run.api_id, "backend in sync, no changes needed");
    } else {
        tracing::info!(api_id = %run.api_id, changes = applied.len(), "updating backend");
    }

    let run = run.create_tables(clients, options).await?;
    let run = run.update_tables(clients, options).await?;
    let run = run.create_roles(clients).await?;
    let run = run.attach_policies(clients).await?;
    let run = run.update_api(clients).await?;
    let run = run.submit_schema(clients, options).await?;
    let run = run.sync_data_sources(clients).await?;
    let run = run.sync_resolvers(clients).await?;
    let run = run.sync_api_keys(clients).await?;
    run.finish(manager, options, applied)
}

struct UpdateRun {
    dev: BackendSnapshot,
    current: BackendSnapshot,
    plan: UpdatePlan,
    api_id: String,
    suffix: String,
    tables: Vec<Table>,
    roles: Vec<MintedRole>,
    /// Dev side of every actionable data source, roles applied as minted.
    pending_sources: Vec<Diffed<DataSource>>,
    data_sources: Vec<DataSource>,
    api: Option<GraphqlApi>,
    resolvers: Vec<Resolver>,
    api_keys: Vec<ApiKey>,
}

impl UpdateRun {
    fn load(manager: &ResourceManager) -> Result<Self, ProvisionerError> {
        let dev = manager.load_dev()?;
        let current = manager.load_current()?;
        let api_id = current.api_id().map(String::from).ok_or_else(|| {
            ProvisionerError::InvalidState("no GraphQL API has been created yet; run create first".into())
        })?;

        let mut plan = build_plan(&dev, &current)?;
        let suffix = random_suffix();
        resolve_table_names(
            plan.tables
                .iter_mut()
                .filter(|t| t.mark() == DiffMark::Create)
                .map(Diffed::entity_mut),
            plan.data_sources.iter_mut().map(Diffed::entity_mut),
            &suffix,
        );
        let pending_sources = plan.data_sources.clone();

        Ok(Self {
            dev,
            current,
            plan,
            api_id,
            suffix,
            tables: Vec::new(),
            roles: Vec::new(),
            pending_sources,
            data_sources: Vec::new(),
            api: None,
            resolvers: Vec::new(),
            api_keys: Vec::new(),
        })
    }

    fn reject_deletes(&self) -> Result<(), ProvisionerError> {
        match self.plan.first_delete() {
            Some(entry) => Err(delete_unsupported(entry.addr.kind, &entry.addr.name)),
            None => Ok(()),
        }
    }

    async fn create_tables(
        mut self,
        clients: &Clients,
        options: &RunOptions,
    ) -> Result<Self, ProvisionerError> {
        let pending: Vec<Table> = self
            .plan
            .tables
            .iter()
            .filter_map(|t| match t {
                Diffed::Create(table) => Some(table.clone()),
                _ => None,
            })
            .collect();
        if !pending.is_empty() {
            self.tables = create_tables(clients, &pending, &options.table_wait).await?;
        }
        Ok(self)
    }

    /// Requests for one table run in order, each followed by a wait.
    /// Different tables proceed concurrently.
    async fn update_tables(
        mut self,
        clients: &Clients,
        options: &RunOptions,
    ) -> Result<Self, ProvisionerError> {
        let mut work = Vec::new();
        for entry in &self.plan.tables {
            if let Diffed::Update { dev, current } = entry {
                work.push((current, tables::construct_update_params(dev, current)?));
            }
        }

        let policy = &options.table_wait;
        let updated = try_join_all(work.into_iter().map(|(current, requests)| async move {
            let mut table = current.clone();
            for request in requests {
                tracing::info!(
                    table = %request.table_name,
                    throughput = request.provisioned_throughput.is_some(),
                    index_changes = request.global_secondary_index_updates.len(),
                    "updating table"
                );
                let name = request.table_name.clone();
                let pending = clients
                    .kv
                    .update_table(request)
                    .await
                    .map_err(failed("table", &name))?;
                table = wait_for_table(clients.kv.as_ref(), pending, policy).await?;
            }
            Ok::<_, ProvisionerError>(table)
        }))
        .await?;

        self.tables.extend(updated);
        Ok(self)
    }

    /// Roles are minted only for KV-store sources that have none yet,
    /// neither in dev nor in current.
    async fn create_roles(mut self, clients: &Clients) -> Result<Self, ProvisionerError> {
        let needing = self.pending_sources.iter().filter_map(|d| {
            let dev = d.entity();
            let inherited = d
                .current()
                .and_then(|c| c.service_role_arn.as_ref())
                .is_some_and(|r| r.is_resolved());
            (dev.needs_role() && !inherited).then_some(dev)
        });
        self.roles = create_roles(clients, needing, &self.suffix).await?;
        Ok(self)
    }

    async fn attach_policies(mut self, clients: &Clients) -> Result<Self, ProvisionerError> {
        if self.roles.is_empty() {
            return Ok(self);
        }
        let sources: Vec<DataSource> = self
            .pending_sources
            .iter()
            .map(|d| d.entity().clone())
            .collect();
        let mut known = self.tables.clone();
        known.extend(self.current.tables.iter().cloned());
        attach_policies(clients, &sources, &self.roles, &known).await?;

        for entry in &mut self.pending_sources {
            apply_roles(std::slice::from_mut(entry.entity_mut()), &self.roles);
        }
        Ok(self)
    }

    async fn update_api(mut self, clients: &Clients) -> Result<Self, ProvisionerError> {
        let Diffed::Update { dev, .. } = &self.plan.api else {
            return Ok(self);
        };
        let name = dev.name.value().map(String::from).ok_or_else(|| {
            ProvisionerError::InvalidState("current GraphQL API has no name".into())
        })?;
        tracing::info!(api_id = %self.api_id, api = %name, "updating GraphQL API");

        let updated = clients
            .graph
            .update_graphql_api(self.api_id.clone(), api::construct_param(dev, name.clone()))
            .await
            .map_err(failed("api", &name))?;
        self.api = Some(updated);
        Ok(self)
    }

    async fn submit_schema(
        self,
        clients: &Clients,
        options: &RunOptions,
    ) -> Result<Self, ProvisionerError> {
        if !self.plan.schema.is_actionable() {
            return Ok(self);
        }
        let schema = self.dev.require_schema()?.to_string();
        tracing::info!(api_id = %self.api_id, mark = %self.plan.schema, "submitting schema");
        clients
            .graph
            .start_schema_creation(self.api_id.clone(), schema)
            .await
            .map_err(failed("schema", &self.api_id))?;
        wait_for_schema(clients.graph.as_ref(), &self.api_id, &options.schema_wait).await?;
        Ok(self)
    }

    async fn sync_data_sources(mut self, clients: &Clients) -> Result<Self, ProvisionerError> {
        let api_id = &self.api_id;
        self.data_sources = try_join_all(self.pending_sources.iter().map(|entry| async move {
            let name = entry.entity().name.clone();
            let result = match entry {
                Diffed::Create(dev) => {
                    tracing::info!(data_source = %name, "creating data source");
                    let params = data_sources::construct_create_param(dev)?;
                    clients.graph.create_data_source(api_id.clone(), params).await
                }
                Diffed::Update { dev, current } => {
                    tracing::info!(data_source = %name, "updating data source");
                    let params = data_sources::construct_update_param(dev, current);
                    clients.graph.update_data_source(api_id.clone(), params).await
                }
                Diffed::Unchanged { current, .. } => Ok(current.clone()),
                Diffed::Delete(_) => Err(delete_unsupported(ResourceKind::DataSource, &name)),
            };
            result.map_err(failed("data source", &name))
        }))
        .await?;
        Ok(self)
    }

    async fn sync_resolvers(mut self, clients: &Clients) -> Result<Self, ProvisionerError> {
        let api_id = &self.api_id;
        self.resolvers = try_join_all(self.plan.resolvers.iter().map(|entry| async move {
            let name = resolvers::label(entry.entity());
            let result = match entry {
                Diffed::Create(dev) => {
                    tracing::info!(resolver = %name, "creating resolver");
                    let params = resolvers::construct_param(dev)?;
                    clients.graph.create_resolver(api_id.clone(), params).await
                }
                Diffed::Update { dev, .. } => {
                    tracing::info!(resolver = %name, "updating resolver");
                    let params = resolvers::construct_param(dev)?;
                    clients.graph.update_resolver(api_id.clone(), params).await
                }
                Diffed::Unchanged { current, .. } => Ok(current.clone()),
                Diffed::Delete(_) => Err(delete_unsupported(ResourceKind::Resolver, &name)),
            };
            result.map_err(failed("resolver", &name))
        }))
        .await?;
        Ok(self)
    }

    async fn sync_api_keys(mut self, clients: &Clients) -> Result<Self, ProvisionerError> {
        let api_id = &self.api_id;
        self.api_keys = try_join_all(self.plan.api_keys.iter().map(|entry| async move {
            let name = api_keys::label(entry.entity());
            let result = match entry {
                Diffed::Update { dev, current } => {
                    tracing::info!(api_key = %name, "updating API key");
                    let params = api_keys::construct_update_param(dev, current);
                    clients.graph.update_api_key(api_id.clone(), params).await
                }
                Diffed::Create(dev) => {
                    tracing::info!(api_key = %name, "creating API key");
                    let params = api_keys::construct_create_param(dev);
                    clients.graph.create_api_key(api_id.clone(), params).await
                }
                Diffed::Unchanged { current, .. } => Ok(current.clone()),
                Diffed::Delete(_) => Err(delete_unsupported(ResourceKind::ApiKey, &name)),
            };
            result.map_err(failed("api key", &name))
        }))
        .await?;
        Ok(self)
    }

    /// Fold the results into current and persist.
    fn finish(
        self,
        manager: &ResourceManager,
        options: &RunOptions,
        applied: Vec<PlanEntry>,
    ) -> Result<UpdateReport, ProvisionerError> {
        let schema_changed = self.plan.schema.is_actionable();
        let current = self.current;

        let merged = BackendSnapshot {
            api: self.api.or(current.api),
            tables: merge(current.tables, self.tables, |a, b| a.key() == b.key()),
            data_sources: merge(current.data_sources, self.data_sources, |a, b| {
                a.name == b.name
            }),
            resolvers: merge(current.resolvers, self.resolvers, |a, b| {
                a.type_name == b.type_name && a.field_name == b.field_name
            }),
            api_keys: merge(current.api_keys, self.api_keys, |a, b| a.id == b.id),
            schema: if schema_changed {
                self.dev.schema
            } else {
                current.schema
            },
        };
        persist(manager, &merged, &options.region)?;

        tracing::info!(api_id = %self.api_id, changes = applied.len(), "backend updated");
        Ok(UpdateReport {
            api_id: self.api_id,
            applied,
        })
    }
}

/// Replace matching entries of `current` with their fresh remote state and
/// append the rest.
fn merge<T>(mut current: Vec<T>, results: Vec<T>, same_key: impl Fn(&T, &T) -> bool) -> Vec<T> {
    for result in results {
        match current.iter().position(|c| same_key(c, &result)) {
            Some(i) => current[i] = result,
            None => current.push(result),
        }
    }
    current
}

fn delete_unsupported(kind: ResourceKind, name: &str) -> ProvisionerError {
    ProvisionerError::DeleteUnsupported {
        kind: kind.to_string(),
        name: name.to_string(),
    }
}
