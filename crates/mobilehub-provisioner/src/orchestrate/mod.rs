//! The Create, Update, and Retrieve orchestrators.
//!
//! Each run is a fixed sequence of stages. A stage takes the run context by
//! value, makes its remote calls, and hands the enriched context to the next
//! stage. The first failed call aborts the run, and nothing is persisted
//! until every stage has succeeded.

mod create;
mod retrieve;
mod update;

pub use create::{CreateReport, create};
pub use retrieve::{RetrieveReport, retrieve};
pub use update::{UpdateReport, update};

use futures::future::try_join_all;

use mobilehub_core::models::api::PublicApiInfo;
use mobilehub_core::models::data_source::DataSource;
use mobilehub_core::models::table::Table;
use mobilehub_core::placeholder::{is_templated, substitute_suffix};
use mobilehub_core::{BackendSnapshot, ProviderId};
use mobilehub_storage::ResourceManager;

use crate::client::Clients;
use crate::error::ProvisionerError;
use crate::helpers::{dress_snapshot, service_role, tables};
use crate::wait::{RetryPolicy, wait_for_tables};

/// Settings shared by every orchestrator run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Fallback base for generated API names.
    pub project_name: String,
    /// Region recorded in the public API info.
    pub region: String,
    pub schema_wait: RetryPolicy,
    pub table_wait: RetryPolicy,
}

impl RunOptions {
    pub fn new(project_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            region: region.into(),
            schema_wait: RetryPolicy::SCHEMA_COMPILE,
            table_wait: RetryPolicy::TABLE_ACTIVATION,
        }
    }
}

/// Log a failed remote call against the resource it targeted.
fn failed<'a>(
    label: &'a str,
    name: &'a str,
) -> impl FnOnce(ProvisionerError) -> ProvisionerError + 'a {
    move |e| {
        tracing::error!(resource = label, name = %name, error = %e, "remote call failed");
        e.with_resource(label, name)
    }
}

/// Fill the suffix slot of templated table names, in the tables themselves
/// and in the data sources that point at them.
fn resolve_table_names<'a>(
    tables: impl IntoIterator<Item = &'a mut Table>,
    sources: impl IntoIterator<Item = &'a mut DataSource>,
    suffix: &str,
) {
    for table in tables {
        if is_templated(&table.table_name) {
            table.table_name = substitute_suffix(&table.table_name, suffix);
        }
    }
    for config in sources.into_iter().filter_map(|d| d.dynamodb_config.as_mut()) {
        if is_templated(&config.table_name) {
            config.table_name = substitute_suffix(&config.table_name, suffix);
        }
    }
}

/// Create every table concurrently, then wait until all are stable.
async fn create_tables(
    clients: &Clients,
    pending: &[Table],
    policy: &RetryPolicy,
) -> Result<Vec<Table>, ProvisionerError> {
    let created = try_join_all(pending.iter().map(|table| async move {
        tracing::info!(table = %table.table_name, region = %table.region, "creating table");
        clients
            .kv
            .create_table(tables::construct_create_param(table))
            .await
            .map_err(failed("table", &table.table_name))
    }))
    .await?;
    wait_for_tables(clients.kv.as_ref(), created, policy).await
}

/// An execution role created during this run.
#[derive(Debug, Clone)]
struct MintedRole {
    data_source: String,
    role_name: String,
    arn: String,
}

async fn create_roles<'a>(
    clients: &Clients,
    sources: impl IntoIterator<Item = &'a DataSource>,
    suffix: &str,
) -> Result<Vec<MintedRole>, ProvisionerError> {
    try_join_all(sources.into_iter().map(|ds| async move {
        let (table_name, _) = ds.table_ref().ok_or_else(|| {
            ProvisionerError::InvalidState(format!("data source {} has no table config", ds.name))
        })?;
        let params = service_role::construct_create_role_param_for_ddb(table_name, suffix);
        let role_name = params.role_name.clone();
        tracing::info!(data_source = %ds.name, role = %role_name, "creating execution role");
        let arn = clients
            .roles
            .create_role(params)
            .await
            .map_err(failed("role", &role_name))?;
        Ok::<_, ProvisionerError>(MintedRole {
            data_source: ds.name.clone(),
            role_name,
            arn,
        })
    }))
    .await
}

/// Grant each minted role access to its data source's table.
///
/// The table ARN comes from `known` when the table was touched in this run,
/// and from a describe call otherwise.
async fn attach_policies(
    clients: &Clients,
    sources: &[DataSource],
    roles: &[MintedRole],
    known: &[Table],
) -> Result<(), ProvisionerError> {
    try_join_all(roles.iter().map(|role| async move {
        let ds = sources
            .iter()
            .find(|d| d.name == role.data_source)
            .ok_or_else(|| {
                ProvisionerError::InvalidState(format!(
                    "role {} belongs to unknown data source {}",
                    role.role_name, role.data_source
                ))
            })?;
        let (table_name, region) = ds.table_ref().ok_or_else(|| {
            ProvisionerError::InvalidState(format!("data source {} has no table config", ds.name))
        })?;

        let known_arn = known
            .iter()
            .find(|t| t.key() == (table_name, region))
            .and_then(|t| t.table_arn.clone());
        let table_arn = match known_arn {
            Some(arn) => arn,
            None => clients
                .kv
                .describe_table(region.to_string(), table_name.to_string())
                .await
                .map_err(failed("table", table_name))?
                .table_arn
                .ok_or_else(|| {
                    ProvisionerError::InvalidState(format!("table {table_name} has no ARN"))
                })?,
        };

        let Some(params) =
            service_role::construct_put_role_policy_param_for_ddb(ds, &role.role_name, &table_arn)
        else {
            return Ok(());
        };
        tracing::info!(role = %role.role_name, table = %table_name, "attaching table policy");
        clients
            .roles
            .put_role_policy(params)
            .await
            .map_err(failed("role policy", &role.role_name))
    }))
    .await?;
    Ok(())
}

fn apply_roles(sources: &mut [DataSource], roles: &[MintedRole]) {
    for role in roles {
        if let Some(ds) = sources.iter_mut().find(|d| d.name == role.data_source) {
            ds.service_role_arn = Some(ProviderId::resolved(&role.arn));
        }
    }
}

/// The client-facing projection: endpoint, region, auth mode, first key.
fn public_info(current: &BackendSnapshot, region: &str) -> Option<PublicApiInfo> {
    let api = current.api.as_ref()?;
    Some(PublicApiInfo {
        graphql_endpoint: api.graphql_endpoint()?.to_string(),
        region: region.to_string(),
        authentication_type: api.authentication_type,
        api_key: current
            .api_keys
            .first()
            .and_then(|k| k.id.value())
            .map(String::from),
    })
}

/// Write the current snapshot, the public info, and a refreshed dev
/// snapshot dressed from current.
fn persist(
    manager: &ResourceManager,
    current: &BackendSnapshot,
    region: &str,
) -> Result<(), ProvisionerError> {
    manager.save_current(current)?;
    match public_info(current, region) {
        Some(info) => manager.save_public_info(&info)?,
        None => tracing::warn!("API has no GraphQL endpoint yet; public info not written"),
    }
    manager.save_dev(&dress_snapshot(current.clone()))?;
    Ok(())
}
