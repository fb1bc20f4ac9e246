use futures::future::try_join_all;

use mobilehub_core::BackendSnapshot;
use mobilehub_storage::ResourceManager;

use super::{RunOptions, failed, persist};
use crate::client::Clients;
use crate::error::ProvisionerError;
use crate::helpers::schema;
use crate::params::TypeDefinition;

/// What a retrieve run found remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveReport {
    pub api_id: String,
    pub api_name: String,
    pub tables: usize,
    pub data_sources: usize,
    pub resolvers: usize,
    pub api_keys: usize,
}

/// Read the remote backend back into the current snapshot.
///
/// The API id comes from current, or from dev when current is missing.
/// Nothing remote is mutated.
pub async fn retrieve(
    manager: &ResourceManager,
    clients: &Clients,
    options: &RunOptions,
) -> Result<RetrieveReport, ProvisionerError> {
    manager.ensure_enabled()?;
    let api_id = match manager.load_current()?.api_id() {
        Some(id) => id.to_string(),
        None => manager
            .load_dev()?
            .api_id()
            .map(String::from)
            .ok_or_else(|| {
                ProvisionerError::InvalidState(
                    "no API id in the current or dev snapshot; run create first".into(),
                )
            })?,
    };
    tracing::info!(api_id = %api_id, "retrieving backend");

    let graph = clients.graph.as_ref();
    let (api, data_sources, types, api_keys) = futures::try_join!(
        graph.get_graphql_api(api_id.clone()),
        graph.list_data_sources(api_id.clone()),
        graph.list_types(api_id.clone()),
        graph.list_api_keys(api_id.clone()),
    )
    .map_err(failed("api", &api_id))?;

    // Several data sources may share one table.
    let mut table_refs: Vec<(String, String)> = Vec::new();
    for (name, region) in data_sources.iter().filter_map(|d| d.table_ref()) {
        if !table_refs.iter().any(|(n, r)| n == name && r == region) {
            table_refs.push((name.to_string(), region.to_string()));
        }
    }
    let resolver_types: Vec<&str> = types
        .iter()
        .filter(|t| is_object_type(t))
        .map(|t| t.name.as_str())
        .collect();

    let (tables, resolver_lists) = futures::try_join!(
        try_join_all(table_refs.iter().map(|(name, region)| async move {
            clients
                .kv
                .describe_table(region.clone(), name.clone())
                .await
                .map_err(failed("table", name))
        })),
        try_join_all(resolver_types.iter().map(|type_name| {
            let api_id = api_id.clone();
            async move {
                graph
                    .list_resolvers(api_id, type_name.to_string())
                    .await
                    .map_err(failed("resolvers of type", type_name))
            }
        })),
    )?;

    let current = BackendSnapshot {
        api: Some(api),
        data_sources,
        tables,
        resolvers: resolver_lists.into_iter().flatten().collect(),
        api_keys,
        schema: Some(schema::concat_type_definitions(&types)),
    };

    let report = RetrieveReport {
        api_id,
        api_name: current
            .api
            .as_ref()
            .map(|a| a.name.to_string())
            .unwrap_or_default(),
        tables: current.tables.len(),
        data_sources: current.data_sources.len(),
        resolvers: current.resolvers.len(),
        api_keys: current.api_keys.len(),
    };
    persist(manager, &current, &options.region)?;

    tracing::info!(
        api_id = %report.api_id,
        tables = report.tables,
        data_sources = report.data_sources,
        resolvers = report.resolvers,
        "backend retrieved"
    );
    Ok(report)
}

/// Only object types can carry resolvers.
fn is_object_type(t: &TypeDefinition) -> bool {
    t.definition.trim_start().starts_with("type ")
}
