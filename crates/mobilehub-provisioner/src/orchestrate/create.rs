use futures::future::try_join_all;

use mobilehub_core::models::api::GraphqlApi;
use mobilehub_core::models::api_key::ApiKey;
use mobilehub_core::models::data_source::DataSource;
use mobilehub_core::models::resolver::Resolver;
use mobilehub_core::models::table::Table;
use mobilehub_core::BackendSnapshot;
use mobilehub_storage::ResourceManager;

use super::{
    MintedRole, RunOptions, apply_roles, attach_policies, create_roles, create_tables, failed,
    persist, resolve_table_names,
};
use crate::client::Clients;
use crate::error::ProvisionerError;
use crate::helpers::{api, api_keys, data_sources, random_suffix, resolvers};
use crate::wait::wait_for_schema;

/// What a create run provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReport {
    pub api_name: String,
    pub api_id: String,
    pub graphql_endpoint: Option<String>,
    pub tables: usize,
    pub roles: usize,
    pub data_sources: usize,
    pub resolvers: usize,
    pub api_keys: usize,
}

/// Provision a whole backend from the dev snapshot.
///
/// Tables, then execution roles and their policies, then the API, its
/// schema, data sources, resolvers, and keys. On success the current
/// snapshot and public info are written and dev is refreshed from current.
pub async fn create(
    manager: &ResourceManager,
    clients: &Clients,
    options: &RunOptions,
) -> Result<CreateReport, ProvisionerError> {
    let run = CreateRun::load(manager)?;
    tracing::info!(project = %options.project_name, suffix = %run.suffix, "creating backend");

    let run = run.create_tables(clients, options).await?;
    let run = run.create_roles(clients).await?;
    let run = run.attach_policies(clients).await?;
    let run = run.create_api(clients, options).await?;
    let run = run.submit_schema(clients, options).await?;
    let run = run.create_data_sources(clients).await?;
    let run = run.create_resolvers(clients).await?;
    let run = run.create_api_keys(clients).await?;
    run.finish(manager, options)
}

struct CreateRun {
    dev: BackendSnapshot,
    suffix: String,
    tables: Vec<Table>,
    roles: Vec<MintedRole>,
    data_sources: Vec<DataSource>,
    api: Option<GraphqlApi>,
    resolvers: Vec<Resolver>,
    api_keys: Vec<ApiKey>,
}

impl CreateRun {
    fn load(manager: &ResourceManager) -> Result<Self, ProvisionerError> {
        let current = manager.load_current()?;
        if let Some(api_id) = current.api_id() {
            return Err(ProvisionerError::InvalidState(format!(
                "API {api_id} already exists; run update instead"
            )));
        }

        let mut dev = manager.load_dev()?;
        dev.require_api()?;
        dev.require_schema()?;

        let suffix = random_suffix();
        resolve_table_names(&mut dev.tables, &mut dev.data_sources, &suffix);
        let data_sources = dev.data_sources.clone();

        Ok(Self {
            dev,
            suffix,
            tables: Vec::new(),
            roles: Vec::new(),
            data_sources,
            api: None,
            resolvers: Vec::new(),
            api_keys: Vec::new(),
        })
    }

    fn api_id(&self) -> Result<String, ProvisionerError> {
        self.api
            .as_ref()
            .and_then(|a| a.api_id.clone())
            .ok_or_else(|| ProvisionerError::InvalidState("GraphQL API was not created".into()))
    }

    /// Tables that already carry an ARN are provider-managed and kept as is.
    async fn create_tables(
        mut self,
        clients: &Clients,
        options: &RunOptions,
    ) -> Result<Self, ProvisionerError> {
        let (managed, pending): (Vec<Table>, Vec<Table>) = self
            .dev
            .tables
            .iter()
            .cloned()
            .partition(|t| t.table_arn.is_some());
        for table in &managed {
            tracing::info!(table = %table.table_name, "table is provider-managed, skipping");
        }

        let created = create_tables(clients, &pending, &options.table_wait).await?;
        self.tables = managed.into_iter().chain(created).collect();
        Ok(self)
    }

    async fn create_roles(mut self, clients: &Clients) -> Result<Self, ProvisionerError> {
        let needing = self.data_sources.iter().filter(|d| d.needs_role());
        self.roles = create_roles(clients, needing, &self.suffix).await?;
        Ok(self)
    }

    async fn attach_policies(mut self, clients: &Clients) -> Result<Self, ProvisionerError> {
        attach_policies(clients, &self.data_sources, &self.roles, &self.tables).await?;
        apply_roles(&mut self.data_sources, &self.roles);
        Ok(self)
    }

    async fn create_api(
        mut self,
        clients: &Clients,
        options: &RunOptions,
    ) -> Result<Self, ProvisionerError> {
        let dev_api = self.dev.require_api()?;
        let name = api::generated_name(dev_api, &options.project_name, &self.suffix);
        tracing::info!(api = %name, auth = %dev_api.authentication_type, "creating GraphQL API");

        let created = clients
            .graph
            .create_graphql_api(api::construct_param(dev_api, name.clone()))
            .await
            .map_err(failed("api", &name))?;
        self.api = Some(created);
        self.api_id()?;
        Ok(self)
    }

    async fn submit_schema(
        self,
        clients: &Clients,
        options: &RunOptions,
    ) -> Result<Self, ProvisionerError> {
        let api_id = self.api_id()?;
        let schema = self.dev.require_schema()?.to_string();
        tracing::info!(api_id = %api_id, "submitting schema");
        clients
            .graph
            .start_schema_creation(api_id.clone(), schema)
            .await
            .map_err(failed("schema", &api_id))?;
        wait_for_schema(clients.graph.as_ref(), &api_id, &options.schema_wait).await?;
        Ok(self)
    }

    async fn create_data_sources(mut self, clients: &Clients) -> Result<Self, ProvisionerError> {
        let api_id = self.api_id()?;
        let params = self
            .data_sources
            .iter()
            .map(data_sources::construct_create_param)
            .collect::<Result<Vec<_>, _>>()?;

        self.data_sources = try_join_all(params.into_iter().map(|p| {
            let api_id = api_id.clone();
            async move {
                let name = p.name.clone();
                tracing::info!(data_source = %name, kind = %p.kind, "creating data source");
                clients
                    .graph
                    .create_data_source(api_id, p)
                    .await
                    .map_err(failed("data source", &name))
            }
        }))
        .await?;
        Ok(self)
    }

    async fn create_resolvers(mut self, clients: &Clients) -> Result<Self, ProvisionerError> {
        let api_id = self.api_id()?;
        let params = self
            .dev
            .resolvers
            .iter()
            .map(resolvers::construct_param)
            .collect::<Result<Vec<_>, _>>()?;

        self.resolvers = try_join_all(params.into_iter().map(|p| {
            let api_id = api_id.clone();
            async move {
                let name = format!("{}.{}", p.type_name, p.field_name);
                tracing::info!(resolver = %name, "creating resolver");
                clients
                    .graph
                    .create_resolver(api_id, p)
                    .await
                    .map_err(failed("resolver", &name))
            }
        }))
        .await?;
        Ok(self)
    }

    /// A default key is added when dev declares none.
    async fn create_api_keys(mut self, clients: &Clients) -> Result<Self, ProvisionerError> {
        let api_id = self.api_id()?;
        let declared = if self.dev.api_keys.is_empty() {
            tracing::info!("no API keys declared, adding the default key");
            vec![ApiKey::default_key()]
        } else {
            self.dev.api_keys.clone()
        };

        self.api_keys = try_join_all(declared.iter().map(|key| {
            let api_id = api_id.clone();
            async move {
                let name = api_keys::label(key);
                tracing::info!(api_key = %name, "creating API key");
                clients
                    .graph
                    .create_api_key(api_id, api_keys::construct_create_param(key))
                    .await
                    .map_err(failed("api key", &name))
            }
        }))
        .await?;
        Ok(self)
    }

    fn finish(
        self,
        manager: &ResourceManager,
        options: &RunOptions,
    ) -> Result<CreateReport, ProvisionerError> {
        let api_id = self.api_id()?;
        let api = self
            .api
            .ok_or_else(|| ProvisionerError::InvalidState("GraphQL API was not created".into()))?;

        let report = CreateReport {
            api_name: api.name.to_string(),
            api_id,
            graphql_endpoint: api.graphql_endpoint().map(String::from),
            tables: self.tables.len(),
            roles: self.roles.len(),
            data_sources: self.data_sources.len(),
            resolvers: self.resolvers.len(),
            api_keys: self.api_keys.len(),
        };

        let current = BackendSnapshot {
            api: Some(api),
            data_sources: self.data_sources,
            tables: self.tables,
            resolvers: self.resolvers,
            api_keys: self.api_keys,
            schema: self.dev.schema,
        };
        persist(manager, &current, &options.region)?;

        tracing::info!(api_id = %report.api_id, api = %report.api_name, "backend created");
        Ok(report)
    }
}
