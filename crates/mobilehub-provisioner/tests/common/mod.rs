#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use mobilehub_core::models::api::GraphqlApi;
use mobilehub_core::models::api_key::ApiKey;
use mobilehub_core::models::data_source::DataSource;
use mobilehub_core::models::resolver::Resolver;
use mobilehub_core::models::table::{
    GlobalSecondaryIndex, LocalSecondaryIndex, ProvisionedThroughput, Table,
};
use mobilehub_core::{MappingTemplate, ProviderId};
use mobilehub_provisioner::client::{BoxFuture, Clients, GraphApiClient, KvStoreClient, RoleClient};
use mobilehub_provisioner::params::{
    ApiKeyParams, ApiParams, CreateRoleParams, CreateTableParams, DataSourceParams,
    GlobalIndexUpdate, PutRolePolicyParams, ResolverParams, SchemaStatus, TypeDefinition,
    UpdateTableParams,
};
use mobilehub_provisioner::{ProvisionerError, RetryPolicy, RunOptions};
use mobilehub_storage::{ProjectLayout, ResourceManager};

pub const API_ID: &str = "api-1";
pub const ACCOUNT: &str = "123456789012";

/// One remote call as seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateTable(String),
    UpdateTable(UpdateTableParams),
    DescribeTable(String),
    CreateRole(String),
    PutRolePolicy(PutRolePolicyParams),
    CreateApi(String),
    UpdateApi(String),
    GetApi,
    StartSchema,
    SchemaStatus,
    ListTypes,
    CreateDataSource(String),
    UpdateDataSource(String),
    ListDataSources,
    CreateResolver(String),
    UpdateResolver(String),
    ListResolvers(String),
    CreateApiKey,
    UpdateApiKey(String),
    ListApiKeys,
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateTable(_)
                | Self::UpdateTable(_)
                | Self::CreateRole(_)
                | Self::PutRolePolicy(_)
                | Self::CreateApi(_)
                | Self::UpdateApi(_)
                | Self::StartSchema
                | Self::CreateDataSource(_)
                | Self::UpdateDataSource(_)
                | Self::CreateResolver(_)
                | Self::UpdateResolver(_)
                | Self::CreateApiKey
                | Self::UpdateApiKey(_)
        )
    }
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    tables: Vec<Table>,
    api: Option<GraphqlApi>,
    schema: Option<String>,
    schema_statuses: VecDeque<String>,
    transitional_polls: u32,
    types: Vec<TypeDefinition>,
    data_sources: Vec<DataSource>,
    resolvers: Vec<Resolver>,
    api_keys: Vec<ApiKey>,
    next_key: u32,
    fail_on: Option<&'static str>,
}

/// In-memory stand-in for DynamoDB, IAM, and AppSync.
#[derive(Default)]
pub struct MockCloud {
    state: Mutex<State>,
}

impl MockCloud {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn clients(self: &Arc<Self>) -> Clients {
        Clients {
            kv: self.clone(),
            roles: self.clone(),
            graph: self.clone(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Statuses returned by successive schema polls; `SUCCESS` once drained.
    pub fn script_schema(&self, statuses: &[&str]) {
        self.state.lock().unwrap().schema_statuses =
            statuses.iter().map(|s| s.to_string()).collect();
    }

    /// The next `n` describe calls report the table as still updating.
    pub fn hold_tables(&self, n: u32) {
        self.state.lock().unwrap().transitional_polls = n;
    }

    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().unwrap().fail_on = Some(operation);
    }

    pub fn set_types(&self, types: &[(&str, &str)]) {
        self.state.lock().unwrap().types = types
            .iter()
            .map(|(name, definition)| TypeDefinition {
                name: name.to_string(),
                definition: definition.to_string(),
            })
            .collect();
    }

    pub fn remote_table(&self, name: &str) -> Option<Table> {
        self.state
            .lock()
            .unwrap()
            .tables
            .iter()
            .find(|t| t.table_name == name)
            .cloned()
    }

    pub fn remote_schema(&self) -> Option<String> {
        self.state.lock().unwrap().schema.clone()
    }

    fn enter(&self, call: Call, operation: &'static str) -> Result<std::sync::MutexGuard<'_, State>, ProvisionerError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.fail_on == Some(operation) {
            return Err(ProvisionerError::CreateFailed(format!("{operation}: injected failure")));
        }
        Ok(state)
    }
}

fn ready<T: Send + 'static>(value: T) -> BoxFuture<'static, T> {
    Box::pin(async move { value })
}

fn table_arn(region: &str, name: &str) -> String {
    format!("arn:aws:dynamodb:{region}:{ACCOUNT}:table/{name}")
}

fn throughput(t: mobilehub_provisioner::params::Throughput) -> ProvisionedThroughput {
    ProvisionedThroughput::new(t.read_capacity_units, t.write_capacity_units)
}

impl KvStoreClient for MockCloud {
    fn create_table(&self, params: CreateTableParams) -> BoxFuture<'_, Result<Table, ProvisionerError>> {
        let result = self
            .enter(Call::CreateTable(params.table_name.clone()), "CreateTable")
            .map(|mut state| {
                let arn = table_arn(&params.region, &params.table_name);
                let table = Table {
                    table_name: params.table_name.clone(),
                    region: params.region.clone(),
                    attribute_definitions: params.attribute_definitions.clone(),
                    key_schema: params.key_schema.clone(),
                    provisioned_throughput: throughput(params.provisioned_throughput),
                    global_secondary_indexes: params
                        .global_secondary_indexes
                        .iter()
                        .map(|i| GlobalSecondaryIndex {
                            index_name: i.index_name.clone(),
                            key_schema: i.key_schema.clone(),
                            projection: i.projection.clone(),
                            provisioned_throughput: i.provisioned_throughput.map(throughput),
                            index_status: Some("ACTIVE".into()),
                            index_arn: Some(format!("{arn}/index/{}", i.index_name)),
                            item_count: Some(0),
                            index_size_bytes: Some(0),
                        })
                        .collect(),
                    local_secondary_indexes: params
                        .local_secondary_indexes
                        .iter()
                        .map(|i| LocalSecondaryIndex {
                            index_name: i.index_name.clone(),
                            key_schema: i.key_schema.clone(),
                            projection: i.projection.clone(),
                            index_arn: Some(format!("{arn}/index/{}", i.index_name)),
                            item_count: Some(0),
                            index_size_bytes: Some(0),
                        })
                        .collect(),
                    table_status: Some("ACTIVE".into()),
                    table_arn: Some(arn),
                    table_id: Some(format!("id-{}", params.table_name)),
                    item_count: Some(0),
                    table_size_bytes: Some(0),
                    creation_date_time: Some(1_700_000_000),
                };
                state.tables.push(table.clone());
                Table {
                    table_status: Some("CREATING".into()),
                    ..table
                }
            });
        ready(result)
    }

    fn update_table(&self, params: UpdateTableParams) -> BoxFuture<'_, Result<Table, ProvisionerError>> {
        let result = self
            .enter(Call::UpdateTable(params.clone()), "UpdateTable")
            .and_then(|mut state| {
                let table = state
                    .tables
                    .iter_mut()
                    .find(|t| t.table_name == params.table_name)
                    .ok_or_else(|| ProvisionerError::UpdateFailed("no such table".into()))?;
                if let Some(t) = params.provisioned_throughput {
                    table.provisioned_throughput = throughput(t);
                }
                for attribute in &params.attribute_definitions {
                    if table.attribute(&attribute.attribute_name).is_none() {
                        table.attribute_definitions.push(attribute.clone());
                    }
                }
                for update in &params.global_secondary_index_updates {
                    match update {
                        GlobalIndexUpdate::Create(i) => {
                            table.global_secondary_indexes.push(GlobalSecondaryIndex {
                                index_name: i.index_name.clone(),
                                key_schema: i.key_schema.clone(),
                                projection: i.projection.clone(),
                                provisioned_throughput: i.provisioned_throughput.map(throughput),
                                index_status: Some("ACTIVE".into()),
                                index_arn: None,
                                item_count: None,
                                index_size_bytes: None,
                            })
                        }
                        GlobalIndexUpdate::Update {
                            index_name,
                            provisioned_throughput,
                        } => {
                            if let Some(i) = table
                                .global_secondary_indexes
                                .iter_mut()
                                .find(|i| &i.index_name == index_name)
                            {
                                i.provisioned_throughput = Some(throughput(*provisioned_throughput));
                            }
                        }
                        GlobalIndexUpdate::Delete { index_name } => table
                            .global_secondary_indexes
                            .retain(|i| &i.index_name != index_name),
                    }
                }
                Ok(Table {
                    table_status: Some("UPDATING".into()),
                    ..table.clone()
                })
            });
        ready(result)
    }

    fn describe_table(
        &self,
        region: String,
        table_name: String,
    ) -> BoxFuture<'_, Result<Table, ProvisionerError>> {
        let result = self
            .enter(Call::DescribeTable(table_name.clone()), "DescribeTable")
            .and_then(|mut state| {
                let held = state.transitional_polls > 0;
                if held {
                    state.transitional_polls -= 1;
                }
                let mut table = state
                    .tables
                    .iter()
                    .find(|t| t.table_name == table_name && t.region == region)
                    .cloned()
                    .ok_or_else(|| ProvisionerError::Aws(format!("table {table_name} not found")))?;
                if held {
                    table.table_status = Some("UPDATING".into());
                }
                Ok(table)
            });
        ready(result)
    }
}

impl RoleClient for MockCloud {
    fn create_role(&self, params: CreateRoleParams) -> BoxFuture<'_, Result<String, ProvisionerError>> {
        let result = self
            .enter(Call::CreateRole(params.role_name.clone()), "CreateRole")
            .map(|_| format!("arn:aws:iam::{ACCOUNT}:role/{}", params.role_name));
        ready(result)
    }

    fn put_role_policy(&self, params: PutRolePolicyParams) -> BoxFuture<'_, Result<(), ProvisionerError>> {
        let result = self
            .enter(Call::PutRolePolicy(params), "PutRolePolicy")
            .map(|_| ());
        ready(result)
    }
}

fn api_from_params(params: &ApiParams) -> GraphqlApi {
    GraphqlApi {
        name: ProviderId::resolved(&params.name),
        api_id: Some(API_ID.to_string()),
        authentication_type: params.authentication_type,
        user_pool_config: params.user_pool_config.clone(),
        open_id_connect_config: params.open_id_connect_config.clone(),
        arn: Some(format!("arn:aws:appsync:us-east-1:{ACCOUNT}:apis/{API_ID}")),
        uris: Some(BTreeMap::from([(
            "GRAPHQL".to_string(),
            format!("https://{API_ID}.appsync-api.us-east-1.amazonaws.com/graphql"),
        )])),
    }
}

fn data_source_from_params(params: DataSourceParams) -> DataSource {
    DataSource {
        data_source_arn: Some(format!(
            "arn:aws:appsync:us-east-1:{ACCOUNT}:apis/{API_ID}/datasources/{}",
            params.name
        )),
        name: params.name,
        description: params.description,
        kind: params.kind,
        service_role_arn: params.service_role_arn.map(ProviderId::resolved),
        dynamodb_config: params.dynamodb_config,
        lambda_config: params.lambda_config,
        elasticsearch_config: params.elasticsearch_config,
    }
}

fn resolver_from_params(params: ResolverParams) -> Resolver {
    Resolver {
        resolver_arn: Some(format!(
            "arn:aws:appsync:us-east-1:{ACCOUNT}:apis/{API_ID}/types/{}/resolvers/{}",
            params.type_name, params.field_name
        )),
        type_name: params.type_name,
        field_name: params.field_name,
        data_source_name: params.data_source_name,
        request_mapping_template: MappingTemplate::Inline(params.request_mapping_template),
        response_mapping_template: MappingTemplate::Inline(params.response_mapping_template),
    }
}

fn upsert<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T, &T) -> bool) {
    match items.iter().position(|i| same(i, &item)) {
        Some(i) => items[i] = item,
        None => items.push(item),
    }
}

impl GraphApiClient for MockCloud {
    fn create_graphql_api(&self, params: ApiParams) -> BoxFuture<'_, Result<GraphqlApi, ProvisionerError>> {
        let result = self
            .enter(Call::CreateApi(params.name.clone()), "CreateGraphqlApi")
            .map(|mut state| {
                let api = api_from_params(&params);
                state.api = Some(api.clone());
                api
            });
        ready(result)
    }

    fn update_graphql_api(
        &self,
        _api_id: String,
        params: ApiParams,
    ) -> BoxFuture<'_, Result<GraphqlApi, ProvisionerError>> {
        let result = self
            .enter(Call::UpdateApi(params.name.clone()), "UpdateGraphqlApi")
            .map(|mut state| {
                let api = api_from_params(&params);
                state.api = Some(api.clone());
                api
            });
        ready(result)
    }

    fn get_graphql_api(&self, _api_id: String) -> BoxFuture<'_, Result<GraphqlApi, ProvisionerError>> {
        let result = self.enter(Call::GetApi, "GetGraphqlApi").and_then(|state| {
            state
                .api
                .clone()
                .ok_or_else(|| ProvisionerError::Aws("no such API".into()))
        });
        ready(result)
    }

    fn start_schema_creation(
        &self,
        _api_id: String,
        definition: String,
    ) -> BoxFuture<'_, Result<SchemaStatus, ProvisionerError>> {
        let result = self
            .enter(Call::StartSchema, "StartSchemaCreation")
            .map(|mut state| {
                state.schema = Some(definition);
                SchemaStatus {
                    status: "PROCESSING".into(),
                    details: None,
                }
            });
        ready(result)
    }

    fn get_schema_creation_status(
        &self,
        _api_id: String,
    ) -> BoxFuture<'_, Result<SchemaStatus, ProvisionerError>> {
        let result = self
            .enter(Call::SchemaStatus, "GetSchemaCreationStatus")
            .map(|mut state| {
                let status = state
                    .schema_statuses
                    .pop_front()
                    .unwrap_or_else(|| "SUCCESS".into());
                let details = (status == "FAILED").then(|| "Syntax Error on line 3".to_string());
                SchemaStatus { status, details }
            });
        ready(result)
    }

    fn list_types(&self, _api_id: String) -> BoxFuture<'_, Result<Vec<TypeDefinition>, ProvisionerError>> {
        let result = self
            .enter(Call::ListTypes, "ListTypes")
            .map(|state| state.types.clone());
        ready(result)
    }

    fn create_data_source(
        &self,
        _api_id: String,
        params: DataSourceParams,
    ) -> BoxFuture<'_, Result<DataSource, ProvisionerError>> {
        let result = self
            .enter(Call::CreateDataSource(params.name.clone()), "CreateDataSource")
            .map(|mut state| {
                let ds = data_source_from_params(params);
                state.data_sources.push(ds.clone());
                ds
            });
        ready(result)
    }

    fn update_data_source(
        &self,
        _api_id: String,
        params: DataSourceParams,
    ) -> BoxFuture<'_, Result<DataSource, ProvisionerError>> {
        let result = self
            .enter(Call::UpdateDataSource(params.name.clone()), "UpdateDataSource")
            .map(|mut state| {
                let ds = data_source_from_params(params);
                upsert(&mut state.data_sources, ds.clone(), |a, b| a.name == b.name);
                ds
            });
        ready(result)
    }

    fn list_data_sources(&self, _api_id: String) -> BoxFuture<'_, Result<Vec<DataSource>, ProvisionerError>> {
        let result = self
            .enter(Call::ListDataSources, "ListDataSources")
            .map(|state| state.data_sources.clone());
        ready(result)
    }

    fn create_resolver(
        &self,
        _api_id: String,
        params: ResolverParams,
    ) -> BoxFuture<'_, Result<Resolver, ProvisionerError>> {
        let label = format!("{}.{}", params.type_name, params.field_name);
        let result = self
            .enter(Call::CreateResolver(label), "CreateResolver")
            .map(|mut state| {
                let resolver = resolver_from_params(params);
                state.resolvers.push(resolver.clone());
                resolver
            });
        ready(result)
    }

    fn update_resolver(
        &self,
        _api_id: String,
        params: ResolverParams,
    ) -> BoxFuture<'_, Result<Resolver, ProvisionerError>> {
        let label = format!("{}.{}", params.type_name, params.field_name);
        let result = self
            .enter(Call::UpdateResolver(label), "UpdateResolver")
            .map(|mut state| {
                let resolver = resolver_from_params(params);
                upsert(&mut state.resolvers, resolver.clone(), |a, b| {
                    a.type_name == b.type_name && a.field_name == b.field_name
                });
                resolver
            });
        ready(result)
    }

    fn list_resolvers(
        &self,
        _api_id: String,
        type_name: String,
    ) -> BoxFuture<'_, Result<Vec<Resolver>, ProvisionerError>> {
        let result = self
            .enter(Call::ListResolvers(type_name.clone()), "ListResolvers")
            .map(|state| {
                state
                    .resolvers
                    .iter()
                    .filter(|r| r.type_name == type_name)
                    .cloned()
                    .collect()
            });
        ready(result)
    }

    fn create_api_key(
        &self,
        _api_id: String,
        params: ApiKeyParams,
    ) -> BoxFuture<'_, Result<ApiKey, ProvisionerError>> {
        let result = self
            .enter(Call::CreateApiKey, "CreateApiKey")
            .map(|mut state| {
                state.next_key += 1;
                let key = ApiKey {
                    id: ProviderId::resolved(format!("da2-key{}", state.next_key)),
                    description: params.description,
                    expires: Some(params.expires.unwrap_or(1_900_000_000)),
                    deletes: Some(1_910_000_000),
                };
                state.api_keys.push(key.clone());
                key
            });
        ready(result)
    }

    fn update_api_key(
        &self,
        _api_id: String,
        params: ApiKeyParams,
    ) -> BoxFuture<'_, Result<ApiKey, ProvisionerError>> {
        let id = params.id.clone().unwrap_or_default();
        let result = self
            .enter(Call::UpdateApiKey(id.clone()), "UpdateApiKey")
            .and_then(|mut state| {
                let key = state
                    .api_keys
                    .iter_mut()
                    .find(|k| k.id.value() == Some(id.as_str()))
                    .ok_or_else(|| ProvisionerError::UpdateFailed("no such key".into()))?;
                key.description = params.description;
                if params.expires.is_some() {
                    key.expires = params.expires;
                }
                Ok(key.clone())
            });
        ready(result)
    }

    fn list_api_keys(&self, _api_id: String) -> BoxFuture<'_, Result<Vec<ApiKey>, ProvisionerError>> {
        let result = self
            .enter(Call::ListApiKeys, "ListApiKeys")
            .map(|state| state.api_keys.clone());
        ready(result)
    }
}

pub fn project() -> (tempfile::TempDir, ResourceManager) {
    let dir = tempfile::tempdir().unwrap();
    let manager = ResourceManager::new(ProjectLayout::new(dir.path()));
    (dir, manager)
}

pub fn options() -> RunOptions {
    RunOptions {
        schema_wait: RetryPolicy::immediate(5),
        table_wait: RetryPolicy::immediate(5),
        ..RunOptions::new("blog", "us-east-1")
    }
}
