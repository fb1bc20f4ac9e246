use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use mobilehub_core::models::api::GraphqlApi;
use mobilehub_core::models::api_key::ApiKey;
use mobilehub_core::models::data_source::DataSource;
use mobilehub_core::models::resolver::Resolver;
use mobilehub_core::models::table::Table;

use crate::error::ProvisionerError;
use crate::params::{
    ApiKeyParams, ApiParams, CreateRoleParams, CreateTableParams, DataSourceParams,
    PutRolePolicyParams, ResolverParams, SchemaStatus, TypeDefinition, UpdateTableParams,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// DynamoDB-style table provisioning. Each call names its region.
pub trait KvStoreClient: Send + Sync {
    fn create_table(
        &self,
        params: CreateTableParams,
    ) -> BoxFuture<'_, Result<Table, ProvisionerError>>;

    fn update_table(
        &self,
        params: UpdateTableParams,
    ) -> BoxFuture<'_, Result<Table, ProvisionerError>>;

    fn describe_table(
        &self,
        region: String,
        table_name: String,
    ) -> BoxFuture<'_, Result<Table, ProvisionerError>>;
}

/// IAM role provisioning.
pub trait RoleClient: Send + Sync {
    /// Returns the new role's ARN.
    fn create_role(&self, params: CreateRoleParams) -> BoxFuture<'_, Result<String, ProvisionerError>>;

    fn put_role_policy(
        &self,
        params: PutRolePolicyParams,
    ) -> BoxFuture<'_, Result<(), ProvisionerError>>;
}

/// AppSync-style GraphQL API provisioning.
pub trait GraphApiClient: Send + Sync {
    fn create_graphql_api(&self, params: ApiParams)
    -> BoxFuture<'_, Result<GraphqlApi, ProvisionerError>>;

    fn update_graphql_api(
        &self,
        api_id: String,
        params: ApiParams,
    ) -> BoxFuture<'_, Result<GraphqlApi, ProvisionerError>>;

    fn get_graphql_api(&self, api_id: String) -> BoxFuture<'_, Result<GraphqlApi, ProvisionerError>>;

    fn start_schema_creation(
        &self,
        api_id: String,
        definition: String,
    ) -> BoxFuture<'_, Result<SchemaStatus, ProvisionerError>>;

    fn get_schema_creation_status(
        &self,
        api_id: String,
    ) -> BoxFuture<'_, Result<SchemaStatus, ProvisionerError>>;

    /// SDL definitions of every type in the API.
    fn list_types(
        &self,
        api_id: String,
    ) -> BoxFuture<'_, Result<Vec<TypeDefinition>, ProvisionerError>>;

    fn create_data_source(
        &self,
        api_id: String,
        params: DataSourceParams,
    ) -> BoxFuture<'_, Result<DataSource, ProvisionerError>>;

    fn update_data_source(
        &self,
        api_id: String,
        params: DataSourceParams,
    ) -> BoxFuture<'_, Result<DataSource, ProvisionerError>>;

    fn list_data_sources(
        &self,
        api_id: String,
    ) -> BoxFuture<'_, Result<Vec<DataSource>, ProvisionerError>>;

    fn create_resolver(
        &self,
        api_id: String,
        params: ResolverParams,
    ) -> BoxFuture<'_, Result<Resolver, ProvisionerError>>;

    fn update_resolver(
        &self,
        api_id: String,
        params: ResolverParams,
    ) -> BoxFuture<'_, Result<Resolver, ProvisionerError>>;

    fn list_resolvers(
        &self,
        api_id: String,
        type_name: String,
    ) -> BoxFuture<'_, Result<Vec<Resolver>, ProvisionerError>>;

    fn create_api_key(
        &self,
        api_id: String,
        params: ApiKeyParams,
    ) -> BoxFuture<'_, Result<ApiKey, ProvisionerError>>;

    fn update_api_key(
        &self,
        api_id: String,
        params: ApiKeyParams,
    ) -> BoxFuture<'_, Result<ApiKey, ProvisionerError>>;

    fn list_api_keys(&self, api_id: String) -> BoxFuture<'_, Result<Vec<ApiKey>, ProvisionerError>>;
}

/// The set of remote clients one orchestrator run talks to.
#[derive(Clone)]
pub struct Clients {
    pub kv: Arc<dyn KvStoreClient>,
    pub roles: Arc<dyn RoleClient>,
    pub graph: Arc<dyn GraphApiClient>,
}
