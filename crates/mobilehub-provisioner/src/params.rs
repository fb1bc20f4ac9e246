//! Request parameters for the remote provisioning calls.
//!
//! Each struct carries exactly the fields the corresponding call accepts;
//! provider-only fields never appear here.

use mobilehub_core::models::api::{AuthenticationType, OpenIdConnectConfig, UserPoolConfig};
use mobilehub_core::models::data_source::{
    DataSourceType, DynamodbConfig, ElasticsearchConfig, LambdaConfig,
};
use mobilehub_core::models::table::{AttributeDefinition, KeySchemaElement, Projection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throughput {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableParams {
    pub region: String,
    pub table_name: String,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub key_schema: Vec<KeySchemaElement>,
    pub provisioned_throughput: Throughput,
    pub global_secondary_indexes: Vec<GlobalIndexParams>,
    pub local_secondary_indexes: Vec<LocalIndexParams>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalIndexParams {
    pub index_name: String,
    pub key_schema: Vec<KeySchemaElement>,
    pub projection: Projection,
    pub provisioned_throughput: Option<Throughput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIndexParams {
    pub index_name: String,
    pub key_schema: Vec<KeySchemaElement>,
    pub projection: Projection,
}

/// One UpdateTable request. Only changed fields are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTableParams {
    pub region: String,
    pub table_name: String,
    pub provisioned_throughput: Option<Throughput>,
    /// Only the attributes keyed by a newly created index.
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub global_secondary_index_updates: Vec<GlobalIndexUpdate>,
}

impl UpdateTableParams {
    pub fn is_empty(&self) -> bool {
        self.provisioned_throughput.is_none() && self.global_secondary_index_updates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalIndexUpdate {
    Create(GlobalIndexParams),
    Update {
        index_name: String,
        provisioned_throughput: Throughput,
    },
    Delete {
        index_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleParams {
    pub role_name: String,
    pub assume_role_policy_document: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRolePolicyParams {
    pub role_name: String,
    pub policy_name: String,
    pub policy_document: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiParams {
    pub name: String,
    pub authentication_type: AuthenticationType,
    pub user_pool_config: Option<UserPoolConfig>,
    pub open_id_connect_config: Option<OpenIdConnectConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceParams {
    pub name: String,
    pub description: Option<String>,
    pub kind: DataSourceType,
    pub service_role_arn: Option<String>,
    pub dynamodb_config: Option<DynamodbConfig>,
    pub lambda_config: Option<LambdaConfig>,
    pub elasticsearch_config: Option<ElasticsearchConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverParams {
    pub type_name: String,
    pub field_name: String,
    pub data_source_name: String,
    pub request_mapping_template: String,
    pub response_mapping_template: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyParams {
    /// Set on update only.
    pub id: Option<String>,
    pub description: Option<String>,
    pub expires: Option<i64>,
}

/// Schema compilation status as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStatus {
    pub status: String,
    pub details: Option<String>,
}

/// One SDL fragment from the provider's type listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub definition: String,
}
