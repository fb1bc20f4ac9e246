use crate::error::CoreError;
use crate::models::api::GraphqlApi;
use crate::models::api_key::ApiKey;
use crate::models::data_source::DataSource;
use crate::models::resolver::Resolver;
use crate::models::table::Table;

/// Every resource collection of one backend feature, as loaded from either
/// the dev or the current tree. A missing file loads as an empty collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendSnapshot {
    pub api: Option<GraphqlApi>,
    pub data_sources: Vec<DataSource>,
    pub tables: Vec<Table>,
    pub resolvers: Vec<Resolver>,
    pub api_keys: Vec<ApiKey>,
    pub schema: Option<String>,
}

impl BackendSnapshot {
    pub fn is_empty(&self) -> bool {
        self.api.is_none()
            && self.data_sources.is_empty()
            && self.tables.is_empty()
            && self.resolvers.is_empty()
            && self.api_keys.is_empty()
            && self.schema.is_none()
    }

    pub fn require_api(&self) -> Result<&GraphqlApi, CoreError> {
        self.api
            .as_ref()
            .ok_or_else(|| CoreError::MissingField("graphqlApi".into()))
    }

    pub fn require_schema(&self) -> Result<&str, CoreError> {
        self.schema
            .as_deref()
            .ok_or_else(|| CoreError::MissingField("schema".into()))
    }

    /// The provider-assigned API id, if the API has been created.
    pub fn api_id(&self) -> Option<&str> {
        self.api.as_ref().and_then(|a| a.api_id.as_deref())
    }

    pub fn find_table(&self, name: &str, region: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.table_name == name && t.region == region)
    }
}
