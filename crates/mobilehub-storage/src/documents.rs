//! On-disk document shapes, one per file.

use serde::{Deserialize, Serialize};

use mobilehub_core::models::api_key::ApiKey;
use mobilehub_core::models::data_source::DataSource;
use mobilehub_core::models::resolver::Resolver;
use mobilehub_core::models::table::Table;

/// `dataSources.json`: data sources and the tables behind them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourcesDocument {
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// `resolvers.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolversDocument {
    #[serde(default)]
    pub resolvers: Vec<Resolver>,
}

/// `apiKeys.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeysDocument {
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
}
