use std::fmt;

use serde::{Deserialize, Serialize};

use crate::placeholder::ProviderId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: DataSourceType,
    /// Execution role. Authored as the placeholder for KV-store sources
    /// that should get a dedicated role on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_role_arn: Option<ProviderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamodb_config: Option<DynamodbConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda_config: Option<LambdaConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch_config: Option<ElasticsearchConfig>,

    // ── provider-only ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_arn: Option<String>,
}

impl DataSource {
    pub fn is_kv_store(&self) -> bool {
        self.kind == DataSourceType::AmazonDynamodb
    }

    /// Whether this source still needs a role minted by the provisioner.
    pub fn needs_role(&self) -> bool {
        self.is_kv_store()
            && !self
                .service_role_arn
                .as_ref()
                .is_some_and(ProviderId::is_resolved)
    }

    /// `(table name, region)` of the backing KV table, if any.
    pub fn table_ref(&self) -> Option<(&str, &str)> {
        self.dynamodb_config
            .as_ref()
            .map(|c| (c.table_name.as_str(), c.aws_region.as_str()))
    }
}

/// The closed set of backing store kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSourceType {
    AmazonDynamodb,
    AwsLambda,
    AmazonElasticsearch,
}

impl DataSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmazonDynamodb => "AMAZON_DYNAMODB",
            Self::AwsLambda => "AWS_LAMBDA",
            Self::AmazonElasticsearch => "AMAZON_ELASTICSEARCH",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "AMAZON_DYNAMODB" => Some(Self::AmazonDynamodb),
            "AWS_LAMBDA" => Some(Self::AwsLambda),
            "AMAZON_ELASTICSEARCH" => Some(Self::AmazonElasticsearch),
            _ => None,
        }
    }
}

impl fmt::Display for DataSourceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamodbConfig {
    /// May carry the sentinel as a name-suffix slot before the first create.
    pub table_name: String,
    pub aws_region: String,
    #[serde(default)]
    pub use_caller_credentials: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaConfig {
    pub lambda_function_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchConfig {
    pub endpoint: String,
    pub aws_region: String,
}
