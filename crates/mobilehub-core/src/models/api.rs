use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::placeholder::ProviderId;

/// The GraphQL API itself. Singleton per backend feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlApi {
    /// Generated on first create when authored as the placeholder.
    pub name: ProviderId,
    /// Provider-assigned; absent until the API exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    pub authentication_type: AuthenticationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_pool_config: Option<UserPoolConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id_connect_config: Option<OpenIdConnectConfig>,

    // ── provider-only ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uris: Option<BTreeMap<String, String>>,
}

impl GraphqlApi {
    pub fn graphql_endpoint(&self) -> Option<&str> {
        self.uris
            .as_ref()
            .and_then(|uris| uris.get("GRAPHQL"))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticationType {
    ApiKey,
    AwsIam,
    AmazonCognitoUserPools,
    OpenidConnect,
}

impl AuthenticationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "API_KEY",
            Self::AwsIam => "AWS_IAM",
            Self::AmazonCognitoUserPools => "AMAZON_COGNITO_USER_POOLS",
            Self::OpenidConnect => "OPENID_CONNECT",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "API_KEY" => Some(Self::ApiKey),
            "AWS_IAM" => Some(Self::AwsIam),
            "AMAZON_COGNITO_USER_POOLS" => Some(Self::AmazonCognitoUserPools),
            "OPENID_CONNECT" => Some(Self::OpenidConnect),
            _ => None,
        }
    }
}

impl fmt::Display for AuthenticationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPoolConfig {
    pub user_pool_id: String,
    pub aws_region: String,
    /// `ALLOW` or `DENY`
    pub default_action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id_client_regex: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenIdConnectConfig {
    pub issuer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat_ttl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_ttl: Option<i64>,
}

/// Client-facing projection written next to the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicApiInfo {
    pub graphql_endpoint: String,
    pub region: String,
    pub authentication_type: AuthenticationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}
