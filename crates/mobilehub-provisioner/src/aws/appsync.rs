//! AppSync GraphQL APIs and everything hanging off them.

use std::collections::BTreeMap;

use aws_sdk_appsync::Client;
use aws_sdk_appsync::error::BuildError;
use aws_sdk_appsync::primitives::Blob;
use aws_sdk_appsync::types;

use mobilehub_core::models::api::{
    AuthenticationType, GraphqlApi, OpenIdConnectConfig, UserPoolConfig,
};
use mobilehub_core::models::api_key::ApiKey;
use mobilehub_core::models::data_source::{
    DataSource, DataSourceType, DynamodbConfig, ElasticsearchConfig, LambdaConfig,
};
use mobilehub_core::models::resolver::Resolver;
use mobilehub_core::{MappingTemplate, ProviderId};

use crate::client::{BoxFuture, GraphApiClient};
use crate::error::{ProvisionerError, format_err_chain};
use crate::params::{
    ApiKeyParams, ApiParams, DataSourceParams, ResolverParams, SchemaStatus, TypeDefinition,
};

pub struct AppSyncApi {
    client: Client,
}

impl AppSyncApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn sdk_err<E: std::error::Error + 'static>(
    kind: fn(String) -> ProvisionerError,
    operation: &'static str,
) -> impl FnOnce(E) -> ProvisionerError {
    move |e| kind(format!("appsync:{operation} failed: {}", format_err_chain(&e)))
}

fn built<T>(result: Result<T, BuildError>) -> Result<T, ProvisionerError> {
    result.map_err(|e| ProvisionerError::InvalidState(format!("invalid AppSync request: {e}")))
}

fn missing(operation: &str, what: &str) -> ProvisionerError {
    ProvisionerError::Aws(format!("appsync:{operation} returned no {what}"))
}

impl GraphApiClient for AppSyncApi {
    fn create_graphql_api(
        &self,
        params: ApiParams,
    ) -> BoxFuture<'_, Result<GraphqlApi, ProvisionerError>> {
        Box::pin(async move {
            let resp = self
                .client
                .create_graphql_api()
                .name(&params.name)
                .authentication_type(types::AuthenticationType::from(
                    params.authentication_type.as_str(),
                ))
                .set_user_pool_config(params.user_pool_config.as_ref().map(user_pool_to).transpose()?)
                .set_open_id_connect_config(
                    params.open_id_connect_config.as_ref().map(oidc_to).transpose()?,
                )
                .send()
                .await
                .map_err(sdk_err(ProvisionerError::CreateFailed, "CreateGraphqlApi"))?;
            let api = resp
                .graphql_api()
                .ok_or_else(|| missing("CreateGraphqlApi", "API"))?;
            api_from(api)
        })
    }

    fn update_graphql_api(
        &self,
        api_id: String,
        params: ApiParams,
    ) -> BoxFuture<'_, Result<GraphqlApi, ProvisionerError>> {
        Box::pin(async move {
            let resp = self
                .client
                .update_graphql_api()
                .api_id(&api_id)
                .name(&params.name)
                .authentication_type(types::AuthenticationType::from(
                    params.authentication_type.as_str(),
                ))
                .set_user_pool_config(params.user_pool_config.as_ref().map(user_pool_to).transpose()?)
                .set_open_id_connect_config(
                    params.open_id_connect_config.as_ref().map(oidc_to).transpose()?,
                )
                .send()
                .await
                .map_err(sdk_err(ProvisionerError::UpdateFailed, "UpdateGraphqlApi"))?;
            let api = resp
                .graphql_api()
                .ok_or_else(|| missing("UpdateGraphqlApi", "API"))?;
            api_from(api)
        })
    }

    fn get_graphql_api(&self, api_id: String) -> BoxFuture<'_, Result<GraphqlApi, ProvisionerError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get_graphql_api()
                .api_id(&api_id)
                .send()
                .await
                .map_err(sdk_err(ProvisionerError::Aws, "GetGraphqlApi"))?;
            let api = resp
                .graphql_api()
                .ok_or_else(|| missing("GetGraphqlApi", "API"))?;
            api_from(api)
        })
    }

    fn start_schema_creation(
        &self,
        api_id: String,
        definition: String,
    ) -> BoxFuture<'_, Result<SchemaStatus, ProvisionerError>> {
        Box::pin(async move {
            let resp = self
                .client
                .start_schema_creation()
                .api_id(&api_id)
                .definition(Blob::new(definition.into_bytes()))
                .send()
                .await
                .map_err(sdk_err(ProvisionerError::UpdateFailed, "StartSchemaCreation"))?;
            Ok(SchemaStatus {
                status: resp
                    .status()
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_default(),
                details: None,
            })
        })
    }

    fn get_schema_creation_status(
        &self,
        api_id: String,
    ) -> BoxFuture<'_, Result<SchemaStatus, ProvisionerError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get_schema_creation_status()
                .api_id(&api_id)
                .send()
                .await
                .map_err(sdk_err(ProvisionerError::Aws, "GetSchemaCreationStatus"))?;
            Ok(SchemaStatus {
                status: resp
                    .status()
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_default(),
                details: resp.details().map(String::from),
            })
        })
    }

    fn list_types(
        &self,
        api_id: String,
    ) -> BoxFuture<'_, Result<Vec<TypeDefinition>, ProvisionerError>> {
        Box::pin(async move {
            let mut out = Vec::new();
            let mut next_token: Option<String> = None;
            loop {
                let resp = self
                    .client
                    .list_types()
                    .api_id(&api_id)
                    .format(types::TypeDefinitionFormat::Sdl)
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .map_err(sdk_err(ProvisionerError::Aws, "ListTypes"))?;
                out.extend(resp.types().iter().map(|t| TypeDefinition {
                    name: t.name().unwrap_or_default().to_string(),
                    definition: t.definition().unwrap_or_default().to_string(),
                }));
                match resp.next_token() {
                    Some(token) => next_token = Some(token.to_string()),
                    None => break,
                }
            }
            Ok(out)
        })
    }

    fn create_data_source(
        &self,
        api_id: String,
        params: DataSourceParams,
    ) -> BoxFuture<'_, Result<DataSource, ProvisionerError>> {
        Box::pin(async move {
            let configs = SdkConfigs::from_params(&params)?;
            let resp = self
                .client
                .create_data_source()
                .api_id(&api_id)
                .name(&params.name)
                .set_description(params.description.clone())
                .r#type(types::DataSourceType::from(params.kind.as_str()))
                .set_service_role_arn(params.service_role_arn.clone())
                .set_dynamodb_config(configs.dynamodb)
                .set_lambda_config(configs.lambda)
                .set_elasticsearch_config(configs.elasticsearch)
                .send()
                .await
                .map_err(sdk_err(ProvisionerError::CreateFailed, "CreateDataSource"))?;
            resp.data_source()
                .and_then(data_source_from)
                .ok_or_else(|| missing("CreateDataSource", "data source"))
        })
    }

    fn update_data_source(
        &self,
        api_id: String,
        params: DataSourceParams,
    ) -> BoxFuture<'_, Result<DataSource, ProvisionerError>> {
        Box::pin(async move {
            let configs = SdkConfigs::from_params(&params)?;
            let resp = self
                .client
                .update_data_source()
                .api_id(&api_id)
                .name(&params.name)
                .set_description(params.description.clone())
                .r#type(types::DataSourceType::from(params.kind.as_str()))
                .set_service_role_arn(params.service_role_arn.clone())
                .set_dynamodb_config(configs.dynamodb)
                .set_lambda_config(configs.lambda)
                .set_elasticsearch_config(configs.elasticsearch)
                .send()
                .await
                .map_err(sdk_err(ProvisionerError::UpdateFailed, "UpdateDataSource"))?;
            resp.data_source()
                .and_then(data_source_from)
                .ok_or_else(|| missing("UpdateDataSource", "data source"))
        })
    }

    fn list_data_sources(
        &self,
        api_id: String,
    ) -> BoxFuture<'_, Result<Vec<DataSource>, ProvisionerError>> {
        Box::pin(async move {
            let mut out = Vec::new();
            let mut next_token: Option<String> = None;
            loop {
                let resp = self
                    .client
                    .list_data_sources()
                    .api_id(&api_id)
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .map_err(sdk_err(ProvisionerError::Aws, "ListDataSources"))?;
                for raw in resp.data_sources() {
                    match data_source_from(raw) {
                        Some(ds) => out.push(ds),
                        None => tracing::warn!(
                            data_source = raw.name().unwrap_or_default(),
                            kind = raw.r#type().map(|t| t.as_str()).unwrap_or_default(),
                            "skipping data source of unsupported kind"
                        ),
                    }
                }
                match resp.next_token() {
                    Some(token) => next_token = Some(token.to_string()),
                    None => break,
                }
            }
            Ok(out)
        })
    }

    fn create_resolver(
        &self,
        api_id: String,
        params: ResolverParams,
    ) -> BoxFuture<'_, Result<Resolver, ProvisionerError>> {
        Box::pin(async move {
            let resp = self
                .client
                .create_resolver()
                .api_id(&api_id)
                .type_name(&params.type_name)
                .field_name(&params.field_name)
                .data_source_name(&params.data_source_name)
                .request_mapping_template(&params.request_mapping_template)
                .response_mapping_template(&params.response_mapping_template)
                .send()
                .await
                .map_err(sdk_err(ProvisionerError::CreateFailed, "CreateResolver"))?;
            resp.resolver()
                .map(resolver_from)
                .ok_or_else(|| missing("CreateResolver", "resolver"))
        })
    }

    fn update_resolver(
        &self,
        api_id: String,
        params: ResolverParams,
    ) -> BoxFuture<'_, Result<Resolver, ProvisionerError>> {
        Box::pin(async move {
            let resp = self
                .client
                .update_resolver()
                .api_id(&api_id)
                .type_name(&params.type_name)
                .field_name(&params.field_name)
                .data_source_name(&params.data_source_name)
                .request_mapping_template(&params.request_mapping_template)
                .response_mapping_template(&params.response_mapping_template)
                .send()
                .await
                .map_err(sdk_err(ProvisionerError::UpdateFailed, "UpdateResolver"))?;
            resp.resolver()
                .map(resolver_from)
                .ok_or_else(|| missing("UpdateResolver", "resolver"))
        })
    }

    fn list_resolvers(
        &self,
        api_id: String,
        type_name: String,
    ) -> BoxFuture<'_, Result<Vec<Resolver>, ProvisionerError>> {
        Box::pin(async move {
            let mut out = Vec::new();
            let mut next_token: Option<String> = None;
            loop {
                let resp = self
                    .client
                    .list_resolvers()
                    .api_id(&api_id)
                    .type_name(&type_name)
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .map_err(sdk_err(ProvisionerError::Aws, "ListResolvers"))?;
                out.extend(resp.resolvers().iter().map(resolver_from));
                match resp.next_token() {
                    Some(token) => next_token = Some(token.to_string()),
                    None => break,
                }
            }
            Ok(out)
        })
    }

    fn create_api_key(
        &self,
        api_id: String,
        params: ApiKeyParams,
    ) -> BoxFuture<'_, Result<ApiKey, ProvisionerError>> {
        Box::pin(async move {
            let resp = self
                .client
                .create_api_key()
                .api_id(&api_id)
                .set_description(params.description.clone())
                .set_expires(params.expires)
                .send()
                .await
                .map_err(sdk_err(ProvisionerError::CreateFailed, "CreateApiKey"))?;
            resp.api_key()
                .map(api_key_from)
                .ok_or_else(|| missing("CreateApiKey", "key"))
        })
    }

    fn update_api_key(
        &self,
        api_id: String,
        params: ApiKeyParams,
    ) -> BoxFuture<'_, Result<ApiKey, ProvisionerError>> {
        Box::pin(async move {
            let id = params.id.clone().ok_or_else(|| {
                ProvisionerError::InvalidState("API key update without a key id".into())
            })?;
            let resp = self
                .client
                .update_api_key()
                .api_id(&api_id)
                .id(id)
                .set_description(params.description.clone())
                .set_expires(params.expires)
                .send()
                .await
                .map_err(sdk_err(ProvisionerError::UpdateFailed, "UpdateApiKey"))?;
            resp.api_key()
                .map(api_key_from)
                .ok_or_else(|| missing("UpdateApiKey", "key"))
        })
    }

    fn list_api_keys(&self, api_id: String) -> BoxFuture<'_, Result<Vec<ApiKey>, ProvisionerError>> {
        Box::pin(async move {
            let mut out = Vec::new();
            let mut next_token: Option<String> = None;
            loop {
                let resp = self
                    .client
                    .list_api_keys()
                    .api_id(&api_id)
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .map_err(sdk_err(ProvisionerError::Aws, "ListApiKeys"))?;
                out.extend(resp.api_keys().iter().map(api_key_from));
                match resp.next_token() {
                    Some(token) => next_token = Some(token.to_string()),
                    None => break,
                }
            }
            Ok(out)
        })
    }
}

// ── request shapes ──

fn user_pool_to(c: &UserPoolConfig) -> Result<types::UserPoolConfig, ProvisionerError> {
    built(
        types::UserPoolConfig::builder()
            .user_pool_id(&c.user_pool_id)
            .aws_region(&c.aws_region)
            .default_action(types::DefaultAction::from(c.default_action.as_str()))
            .set_app_id_client_regex(c.app_id_client_regex.clone())
            .build(),
    )
}

fn oidc_to(c: &OpenIdConnectConfig) -> Result<types::OpenIdConnectConfig, ProvisionerError> {
    built(
        types::OpenIdConnectConfig::builder()
            .issuer(&c.issuer)
            .set_client_id(c.client_id.clone())
            .set_iat_ttl(c.iat_ttl)
            .set_auth_ttl(c.auth_ttl)
            .build(),
    )
}

/// Per-kind backing configs in SDK form.
struct SdkConfigs {
    dynamodb: Option<types::DynamodbDataSourceConfig>,
    lambda: Option<types::LambdaDataSourceConfig>,
    elasticsearch: Option<types::ElasticsearchDataSourceConfig>,
}

impl SdkConfigs {
    fn from_params(params: &DataSourceParams) -> Result<Self, ProvisionerError> {
        let dynamodb = params
            .dynamodb_config
            .as_ref()
            .map(|c| {
                built(
                    types::DynamodbDataSourceConfig::builder()
                        .table_name(&c.table_name)
                        .aws_region(&c.aws_region)
                        .use_caller_credentials(c.use_caller_credentials)
                        .build(),
                )
            })
            .transpose()?;
        let lambda = params
            .lambda_config
            .as_ref()
            .map(|c| {
                built(
                    types::LambdaDataSourceConfig::builder()
                        .lambda_function_arn(&c.lambda_function_arn)
                        .build(),
                )
            })
            .transpose()?;
        let elasticsearch = params
            .elasticsearch_config
            .as_ref()
            .map(|c| {
                built(
                    types::ElasticsearchDataSourceConfig::builder()
                        .endpoint(&c.endpoint)
                        .aws_region(&c.aws_region)
                        .build(),
                )
            })
            .transpose()?;
        Ok(Self {
            dynamodb,
            lambda,
            elasticsearch,
        })
    }
}

// ── response shapes ──

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// The SDK reports unset TTLs and expiries as zero.
fn nonzero(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v != 0)
}

fn api_from(api: &types::GraphqlApi) -> Result<GraphqlApi, ProvisionerError> {
    let raw_auth = api
        .authentication_type()
        .map(|t| t.as_str())
        .unwrap_or_default();
    let authentication_type = AuthenticationType::parse(raw_auth).ok_or_else(|| {
        ProvisionerError::InvalidState(format!("unsupported authentication type {raw_auth:?}"))
    })?;

    Ok(GraphqlApi {
        name: ProviderId::resolved(text(api.name())),
        api_id: api.api_id().map(String::from),
        authentication_type,
        user_pool_config: api.user_pool_config().map(|c| UserPoolConfig {
            user_pool_id: text(Option::<&str>::from(c.user_pool_id())),
            aws_region: text(Option::<&str>::from(c.aws_region())),
            default_action: Option::<&types::DefaultAction>::from(c.default_action())
                .map(|a| a.as_str().to_string())
                .unwrap_or_default(),
            app_id_client_regex: c.app_id_client_regex().map(String::from),
        }),
        open_id_connect_config: api.open_id_connect_config().map(|c| OpenIdConnectConfig {
            issuer: text(Option::<&str>::from(c.issuer())),
            client_id: c.client_id().map(String::from),
            iat_ttl: nonzero(Option::<i64>::from(c.iat_ttl())),
            auth_ttl: nonzero(Option::<i64>::from(c.auth_ttl())),
        }),
        arn: api.arn().map(String::from),
        uris: api.uris().map(|uris| {
            uris.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<BTreeMap<_, _>>()
        }),
    })
}

/// `None` for data source kinds the reconciler does not manage.
fn data_source_from(ds: &types::DataSource) -> Option<DataSource> {
    let kind = DataSourceType::parse(ds.r#type()?.as_str())?;
    Some(DataSource {
        name: text(ds.name()),
        description: ds.description().map(String::from),
        kind,
        service_role_arn: ds.service_role_arn().map(ProviderId::resolved),
        dynamodb_config: ds.dynamodb_config().map(|c| DynamodbConfig {
            table_name: text(Option::<&str>::from(c.table_name())),
            aws_region: text(Option::<&str>::from(c.aws_region())),
            use_caller_credentials: Option::<bool>::from(c.use_caller_credentials())
                .unwrap_or(false),
        }),
        lambda_config: ds.lambda_config().map(|c| LambdaConfig {
            lambda_function_arn: text(Option::<&str>::from(c.lambda_function_arn())),
        }),
        elasticsearch_config: ds.elasticsearch_config().map(|c| ElasticsearchConfig {
            endpoint: text(Option::<&str>::from(c.endpoint())),
            aws_region: text(Option::<&str>::from(c.aws_region())),
        }),
        data_source_arn: ds.data_source_arn().map(String::from),
    })
}

fn resolver_from(r: &types::Resolver) -> Resolver {
    Resolver {
        type_name: text(r.type_name()),
        field_name: text(r.field_name()),
        data_source_name: text(r.data_source_name()),
        request_mapping_template: MappingTemplate::Inline(text(r.request_mapping_template())),
        response_mapping_template: MappingTemplate::Inline(text(r.response_mapping_template())),
        resolver_arn: r.resolver_arn().map(String::from),
    }
}

fn api_key_from(k: &types::ApiKey) -> ApiKey {
    ApiKey {
        id: ProviderId::resolved(text(k.id())),
        description: k.description().map(String::from),
        expires: nonzero(Option::<i64>::from(k.expires())),
        deletes: nonzero(Option::<i64>::from(k.deletes())),
    }
}
