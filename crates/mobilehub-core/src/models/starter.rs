//! The dev snapshot written when the feature is first enabled.

use crate::models::api::{AuthenticationType, GraphqlApi};
use crate::models::data_source::{DataSource, DataSourceType, DynamodbConfig};
use crate::models::resolver::Resolver;
use crate::models::snapshot::BackendSnapshot;
use crate::models::table::{AttributeDefinition, KeySchemaElement, ProvisionedThroughput, Table};
use crate::placeholder::{MappingTemplate, ProviderId, SENTINEL};

const STARTER_SCHEMA: &str = r#"type Post {
  id: ID!
  author: String!
  title: String
  content: String
}

type Query {
  getPost(id: ID!): Post
}

type Mutation {
  putPost(author: String!, title: String, content: String): Post
}

schema {
  query: Query
  mutation: Mutation
}
"#;

const GET_POST_REQUEST: &str = r#"{
  "version": "2017-02-28",
  "operation": "GetItem",
  "key": {
    "id": $util.dynamodb.toDynamoDBJson($ctx.args.id)
  }
}"#;

const PUT_POST_REQUEST: &str = r#"{
  "version": "2017-02-28",
  "operation": "PutItem",
  "key": {
    "id": $util.dynamodb.toDynamoDBJson($util.autoId())
  },
  "attributeValues": $util.dynamodb.toMapValuesJson($ctx.args)
}"#;

const ITEM_RESPONSE: &str = "$util.toJson($ctx.result)";

/// A one-table, two-resolver API keyed by the project name.
pub fn starter_snapshot(project_name: &str, region: &str) -> BackendSnapshot {
    let table_name = format!("{project_name}-Posts-{SENTINEL}");

    let resolver = |type_name: &str, field_name: &str, request: &str| Resolver {
        type_name: type_name.to_string(),
        field_name: field_name.to_string(),
        data_source_name: "PostsTable".to_string(),
        request_mapping_template: MappingTemplate::Inline(request.to_string()),
        response_mapping_template: MappingTemplate::Inline(ITEM_RESPONSE.to_string()),
        resolver_arn: None,
    };

    BackendSnapshot {
        api: Some(GraphqlApi {
            name: ProviderId::with_hint(project_name),
            api_id: None,
            authentication_type: AuthenticationType::ApiKey,
            user_pool_config: None,
            open_id_connect_config: None,
            arn: None,
            uris: None,
        }),
        data_sources: vec![DataSource {
            name: "PostsTable".to_string(),
            description: Some("Posts table".to_string()),
            kind: DataSourceType::AmazonDynamodb,
            service_role_arn: Some(ProviderId::unresolved()),
            dynamodb_config: Some(DynamodbConfig {
                table_name: table_name.clone(),
                aws_region: region.to_string(),
                use_caller_credentials: false,
            }),
            lambda_config: None,
            elasticsearch_config: None,
            data_source_arn: None,
        }],
        tables: vec![Table {
            table_name,
            region: region.to_string(),
            attribute_definitions: vec![AttributeDefinition {
                attribute_name: "id".to_string(),
                attribute_type: "S".to_string(),
            }],
            key_schema: vec![KeySchemaElement {
                attribute_name: "id".to_string(),
                key_type: "HASH".to_string(),
            }],
            provisioned_throughput: ProvisionedThroughput::new(5, 5),
            global_secondary_indexes: vec![],
            local_secondary_indexes: vec![],
            table_status: None,
            table_arn: None,
            table_id: None,
            item_count: None,
            table_size_bytes: None,
            creation_date_time: None,
        }],
        resolvers: vec![
            resolver("Query", "getPost", GET_POST_REQUEST),
            resolver("Mutation", "putPost", PUT_POST_REQUEST),
        ],
        api_keys: vec![],
        schema: Some(STARTER_SCHEMA.to_string()),
    }
}
