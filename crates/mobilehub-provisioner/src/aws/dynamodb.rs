//! DynamoDB tables. Every call targets the region named in its request.

use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::BuildError;
use aws_sdk_dynamodb::primitives::DateTime;
use aws_sdk_dynamodb::types;

use mobilehub_core::models::table::{
    AttributeDefinition, GlobalSecondaryIndex, KeySchemaElement, LocalSecondaryIndex, Projection,
    ProvisionedThroughput, Table,
};

use crate::client::{BoxFuture, KvStoreClient};
use crate::error::{ProvisionerError, format_err_chain};
use crate::params::{
    CreateTableParams, GlobalIndexParams, GlobalIndexUpdate, LocalIndexParams, Throughput,
    UpdateTableParams,
};

pub struct DynamoDbTables {
    config: SdkConfig,
}

impl DynamoDbTables {
    pub fn new(config: SdkConfig) -> Self {
        Self { config }
    }

    fn client(&self, region: &str) -> Client {
        let conf = aws_sdk_dynamodb::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        Client::from_conf(conf)
    }
}

impl KvStoreClient for DynamoDbTables {
    fn create_table(
        &self,
        params: CreateTableParams,
    ) -> BoxFuture<'_, Result<Table, ProvisionerError>> {
        Box::pin(async move {
            let mut req = self
                .client(&params.region)
                .create_table()
                .table_name(&params.table_name)
                .set_attribute_definitions(Some(attribute_definitions(
                    &params.attribute_definitions,
                )?))
                .set_key_schema(Some(key_schema(&params.key_schema)?))
                .provisioned_throughput(throughput(params.provisioned_throughput)?);
            for index in &params.global_secondary_indexes {
                req = req.global_secondary_indexes(global_index(index)?);
            }
            for index in &params.local_secondary_indexes {
                req = req.local_secondary_indexes(local_index(index)?);
            }

            let resp = req.send().await.map_err(|e| {
                ProvisionerError::CreateFailed(format!(
                    "dynamodb:CreateTable failed: {}",
                    format_err_chain(&e)
                ))
            })?;
            let description = resp.table_description().ok_or_else(|| {
                ProvisionerError::CreateFailed(format!(
                    "dynamodb:CreateTable returned no description for {}",
                    params.table_name
                ))
            })?;
            Ok(table_from_description(description, &params.region))
        })
    }

    fn update_table(
        &self,
        params: UpdateTableParams,
    ) -> BoxFuture<'_, Result<Table, ProvisionerError>> {
        Box::pin(async move {
            let mut req = self
                .client(&params.region)
                .update_table()
                .table_name(&params.table_name);
            if !params.attribute_definitions.is_empty() {
                req = req.set_attribute_definitions(Some(attribute_definitions(
                    &params.attribute_definitions,
                )?));
            }
            if let Some(t) = params.provisioned_throughput {
                req = req.provisioned_throughput(throughput(t)?);
            }
            for update in &params.global_secondary_index_updates {
                req = req.global_secondary_index_updates(index_update(update)?);
            }

            let resp = req.send().await.map_err(|e| {
                ProvisionerError::UpdateFailed(format!(
                    "dynamodb:UpdateTable failed: {}",
                    format_err_chain(&e)
                ))
            })?;
            let description = resp.table_description().ok_or_else(|| {
                ProvisionerError::UpdateFailed(format!(
                    "dynamodb:UpdateTable returned no description for {}",
                    params.table_name
                ))
            })?;
            Ok(table_from_description(description, &params.region))
        })
    }

    fn describe_table(
        &self,
        region: String,
        table_name: String,
    ) -> BoxFuture<'_, Result<Table, ProvisionerError>> {
        Box::pin(async move {
            let resp = self
                .client(&region)
                .describe_table()
                .table_name(&table_name)
                .send()
                .await
                .map_err(|e| {
                    ProvisionerError::Aws(format!(
                        "dynamodb:DescribeTable failed: {}",
                        format_err_chain(&e)
                    ))
                })?;
            let description = resp.table().ok_or_else(|| {
                ProvisionerError::Aws(format!("table {table_name} has no description"))
            })?;
            Ok(table_from_description(description, &region))
        })
    }
}

// ── request shapes ──

fn built<T>(result: Result<T, BuildError>) -> Result<T, ProvisionerError> {
    result.map_err(|e| ProvisionerError::InvalidState(format!("invalid DynamoDB request: {e}")))
}

fn attribute_definitions(
    defs: &[AttributeDefinition],
) -> Result<Vec<types::AttributeDefinition>, ProvisionerError> {
    defs.iter()
        .map(|d| {
            built(
                types::AttributeDefinition::builder()
                    .attribute_name(&d.attribute_name)
                    .attribute_type(types::ScalarAttributeType::from(d.attribute_type.as_str()))
                    .build(),
            )
        })
        .collect()
}

fn key_schema(keys: &[KeySchemaElement]) -> Result<Vec<types::KeySchemaElement>, ProvisionerError> {
    keys.iter()
        .map(|k| {
            built(
                types::KeySchemaElement::builder()
                    .attribute_name(&k.attribute_name)
                    .key_type(types::KeyType::from(k.key_type.as_str()))
                    .build(),
            )
        })
        .collect()
}

fn throughput(t: Throughput) -> Result<types::ProvisionedThroughput, ProvisionerError> {
    built(
        types::ProvisionedThroughput::builder()
            .read_capacity_units(t.read_capacity_units)
            .write_capacity_units(t.write_capacity_units)
            .build(),
    )
}

fn projection(p: &Projection) -> types::Projection {
    let non_key = (!p.non_key_attributes.is_empty()).then(|| p.non_key_attributes.clone());
    types::Projection::builder()
        .projection_type(types::ProjectionType::from(p.projection_type.as_str()))
        .set_non_key_attributes(non_key)
        .build()
}

fn global_index(index: &GlobalIndexParams) -> Result<types::GlobalSecondaryIndex, ProvisionerError> {
    let index_throughput = index.provisioned_throughput.map(throughput).transpose()?;
    built(
        types::GlobalSecondaryIndex::builder()
            .index_name(&index.index_name)
            .set_key_schema(Some(key_schema(&index.key_schema)?))
            .projection(projection(&index.projection))
            .set_provisioned_throughput(index_throughput)
            .build(),
    )
}

fn local_index(index: &LocalIndexParams) -> Result<types::LocalSecondaryIndex, ProvisionerError> {
    built(
        types::LocalSecondaryIndex::builder()
            .index_name(&index.index_name)
            .set_key_schema(Some(key_schema(&index.key_schema)?))
            .projection(projection(&index.projection))
            .build(),
    )
}

fn index_update(
    update: &GlobalIndexUpdate,
) -> Result<types::GlobalSecondaryIndexUpdate, ProvisionerError> {
    let builder = types::GlobalSecondaryIndexUpdate::builder();
    let builder = match update {
        GlobalIndexUpdate::Create(index) => {
            let index_throughput = index.provisioned_throughput.map(throughput).transpose()?;
            builder.create(built(
                types::CreateGlobalSecondaryIndexAction::builder()
                    .index_name(&index.index_name)
                    .set_key_schema(Some(key_schema(&index.key_schema)?))
                    .projection(projection(&index.projection))
                    .set_provisioned_throughput(index_throughput)
                    .build(),
            )?)
        }
        GlobalIndexUpdate::Update {
            index_name,
            provisioned_throughput,
        } => builder.update(built(
            types::UpdateGlobalSecondaryIndexAction::builder()
                .index_name(index_name)
                .provisioned_throughput(throughput(*provisioned_throughput)?)
                .build(),
        )?),
        GlobalIndexUpdate::Delete { index_name } => builder.delete(built(
            types::DeleteGlobalSecondaryIndexAction::builder()
                .index_name(index_name)
                .build(),
        )?),
    };
    Ok(builder.build())
}

// ── response shapes ──

fn secs(t: Option<&DateTime>) -> Option<i64> {
    t.map(DateTime::secs)
}

fn attribute_from(d: &types::AttributeDefinition) -> AttributeDefinition {
    AttributeDefinition {
        attribute_name: Option::<&str>::from(d.attribute_name())
            .unwrap_or_default()
            .to_string(),
        attribute_type: Option::<&types::ScalarAttributeType>::from(d.attribute_type())
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
    }
}

fn key_from(k: &types::KeySchemaElement) -> KeySchemaElement {
    KeySchemaElement {
        attribute_name: Option::<&str>::from(k.attribute_name())
            .unwrap_or_default()
            .to_string(),
        key_type: Option::<&types::KeyType>::from(k.key_type())
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
    }
}

fn throughput_from(p: Option<&types::ProvisionedThroughputDescription>) -> ProvisionedThroughput {
    let Some(p) = p else {
        return ProvisionedThroughput::new(0, 0);
    };
    ProvisionedThroughput {
        read_capacity_units: p.read_capacity_units().unwrap_or_default(),
        write_capacity_units: p.write_capacity_units().unwrap_or_default(),
        number_of_decreases_today: p.number_of_decreases_today(),
        last_increase_date_time: secs(p.last_increase_date_time()),
        last_decrease_date_time: secs(p.last_decrease_date_time()),
    }
}

fn projection_from(p: Option<&types::Projection>) -> Projection {
    Projection {
        projection_type: p
            .and_then(|p| p.projection_type())
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| "ALL".to_string()),
        non_key_attributes: p
            .map(|p| p.non_key_attributes().to_vec())
            .unwrap_or_default(),
    }
}

fn table_from_description(d: &types::TableDescription, region: &str) -> Table {
    Table {
        table_name: d.table_name().unwrap_or_default().to_string(),
        region: region.to_string(),
        attribute_definitions: d.attribute_definitions().iter().map(attribute_from).collect(),
        key_schema: d.key_schema().iter().map(key_from).collect(),
        provisioned_throughput: throughput_from(d.provisioned_throughput()),
        global_secondary_indexes: d
            .global_secondary_indexes()
            .iter()
            .map(|i| GlobalSecondaryIndex {
                index_name: i.index_name().unwrap_or_default().to_string(),
                key_schema: i.key_schema().iter().map(key_from).collect(),
                projection: projection_from(i.projection()),
                provisioned_throughput: i
                    .provisioned_throughput()
                    .map(|p| throughput_from(Some(p))),
                index_status: i.index_status().map(|s| s.as_str().to_string()),
                index_arn: i.index_arn().map(String::from),
                item_count: i.item_count(),
                index_size_bytes: i.index_size_bytes(),
            })
            .collect(),
        local_secondary_indexes: d
            .local_secondary_indexes()
            .iter()
            .map(|i| LocalSecondaryIndex {
                index_name: i.index_name().unwrap_or_default().to_string(),
                key_schema: i.key_schema().iter().map(key_from).collect(),
                projection: projection_from(i.projection()),
                index_arn: i.index_arn().map(String::from),
                item_count: i.item_count(),
                index_size_bytes: i.index_size_bytes(),
            })
            .collect(),
        table_status: d.table_status().map(|s| s.as_str().to_string()),
        table_arn: d.table_arn().map(String::from),
        table_id: d.table_id().map(String::from),
        item_count: d.item_count(),
        table_size_bytes: d.table_size_bytes(),
        creation_date_time: secs(d.creation_date_time()),
    }
}
