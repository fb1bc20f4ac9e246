//! Data sources: dressing, diffing by name, and request construction.

use mobilehub_core::diff::{actionable, reconcile as reconcile_with};
use mobilehub_core::models::data_source::DataSource;
use mobilehub_core::{Diffed, ProviderId};

use crate::error::ProvisionerError;
use crate::params::DataSourceParams;

pub fn dress_for_dev_backend(mut data_source: DataSource) -> DataSource {
    data_source.data_source_arn = None;
    data_source
}

/// Equal on every provider-input field. An unresolved dev role matches any
/// current role.
pub fn same(dev: &DataSource, current: &DataSource) -> bool {
    dev.name == current.name
        && dev.description == current.description
        && dev.kind == current.kind
        && dev.dynamodb_config == current.dynamodb_config
        && dev.lambda_config == current.lambda_config
        && dev.elasticsearch_config == current.elasticsearch_config
        && ProviderId::dev_matches(
            dev.service_role_arn.as_ref(),
            current.service_role_arn.as_ref(),
        )
}

pub fn reconcile(dev: &[DataSource], current: &[DataSource]) -> Vec<Diffed<DataSource>> {
    reconcile_with(
        dev,
        current,
        |d, current| current.iter().position(|c| c.name == d.name),
        same,
    )
}

pub fn diff(dev: &[DataSource], current: &[DataSource]) -> Vec<Diffed<DataSource>> {
    actionable(reconcile(dev, current))
}

fn params(data_source: &DataSource, service_role_arn: Option<String>) -> DataSourceParams {
    DataSourceParams {
        name: data_source.name.clone(),
        description: data_source.description.clone(),
        kind: data_source.kind,
        service_role_arn,
        dynamodb_config: data_source.dynamodb_config.clone(),
        lambda_config: data_source.lambda_config.clone(),
        elasticsearch_config: data_source.elasticsearch_config.clone(),
    }
}

/// KV-store sources must have their role resolved by now.
pub fn construct_create_param(data_source: &DataSource) -> Result<DataSourceParams, ProvisionerError> {
    let role = data_source
        .service_role_arn
        .as_ref()
        .and_then(|r| r.value())
        .map(String::from);
    if data_source.is_kv_store() && role.is_none() {
        return Err(ProvisionerError::InvalidState(format!(
            "data source {} has no execution role",
            data_source.name
        )));
    }
    Ok(params(data_source, role))
}

/// Keeps the current role unless dev names a different resolved one.
pub fn construct_update_param(dev: &DataSource, current: &DataSource) -> DataSourceParams {
    let role = dev
        .service_role_arn
        .as_ref()
        .and_then(|r| r.value())
        .or_else(|| current.service_role_arn.as_ref().and_then(|r| r.value()))
        .map(String::from);
    params(dev, role)
}
