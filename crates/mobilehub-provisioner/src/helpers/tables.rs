//! Backing tables: dressing, diffing by `(TableName, Region)`, and
//! CreateTable / UpdateTable parameter construction.

use std::collections::BTreeMap;

use mobilehub_core::diff::{actionable, reconcile as reconcile_with};
use mobilehub_core::models::table::{
    AttributeDefinition, GlobalSecondaryIndex, LocalSecondaryIndex, ProvisionedThroughput, Table,
};
use mobilehub_core::Diffed;

use crate::error::ProvisionerError;
use crate::params::{
    CreateTableParams, GlobalIndexParams, GlobalIndexUpdate, LocalIndexParams, Throughput,
    UpdateTableParams,
};

pub fn dress_for_dev_backend(mut table: Table) -> Table {
    table.table_status = None;
    table.table_arn = None;
    table.table_id = None;
    table.item_count = None;
    table.table_size_bytes = None;
    table.creation_date_time = None;
    dress_throughput(&mut table.provisioned_throughput);

    for index in &mut table.global_secondary_indexes {
        index.index_status = None;
        index.index_arn = None;
        index.item_count = None;
        index.index_size_bytes = None;
        if let Some(throughput) = &mut index.provisioned_throughput {
            dress_throughput(throughput);
        }
    }
    for index in &mut table.local_secondary_indexes {
        index.index_arn = None;
        index.item_count = None;
        index.index_size_bytes = None;
    }
    table
}

fn dress_throughput(throughput: &mut ProvisionedThroughput) {
    throughput.number_of_decreases_today = None;
    throughput.last_increase_date_time = None;
    throughput.last_decrease_date_time = None;
}

/// Dressed, with order-insensitive collections sorted.
fn normalized(table: &Table) -> Table {
    let mut t = dress_for_dev_backend(table.clone());
    t.attribute_definitions.sort();
    t.global_secondary_indexes
        .sort_by(|a, b| a.index_name.cmp(&b.index_name));
    t.local_secondary_indexes
        .sort_by(|a, b| a.index_name.cmp(&b.index_name));
    t
}

pub fn same(dev: &Table, current: &Table) -> bool {
    normalized(dev) == normalized(current)
}

/// Every pairing, unchanged ones included.
pub fn reconcile(dev: &[Table], current: &[Table]) -> Vec<Diffed<Table>> {
    reconcile_with(
        dev,
        current,
        |d, current| current.iter().position(|c| c.key() == d.key()),
        same,
    )
}

pub fn diff(dev: &[Table], current: &[Table]) -> Vec<Diffed<Table>> {
    actionable(reconcile(dev, current))
}

fn throughput(p: &ProvisionedThroughput) -> Throughput {
    Throughput {
        read_capacity_units: p.read_capacity_units,
        write_capacity_units: p.write_capacity_units,
    }
}

fn global_index_params(index: &GlobalSecondaryIndex) -> GlobalIndexParams {
    GlobalIndexParams {
        index_name: index.index_name.clone(),
        key_schema: index.key_schema.clone(),
        projection: index.projection.clone(),
        provisioned_throughput: index.provisioned_throughput.as_ref().map(throughput),
    }
}

fn local_index_params(index: &LocalSecondaryIndex) -> LocalIndexParams {
    LocalIndexParams {
        index_name: index.index_name.clone(),
        key_schema: index.key_schema.clone(),
        projection: index.projection.clone(),
    }
}

pub fn construct_create_param(table: &Table) -> CreateTableParams {
    CreateTableParams {
        region: table.region.clone(),
        table_name: table.table_name.clone(),
        attribute_definitions: table.attribute_definitions.clone(),
        key_schema: table.key_schema.clone(),
        provisioned_throughput: throughput(&table.provisioned_throughput),
        global_secondary_indexes: table
            .global_secondary_indexes
            .iter()
            .map(global_index_params)
            .collect(),
        local_secondary_indexes: table
            .local_secondary_indexes
            .iter()
            .map(local_index_params)
            .collect(),
    }
}

/// Build the UpdateTable requests that take `current` to `dev`.
///
/// The first request carries table and index throughput changes. DynamoDB
/// accepts one index creation or deletion per call, so each of those gets
/// its own request afterwards: deletions first, then creations. A changed
/// index key schema or projection becomes a delete followed by a create.
/// Primary keys and local indexes cannot change in place.
pub fn construct_update_params(
    dev: &Table,
    current: &Table,
) -> Result<Vec<UpdateTableParams>, ProvisionerError> {
    if dev.key_schema != current.key_schema {
        return Err(ProvisionerError::UpdateFailed(format!(
            "table {}: key schema cannot change in place",
            dev.table_name
        )));
    }
    let dev_lsis = normalized(dev).local_secondary_indexes;
    let current_lsis = normalized(current).local_secondary_indexes;
    if dev_lsis != current_lsis {
        return Err(ProvisionerError::UpdateFailed(format!(
            "table {}: local secondary indexes cannot change in place",
            dev.table_name
        )));
    }

    let request = |table_throughput, attribute_definitions, updates| UpdateTableParams {
        region: dev.region.clone(),
        table_name: dev.table_name.clone(),
        provisioned_throughput: table_throughput,
        attribute_definitions,
        global_secondary_index_updates: updates,
    };

    let dev_indexes: BTreeMap<&str, &GlobalSecondaryIndex> = dev
        .global_secondary_indexes
        .iter()
        .map(|i| (i.index_name.as_str(), i))
        .collect();
    let current_indexes: BTreeMap<&str, &GlobalSecondaryIndex> = current
        .global_secondary_indexes
        .iter()
        .map(|i| (i.index_name.as_str(), i))
        .collect();

    let mut throughput_updates = Vec::new();
    let mut deletes = Vec::new();
    let mut creates = Vec::new();

    for (name, d) in &dev_indexes {
        match current_indexes.get(name) {
            None => creates.push(*d),
            Some(c) if d.key_schema != c.key_schema || d.projection != c.projection => {
                deletes.push(*name);
                creates.push(*d);
            }
            Some(c) => {
                let wanted = d.provisioned_throughput.as_ref().map(throughput);
                let have = c.provisioned_throughput.as_ref().map(throughput);
                if let Some(wanted) = wanted.filter(|w| Some(*w) != have) {
                    throughput_updates.push(GlobalIndexUpdate::Update {
                        index_name: (*name).to_string(),
                        provisioned_throughput: wanted,
                    });
                }
            }
        }
    }
    for name in current_indexes.keys() {
        if !dev_indexes.contains_key(name) {
            deletes.push(*name);
        }
    }

    let mut requests = Vec::new();

    let table_throughput = (dev.provisioned_throughput.units()
        != current.provisioned_throughput.units())
    .then(|| throughput(&dev.provisioned_throughput));
    let first = request(table_throughput, Vec::new(), throughput_updates);
    if !first.is_empty() {
        requests.push(first);
    }

    for name in deletes {
        requests.push(request(
            None,
            Vec::new(),
            vec![GlobalIndexUpdate::Delete {
                index_name: name.to_string(),
            }],
        ));
    }

    for index in creates {
        let attributes = index_attributes(dev, index)?;
        requests.push(request(
            None,
            attributes,
            vec![GlobalIndexUpdate::Create(global_index_params(index))],
        ));
    }

    Ok(requests)
}

/// Attribute definitions for the key elements of `index`.
fn index_attributes(
    table: &Table,
    index: &GlobalSecondaryIndex,
) -> Result<Vec<AttributeDefinition>, ProvisionerError> {
    index
        .key_schema
        .iter()
        .map(|k| {
            table.attribute(&k.attribute_name).cloned().ok_or_else(|| {
                ProvisionerError::UpdateFailed(format!(
                    "table {}: index {} keys on undefined attribute {}",
                    table.table_name, index.index_name, k.attribute_name
                ))
            })
        })
        .collect()
}
