//! Execution roles for KV-store data sources.

use serde_json::json;

use mobilehub_core::models::data_source::DataSource;

use crate::params::{CreateRoleParams, PutRolePolicyParams};

/// IAM caps role names at 64 characters.
const MAX_ROLE_NAME: usize = 64;

pub const POLICY_NAME: &str = "appsync-dynamodb-access";

/// Item-level actions a resolver needs against its table.
pub const DYNAMODB_ACTIONS: [&str; 8] = [
    "dynamodb:BatchGetItem",
    "dynamodb:BatchWriteItem",
    "dynamodb:DeleteItem",
    "dynamodb:GetItem",
    "dynamodb:PutItem",
    "dynamodb:Query",
    "dynamodb:Scan",
    "dynamodb:UpdateItem",
];

fn trust_policy() -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": "appsync.amazonaws.com" },
            "Action": "sts:AssumeRole"
        }]
    })
    .to_string()
}

/// `appsync-<table>-<suffix>`, with characters IAM rejects replaced and the
/// table part shortened so the suffix always survives. A table name that
/// already ends in `-<suffix>` does not get it twice.
pub fn role_name_for_table(table_name: &str, suffix: &str) -> String {
    let base = table_name
        .strip_suffix(suffix)
        .and_then(|rest| rest.strip_suffix('-'))
        .unwrap_or(table_name);
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "+=,.@_-".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect();
    let fixed = "appsync-".len() + 1 + suffix.len();
    let room = MAX_ROLE_NAME.saturating_sub(fixed);
    let table_part: String = sanitized.chars().take(room).collect();
    format!("appsync-{table_part}-{suffix}")
}

pub fn construct_create_role_param_for_ddb(table_name: &str, suffix: &str) -> CreateRoleParams {
    CreateRoleParams {
        role_name: role_name_for_table(table_name, suffix),
        assume_role_policy_document: trust_policy(),
    }
}

/// Inline policy scoped to the data source's table and its indexes.
///
/// `None` for data sources that are not KV-store backed.
pub fn construct_put_role_policy_param_for_ddb(
    data_source: &DataSource,
    role_name: &str,
    table_arn: &str,
) -> Option<PutRolePolicyParams> {
    if !data_source.is_kv_store() {
        return None;
    }
    let policy = json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Action": DYNAMODB_ACTIONS,
            "Resource": [table_arn, format!("{table_arn}/*")]
        }]
    });
    Some(PutRolePolicyParams {
        role_name: role_name.to_string(),
        policy_name: POLICY_NAME.to_string(),
        policy_document: policy.to_string(),
    })
}
