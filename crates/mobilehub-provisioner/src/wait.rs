//! Bounded polling for slow remote operations.
//!
//! Waiters only observe: they poll, hand back the latest remote state, and
//! make no diffing or provisioning decisions.

use std::time::Duration;

use futures::future::try_join_all;
use mobilehub_core::models::table::Table;

use crate::client::{GraphApiClient, KvStoreClient};
use crate::error::{ProvisionerError, format_err_chain};
use crate::params::SchemaStatus;

/// How often and how long a waiter polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const SCHEMA_COMPILE: Self = Self {
        max_attempts: 100,
        delay: Duration::from_secs(2),
    };

    pub const TABLE_ACTIVATION: Self = Self {
        max_attempts: 100,
        delay: Duration::from_secs(3),
    };

    /// No delay between polls.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Schema compilation as seen through one status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Pending,
    Succeeded,
    Failed,
}

impl SchemaState {
    pub fn from_status(status: &str) -> Self {
        match status {
            "SUCCESS" | "ACTIVE" => Self::Succeeded,
            "FAILED" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// Poll schema compilation until it succeeds, fails, or the policy runs out.
pub async fn wait_for_schema(
    graph: &dyn GraphApiClient,
    api_id: &str,
    policy: &RetryPolicy,
) -> Result<SchemaStatus, ProvisionerError> {
    for attempt in 1..=policy.max_attempts {
        let status = graph
            .get_schema_creation_status(api_id.to_string())
            .await
            .map_err(|e| ProvisionerError::WaitInterrupted {
                operation: format!("schema compilation of {api_id}"),
                reason: format_err_chain(&e),
            })?;

        match SchemaState::from_status(&status.status) {
            SchemaState::Succeeded => {
                tracing::info!(api_id = %api_id, attempt, "schema compiled");
                return Ok(status);
            }
            SchemaState::Failed => {
                return Err(ProvisionerError::SchemaCompileFailed {
                    api_id: api_id.to_string(),
                    details: status.details.unwrap_or_else(|| "no details".into()),
                });
            }
            SchemaState::Pending => {
                tracing::debug!(api_id = %api_id, attempt, status = %status.status, "schema still compiling");
                if attempt < policy.max_attempts {
                    policy.pause().await;
                }
            }
        }
    }

    Err(ProvisionerError::WaitTimeout {
        operation: format!("schema compilation of {api_id}"),
        attempts: policy.max_attempts,
    })
}

/// Poll one table until it leaves the transitional statuses.
///
/// A table whose last known status is already stable comes straight back
/// without a remote call.
pub async fn wait_for_table(
    kv: &dyn KvStoreClient,
    table: Table,
    policy: &RetryPolicy,
) -> Result<Table, ProvisionerError> {
    if !table.is_transitional() {
        return Ok(table);
    }

    let operation = format!("table {} to become stable", table.table_name);
    for attempt in 1..=policy.max_attempts {
        let fresh = kv
            .describe_table(table.region.clone(), table.table_name.clone())
            .await
            .map_err(|e| ProvisionerError::WaitInterrupted {
                operation: operation.clone(),
                reason: format_err_chain(&e),
            })?;

        if !fresh.is_transitional() {
            tracing::info!(
                table = %fresh.table_name,
                status = fresh.table_status.as_deref().unwrap_or("unknown"),
                attempt,
                "table stable"
            );
            return Ok(fresh);
        }
        tracing::debug!(table = %fresh.table_name, attempt, "table still transitioning");
        if attempt < policy.max_attempts {
            policy.pause().await;
        }
    }

    Err(ProvisionerError::WaitTimeout {
        operation,
        attempts: policy.max_attempts,
    })
}

/// Wait on every table concurrently. Fails fast on the first error.
pub async fn wait_for_tables(
    kv: &dyn KvStoreClient,
    tables: Vec<Table>,
    policy: &RetryPolicy,
) -> Result<Vec<Table>, ProvisionerError> {
    try_join_all(tables.into_iter().map(|t| wait_for_table(kv, t, policy))).await
}
