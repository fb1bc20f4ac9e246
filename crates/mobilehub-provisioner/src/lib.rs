//! mobilehub-provisioner
//!
//! Reconciliation engine for the AppSync backend feature. Compares the
//! authored dev snapshot against the last-known current snapshot and drives
//! AppSync, DynamoDB, and IAM to close the gap.
//!
//! Public API:
//! - `create()` - provision a whole backend from the dev snapshot
//! - `update()` - apply the create and update marks of a dev/current diff
//! - `retrieve()` - read the remote backend back into current
//! - `preview()` - the plan an update would execute, without remote calls

pub mod addr;
pub mod aws;
pub mod client;
pub mod error;
pub mod helpers;
pub mod orchestrate;
pub mod params;
pub mod plan;
pub mod wait;

use mobilehub_storage::ResourceManager;

pub use crate::addr::{EntityAddr, ResourceKind};
pub use crate::client::{Clients, GraphApiClient, KvStoreClient, RoleClient};
pub use crate::error::ProvisionerError;
pub use crate::orchestrate::{
    CreateReport, RetrieveReport, RunOptions, UpdateReport, create, retrieve, update,
};
pub use crate::plan::{PlanEntry, UpdatePlan, build_plan};
pub use crate::wait::RetryPolicy;

/// Diff dev against current from disk.
pub fn preview(manager: &ResourceManager) -> Result<UpdatePlan, ProvisionerError> {
    let dev = manager.load_dev()?;
    let current = manager.load_current()?;
    build_plan(&dev, &current)
}
