//! AWS SDK implementations of the provisioning client traits.

pub mod appsync;
pub mod dynamodb;
pub mod iam;

use std::sync::Arc;

use aws_config::SdkConfig;

pub use appsync::AppSyncApi;
pub use dynamodb::DynamoDbTables;
pub use iam::IamRoles;

use crate::client::Clients;

/// Build the full client set from one loaded SDK config.
pub fn clients_from_config(config: &SdkConfig) -> Clients {
    Clients {
        kv: Arc::new(DynamoDbTables::new(config.clone())),
        roles: Arc::new(IamRoles::new(aws_sdk_iam::Client::new(config))),
        graph: Arc::new(AppSyncApi::new(aws_sdk_appsync::Client::new(config))),
    }
}
