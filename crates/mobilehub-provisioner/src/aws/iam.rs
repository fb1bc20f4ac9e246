use aws_sdk_iam::Client;

use crate::client::{BoxFuture, RoleClient};
use crate::error::{ProvisionerError, format_err_chain};
use crate::params::{CreateRoleParams, PutRolePolicyParams};

/// Execution roles through IAM.
pub struct IamRoles {
    client: Client,
}

impl IamRoles {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl RoleClient for IamRoles {
    fn create_role(&self, params: CreateRoleParams) -> BoxFuture<'_, Result<String, ProvisionerError>> {
        Box::pin(async move {
            let resp = self
                .client
                .create_role()
                .role_name(&params.role_name)
                .assume_role_policy_document(&params.assume_role_policy_document)
                .description("AppSync data source execution role")
                .send()
                .await
                .map_err(|e| {
                    ProvisionerError::CreateFailed(format!(
                        "iam:CreateRole failed: {}",
                        format_err_chain(&e)
                    ))
                })?;

            resp.role().map(|r| r.arn().to_string()).ok_or_else(|| {
                ProvisionerError::CreateFailed(format!(
                    "iam:CreateRole returned no role for {}",
                    params.role_name
                ))
            })
        })
    }

    fn put_role_policy(
        &self,
        params: PutRolePolicyParams,
    ) -> BoxFuture<'_, Result<(), ProvisionerError>> {
        Box::pin(async move {
            self.client
                .put_role_policy()
                .role_name(&params.role_name)
                .policy_name(&params.policy_name)
                .policy_document(&params.policy_document)
                .send()
                .await
                .map_err(|e| {
                    ProvisionerError::CreateFailed(format!(
                        "iam:PutRolePolicy failed: {}",
                        format_err_chain(&e)
                    ))
                })?;
            Ok(())
        })
    }
}
