use mobilehub_provisioner::Clients;

use crate::config::CredentialSource;

/// Build an `SdkConfig` from a region and credential source.
pub async fn build_aws_config(region: &str, creds: &CredentialSource) -> aws_config::SdkConfig {
    let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()));

    match creds {
        CredentialSource::Inline {
            access_key_id,
            secret_access_key,
            session_token,
        } => {
            builder = builder.credentials_provider(aws_sdk_iam::config::Credentials::new(
                access_key_id,
                secret_access_key,
                session_token.clone(),
                None,
                "mobilehub-config",
            ));
        }
        CredentialSource::Profile { profile_name } => {
            builder = builder.profile_name(profile_name);
        }
        CredentialSource::DefaultChain => {}
    }

    builder.load().await
}

/// Remote clients for AppSync, DynamoDB, and IAM in the configured region.
pub async fn connect(region: &str, creds: &CredentialSource) -> Clients {
    let config = build_aws_config(region, creds).await;
    mobilehub_provisioner::aws::clients_from_config(&config)
}
