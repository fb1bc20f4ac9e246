mod common;

use mobilehub_core::models::api_key::ApiKey;
use mobilehub_core::models::starter::starter_snapshot;
use mobilehub_core::placeholder::{SENTINEL, is_templated};
use mobilehub_core::ProviderId;
use mobilehub_provisioner::{ProvisionerError, create};

use common::{API_ID, Call, MockCloud, options, project};

#[tokio::test]
async fn starter_backend_is_created_in_one_pass() {
    let (_dir, manager) = project();
    manager.enable(&starter_snapshot("blog", "us-east-1")).unwrap();
    let cloud = MockCloud::new();

    let report = create(&manager, &cloud.clients(), &options()).await.unwrap();
    assert_eq!(report.api_id, API_ID);
    assert!(report.api_name.starts_with("blog-"));

    assert_eq!(cloud.count(|c| matches!(c, Call::CreateTable(_))), 1);
    assert_eq!(cloud.count(|c| matches!(c, Call::CreateRole(_))), 1);
    assert_eq!(cloud.count(|c| matches!(c, Call::PutRolePolicy(_))), 1);
    assert_eq!(cloud.count(|c| matches!(c, Call::CreateApi(_))), 1);
    assert_eq!(cloud.count(|c| matches!(c, Call::StartSchema)), 1);
    assert_eq!(cloud.count(|c| matches!(c, Call::CreateDataSource(_))), 1);
    assert_eq!(cloud.count(|c| matches!(c, Call::CreateResolver(_))), 2);
    assert_eq!(cloud.count(|c| matches!(c, Call::CreateApiKey)), 1);
}

#[tokio::test]
async fn single_resolver_backend_issues_one_call_per_resource() {
    let (_dir, manager) = project();
    let mut dev = starter_snapshot("blog", "us-east-1");
    dev.resolvers.truncate(1);
    manager.enable(&dev).unwrap();
    let cloud = MockCloud::new();

    create(&manager, &cloud.clients(), &options()).await.unwrap();

    let mutations = cloud.mutations();
    assert_eq!(mutations.len(), 8, "{mutations:?}");
    assert_eq!(cloud.count(|c| matches!(c, Call::CreateTable(_))), 1);
    assert_eq!(cloud.count(|c| matches!(c, Call::CreateRole(_))), 1);
    assert_eq!(cloud.count(|c| matches!(c, Call::PutRolePolicy(_))), 1);
    assert_eq!(cloud.count(|c| matches!(c, Call::CreateApi(_))), 1);
    assert_eq!(cloud.count(|c| matches!(c, Call::StartSchema)), 1);
    assert_eq!(cloud.count(|c| matches!(c, Call::CreateDataSource(_))), 1);
    assert_eq!(
        cloud.count(|c| matches!(c, Call::CreateResolver(_))),
        1
    );
    assert_eq!(cloud.count(|c| matches!(c, Call::CreateApiKey)), 1);

    let current = manager.load_current().unwrap();
    assert_eq!(current.api_id(), Some(API_ID));
    assert_eq!(current.api_keys.len(), 1);
    assert!(current.api_keys[0].id.is_resolved());
}

#[tokio::test]
async fn table_names_get_one_suffix_shared_with_roles() {
    let (_dir, manager) = project();
    manager.enable(&starter_snapshot("blog", "us-east-1")).unwrap();
    let cloud = MockCloud::new();
    create(&manager, &cloud.clients(), &options()).await.unwrap();

    let current = manager.load_current().unwrap();
    let table = &current.tables[0];
    assert!(!is_templated(&table.table_name));
    let suffix = table.table_name.strip_prefix("blog-Posts-").unwrap();
    assert_eq!(suffix.len(), 8);

    let ds = &current.data_sources[0];
    assert_eq!(ds.table_ref(), Some((table.table_name.as_str(), "us-east-1")));
    let role = ds.service_role_arn.as_ref().and_then(ProviderId::value).unwrap();
    assert!(role.ends_with(suffix), "{role}");
}

#[tokio::test]
async fn role_policy_targets_created_table() {
    let (_dir, manager) = project();
    manager.enable(&starter_snapshot("blog", "us-east-1")).unwrap();
    let cloud = MockCloud::new();
    create(&manager, &cloud.clients(), &options()).await.unwrap();

    let current = manager.load_current().unwrap();
    let arn = current.tables[0].table_arn.clone().unwrap();
    let policy = cloud
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::PutRolePolicy(p) => Some(p),
            _ => None,
        })
        .unwrap();
    let doc: serde_json::Value = serde_json::from_str(&policy.policy_document).unwrap();
    assert_eq!(doc["Statement"][0]["Resource"][0], arn.as_str());
    assert_eq!(doc["Statement"][0]["Resource"][1], format!("{arn}/*").as_str());
}

#[tokio::test]
async fn current_carries_provider_ids_and_dev_keeps_placeholders() {
    let (dir, manager) = project();
    manager.enable(&starter_snapshot("blog", "us-east-1")).unwrap();
    let cloud = MockCloud::new();
    create(&manager, &cloud.clients(), &options()).await.unwrap();

    let current = manager.load_current().unwrap();
    assert_eq!(current.api_id(), Some(API_ID));
    assert_eq!(current.api_keys.len(), 1);
    assert_eq!(current.api_keys[0].id.value(), Some("da2-key1"));
    assert_eq!(
        current.api_keys[0].description.as_deref(),
        Some(ApiKey::DEFAULT_DESCRIPTION)
    );

    let dev = manager.load_dev().unwrap();
    assert_eq!(dev.api_keys[0].id.placeholder_index(), Some(0));
    assert!(dev.api.as_ref().unwrap().name.is_resolved());
    assert!(dev.tables[0].table_arn.is_none());

    let raw_dev = std::fs::read_to_string(dir.path().join("backend/appsync/apiKeys.json")).unwrap();
    assert!(!raw_dev.contains("da2-key1"));
    assert!(raw_dev.contains(&format!("{SENTINEL}:0")));

    let info = manager.load_public_info().unwrap().unwrap();
    assert!(info.graphql_endpoint.contains(API_ID));
    assert_eq!(info.region, "us-east-1");
    assert_eq!(info.api_key.as_deref(), Some("da2-key1"));
}

#[tokio::test]
async fn declared_keys_suppress_the_default() {
    let (_dir, manager) = project();
    let mut starter = starter_snapshot("blog", "us-east-1");
    starter.api_keys = vec![
        ApiKey {
            description: Some("web".into()),
            ..ApiKey::default_key()
        },
        ApiKey {
            description: Some("mobile".into()),
            ..ApiKey::default_key()
        },
    ];
    manager.enable(&starter).unwrap();
    let cloud = MockCloud::new();
    create(&manager, &cloud.clients(), &options()).await.unwrap();

    assert_eq!(cloud.count(|c| matches!(c, Call::CreateApiKey)), 2);
    let current = manager.load_current().unwrap();
    let descriptions: Vec<_> = current
        .api_keys
        .iter()
        .filter_map(|k| k.description.as_deref())
        .collect();
    assert_eq!(descriptions, vec!["web", "mobile"]);
}

#[tokio::test]
async fn failed_call_aborts_without_persisting() {
    let (_dir, manager) = project();
    let starter = starter_snapshot("blog", "us-east-1");
    manager.enable(&starter).unwrap();
    let cloud = MockCloud::new();
    cloud.fail_on("CreateDataSource");

    let err = create(&manager, &cloud.clients(), &options()).await.unwrap_err();
    assert!(err.to_string().contains("PostsTable"), "{err}");
    assert_eq!(cloud.count(|c| matches!(c, Call::CreateResolver(_))), 0);
    assert!(manager.load_current().unwrap().is_empty());
    assert_eq!(manager.load_dev().unwrap(), starter);
}

#[tokio::test]
async fn schema_compile_failure_is_reported() {
    let (_dir, manager) = project();
    manager.enable(&starter_snapshot("blog", "us-east-1")).unwrap();
    let cloud = MockCloud::new();
    cloud.script_schema(&["PROCESSING", "FAILED"]);

    let err = create(&manager, &cloud.clients(), &options()).await.unwrap_err();
    match err {
        ProvisionerError::SchemaCompileFailed { api_id, details } => {
            assert_eq!(api_id, API_ID);
            assert!(details.contains("Syntax Error"));
        }
        other => panic!("expected schema failure, got {other:?}"),
    }
    assert_eq!(cloud.count(|c| matches!(c, Call::CreateDataSource(_))), 0);
}

#[tokio::test]
async fn second_create_is_refused() {
    let (_dir, manager) = project();
    manager.enable(&starter_snapshot("blog", "us-east-1")).unwrap();
    let cloud = MockCloud::new();
    create(&manager, &cloud.clients(), &options()).await.unwrap();
    cloud.clear_calls();

    let err = create(&manager, &cloud.clients(), &options()).await.unwrap_err();
    assert!(matches!(err, ProvisionerError::InvalidState(_)));
    assert!(cloud.calls().is_empty());
}
