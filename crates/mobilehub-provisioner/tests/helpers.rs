use mobilehub_core::models::api_key::ApiKey;
use mobilehub_core::models::starter::starter_snapshot;
use mobilehub_core::models::table::{GlobalSecondaryIndex, KeySchemaElement, Projection, Table};
use mobilehub_core::{DiffMark, ProviderId};
use mobilehub_provisioner::helpers::{
    api, api_keys, data_sources, dress_snapshot, schema, service_role, tables,
};
use mobilehub_provisioner::params::GlobalIndexUpdate;
use mobilehub_provisioner::ProvisionerError;

fn active(mut table: Table) -> Table {
    table.table_status = Some("ACTIVE".into());
    table.table_arn = Some(format!("arn:aws:dynamodb:us-east-1:1:table/{}", table.table_name));
    table.item_count = Some(42);
    table
}

fn key(id: &str, description: &str) -> ApiKey {
    ApiKey {
        id: ProviderId::resolved(id),
        description: Some(description.into()),
        expires: Some(1_900_000_000),
        deletes: Some(1_910_000_000),
    }
}

fn index(name: &str, attribute: &str) -> GlobalSecondaryIndex {
    GlobalSecondaryIndex {
        index_name: name.into(),
        key_schema: vec![KeySchemaElement {
            attribute_name: attribute.into(),
            key_type: "HASH".into(),
        }],
        projection: Projection {
            projection_type: "ALL".into(),
            non_key_attributes: vec![],
        },
        provisioned_throughput: None,
        index_status: None,
        index_arn: None,
        item_count: None,
        index_size_bytes: None,
    }
}

#[test]
fn dressing_is_idempotent() {
    let mut snapshot = starter_snapshot("blog", "us-east-1");
    snapshot.tables = snapshot.tables.into_iter().map(active).collect();
    snapshot.api_keys = vec![key("da2-a", "web")];

    let once = dress_snapshot(snapshot);
    let twice = dress_snapshot(once.clone());
    assert_eq!(once, twice);
    assert!(once.tables[0].table_arn.is_none());
    assert_eq!(once.api_keys[0].id.placeholder_index(), Some(0));
}

#[test]
fn dressed_current_diffs_clean_against_itself() {
    let mut current = starter_snapshot("blog", "us-east-1");
    current.tables = current.tables.into_iter().map(active).collect();
    current.api_keys = vec![key("da2-a", "web"), key("da2-b", "mobile")];
    let dev = dress_snapshot(current.clone());

    assert!(tables::diff(&dev.tables, &current.tables).is_empty());
    assert!(data_sources::diff(&dev.data_sources, &current.data_sources).is_empty());
    assert!(api_keys::diff(&dev.api_keys, &current.api_keys).is_empty());
}

#[test]
fn out_of_range_key_placeholder_is_a_create() {
    let current = vec![key("da2-a", "web")];
    let mut dev = api_keys::dress_for_dev_backend(current.clone());
    dev.push(ApiKey {
        id: ProviderId::with_hint("5"),
        description: Some("extra".into()),
        expires: None,
        deletes: None,
    });
    dev.push(ApiKey {
        description: Some("bare".into()),
        ..ApiKey::default_key()
    });

    let marks: Vec<_> = api_keys::reconcile(&dev, &current)
        .iter()
        .map(|d| d.mark())
        .collect();
    assert_eq!(marks, vec![DiffMark::None, DiffMark::Create, DiffMark::Create]);
}

#[test]
fn literal_key_id_matches_by_equality() {
    let current = vec![key("da2-a", "web"), key("da2-b", "mobile")];
    let dev = vec![ApiKey {
        description: Some("mobile v2".into()),
        ..key("da2-b", "")
    }];

    let diffed = api_keys::diff(&dev, &current);
    assert_eq!(diffed.len(), 2);
    assert_eq!(diffed[0].mark(), DiffMark::Update);
    assert_eq!(diffed[0].current().unwrap().id.value(), Some("da2-b"));
    assert_eq!(diffed[1].mark(), DiffMark::Delete);

    let params = api_keys::construct_update_param(diffed[0].entity(), diffed[0].current().unwrap());
    assert_eq!(params.id.as_deref(), Some("da2-b"));
}

#[test]
fn throughput_only_change_is_one_request() {
    let current = active(starter_snapshot("blog", "us-east-1").tables.remove(0));
    let mut dev = tables::dress_for_dev_backend(current.clone());
    dev.provisioned_throughput.read_capacity_units = 10;

    let requests = tables::construct_update_params(&dev, &current).unwrap();
    assert_eq!(requests.len(), 1);
    let throughput = requests[0].provisioned_throughput.unwrap();
    assert_eq!(
        (throughput.read_capacity_units, throughput.write_capacity_units),
        (10, 5)
    );
    assert!(requests[0].attribute_definitions.is_empty());
}

#[test]
fn index_changes_are_split_delete_then_create() {
    let mut current = active(starter_snapshot("blog", "us-east-1").tables.remove(0));
    current.global_secondary_indexes = vec![index("old", "id")];
    let mut dev = tables::dress_for_dev_backend(current.clone());
    dev.attribute_definitions
        .push(mobilehub_core::models::table::AttributeDefinition {
            attribute_name: "author".into(),
            attribute_type: "S".into(),
        });
    dev.global_secondary_indexes = vec![index("byAuthor", "author")];

    let requests = tables::construct_update_params(&dev, &current).unwrap();
    assert_eq!(requests.len(), 2);
    assert!(matches!(
        requests[0].global_secondary_index_updates.as_slice(),
        [GlobalIndexUpdate::Delete { index_name }] if index_name == "old"
    ));
    assert!(matches!(
        requests[1].global_secondary_index_updates.as_slice(),
        [GlobalIndexUpdate::Create(i)] if i.index_name == "byAuthor"
    ));
    assert_eq!(requests[1].attribute_definitions[0].attribute_name, "author");
}

#[test]
fn key_schema_change_is_rejected() {
    let current = active(starter_snapshot("blog", "us-east-1").tables.remove(0));
    let mut dev = tables::dress_for_dev_backend(current.clone());
    dev.key_schema[0].attribute_name = "slug".into();

    let err = tables::construct_update_params(&dev, &current).unwrap_err();
    assert!(matches!(err, ProvisionerError::UpdateFailed(_)));
}

#[test]
fn unresolved_role_blocks_data_source_create() {
    let ds = starter_snapshot("blog", "us-east-1").data_sources.remove(0);
    let err = data_sources::construct_create_param(&ds).unwrap_err();
    assert!(matches!(err, ProvisionerError::InvalidState(_)));
}

#[test]
fn placeholder_role_matches_any_current_role() {
    let dev = starter_snapshot("blog", "us-east-1").data_sources.remove(0);
    let mut current = dev.clone();
    current.service_role_arn = Some(ProviderId::resolved("arn:aws:iam::1:role/r"));

    assert!(data_sources::same(&dev, &current));
    let params = data_sources::construct_update_param(&dev, &current);
    assert_eq!(params.service_role_arn.as_deref(), Some("arn:aws:iam::1:role/r"));
}

#[test]
fn generated_api_name_uses_hint_and_suffix() {
    let dev = starter_snapshot("blog", "us-east-1").api.unwrap();
    assert_eq!(api::generated_name(&dev, "ignored", "abcd1234"), "blog-abcd1234");

    let mut named = dev.clone();
    named.name = ProviderId::resolved("my-api");
    assert_eq!(api::generated_name(&named, "blog", "abcd1234"), "my-api");
}

#[test]
fn placeholder_api_name_is_not_a_rename() {
    let dev = starter_snapshot("blog", "us-east-1").api.unwrap();
    let mut current = dev.clone();
    current.name = ProviderId::resolved("blog-abcd1234");
    current.api_id = Some("api-1".into());

    let diffed = api::diff(&dev, Some(&current));
    assert_eq!(diffed.mark(), DiffMark::None);
    assert_eq!(diffed.entity().api_id.as_deref(), Some("api-1"));
}

#[test]
fn schema_equality_ignores_layout() {
    let a = "type Query {\n  ping: String\n}\n";
    let b = "\r\ntype Query {\n    ping: String\n}";
    assert_eq!(schema::diff(Some(a), Some(&schema::dress_for_dev_backend(b.into()))), DiffMark::None);
    assert_eq!(schema::diff(Some(a), None), DiffMark::Create);
    assert_eq!(schema::diff(None, Some(a)), DiffMark::None);
    assert_eq!(
        schema::diff(Some("type Query {\n  pong: String\n}"), Some(a)),
        DiffMark::Update
    );
}

#[test]
fn role_names_fit_iam_limits() {
    let long = "x".repeat(200);
    let name = service_role::role_name_for_table(&long, "abcd1234");
    assert!(name.len() <= 64);
    assert!(name.ends_with("-abcd1234"));

    let weird = service_role::role_name_for_table("blog:posts", "abcd1234");
    assert_eq!(weird, "appsync-blog_posts-abcd1234");
}

#[test]
fn role_name_carries_the_run_suffix_once() {
    assert_eq!(
        service_role::role_name_for_table("blog-Comments-abcd1234", "abcd1234"),
        "appsync-blog-Comments-abcd1234"
    );
    assert_eq!(
        service_role::role_name_for_table("blog-Commentsabcd1234", "abcd1234"),
        "appsync-blog-Commentsabcd1234-abcd1234"
    );
}

#[test]
fn policy_is_scoped_to_table_and_indexes() {
    let ds = starter_snapshot("blog", "us-east-1").data_sources.remove(0);
    let arn = "arn:aws:dynamodb:us-east-1:1:table/blog-Posts";
    let params = service_role::construct_put_role_policy_param_for_ddb(&ds, "role", arn).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&params.policy_document).unwrap();

    let resources = doc["Statement"][0]["Resource"].as_array().unwrap();
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[1], format!("{arn}/*").as_str());
    let actions = doc["Statement"][0]["Action"].as_array().unwrap();
    assert!(actions.iter().any(|a| a == "dynamodb:Query"));
}
