//! The GraphQL API metadata singleton.

use mobilehub_core::models::api::GraphqlApi;
use mobilehub_core::{Diffed, ProviderId};

use crate::params::ApiParams;

pub fn dress_for_dev_backend(mut api: GraphqlApi) -> GraphqlApi {
    api.arn = None;
    api.uris = None;
    api
}

pub fn same(dev: &GraphqlApi, current: &GraphqlApi) -> bool {
    ProviderId::dev_matches(Some(&dev.name), Some(&current.name))
        && dev.authentication_type == current.authentication_type
        && dev.user_pool_config == current.user_pool_config
        && dev.open_id_connect_config == current.open_id_connect_config
}

/// Compare the dev declaration against the current API, if any.
///
/// A placeholder dev name takes the current name first, so assigning the
/// generated name is never mistaken for a rename. The dev side also inherits
/// the current API id.
pub fn diff(dev: &GraphqlApi, current: Option<&GraphqlApi>) -> Diffed<GraphqlApi> {
    let Some(current) = current else {
        return Diffed::Create(dev.clone());
    };

    let mut dev = dev.clone();
    if !dev.name.is_resolved() {
        dev.name = current.name.clone();
    }
    if dev.api_id.is_none() {
        dev.api_id = current.api_id.clone();
    }

    if same(&dev, current) {
        Diffed::Unchanged {
            dev,
            current: current.clone(),
        }
    } else {
        Diffed::Update {
            dev,
            current: current.clone(),
        }
    }
}

/// The name to create the API under: the authored name, or
/// `<hint or project>-<suffix>` while it is still a placeholder.
pub fn generated_name(api: &GraphqlApi, project_name: &str, suffix: &str) -> String {
    match &api.name {
        ProviderId::Resolved(name) => name.clone(),
        ProviderId::Unresolved(hint) => {
            format!("{}-{suffix}", hint.as_deref().unwrap_or(project_name))
        }
    }
}

pub fn construct_param(api: &GraphqlApi, name: String) -> ApiParams {
    ApiParams {
        name,
        authentication_type: api.authentication_type,
        user_pool_config: api.user_pool_config.clone(),
        open_id_connect_config: api.open_id_connect_config.clone(),
    }
}
