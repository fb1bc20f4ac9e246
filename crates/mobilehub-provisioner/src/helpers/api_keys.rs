//! API keys: dressing to positional placeholders and diffing by id.

use mobilehub_core::diff::{actionable, reconcile as reconcile_with};
use mobilehub_core::models::api_key::ApiKey;
use mobilehub_core::{Diffed, ProviderId};

use crate::params::ApiKeyParams;

/// Replace each key id with `{managed-by-mobilehub}:N` so key material never
/// reaches the dev tree. `N` is the key's position in the collection.
pub fn dress_for_dev_backend(keys: Vec<ApiKey>) -> Vec<ApiKey> {
    keys.into_iter()
        .enumerate()
        .map(|(i, mut key)| {
            key.id = ProviderId::with_hint(i.to_string());
            key.deletes = None;
            key
        })
        .collect()
}

/// Locate a dev key's counterpart.
///
/// A positional placeholder resolves to that entry of `current` when in
/// range; a bare placeholder never matches; a literal id matches by equality.
pub fn find_current(dev: &ApiKey, current: &[ApiKey]) -> Option<usize> {
    match &dev.id {
        ProviderId::Unresolved(_) => dev.id.placeholder_index().filter(|&i| i < current.len()),
        ProviderId::Resolved(id) => current
            .iter()
            .position(|c| c.id.value() == Some(id.as_str())),
    }
}

/// Unset dev expiry leaves the provider's value alone.
pub fn same(dev: &ApiKey, current: &ApiKey) -> bool {
    dev.description == current.description
        && (dev.expires.is_none() || dev.expires == current.expires)
}

pub fn reconcile(dev: &[ApiKey], current: &[ApiKey]) -> Vec<Diffed<ApiKey>> {
    reconcile_with(dev, current, find_current, same)
}

pub fn diff(dev: &[ApiKey], current: &[ApiKey]) -> Vec<Diffed<ApiKey>> {
    actionable(reconcile(dev, current))
}

pub fn construct_create_param(key: &ApiKey) -> ApiKeyParams {
    ApiKeyParams {
        id: None,
        description: key.description.clone(),
        expires: key.expires,
    }
}

pub fn construct_update_param(dev: &ApiKey, current: &ApiKey) -> ApiKeyParams {
    ApiKeyParams {
        id: current.id.value().map(String::from),
        description: dev.description.clone(),
        expires: dev.expires.or(current.expires),
    }
}

pub fn label(key: &ApiKey) -> String {
    key.description.clone().unwrap_or_else(|| "api key".to_string())
}
