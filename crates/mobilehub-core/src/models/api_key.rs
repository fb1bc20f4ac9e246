use serde::{Deserialize, Serialize};

use crate::placeholder::ProviderId;

/// An AppSync API key descriptor.
///
/// In a dev snapshot the id is usually `{managed-by-mobilehub}:N`, a
/// positional reference into the current snapshot's key list, so secrets
/// never land in the authored tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Expiry as epoch seconds; the provider picks a default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,

    // ── provider-only ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletes: Option<i64>,
}

impl ApiKey {
    pub const DEFAULT_DESCRIPTION: &'static str = "default api key";

    /// The key auto-inserted when a create run declares none.
    pub fn default_key() -> Self {
        Self {
            id: ProviderId::unresolved(),
            description: Some(Self::DEFAULT_DESCRIPTION.to_string()),
            expires: None,
            deletes: None,
        }
    }
}
