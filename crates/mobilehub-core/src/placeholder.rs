//! Provider-assigned identifiers and out-of-line mapping templates.
//!
//! Values that only the remote provider can assign (role ARNs, API key ids,
//! generated API names, table-name suffixes) are authored locally as the
//! [`SENTINEL`] string. On disk the sentinel stays a plain string so the JSON
//! documents keep their shape; in memory it becomes an explicit
//! [`ProviderId::Unresolved`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Marker for a value the provider has not assigned yet.
pub const SENTINEL: &str = "{managed-by-mobilehub}";

/// An identifier that is either still waiting on the provider or resolved.
///
/// Serialized forms:
/// - `"{managed-by-mobilehub}"` → `Unresolved(None)`
/// - `"{managed-by-mobilehub}:hint"` → `Unresolved(Some("hint"))`
/// - anything else → `Resolved(value)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderId {
    Unresolved(Option<String>),
    Resolved(String),
}

impl ProviderId {
    pub fn unresolved() -> Self {
        Self::Unresolved(None)
    }

    pub fn with_hint(hint: impl Into<String>) -> Self {
        Self::Unresolved(Some(hint.into()))
    }

    pub fn resolved(value: impl Into<String>) -> Self {
        Self::Resolved(value.into())
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The provider-issued value, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Resolved(v) => Some(v),
            Self::Unresolved(_) => None,
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Unresolved(hint) => hint.as_deref(),
            Self::Resolved(_) => None,
        }
    }

    /// Positional reference encoded as `{managed-by-mobilehub}:N`.
    pub fn placeholder_index(&self) -> Option<usize> {
        self.hint().and_then(|h| h.parse().ok())
    }

    /// Compare a dev-side value against a current-side value.
    ///
    /// An unresolved dev value means "unset" and matches anything.
    pub fn dev_matches(dev: Option<&Self>, current: Option<&Self>) -> bool {
        match (dev, current) {
            (None, _) | (Some(Self::Unresolved(_)), _) => true,
            (Some(Self::Resolved(d)), Some(Self::Resolved(c))) => d == c,
            (Some(Self::Resolved(_)), _) => false,
        }
    }
}

impl From<String> for ProviderId {
    fn from(raw: String) -> Self {
        if raw == SENTINEL {
            return Self::Unresolved(None);
        }
        match raw.strip_prefix(SENTINEL).and_then(|r| r.strip_prefix(':')) {
            Some(hint) => Self::Unresolved(Some(hint.to_string())),
            None => Self::Resolved(raw),
        }
    }
}

impl From<ProviderId> for String {
    fn from(id: ProviderId) -> Self {
        match id {
            ProviderId::Unresolved(None) => SENTINEL.to_string(),
            ProviderId::Unresolved(Some(hint)) => format!("{SENTINEL}:{hint}"),
            ProviderId::Resolved(value) => value,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unresolved(None) => f.write_str(SENTINEL),
            Self::Unresolved(Some(hint)) => write!(f, "{SENTINEL}:{hint}"),
            Self::Resolved(value) => f.write_str(value),
        }
    }
}

/// Whether a physical name still carries the sentinel as a suffix slot.
pub fn is_templated(name: &str) -> bool {
    name.contains(SENTINEL)
}

/// Replace every sentinel occurrence in a physical name with `suffix`.
pub fn substitute_suffix(name: &str, suffix: &str) -> String {
    name.replace(SENTINEL, suffix)
}

/// A resolver mapping template, either inline or stored in a sibling file.
///
/// A file reference serializes as `{managed-by-mobilehub}:<file name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MappingTemplate {
    Inline(String),
    File(String),
}

impl MappingTemplate {
    /// Inline body, `None` for a file reference that has not been read yet.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Inline(body) => Some(body),
            Self::File(_) => None,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::File(name) => Some(name),
            Self::Inline(_) => None,
        }
    }
}

impl TryFrom<String> for MappingTemplate {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match raw.strip_prefix(SENTINEL) {
            Some(rest) => match rest.strip_prefix(':') {
                Some(file) if !file.trim().is_empty() => Ok(Self::File(file.to_string())),
                _ => Err(CoreError::InvalidPlaceholder(format!(
                    "mapping template reference without a file name: {raw}"
                ))),
            },
            None => Ok(Self::Inline(raw)),
        }
    }
}

impl From<MappingTemplate> for String {
    fn from(template: MappingTemplate) -> Self {
        match template {
            MappingTemplate::Inline(body) => body,
            MappingTemplate::File(name) => format!("{SENTINEL}:{name}"),
        }
    }
}
