use std::fmt;

use serde::{Deserialize, Serialize};

/// Resource kinds the reconciler knows about.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Api,
    Schema,
    Table,
    DataSource,
    Resolver,
    ApiKey,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Api => "api",
            Self::Schema => "schema",
            Self::Table => "table",
            Self::DataSource => "data_source",
            Self::Resolver => "resolver",
            Self::ApiKey => "api_key",
        };
        f.write_str(s)
    }
}

/// Composite key for addressing one entity in a plan or a log line.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct EntityAddr {
    pub kind: ResourceKind,
    pub name: String,
}

impl EntityAddr {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for EntityAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.name)
    }
}
