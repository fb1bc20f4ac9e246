use std::path::PathBuf;

pub const API_FILE: &str = "graphqlApi.json";
pub const DATA_SOURCES_FILE: &str = "dataSources.json";
pub const RESOLVERS_FILE: &str = "resolvers.json";
pub const API_KEYS_FILE: &str = "apiKeys.json";
pub const SCHEMA_FILE: &str = "schema.graphql";
pub const MAPPINGS_DIR: &str = "resolver-mappings";
pub const PUBLIC_INFO_FILE: &str = "appsync-info.json";

/// Where each snapshot lives inside a project.
///
/// ```text
/// <root>/backend/appsync/                      dev (authored)
/// <root>/#current-backend-info/appsync/        current (last sync)
/// <root>/#current-backend-info/appsync-info.json
/// ```
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn dev_dir(&self) -> PathBuf {
        self.root.join("backend").join("appsync")
    }

    pub fn current_info_dir(&self) -> PathBuf {
        self.root.join("#current-backend-info")
    }

    pub fn current_dir(&self) -> PathBuf {
        self.current_info_dir().join("appsync")
    }

    pub fn public_info_path(&self) -> PathBuf {
        self.current_info_dir().join(PUBLIC_INFO_FILE)
    }
}

/// File paths within one snapshot directory.
#[derive(Debug, Clone)]
pub struct SnapshotPaths {
    pub dir: PathBuf,
}

impl SnapshotPaths {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn api(&self) -> PathBuf {
        self.dir.join(API_FILE)
    }

    pub fn data_sources(&self) -> PathBuf {
        self.dir.join(DATA_SOURCES_FILE)
    }

    pub fn resolvers(&self) -> PathBuf {
        self.dir.join(RESOLVERS_FILE)
    }

    pub fn api_keys(&self) -> PathBuf {
        self.dir.join(API_KEYS_FILE)
    }

    pub fn schema(&self) -> PathBuf {
        self.dir.join(SCHEMA_FILE)
    }

    pub fn mappings_dir(&self) -> PathBuf {
        self.dir.join(MAPPINGS_DIR)
    }

    pub fn mapping(&self, file_name: &str) -> PathBuf {
        self.mappings_dir().join(file_name)
    }
}
