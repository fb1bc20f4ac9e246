use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk shape of `mobilehub.json`. A bump needs a matching step in
/// [`migrate`].
pub const CURRENT_VERSION: u32 = 1;

pub const CONFIG_FILE: &str = "mobilehub.json";

pub const DEFAULT_REGION: &str = "us-east-1";

/// Project settings stored at the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// 0 when absent: written before versioning.
    #[serde(default)]
    pub config_version: u32,
    pub project_name: String,
    pub region: String,
    /// Added in v1; older configs fall back to the default chain.
    pub credentials: CredentialSource,
    pub created_at: jiff::Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialSource {
    Inline {
        access_key_id: String,
        secret_access_key: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        session_token: Option<String>,
    },
    Profile {
        profile_name: String,
    },
    DefaultChain,
}

impl ProjectConfig {
    pub fn new(project_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            config_version: CURRENT_VERSION,
            project_name: project_name.into(),
            region: region.into(),
            credentials: CredentialSource::DefaultChain,
            created_at: jiff::Timestamp::now(),
        }
    }

    /// Apply command-line overrides on top of the stored settings.
    pub fn with_overrides(mut self, region: Option<&str>, profile: Option<&str>) -> Self {
        if let Some(region) = region {
            self.region = region.to_string();
        }
        if let Some(profile) = profile {
            self.credentials = CredentialSource::Profile {
                profile_name: profile.to_string(),
            };
        }
        self
    }
}

pub fn config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_FILE)
}

pub fn has_config(project_dir: &Path) -> bool {
    config_path(project_dir).exists()
}

pub fn load_config(project_dir: &Path) -> eyre::Result<ProjectConfig> {
    let path = config_path(project_dir);
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Migrations run on the raw value, before the typed parse.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: ProjectConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Bring a raw config from `from_version` up to [`CURRENT_VERSION`], one
/// step at a time.
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update mobilehub."
        ));
    }

    // v0 -> v1: credentials became explicit
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        obj.entry("credentials")
            .or_insert(serde_json::json!({ "type": "default_chain" }));
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 -> v1 (added credentials)");
    }

    Ok(json)
}

pub fn save_config(project_dir: &Path, config: &ProjectConfig) -> eyre::Result<()> {
    std::fs::create_dir_all(project_dir)?;

    // Written at the current version whatever was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let path = config_path(project_dir);
    let json = serde_json::to_string_pretty(&stamped)?;

    let tmp_path = project_dir.join(format!("{CONFIG_FILE}.tmp"));
    std::fs::write(&tmp_path, json.as_bytes())?;

    // Inline credentials may live in here
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, &path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
