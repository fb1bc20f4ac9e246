use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use mobilehub_core::models::api::{GraphqlApi, PublicApiInfo};
use mobilehub_core::models::resolver::{Resolver, TemplateDirection};
use mobilehub_core::{BackendSnapshot, MappingTemplate};

use crate::documents::{ApiKeysDocument, DataSourcesDocument, ResolversDocument};
use crate::error::StorageError;
use crate::layout::{ProjectLayout, SnapshotPaths};
use crate::state;

/// Reads and writes the dev and current snapshots of the AppSync feature.
///
/// Loaded resolvers always carry inline template bodies: file references
/// are read on load, and a reference to a missing file is an error. Saved
/// resolvers always carry file references: each inline body is written to
/// `resolver-mappings/<Type>.<field>.<direction>` first.
#[derive(Debug, Clone)]
pub struct ResourceManager {
    layout: ProjectLayout,
}

impl ResourceManager {
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    fn dev(&self) -> SnapshotPaths {
        SnapshotPaths::new(self.layout.dev_dir())
    }

    fn current(&self) -> SnapshotPaths {
        SnapshotPaths::new(self.layout.current_dir())
    }

    pub fn is_enabled(&self) -> bool {
        self.layout.dev_dir().is_dir()
    }

    pub fn ensure_enabled(&self) -> Result<(), StorageError> {
        if self.is_enabled() {
            Ok(())
        } else {
            Err(StorageError::NotEnabled {
                path: self.layout.dev_dir(),
            })
        }
    }

    pub fn load_dev(&self) -> Result<BackendSnapshot, StorageError> {
        self.ensure_enabled()?;
        load_snapshot(&self.dev())
    }

    pub fn load_current(&self) -> Result<BackendSnapshot, StorageError> {
        load_snapshot(&self.current())
    }

    pub fn save_dev(&self, snapshot: &BackendSnapshot) -> Result<(), StorageError> {
        save_snapshot(&self.dev(), snapshot)?;
        tracing::info!(dir = %self.layout.dev_dir().display(), "dev snapshot saved");
        Ok(())
    }

    pub fn save_current(&self, snapshot: &BackendSnapshot) -> Result<(), StorageError> {
        save_snapshot(&self.current(), snapshot)?;
        tracing::info!(dir = %self.layout.current_dir().display(), "current snapshot saved");
        Ok(())
    }

    pub fn save_public_info(&self, info: &PublicApiInfo) -> Result<(), StorageError> {
        state::write_json(&self.layout.public_info_path(), info)
    }

    pub fn load_public_info(&self) -> Result<Option<PublicApiInfo>, StorageError> {
        state::read_json(&self.layout.public_info_path())
    }

    /// Write the starter dev snapshot. Refuses to clobber an enabled feature.
    pub fn enable(&self, starter: &BackendSnapshot) -> Result<bool, StorageError> {
        if self.is_enabled() {
            tracing::info!("appsync feature already enabled");
            return Ok(false);
        }
        self.save_dev(starter)?;
        Ok(true)
    }

    /// Remove both the dev and current trees.
    pub fn disable(&self) -> Result<(), StorageError> {
        remove_dir(&self.layout.dev_dir())?;
        remove_dir(&self.layout.current_dir())?;
        let public = self.layout.public_info_path();
        match std::fs::remove_file(&public) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::io(public, e)),
        }
        tracing::info!("appsync feature disabled");
        Ok(())
    }
}

fn load_snapshot(paths: &SnapshotPaths) -> Result<BackendSnapshot, StorageError> {
    let api: Option<GraphqlApi> = state::read_json(&paths.api())?;
    let data_sources: DataSourcesDocument =
        state::read_json(&paths.data_sources())?.unwrap_or_default();
    let resolvers: ResolversDocument = state::read_json(&paths.resolvers())?.unwrap_or_default();
    let api_keys: ApiKeysDocument = state::read_json(&paths.api_keys())?.unwrap_or_default();
    let schema = state::read_text(&paths.schema())?;

    let resolvers = resolvers
        .resolvers
        .into_iter()
        .map(|r| materialize(paths, r))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BackendSnapshot {
        api,
        data_sources: data_sources.data_sources,
        tables: data_sources.tables,
        resolvers,
        api_keys: api_keys.api_keys,
        schema,
    })
}

fn save_snapshot(paths: &SnapshotPaths, snapshot: &BackendSnapshot) -> Result<(), StorageError> {
    if let Some(api) = &snapshot.api {
        state::write_json(&paths.api(), api)?;
    }
    state::write_json(
        &paths.data_sources(),
        &DataSourcesDocument {
            data_sources: snapshot.data_sources.clone(),
            tables: snapshot.tables.clone(),
        },
    )?;

    let resolvers = snapshot
        .resolvers
        .iter()
        .cloned()
        .map(|r| externalize(paths, r))
        .collect::<Result<Vec<_>, _>>()?;
    let referenced: BTreeSet<&str> = resolvers
        .iter()
        .flat_map(|r| TemplateDirection::ALL.map(|d| r.template(d).file_name()))
        .flatten()
        .collect();
    prune_mappings(paths, &referenced)?;
    state::write_json(&paths.resolvers(), &ResolversDocument { resolvers })?;

    state::write_json(
        &paths.api_keys(),
        &ApiKeysDocument {
            api_keys: snapshot.api_keys.clone(),
        },
    )?;
    if let Some(schema) = &snapshot.schema {
        state::write_text(&paths.schema(), schema)?;
    }
    Ok(())
}

/// Replace file references with the bodies they point at.
fn materialize(paths: &SnapshotPaths, mut resolver: Resolver) -> Result<Resolver, StorageError> {
    for direction in TemplateDirection::ALL {
        let template = resolver.template_mut(direction);
        if let MappingTemplate::File(name) = template {
            let path = mapping_path(paths, name)?;
            let body = state::read_text(&path)?
                .ok_or(StorageError::MissingMappingTemplate { path })?;
            *template = MappingTemplate::Inline(body);
        }
    }
    Ok(resolver)
}

/// Write inline bodies out and leave file references in their place.
fn externalize(paths: &SnapshotPaths, mut resolver: Resolver) -> Result<Resolver, StorageError> {
    for direction in TemplateDirection::ALL {
        let file_name = resolver.template_file_name(direction);
        let template = resolver.template_mut(direction);
        if let MappingTemplate::Inline(body) = template {
            state::write_text(&mapping_path(paths, &file_name)?, body)?;
            *template = MappingTemplate::File(file_name);
        }
    }
    Ok(resolver)
}

/// Mapping references name a file directly inside `resolver-mappings/`.
fn mapping_path(paths: &SnapshotPaths, name: &str) -> Result<PathBuf, StorageError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);
    if !plain {
        return Err(StorageError::InvalidMappingReference {
            name: name.to_string(),
        });
    }
    Ok(paths.mapping(name))
}

/// Remove mapping files no resolver refers to any more.
fn prune_mappings(paths: &SnapshotPaths, referenced: &BTreeSet<&str>) -> Result<(), StorageError> {
    let dir = paths.mappings_dir();
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(StorageError::io(dir, e)),
    };
    for entry in entries {
        let entry = entry.map_err(|e| StorageError::io(&dir, e))?;
        let path = entry.path();
        let stale = path.is_file()
            && entry
                .file_name()
                .to_str()
                .is_none_or(|name| !referenced.contains(name));
        if stale {
            std::fs::remove_file(&path).map_err(|e| StorageError::io(&path, e))?;
            tracing::debug!(path = %path.display(), "stale mapping template removed");
        }
    }
    Ok(())
}

fn remove_dir(path: &Path) -> Result<(), StorageError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "directory removed");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::io(path, e)),
    }
}
