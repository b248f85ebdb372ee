//! File-backed persistence gateway.
//!
//! Layout of the data directory:
//!
//! ```text
//! <data_dir>/
//!   graphs.json        registry snapshot
//!   svg/<name>.svg     rendered visualizations
//!   markdown/<name>.md authored documents
//! ```
//!
//! Locators handed out by [`JsonFileGateway::store_artifact`] are paths
//! relative to the data directory, such as `svg/overview.svg`.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Utc;
use log::{debug, info};
use tempfile::NamedTempFile;

use cartograph_core::{GraphError, kind::ResourceKind, model::Graph};

use super::{PersistenceGateway, Snapshot, SnapshotRef, artifact_file_name};

const SNAPSHOT_FILE: &str = "graphs.json";

/// Gateway that stores the registry as JSON inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    data_dir: PathBuf,
}

impl JsonFileGateway {
    /// Creates a gateway rooted at `data_dir`. The directory is created on first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of the registry snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    /// Absolute path an artifact locator refers to.
    ///
    /// Returns `None` for locators outside the artifact area of `kind`, which
    /// is how externally referenced files are kept out of reach.
    pub fn artifact_path(&self, kind: ResourceKind, locator: &str) -> Option<PathBuf> {
        let dir = kind_dir(kind)?;
        let file = locator.strip_prefix(dir)?.strip_prefix('/')?;
        if file.is_empty() || file.contains(['/', '\\']) || file.starts_with('.') {
            return None;
        }
        Some(self.data_dir.join(dir).join(file))
    }

    fn write_atomically(&self, dir: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(dir)?;
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(bytes)?;
        temp.flush()?;
        temp.persist(path).map_err(|err| err.error)?;
        Ok(())
    }
}

fn kind_dir(kind: ResourceKind) -> Option<&'static str> {
    match kind {
        ResourceKind::Svg => Some("svg"),
        ResourceKind::Markdown => Some("markdown"),
        ResourceKind::Other => None,
    }
}

impl PersistenceGateway for JsonFileGateway {
    fn load(&self) -> Result<Vec<Graph>, GraphError> {
        let path = self.snapshot_path();
        if !path.exists() {
            debug!(path = path.display().to_string(); "No snapshot found, starting empty");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .map_err(|err| GraphError::persistence("failed to read snapshot", err))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|err| GraphError::persistence("failed to parse snapshot", err))?;

        info!(
            path = path.display().to_string(),
            graphs_count = snapshot.graphs.len(),
            last_updated:? = snapshot.last_updated;
            "Snapshot loaded"
        );
        Ok(snapshot.graphs)
    }

    fn save(&mut self, graphs: &[&Graph]) -> Result<(), GraphError> {
        let snapshot = SnapshotRef {
            graphs,
            last_updated: Utc::now(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|err| GraphError::persistence("failed to serialize snapshot", err))?;

        let path = self.snapshot_path();
        self.write_atomically(&self.data_dir, &path, &bytes)
            .map_err(|err| GraphError::persistence("failed to write snapshot", err))?;

        debug!(
            path = path.display().to_string(),
            graphs_count = graphs.len();
            "Snapshot saved"
        );
        Ok(())
    }

    fn store_artifact(
        &mut self,
        kind: ResourceKind,
        name: &str,
        content: &str,
    ) -> Result<String, GraphError> {
        let file_name = artifact_file_name(kind, name)?;
        let dir_name = kind_dir(kind).ok_or_else(|| {
            GraphError::InvalidInput(format!("resources of kind `{kind}` are not stored artifacts"))
        })?;

        let dir = self.data_dir.join(dir_name);
        let path = dir.join(&file_name);
        self.write_atomically(&dir, &path, content.as_bytes())
            .map_err(|err| GraphError::persistence("failed to store artifact", err))?;

        let locator = format!("{dir_name}/{file_name}");
        debug!(kind:% = kind, locator = locator; "Artifact stored");
        Ok(locator)
    }

    fn read_artifact(&self, kind: ResourceKind, locator: &str) -> Result<String, GraphError> {
        let path = self.artifact_path(kind, locator).ok_or_else(|| {
            GraphError::NotFound(format!("`{locator}` is not a stored {kind} artifact"))
        })?;

        fs::read_to_string(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => {
                GraphError::NotFound(format!("artifact `{locator}` does not exist"))
            }
            _ => GraphError::persistence("failed to read artifact", err),
        })
    }

    fn delete_artifact(&mut self, kind: ResourceKind, locator: &str) -> Result<(), GraphError> {
        let Some(path) = self.artifact_path(kind, locator) else {
            debug!(
                kind:% = kind,
                locator = locator;
                "Locator outside artifact area, nothing to delete"
            );
            return Ok(());
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(kind:% = kind, locator = locator; "Artifact deleted");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(GraphError::persistence("failed to delete artifact", err)),
        }
    }
}
