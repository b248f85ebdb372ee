//! Persistence contract for the graph registry.
//!
//! The store never touches disk itself. After every successful mutation it
//! hands the complete registry to a [`PersistenceGateway`], and it delegates
//! reading and removing rendered or authored artifacts to the same gateway.
//!
//! Two gateways ship with the crate:
//!
//! - [`JsonFileGateway`] keeps a pretty-printed JSON snapshot plus one
//!   subdirectory per artifact kind inside a data directory.
//! - [`MemoryGateway`] keeps everything in process; tests use it to observe
//!   saves and to inject write failures.

mod json_file;
mod memory;

pub use json_file::JsonFileGateway;
pub use memory::MemoryGateway;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cartograph_core::{GraphError, kind::ResourceKind, model::Graph};

/// Storage backend for registry snapshots and artifacts.
pub trait PersistenceGateway {
    /// Returns the previously saved graphs, or an empty list if nothing was saved yet.
    fn load(&self) -> Result<Vec<Graph>, GraphError>;

    /// Replaces the whole snapshot with `graphs`.
    ///
    /// Readers must observe either the previous snapshot or the new one,
    /// never a partially written file.
    fn save(&mut self, graphs: &[&Graph]) -> Result<(), GraphError>;

    /// Stores `content` under `name` in the area for `kind` and returns a
    /// locator for later retrieval or deletion.
    ///
    /// Storing again under the same name replaces the content and returns the
    /// same locator.
    fn store_artifact(
        &mut self,
        kind: ResourceKind,
        name: &str,
        content: &str,
    ) -> Result<String, GraphError>;

    /// Reads back an artifact previously returned by [`store_artifact`](Self::store_artifact).
    fn read_artifact(&self, kind: ResourceKind, locator: &str) -> Result<String, GraphError>;

    /// Removes an artifact. An artifact that is already gone is not an error.
    fn delete_artifact(&mut self, kind: ResourceKind, locator: &str) -> Result<(), GraphError>;
}

/// Serialized form of a registry snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SnapshotRef<'a> {
    pub graphs: &'a [&'a Graph],
    pub last_updated: DateTime<Utc>,
}

/// Deserialized form of a registry snapshot.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Snapshot {
    #[serde(default)]
    pub graphs: Vec<Graph>,
    pub last_updated: Option<DateTime<Utc>>,
}

fn artifact_kind_guard(kind: ResourceKind) -> Result<&'static str, GraphError> {
    kind.extension().ok_or_else(|| {
        GraphError::InvalidInput(format!("resources of kind `{kind}` are not stored artifacts"))
    })
}

/// File name for an artifact: `name` with the kind's extension appended if missing.
pub(crate) fn artifact_file_name(kind: ResourceKind, name: &str) -> Result<String, GraphError> {
    let extension = artifact_kind_guard(kind)?;
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(GraphError::InvalidInput(format!(
            "invalid artifact name `{name}`"
        )));
    }

    if name.ends_with(&format!(".{extension}")) {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}.{extension}"))
    }
}
