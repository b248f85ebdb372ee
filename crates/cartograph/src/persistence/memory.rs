//! In-process persistence gateway.

use std::collections::BTreeMap;

use log::debug;

use cartograph_core::{GraphError, kind::ResourceKind, model::Graph};

use super::{PersistenceGateway, artifact_file_name};

/// Gateway keeping the snapshot and artifacts in memory.
///
/// Useful for tests and for embedding the store without a data directory.
/// [`fail_saves`](Self::fail_saves) makes every subsequent snapshot write
/// fail, which is how rollback behavior is exercised.
#[derive(Debug, Default, Clone)]
pub struct MemoryGateway {
    snapshot: Vec<Graph>,
    artifacts: BTreeMap<String, String>,
    saves_count: usize,
    fail_saves: bool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway whose snapshot already holds `graphs`.
    pub fn with_graphs(graphs: Vec<Graph>) -> Self {
        Self {
            snapshot: graphs,
            ..Self::default()
        }
    }

    /// Makes subsequent [`save`](PersistenceGateway::save) calls fail (or succeed again).
    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// The most recently saved snapshot.
    pub fn snapshot(&self) -> &[Graph] {
        &self.snapshot
    }

    /// Number of successful saves.
    pub fn saves_count(&self) -> usize {
        self.saves_count
    }

    /// Whether an artifact is currently stored under `locator`.
    pub fn has_artifact(&self, locator: &str) -> bool {
        self.artifacts.contains_key(locator)
    }
}

fn locator_for(kind: ResourceKind, file_name: &str) -> String {
    format!("memory://{kind}/{file_name}")
}

impl PersistenceGateway for MemoryGateway {
    fn load(&self) -> Result<Vec<Graph>, GraphError> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, graphs: &[&Graph]) -> Result<(), GraphError> {
        if self.fail_saves {
            return Err(GraphError::PersistenceFailure(
                "snapshot writes are disabled".to_string(),
            ));
        }
        self.snapshot = graphs.iter().map(|graph| (*graph).clone()).collect();
        self.saves_count += 1;
        debug!(graphs_count = graphs.len(); "Snapshot saved in memory");
        Ok(())
    }

    fn store_artifact(
        &mut self,
        kind: ResourceKind,
        name: &str,
        content: &str,
    ) -> Result<String, GraphError> {
        let locator = locator_for(kind, &artifact_file_name(kind, name)?);
        self.artifacts.insert(locator.clone(), content.to_string());
        Ok(locator)
    }

    fn read_artifact(&self, kind: ResourceKind, locator: &str) -> Result<String, GraphError> {
        if !locator.starts_with(&locator_for(kind, "")) {
            return Err(GraphError::NotFound(format!(
                "`{locator}` is not a stored {kind} artifact"
            )));
        }
        self.artifacts
            .get(locator)
            .cloned()
            .ok_or_else(|| GraphError::NotFound(format!("artifact `{locator}` does not exist")))
    }

    fn delete_artifact(&mut self, _kind: ResourceKind, locator: &str) -> Result<(), GraphError> {
        self.artifacts.remove(locator);
        Ok(())
    }
}
