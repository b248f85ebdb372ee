//! The graph registry and its mutation surface.
//!
//! [`GraphStore`] owns every graph in insertion order and is the only way to
//! change them. Each mutating operation follows the same steps:
//!
//! 1. look up the graph and reject archived graphs
//! 2. validate every precondition against a working copy
//! 3. apply the change to the working copy
//! 4. hand the registry, with the working copy in place, to the
//!    [`PersistenceGateway`]
//!
//! The registry only changes if the snapshot write succeeds; a failed write
//! restores the previous state, so memory never runs ahead of disk.
//!
//! There is no internal locking. The store is meant to be driven by a single
//! caller at a time; callers sharing it between threads must wrap it in their
//! own mutual exclusion.

mod edges;
mod graphs;
mod nodes;
mod query;
mod resources;

pub use edges::{EdgeUpdate, NewEdge};
pub use graphs::{GraphUpdate, VISUALIZATION_NAME};
pub use nodes::{NewNode, NodeRemoval, NodeUpdate};
pub use query::{GraphFilter, GraphSummary, NodeDetails, NodeSummary};
pub use resources::{NewResource, ResourceUpdate};

use indexmap::IndexMap;
use log::{debug, info, warn};

use cartograph_core::{
    GraphError,
    identifier::GraphId,
    kind::ResourceKind,
    model::{Graph, Resource},
};

use crate::{
    config::AppConfig,
    export::{Exporter, svg::Svg},
    layout,
    persistence::PersistenceGateway,
};

/// In-memory registry of graphs backed by a persistence gateway.
pub struct GraphStore<G: PersistenceGateway> {
    graphs: IndexMap<GraphId, Graph>,
    gateway: G,
    layout_engine: layout::Engine,
    exporter: Svg,
    auto_visualize: bool,
}

impl<G: PersistenceGateway> GraphStore<G> {
    /// Opens a store over `gateway`, loading its current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidInput`] for invalid layout or style
    /// configuration and [`GraphError::PersistenceFailure`] if the snapshot
    /// cannot be loaded or contains the same graph id twice.
    pub fn open(gateway: G, config: &AppConfig) -> Result<Self, GraphError> {
        config
            .layout()
            .validate()
            .map_err(GraphError::InvalidInput)?;
        let exporter = Svg::from_style(config.style()).map_err(GraphError::InvalidInput)?;

        let loaded = gateway.load()?;
        let mut graphs = IndexMap::with_capacity(loaded.len());
        for graph in loaded {
            let id = graph.id;
            if graphs.insert(id, graph).is_some() {
                return Err(GraphError::PersistenceFailure(format!(
                    "snapshot contains graph `{id}` more than once"
                )));
            }
        }

        info!(graphs_count = graphs.len(); "Graph store opened");

        Ok(Self {
            graphs,
            gateway,
            layout_engine: layout::Engine::from_config(config.layout()),
            exporter,
            auto_visualize: config.store().auto_visualize(),
        })
    }

    /// The persistence gateway backing this store.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Mutable access to the gateway, e.g. to reconfigure it between operations.
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Number of graphs in the registry.
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Returns the graph with `graph_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if no such graph exists.
    pub fn get_graph(&self, graph_id: GraphId) -> Result<&Graph, GraphError> {
        self.graphs
            .get(&graph_id)
            .ok_or_else(|| GraphError::NotFound(format!("graph `{graph_id}` does not exist")))
    }

    /// Clone of a graph that may be changed, rejecting archived graphs.
    fn working_copy(&self, graph_id: GraphId) -> Result<Graph, GraphError> {
        let graph = self.get_graph(graph_id)?;
        graph.ensure_mutable()?;
        Ok(graph.clone())
    }

    /// Writes the whole registry through the gateway.
    fn persist(&mut self) -> Result<(), GraphError> {
        let graphs: Vec<&Graph> = self.graphs.values().collect();
        self.gateway.save(&graphs)
    }

    /// Installs `graph` in the registry and persists, rolling back on failure.
    fn commit(&mut self, graph: Graph) -> Result<(), GraphError> {
        let id = graph.id;
        let previous = self.graphs.insert(id, graph);

        if let Err(err) = self.persist() {
            warn!(graph_id:% = id, err:% = err; "Snapshot write failed, rolling back");
            match previous {
                Some(previous) => {
                    self.graphs.insert(id, previous);
                }
                None => {
                    self.graphs.shift_remove(&id);
                }
            }
            return Err(err);
        }

        Ok(())
    }

    /// Lays out and renders `graph` to an SVG document.
    fn render(&self, graph: &Graph) -> Result<String, GraphError> {
        let layout = self.layout_engine.calculate(graph);
        self.exporter.export_graph(graph, &layout)
    }

    /// Writes an artifact, remembering how to undo the write.
    ///
    /// `replaces` is the locator of an artifact this write overwrites; its
    /// current content is read first so a failed commit can restore it.
    fn write_artifact(
        &mut self,
        kind: ResourceKind,
        name: &str,
        content: &str,
        replaces: Option<&str>,
    ) -> Result<(String, ArtifactWrite), GraphError> {
        let previous = replaces.and_then(|locator| self.gateway.read_artifact(kind, locator).ok());
        let locator = self.gateway.store_artifact(kind, name, content)?;
        let write = match previous {
            Some(previous) => ArtifactWrite::Replaced {
                kind,
                name: name.to_string(),
                previous,
            },
            None => ArtifactWrite::Created {
                kind,
                locator: locator.clone(),
            },
        };
        Ok((locator, write))
    }

    /// Reverts an artifact write after its commit failed.
    fn undo_artifact_write(&mut self, write: ArtifactWrite) {
        match write {
            ArtifactWrite::Created { kind, locator } => self.discard_artifact(kind, &locator),
            ArtifactWrite::Replaced {
                kind,
                name,
                previous,
            } => {
                if let Err(err) = self.gateway.store_artifact(kind, &name, &previous) {
                    warn!(name = name.as_str(), err:% = err; "Failed to restore artifact");
                }
            }
        }
    }

    /// Removes the artifact behind `resource` once nothing refers to it.
    ///
    /// Only artifacts the store wrote are removed, and only when no resource
    /// left in the registry shares the locator.
    fn release_artifact(&mut self, resource: &Resource) {
        if !resource.stored {
            return;
        }
        let shared = self
            .graphs
            .values()
            .flat_map(|graph| &graph.resources)
            .any(|other| other.id != resource.id && other.path == resource.path);
        if shared {
            debug!(locator = resource.path.as_str(); "Artifact still referenced, keeping it");
            return;
        }
        self.discard_artifact(resource.kind, &resource.path);
    }

    /// Best-effort removal of a stored artifact; `other` resources are left alone.
    fn discard_artifact(&mut self, kind: ResourceKind, locator: &str) {
        if !kind.is_stored_artifact() {
            return;
        }
        if let Err(err) = self.gateway.delete_artifact(kind, locator) {
            warn!(locator = locator, err:% = err; "Failed to delete artifact");
        }
    }
}

/// An artifact written ahead of a commit.
enum ArtifactWrite {
    Created {
        kind: ResourceKind,
        locator: String,
    },
    Replaced {
        kind: ResourceKind,
        name: String,
        previous: String,
    },
}

/// Trims `value` and rejects it if nothing is left.
fn required_text(value: &str, what: &str) -> Result<String, GraphError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(GraphError::InvalidInput(format!("{what} must not be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}
