//! Graph-level operations: creation, metadata, lifecycle and rendering.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use cartograph_core::{
    GraphError,
    identifier::{GraphId, NodeId, ResourceId},
    kind::{GraphKind, ResourceKind},
    model::{Graph, Resource},
    status::GraphStatus,
};

use super::{ArtifactWrite, GraphStore, required_text};
use crate::persistence::PersistenceGateway;

/// Name of the SVG resource attached to a graph when it is published.
pub const VISUALIZATION_NAME: &str = "visualization.svg";

/// Changes to a graph's descriptive fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct GraphUpdate {
    pub name: Option<String>,
    /// An empty description clears it.
    pub description: Option<String>,
}

impl<G: PersistenceGateway> GraphStore<G> {
    /// Creates an empty draft graph. `kind` defaults to [`GraphKind::KnowledgeBase`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidInput`] for an empty name.
    pub fn create_graph(
        &mut self,
        name: &str,
        kind: Option<GraphKind>,
        description: Option<String>,
    ) -> Result<Graph, GraphError> {
        let name = required_text(name, "graph name")?;
        let kind = kind.unwrap_or(GraphKind::KnowledgeBase);
        let graph = Graph::new(name, kind, non_empty(description), Utc::now());

        self.commit(graph.clone())?;
        info!(graph_id:% = graph.id, kind:% = kind, name = graph.name.as_str(); "Graph created");
        Ok(graph)
    }

    /// Renames or redescribes a graph.
    pub fn update_graph(
        &mut self,
        graph_id: GraphId,
        update: GraphUpdate,
    ) -> Result<Graph, GraphError> {
        let mut graph = self.working_copy(graph_id)?;

        if let Some(name) = update.name {
            graph.name = required_text(&name, "graph name")?;
        }
        if let Some(description) = update.description {
            graph.description = non_empty(Some(description));
        }
        graph.updated_at = Utc::now();

        self.commit(graph.clone())?;
        Ok(graph)
    }

    /// Sets or clears the root node, which cannot be deleted while it is root.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if `node_id` is not a node of the graph.
    pub fn set_root_node(
        &mut self,
        graph_id: GraphId,
        node_id: Option<NodeId>,
    ) -> Result<Graph, GraphError> {
        let mut graph = self.working_copy(graph_id)?;
        if let Some(node_id) = node_id {
            graph.require_node(node_id)?;
        }
        graph.root_node_id = node_id;
        graph.updated_at = Utc::now();

        self.commit(graph.clone())?;
        Ok(graph)
    }

    /// Publishes a draft graph, or re-publishes a published one.
    ///
    /// With auto-visualization enabled the graph is laid out and rendered,
    /// and the SVG is attached as the [`VISUALIZATION_NAME`] resource,
    /// replacing the one from any earlier publish.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ImmutableState`] for archived graphs and
    /// [`GraphError::DuplicateName`] if a non-SVG resource already uses the
    /// visualization name.
    pub fn publish_graph(&mut self, graph_id: GraphId) -> Result<Graph, GraphError> {
        let mut graph = self.working_copy(graph_id)?;
        let now = Utc::now();

        graph.status = graph.status.transition(GraphStatus::Published)?;
        graph.published_at = Some(now);
        graph.updated_at = now;

        let write = if self.auto_visualize {
            Some(self.attach_visualization(&mut graph, now)?)
        } else {
            None
        };

        if let Err(err) = self.commit(graph.clone()) {
            if let Some(write) = write {
                self.undo_artifact_write(write);
            }
            return Err(err);
        }

        info!(
            graph_id:% = graph.id,
            visualized = self.auto_visualize;
            "Graph published"
        );
        Ok(graph)
    }

    /// Renders `graph` and upserts its visualization resource.
    fn attach_visualization(
        &mut self,
        graph: &mut Graph,
        now: DateTime<Utc>,
    ) -> Result<ArtifactWrite, GraphError> {
        let existing = match graph.resource_by_name(VISUALIZATION_NAME) {
            Some(resource) if resource.kind != ResourceKind::Svg => {
                return Err(GraphError::DuplicateName(format!(
                    "resource `{VISUALIZATION_NAME}` already exists with kind `{}`",
                    resource.kind
                )));
            }
            Some(resource) => Some((resource.id, resource.stored.then(|| resource.path.clone()))),
            None => None,
        };

        let content = self.render(graph)?;
        let resource_id = existing.as_ref().map(|(id, _)| *id).unwrap_or_default();
        let replaces = existing.and_then(|(_, locator)| locator);
        let (locator, write) = self.write_artifact(
            ResourceKind::Svg,
            &resource_id.to_string(),
            &content,
            replaces.as_deref(),
        )?;

        match graph.resource_mut(resource_id) {
            Some(resource) => {
                resource.path = locator;
                resource.stored = true;
                resource.updated_at = now;
            }
            None => {
                let mut resource = Resource::new(VISUALIZATION_NAME, ResourceKind::Svg, locator, now);
                resource.id = resource_id;
                resource.stored = true;
                resource.title = Some(format!("{} visualization", graph.name));
                graph.resources.push(resource);
            }
        }
        Ok(write)
    }

    /// Archives a graph. Archived graphs reject every further mutation.
    ///
    /// Archiving an archived graph returns it unchanged without saving.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] for unknown graphs.
    pub fn archive_graph(&mut self, graph_id: GraphId) -> Result<Graph, GraphError> {
        let mut graph = self.get_graph(graph_id)?.clone();
        if graph.status.is_archived() {
            debug!(graph_id:% = graph_id; "Graph already archived");
            return Ok(graph);
        }
        let now = Utc::now();

        graph.status = graph.status.transition(GraphStatus::Archived)?;
        graph.archived_at = Some(now);
        graph.updated_at = now;

        self.commit(graph.clone())?;
        info!(graph_id:% = graph.id; "Graph archived");
        Ok(graph)
    }

    /// Removes a graph from the registry together with its stored artifacts.
    ///
    /// Archived graphs may be deleted.
    pub fn delete_graph(&mut self, graph_id: GraphId) -> Result<Graph, GraphError> {
        let Some((index, _, graph)) = self.graphs.shift_remove_full(&graph_id) else {
            return Err(GraphError::NotFound(format!(
                "graph `{graph_id}` does not exist"
            )));
        };

        if let Err(err) = self.persist() {
            warn!(graph_id:% = graph_id, err:% = err; "Snapshot write failed, rolling back");
            self.graphs.shift_insert(index, graph_id, graph);
            return Err(err);
        }

        for resource in &graph.resources {
            self.release_artifact(resource);
        }

        info!(graph_id:% = graph_id; "Graph deleted");
        Ok(graph)
    }

    /// Lays out and renders a graph without changing it.
    pub fn render_graph(&self, graph_id: GraphId) -> Result<String, GraphError> {
        let graph = self.get_graph(graph_id)?;
        self.render(graph)
    }

    /// Id of the visualization resource of a graph, if it has been published.
    pub fn visualization_id(&self, graph_id: GraphId) -> Result<Option<ResourceId>, GraphError> {
        let graph = self.get_graph(graph_id)?;
        Ok(graph
            .resource_by_name(VISUALIZATION_NAME)
            .filter(|resource| resource.kind == ResourceKind::Svg)
            .map(|resource| resource.id))
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AppConfig, LayoutConfig, StoreConfig, StyleConfig},
        persistence::MemoryGateway,
        store::{NewNode, NewResource},
    };
    use cartograph_core::{ErrorKind, kind::NodeKind};

    fn store() -> GraphStore<MemoryGateway> {
        GraphStore::open(MemoryGateway::new(), &AppConfig::default()).unwrap()
    }

    #[test]
    fn test_create_graph_defaults() {
        let mut store = store();
        let graph = store
            .create_graph(" Notes ", None, Some("  ".to_string()))
            .unwrap();

        assert_eq!(graph.name, "Notes");
        assert_eq!(graph.kind, GraphKind::KnowledgeBase);
        assert_eq!(graph.status, GraphStatus::Draft);
        assert_eq!(graph.description, None);
        assert_eq!(store.gateway().saves_count(), 1);
    }

    #[test]
    fn test_create_graph_rejects_empty_name() {
        let mut store = store();
        let err = store.create_graph("", None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(store.is_empty());
        assert_eq!(store.gateway().saves_count(), 0);
    }

    #[test]
    fn test_update_graph() {
        let mut store = store();
        let graph = store.create_graph("Sys", None, None).unwrap();
        let updated = store
            .update_graph(
                graph.id,
                GraphUpdate {
                    name: Some("System".to_string()),
                    description: Some("Everything".to_string()),
                },
            )
            .unwrap();
        assert_eq!(updated.name, "System");
        assert_eq!(updated.description.as_deref(), Some("Everything"));

        let err = store
            .update_graph(
                graph.id,
                GraphUpdate {
                    name: Some(" ".to_string()),
                    ..GraphUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(store.get_graph(graph.id).unwrap().name, "System");
    }

    #[test]
    fn test_publish_attaches_visualization() {
        let mut store = store();
        let graph = store.create_graph("Sys", Some(GraphKind::Topology), None).unwrap();
        let published = store.publish_graph(graph.id).unwrap();

        assert_eq!(published.status, GraphStatus::Published);
        assert!(published.published_at.is_some());
        let visualization = published.resource_by_name(VISUALIZATION_NAME).unwrap();
        assert_eq!(visualization.kind, ResourceKind::Svg);
        assert!(store.gateway().has_artifact(&visualization.path));
        assert_eq!(
            store.visualization_id(graph.id).unwrap(),
            Some(visualization.id)
        );
    }

    #[test]
    fn test_republish_replaces_visualization_in_place() {
        let mut store = store();
        let graph = store.create_graph("Sys", None, None).unwrap();
        let first = store.publish_graph(graph.id).unwrap();
        let second = store.publish_graph(graph.id).unwrap();

        assert_eq!(second.status, GraphStatus::Published);
        assert!(second.published_at >= first.published_at);
        assert_eq!(second.resources.len(), 1);
        assert_eq!(second.resources[0].id, first.resources[0].id);
        assert_eq!(second.resources[0].path, first.resources[0].path);
    }

    #[test]
    fn test_publish_without_auto_visualize() {
        let config = AppConfig::new(
            LayoutConfig::default(),
            StyleConfig::default(),
            StoreConfig::new(false),
        );
        let mut store = GraphStore::open(MemoryGateway::new(), &config).unwrap();
        let graph = store.create_graph("Sys", None, None).unwrap();
        let published = store.publish_graph(graph.id).unwrap();
        assert!(published.resources.is_empty());
        assert_eq!(store.visualization_id(graph.id).unwrap(), None);
    }

    #[test]
    fn test_publish_rejects_conflicting_resource_name() {
        let mut store = store();
        let graph = store.create_graph("Sys", None, None).unwrap();
        store
            .add_resource(
                graph.id,
                NewResource::with_path(VISUALIZATION_NAME, ResourceKind::Other, "/tmp/x"),
            )
            .unwrap();

        let err = store.publish_graph(graph.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);
        assert_eq!(
            store.get_graph(graph.id).unwrap().status,
            GraphStatus::Draft
        );
    }

    #[test]
    fn test_failed_publish_rolls_back() {
        let mut store = store();
        let graph = store.create_graph("Sys", None, None).unwrap();
        store.gateway_mut().fail_saves(true);

        let err = store.publish_graph(graph.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);

        let current = store.get_graph(graph.id).unwrap();
        assert_eq!(current.status, GraphStatus::Draft);
        assert!(current.resources.is_empty());
    }

    #[test]
    fn test_failed_republish_keeps_previous_visualization() {
        let mut store = store();
        let graph = store.create_graph("Sys", Some(GraphKind::Topology), None).unwrap();
        let first = store.publish_graph(graph.id).unwrap();
        let visualization = first.resource_by_name(VISUALIZATION_NAME).unwrap();
        let before = store.resource_content(graph.id, visualization.id).unwrap();

        store
            .add_node(graph.id, NewNode::new(NodeKind::Service, "Api"))
            .unwrap();
        store.gateway_mut().fail_saves(true);

        let err = store.publish_graph(graph.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(
            store.resource_content(graph.id, visualization.id).unwrap(),
            before
        );
        assert_ne!(store.render_graph(graph.id).unwrap(), before);
        assert_eq!(
            store.get_graph(graph.id).unwrap().published_at,
            first.published_at
        );
    }

    #[test]
    fn test_archive_is_terminal() {
        let mut store = store();
        let graph = store.create_graph("Sys", None, None).unwrap();
        let archived = store.archive_graph(graph.id).unwrap();
        assert!(archived.archived_at.is_some());
        let saves = store.gateway().saves_count();

        let again = store.archive_graph(graph.id).unwrap();
        assert_eq!(again, archived);
        assert_eq!(store.gateway().saves_count(), saves);
        assert_eq!(
            store.publish_graph(graph.id).unwrap_err().kind(),
            ErrorKind::ImmutableState
        );
        assert_eq!(
            store.set_root_node(graph.id, None).unwrap_err().kind(),
            ErrorKind::ImmutableState
        );
        assert_eq!(
            store.archive_graph(GraphId::new()).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_delete_graph_removes_artifacts() {
        let mut store = store();
        let keep = store.create_graph("Keep", None, None).unwrap();
        let graph = store.create_graph("Sys", None, None).unwrap();
        let published = store.publish_graph(graph.id).unwrap();
        let locator = published.resources[0].path.clone();

        store.delete_graph(graph.id).unwrap();
        assert!(!store.gateway().has_artifact(&locator));
        assert_eq!(store.len(), 1);
        assert!(store.get_graph(keep.id).is_ok());
        assert_eq!(
            store.delete_graph(graph.id).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_failed_delete_restores_position() {
        let mut store = store();
        let first = store.create_graph("first", None, None).unwrap();
        let second = store.create_graph("second", None, None).unwrap();
        store.gateway_mut().fail_saves(true);

        assert!(store.delete_graph(first.id).is_err());
        let ids: Vec<GraphId> = store.graphs.keys().copied().collect();
        assert_eq!(ids, [first.id, second.id]);
    }

    #[test]
    fn test_render_graph_is_read_only() {
        let mut store = store();
        let graph = store.create_graph("Sys", None, None).unwrap();
        store.archive_graph(graph.id).unwrap();
        let saves = store.gateway().saves_count();

        let svg = store.render_graph(graph.id).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(store.gateway().saves_count(), saves);
    }
}
