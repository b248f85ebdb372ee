use chrono::Utc;
use log::debug;
use serde::Serialize;

use cartograph_core::{
    GraphError,
    identifier::{GraphId, NodeId, ResourceId},
    kind::NodeKind,
    matrix,
    model::{Edge, Graph, Metadata, Node},
};

use super::{GraphStore, required_text};
use crate::persistence::PersistenceGateway;

/// Input for [`GraphStore::add_node`].
#[derive(Debug, Clone)]
pub struct NewNode {
    pub kind: NodeKind,
    pub name: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub metadata: Metadata,
    /// Resources of the same graph the node refers to.
    pub resource_ids: Vec<ResourceId>,
}

impl NewNode {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: None,
            file_path: None,
            metadata: Metadata::new(),
            resource_ids: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_resource(mut self, resource_id: ResourceId) -> Self {
        self.resource_ids.push(resource_id);
        self
    }
}

/// Changes to a node. `None` leaves a field unchanged; `metadata` replaces
/// the whole map.
#[derive(Debug, Clone, Default)]
pub struct NodeUpdate {
    pub kind: Option<NodeKind>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub metadata: Option<Metadata>,
}

/// A deleted node together with the edges removed alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRemoval {
    pub node: Node,
    pub removed_edges: Vec<Edge>,
}

fn node_index(graph: &Graph, node_id: NodeId) -> Result<usize, GraphError> {
    graph
        .nodes
        .iter()
        .position(|node| node.id == node_id)
        .ok_or_else(|| {
            GraphError::NotFound(format!(
                "node `{node_id}` does not exist in graph `{}`",
                graph.id
            ))
        })
}

fn ensure_unique_node_name(
    graph: &Graph,
    name: &str,
    except: Option<NodeId>,
) -> Result<(), GraphError> {
    match graph.node_by_name(name) {
        Some(node) if Some(node.id) != except => Err(GraphError::DuplicateName(format!(
            "node `{name}` already exists in graph `{}`",
            graph.id
        ))),
        _ => Ok(()),
    }
}

impl<G: PersistenceGateway> GraphStore<G> {
    /// Appends a node to a graph.
    ///
    /// # Errors
    ///
    /// - [`GraphError::TypeMismatch`] if the node kind is not allowed for the graph kind
    /// - [`GraphError::DuplicateName`] if another node already has the name
    /// - [`GraphError::NotFound`] if a referenced resource does not exist
    pub fn add_node(&mut self, graph_id: GraphId, new: NewNode) -> Result<Node, GraphError> {
        let mut graph = self.working_copy(graph_id)?;

        matrix::validate_node_kind(graph.kind, new.kind)?;
        let name = required_text(&new.name, "node name")?;
        ensure_unique_node_name(&graph, &name, None)?;

        let mut resource_ids = Vec::with_capacity(new.resource_ids.len());
        for resource_id in new.resource_ids {
            graph.require_resource(resource_id)?;
            if !resource_ids.contains(&resource_id) {
                resource_ids.push(resource_id);
            }
        }

        let now = Utc::now();
        let mut node = Node::new(new.kind, name, now);
        node.description = new.description;
        node.file_path = new.file_path;
        node.metadata = new.metadata;
        node.resource_ids = resource_ids;

        graph.nodes.push(node.clone());
        graph.updated_at = now;
        self.commit(graph)?;

        debug!(graph_id:% = graph_id, node_id:% = node.id, kind:% = node.kind; "Node added");
        Ok(node)
    }

    /// Updates a node in place.
    pub fn update_node(
        &mut self,
        graph_id: GraphId,
        node_id: NodeId,
        update: NodeUpdate,
    ) -> Result<Node, GraphError> {
        let mut graph = self.working_copy(graph_id)?;
        let index = node_index(&graph, node_id)?;

        if let Some(kind) = update.kind {
            matrix::validate_node_kind(graph.kind, kind)?;
        }
        let name = update
            .name
            .as_deref()
            .map(|name| required_text(name, "node name"))
            .transpose()?;
        if let Some(name) = &name {
            ensure_unique_node_name(&graph, name, Some(node_id))?;
        }

        let now = Utc::now();
        let node = &mut graph.nodes[index];
        if let Some(kind) = update.kind {
            node.kind = kind;
        }
        if let Some(name) = name {
            node.name = name;
        }
        if let Some(description) = update.description {
            node.description = Some(description);
        }
        if let Some(file_path) = update.file_path {
            node.file_path = Some(file_path);
        }
        if let Some(metadata) = update.metadata {
            node.metadata = metadata;
        }
        node.updated_at = now;
        let node = node.clone();

        graph.updated_at = now;
        self.commit(graph)?;

        debug!(graph_id:% = graph_id, node_id:% = node_id; "Node updated");
        Ok(node)
    }

    /// Deletes a node and every edge starting or ending at it.
    ///
    /// Resources the node referenced are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ImmutableState`] if the node is the graph's root node.
    pub fn delete_node(
        &mut self,
        graph_id: GraphId,
        node_id: NodeId,
    ) -> Result<NodeRemoval, GraphError> {
        let mut graph = self.working_copy(graph_id)?;
        let index = node_index(&graph, node_id)?;
        if graph.is_root(node_id) {
            return Err(GraphError::ImmutableState(format!(
                "node `{node_id}` is the root node of graph `{graph_id}` and cannot be deleted"
            )));
        }

        let node = graph.nodes.remove(index);
        let (removed_edges, kept_edges): (Vec<Edge>, Vec<Edge>) = graph
            .edges
            .drain(..)
            .partition(|edge| edge.touches(node_id));
        graph.edges = kept_edges;
        graph.updated_at = Utc::now();

        self.commit(graph)?;

        debug!(
            graph_id:% = graph_id,
            node_id:% = node_id,
            removed_edges = removed_edges.len();
            "Node deleted"
        );
        Ok(NodeRemoval {
            node,
            removed_edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, persistence::MemoryGateway, store::NewEdge};
    use cartograph_core::{
        ErrorKind,
        kind::{EdgeKind, GraphKind},
    };

    fn topology() -> (GraphStore<MemoryGateway>, GraphId) {
        let mut store = GraphStore::open(MemoryGateway::new(), &AppConfig::default()).unwrap();
        let graph = store
            .create_graph("Sys", Some(GraphKind::Topology), None)
            .unwrap();
        (store, graph.id)
    }

    #[test]
    fn test_add_node() {
        let (mut store, graph_id) = topology();
        let node = store
            .add_node(
                graph_id,
                NewNode::new(NodeKind::Component, "A")
                    .with_description("first")
                    .with_metadata("owner", serde_json::json!("core")),
            )
            .unwrap();

        let graph = store.get_graph(graph_id).unwrap();
        assert_eq!(graph.nodes, vec![node.clone()]);
        assert!(graph.updated_at >= graph.created_at);
        assert_eq!(node.metadata["owner"], "core");
    }

    #[test]
    fn test_add_node_validations() {
        let (mut store, graph_id) = topology();
        store
            .add_node(graph_id, NewNode::new(NodeKind::Component, "A"))
            .unwrap();

        let cases = [
            (NewNode::new(NodeKind::Event, "E"), ErrorKind::TypeMismatch),
            (NewNode::new(NodeKind::Service, "A"), ErrorKind::DuplicateName),
            (NewNode::new(NodeKind::Service, "  "), ErrorKind::InvalidInput),
            (
                NewNode::new(NodeKind::Service, "S").with_resource(ResourceId::new()),
                ErrorKind::NotFound,
            ),
        ];
        for (new, expected) in cases {
            let err = store.add_node(graph_id, new).unwrap_err();
            assert_eq!(err.kind(), expected, "{err}");
        }
        assert_eq!(store.get_graph(graph_id).unwrap().nodes.len(), 1);

        let err = store
            .add_node(GraphId::new(), NewNode::new(NodeKind::Component, "X"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_update_node() {
        let (mut store, graph_id) = topology();
        let a = store
            .add_node(graph_id, NewNode::new(NodeKind::Component, "A"))
            .unwrap();
        store
            .add_node(graph_id, NewNode::new(NodeKind::Component, "B"))
            .unwrap();

        let updated = store
            .update_node(
                graph_id,
                a.id,
                NodeUpdate {
                    kind: Some(NodeKind::Service),
                    name: Some("A".to_string()),
                    file_path: Some("src/a.rs".to_string()),
                    ..NodeUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.kind, NodeKind::Service);
        assert_eq!(updated.file_path.as_deref(), Some("src/a.rs"));
        assert_eq!(updated.created_at, a.created_at);

        let rename = NodeUpdate {
            name: Some("B".to_string()),
            ..NodeUpdate::default()
        };
        assert_eq!(
            store.update_node(graph_id, a.id, rename).unwrap_err().kind(),
            ErrorKind::DuplicateName
        );

        let retype = NodeUpdate {
            kind: Some(NodeKind::Person),
            ..NodeUpdate::default()
        };
        assert_eq!(
            store.update_node(graph_id, a.id, retype).unwrap_err().kind(),
            ErrorKind::TypeMismatch
        );
        assert_eq!(
            store
                .update_node(graph_id, NodeId::new(), NodeUpdate::default())
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_delete_node_cascades_to_touching_edges_only() {
        let (mut store, graph_id) = topology();
        let ids: Vec<NodeId> = ["A", "B", "C"]
            .into_iter()
            .map(|name| {
                store
                    .add_node(graph_id, NewNode::new(NodeKind::Component, name))
                    .unwrap()
                    .id
            })
            .collect();
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        store
            .add_edge(graph_id, NewEdge::new(EdgeKind::DependsOn, a, b))
            .unwrap();
        store
            .add_edge(graph_id, NewEdge::new(EdgeKind::Calls, c, a))
            .unwrap();
        let kept = store
            .add_edge(graph_id, NewEdge::new(EdgeKind::Calls, b, c))
            .unwrap();

        let removal = store.delete_node(graph_id, a).unwrap();
        assert_eq!(removal.node.id, a);
        assert_eq!(removal.removed_edges.len(), 2);

        let graph = store.get_graph(graph_id).unwrap();
        assert_eq!(graph.edges, vec![kept]);
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn test_root_node_is_protected() {
        let (mut store, graph_id) = topology();
        let a = store
            .add_node(graph_id, NewNode::new(NodeKind::Component, "A"))
            .unwrap();
        store.set_root_node(graph_id, Some(a.id)).unwrap();

        let err = store.delete_node(graph_id, a.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ImmutableState);

        store.set_root_node(graph_id, None).unwrap();
        assert!(store.delete_node(graph_id, a.id).is_ok());
    }
}
