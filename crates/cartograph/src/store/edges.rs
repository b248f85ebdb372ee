use chrono::Utc;
use log::debug;

use cartograph_core::{
    GraphError,
    identifier::{EdgeId, GraphId, NodeId},
    kind::EdgeKind,
    matrix,
    model::{Edge, Graph, Metadata},
};

use super::GraphStore;
use crate::persistence::PersistenceGateway;

/// Input for [`GraphStore::add_edge`].
#[derive(Debug, Clone)]
pub struct NewEdge {
    pub kind: EdgeKind,
    pub source: NodeId,
    pub target: NodeId,
    pub label: Option<String>,
    pub weight: Option<f64>,
    pub metadata: Metadata,
}

impl NewEdge {
    pub fn new(kind: EdgeKind, source: NodeId, target: NodeId) -> Self {
        Self {
            kind,
            source,
            target,
            label: None,
            weight: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Changes to an edge. `None` leaves a field unchanged.
///
/// Changing kind or endpoints is validated like a new edge, including the
/// duplicate relationship check.
#[derive(Debug, Clone, Default)]
pub struct EdgeUpdate {
    pub kind: Option<EdgeKind>,
    pub source: Option<NodeId>,
    pub target: Option<NodeId>,
    pub label: Option<String>,
    pub weight: Option<f64>,
    pub metadata: Option<Metadata>,
}

fn validate_weight(weight: Option<f64>) -> Result<(), GraphError> {
    match weight {
        Some(weight) if !weight.is_finite() => Err(GraphError::InvalidInput(format!(
            "edge weight must be a finite number, got {weight}"
        ))),
        _ => Ok(()),
    }
}

/// Checks endpoints, allow-list and uniqueness of a (source, target, kind) triple.
fn validate_relationship(
    graph: &Graph,
    kind: EdgeKind,
    source: NodeId,
    target: NodeId,
    except: Option<EdgeId>,
) -> Result<(), GraphError> {
    graph.require_node(source)?;
    graph.require_node(target)?;
    matrix::validate_edge_kind(graph.kind, kind)?;

    if let Some(existing) = graph.find_relationship(source, target, kind, except) {
        return Err(GraphError::DuplicateRelationship(format!(
            "edge `{}` already connects `{source}` to `{target}` with kind `{kind}`",
            existing.id
        )));
    }
    Ok(())
}

impl<G: PersistenceGateway> GraphStore<G> {
    /// Appends an edge between two nodes of a graph.
    ///
    /// # Errors
    ///
    /// - [`GraphError::NotFound`] if either endpoint is missing
    /// - [`GraphError::TypeMismatch`] if the edge kind is not allowed for the graph kind
    /// - [`GraphError::DuplicateRelationship`] if the same triple already exists
    pub fn add_edge(&mut self, graph_id: GraphId, new: NewEdge) -> Result<Edge, GraphError> {
        let mut graph = self.working_copy(graph_id)?;
        validate_relationship(&graph, new.kind, new.source, new.target, None)?;
        validate_weight(new.weight)?;

        let now = Utc::now();
        let mut edge = Edge::new(new.kind, new.source, new.target, now);
        edge.label = new.label;
        edge.weight = new.weight;
        edge.metadata = new.metadata;

        graph.edges.push(edge.clone());
        graph.updated_at = now;
        self.commit(graph)?;

        debug!(
            graph_id:% = graph_id,
            edge_id:% = edge.id,
            kind:% = edge.kind;
            "Edge added"
        );
        Ok(edge)
    }

    /// Updates an edge in place.
    pub fn update_edge(
        &mut self,
        graph_id: GraphId,
        edge_id: EdgeId,
        update: EdgeUpdate,
    ) -> Result<Edge, GraphError> {
        let mut graph = self.working_copy(graph_id)?;
        let current = graph.require_edge(edge_id)?;

        let kind = update.kind.unwrap_or(current.kind);
        let source = update.source.unwrap_or(current.source);
        let target = update.target.unwrap_or(current.target);
        validate_relationship(&graph, kind, source, target, Some(edge_id))?;
        validate_weight(update.weight)?;

        let now = Utc::now();
        let Some(edge) = graph.edge_mut(edge_id) else {
            return Err(GraphError::NotFound(format!(
                "edge `{edge_id}` does not exist in graph `{graph_id}`"
            )));
        };
        edge.kind = kind;
        edge.source = source;
        edge.target = target;
        if let Some(label) = update.label {
            edge.label = Some(label);
        }
        if let Some(weight) = update.weight {
            edge.weight = Some(weight);
        }
        if let Some(metadata) = update.metadata {
            edge.metadata = metadata;
        }
        edge.updated_at = now;
        let edge = edge.clone();

        graph.updated_at = now;
        self.commit(graph)?;

        debug!(graph_id:% = graph_id, edge_id:% = edge_id; "Edge updated");
        Ok(edge)
    }

    /// Removes an edge. Its endpoints are left untouched.
    pub fn delete_edge(&mut self, graph_id: GraphId, edge_id: EdgeId) -> Result<Edge, GraphError> {
        let mut graph = self.working_copy(graph_id)?;
        let Some(index) = graph.edges.iter().position(|edge| edge.id == edge_id) else {
            return Err(GraphError::NotFound(format!(
                "edge `{edge_id}` does not exist in graph `{graph_id}`"
            )));
        };
        let edge = graph.edges.remove(index);
        graph.updated_at = Utc::now();
        self.commit(graph)?;

        debug!(graph_id:% = graph_id, edge_id:% = edge_id; "Edge deleted");
        Ok(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, persistence::MemoryGateway, store::NewNode};
    use cartograph_core::{
        ErrorKind,
        kind::{GraphKind, NodeKind},
    };

    struct Fixture {
        store: GraphStore<MemoryGateway>,
        graph_id: GraphId,
        a: NodeId,
        b: NodeId,
    }

    fn fixture(kind: GraphKind, node_kind: NodeKind) -> Fixture {
        let mut store = GraphStore::open(MemoryGateway::new(), &AppConfig::default()).unwrap();
        let graph_id = store.create_graph("Sys", Some(kind), None).unwrap().id;
        let a = store
            .add_node(graph_id, NewNode::new(node_kind, "A"))
            .unwrap()
            .id;
        let b = store
            .add_node(graph_id, NewNode::new(node_kind, "B"))
            .unwrap()
            .id;
        Fixture {
            store,
            graph_id,
            a,
            b,
        }
    }

    #[test]
    fn test_add_edge() {
        let Fixture {
            mut store,
            graph_id,
            a,
            b,
        } = fixture(GraphKind::Topology, NodeKind::Component);

        let edge = store
            .add_edge(
                graph_id,
                NewEdge::new(EdgeKind::DependsOn, a, b)
                    .with_label("uses")
                    .with_weight(0.5),
            )
            .unwrap();
        assert_eq!(edge.label.as_deref(), Some("uses"));
        assert_eq!(store.get_graph(graph_id).unwrap().edges, vec![edge]);
    }

    #[test]
    fn test_add_edge_validations() {
        let Fixture {
            mut store,
            graph_id,
            a,
            b,
        } = fixture(GraphKind::Topology, NodeKind::Component);
        store
            .add_edge(graph_id, NewEdge::new(EdgeKind::DependsOn, a, b))
            .unwrap();

        let cases = [
            (
                NewEdge::new(EdgeKind::DependsOn, a, b),
                ErrorKind::DuplicateRelationship,
            ),
            (
                NewEdge::new(EdgeKind::Precedes, a, b),
                ErrorKind::TypeMismatch,
            ),
            (
                NewEdge::new(EdgeKind::Calls, a, NodeId::new()),
                ErrorKind::NotFound,
            ),
            (
                NewEdge::new(EdgeKind::Calls, a, b).with_weight(f64::NAN),
                ErrorKind::InvalidInput,
            ),
        ];
        for (new, expected) in cases {
            let err = store.add_edge(graph_id, new).unwrap_err();
            assert_eq!(err.kind(), expected, "{err}");
        }
        assert_eq!(store.get_graph(graph_id).unwrap().edges.len(), 1);
    }

    #[test]
    fn test_same_endpoints_with_other_kind_or_direction_is_allowed() {
        let Fixture {
            mut store,
            graph_id,
            a,
            b,
        } = fixture(GraphKind::Topology, NodeKind::Component);
        store
            .add_edge(graph_id, NewEdge::new(EdgeKind::DependsOn, a, b))
            .unwrap();
        store
            .add_edge(graph_id, NewEdge::new(EdgeKind::Calls, a, b))
            .unwrap();
        store
            .add_edge(graph_id, NewEdge::new(EdgeKind::DependsOn, b, a))
            .unwrap();
        store
            .add_edge(graph_id, NewEdge::new(EdgeKind::Contains, a, a))
            .unwrap();
        assert_eq!(store.get_graph(graph_id).unwrap().edges.len(), 4);
    }

    #[test]
    fn test_update_edge() {
        let Fixture {
            mut store,
            graph_id,
            a,
            b,
        } = fixture(GraphKind::Timeline, NodeKind::Event);
        let first = store
            .add_edge(graph_id, NewEdge::new(EdgeKind::Precedes, a, b))
            .unwrap();
        let second = store
            .add_edge(graph_id, NewEdge::new(EdgeKind::LeadsTo, a, b))
            .unwrap();

        let updated = store
            .update_edge(
                graph_id,
                first.id,
                EdgeUpdate {
                    label: Some("then".to_string()),
                    ..EdgeUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.label.as_deref(), Some("then"));
        assert_eq!(updated.kind, EdgeKind::Precedes);

        let collide = EdgeUpdate {
            kind: Some(EdgeKind::Precedes),
            ..EdgeUpdate::default()
        };
        assert_eq!(
            store
                .update_edge(graph_id, second.id, collide)
                .unwrap_err()
                .kind(),
            ErrorKind::DuplicateRelationship
        );

        let disallowed = EdgeUpdate {
            kind: Some(EdgeKind::Calls),
            ..EdgeUpdate::default()
        };
        assert_eq!(
            store
                .update_edge(graph_id, second.id, disallowed)
                .unwrap_err()
                .kind(),
            ErrorKind::TypeMismatch
        );

        let reversed = store
            .update_edge(
                graph_id,
                second.id,
                EdgeUpdate {
                    source: Some(b),
                    target: Some(a),
                    ..EdgeUpdate::default()
                },
            )
            .unwrap();
        assert_eq!((reversed.source, reversed.target), (b, a));
    }

    #[test]
    fn test_delete_edge() {
        let Fixture {
            mut store,
            graph_id,
            a,
            b,
        } = fixture(GraphKind::Topology, NodeKind::Service);
        let edge = store
            .add_edge(graph_id, NewEdge::new(EdgeKind::Calls, a, b))
            .unwrap();

        assert_eq!(store.delete_edge(graph_id, edge.id).unwrap(), edge);
        let graph = store.get_graph(graph_id).unwrap();
        assert!(graph.edges.is_empty());
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(
            store.delete_edge(graph_id, edge.id).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
