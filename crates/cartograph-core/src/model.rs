//! Entity shapes of the graph registry.
//!
//! A [`Graph`] owns its [`Node`]s, [`Edge`]s and [`Resource`]s in ordered
//! vectors. Relationships between them are expressed through ids only:
//! edges name their endpoints by [`NodeId`], nodes reference resources by
//! [`ResourceId`]. Cascading deletion is therefore an explicit sweep over
//! those vectors rather than pointer invalidation.
//!
//! The types here check nothing on their own apart from the lookups and the
//! archived guard; cross-entity validation is done by the store before any
//! mutation is applied.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::GraphError,
    identifier::{EdgeId, GraphId, NodeId, ResourceId},
    kind::{EdgeKind, GraphKind, NodeKind, ResourceKind},
    status::GraphStatus,
};

/// Opaque, caller-defined key-value data attached to entities.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A typed, versioned graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub id: GraphId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: GraphKind,
    pub status: GraphStatus,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_node_id: Option<NodeId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Graph {
    /// Creates an empty draft graph stamped with `now`.
    pub fn new(
        name: impl Into<String>,
        kind: GraphKind,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: GraphId::new(),
            name: name.into(),
            description,
            kind,
            status: GraphStatus::Draft,
            nodes: Vec::new(),
            edges: Vec::new(),
            resources: Vec::new(),
            root_node_id: None,
            created_at: now,
            updated_at: now,
            published_at: None,
            archived_at: None,
        }
    }

    /// Fails with [`GraphError::ImmutableState`] if the graph is archived.
    pub fn ensure_mutable(&self) -> Result<(), GraphError> {
        if self.status.is_archived() {
            Err(GraphError::ImmutableState(format!(
                "graph `{}` is archived and cannot be modified",
                self.id
            )))
        } else {
            Ok(())
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    /// Looks up a node, failing with [`GraphError::NotFound`].
    pub fn require_node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.node(id).ok_or_else(|| {
            GraphError::NotFound(format!("node `{id}` does not exist in graph `{}`", self.id))
        })
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|edge| edge.id == id)
    }

    /// Looks up an edge, failing with [`GraphError::NotFound`].
    pub fn require_edge(&self, id: EdgeId) -> Result<&Edge, GraphError> {
        self.edge(id).ok_or_else(|| {
            GraphError::NotFound(format!("edge `{id}` does not exist in graph `{}`", self.id))
        })
    }

    /// Finds an edge other than `except` with the same (source, target, kind) triple.
    pub fn find_relationship(
        &self,
        source: NodeId,
        target: NodeId,
        kind: EdgeKind,
        except: Option<EdgeId>,
    ) -> Option<&Edge> {
        self.edges.iter().find(|edge| {
            Some(edge.id) != except
                && edge.source == source
                && edge.target == target
                && edge.kind == kind
        })
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|resource| resource.id == id)
    }

    pub fn resource_mut(&mut self, id: ResourceId) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|resource| resource.id == id)
    }

    /// Looks up a resource, failing with [`GraphError::NotFound`].
    pub fn require_resource(&self, id: ResourceId) -> Result<&Resource, GraphError> {
        self.resource(id).ok_or_else(|| {
            GraphError::NotFound(format!(
                "resource `{id}` does not exist in graph `{}`",
                self.id
            ))
        })
    }

    pub fn resource_by_name(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|resource| resource.name == name)
    }

    /// Edges whose target is `node`.
    pub fn incoming_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.target == node)
    }

    /// Edges whose source is `node`.
    pub fn outgoing_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.source == node)
    }

    /// Whether `node` is the protected root node.
    pub fn is_root(&self, node: NodeId) -> bool {
        self.root_node_id == Some(node)
    }
}

/// A vertex of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_ids: Vec<ResourceId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    pub fn new(kind: NodeKind, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            name: name.into(),
            description: None,
            file_path: None,
            metadata: Metadata::new(),
            resource_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn references(&self, resource: ResourceId) -> bool {
        self.resource_ids.contains(&resource)
    }
}

/// A directed, typed relationship between two nodes of the same graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub kind: EdgeKind,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Edge {
    pub fn new(kind: EdgeKind, source: NodeId, target: NodeId, now: DateTime<Utc>) -> Self {
        Self {
            id: EdgeId::new(),
            kind,
            source,
            target,
            label: None,
            weight: None,
            metadata: Metadata::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `node` is either endpoint of this edge.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}

/// A file attached to a graph and referenced by nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub kind: ResourceKind,
    pub path: String,
    /// Whether `path` is a locator of an artifact the store wrote and
    /// therefore owns. Caller-supplied paths are never deleted.
    #[serde(default)]
    pub stored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    pub fn new(
        name: impl Into<String>,
        kind: ResourceKind,
        path: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ResourceId::new(),
            name: name.into(),
            kind,
            path: path.into(),
            stored: false,
            title: None,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sample_graph() -> Graph {
        let now = Utc::now();
        let mut graph = Graph::new("Sys", GraphKind::Topology, None, now);
        let a = Node::new(NodeKind::Component, "A", now);
        let b = Node::new(NodeKind::Component, "B", now);
        graph.edges.push(Edge::new(EdgeKind::DependsOn, a.id, b.id, now));
        graph.nodes.push(a);
        graph.nodes.push(b);
        graph
    }

    #[test]
    fn test_new_graph_is_empty_draft() {
        let graph = Graph::new("g", GraphKind::Timeline, None, Utc::now());
        assert_eq!(graph.status, GraphStatus::Draft);
        assert!(graph.nodes.is_empty() && graph.edges.is_empty() && graph.resources.is_empty());
        assert_eq!(graph.created_at, graph.updated_at);
    }

    #[test]
    fn test_lookup_helpers() {
        let graph = sample_graph();
        let a = graph.node_by_name("A").unwrap().id;
        let b = graph.node_by_name("B").unwrap().id;

        assert_eq!(graph.outgoing_edges(a).count(), 1);
        assert_eq!(graph.incoming_edges(a).count(), 0);
        assert!(graph.find_relationship(a, b, EdgeKind::DependsOn, None).is_some());
        assert!(graph.find_relationship(b, a, EdgeKind::DependsOn, None).is_none());

        let edge_id = graph.edges[0].id;
        assert!(
            graph
                .find_relationship(a, b, EdgeKind::DependsOn, Some(edge_id))
                .is_none()
        );
    }

    #[test]
    fn test_require_reports_not_found() {
        let graph = sample_graph();
        let err = graph.require_node(NodeId::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = graph.require_resource(ResourceId::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_ensure_mutable() {
        let mut graph = sample_graph();
        assert!(graph.ensure_mutable().is_ok());
        graph.status = GraphStatus::Archived;
        assert_eq!(
            graph.ensure_mutable().unwrap_err().kind(),
            ErrorKind::ImmutableState
        );
    }

    #[test]
    fn test_serde_round_trip_keeps_timestamps() {
        let mut graph = sample_graph();
        graph.nodes[0]
            .metadata
            .insert("owner".to_string(), serde_json::json!({"team": "core"}));
        graph.edges[0].weight = Some(0.25);
        graph.published_at = Some(Utc::now());

        let json = serde_json::to_string(&graph).unwrap();
        assert!(json.contains("\"createdAt\""));
        let restored: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, graph);
    }
}
