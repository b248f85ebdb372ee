//! Read-only projections of the registry.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cartograph_core::{
    GraphError,
    identifier::{GraphId, NodeId},
    kind::{GraphKind, NodeKind},
    model::{Edge, Graph, Node, Resource},
    status::GraphStatus,
};

use super::GraphStore;
use crate::persistence::PersistenceGateway;

/// Filter for [`GraphStore::list_graphs`]. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphFilter {
    pub status: Option<GraphStatus>,
    pub kind: Option<GraphKind>,
}

impl GraphFilter {
    pub fn with_status(mut self, status: GraphStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_kind(mut self, kind: GraphKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn matches(&self, graph: &Graph) -> bool {
        self.status.is_none_or(|status| graph.status == status)
            && self.kind.is_none_or(|kind| graph.kind == kind)
    }
}

/// A node reduced to what listings show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSummary {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
}

impl From<&Node> for NodeSummary {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            kind: node.kind,
        }
    }
}

/// Listing entry for one graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub id: GraphId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: GraphKind,
    pub status: GraphStatus,
    pub nodes: Vec<NodeSummary>,
    pub nodes_count: usize,
    pub edges_count: usize,
    pub resources_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl From<&Graph> for GraphSummary {
    fn from(graph: &Graph) -> Self {
        Self {
            id: graph.id,
            name: graph.name.clone(),
            description: graph.description.clone(),
            kind: graph.kind,
            status: graph.status,
            nodes: graph.nodes.iter().map(NodeSummary::from).collect(),
            nodes_count: graph.nodes.len(),
            edges_count: graph.edges.len(),
            resources_count: graph.resources.len(),
            created_at: graph.created_at,
            updated_at: graph.updated_at,
            published_at: graph.published_at,
            archived_at: graph.archived_at,
        }
    }
}

/// A node with its edges and the resources it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetails {
    pub node: Node,
    pub incoming_edges: Vec<Edge>,
    pub outgoing_edges: Vec<Edge>,
    pub resources: Vec<Resource>,
}

impl<G: PersistenceGateway> GraphStore<G> {
    /// Summaries of all graphs matching `filter`, in registry insertion order.
    pub fn list_graphs(&self, filter: &GraphFilter) -> Vec<GraphSummary> {
        self.graphs
            .values()
            .filter(|graph| filter.matches(graph))
            .map(GraphSummary::from)
            .collect()
    }

    /// A node together with its incoming and outgoing edges and the
    /// resources it references. Self-loops appear on both sides.
    pub fn get_node_details(
        &self,
        graph_id: GraphId,
        node_id: NodeId,
    ) -> Result<NodeDetails, GraphError> {
        let graph = self.get_graph(graph_id)?;
        let node = graph.require_node(node_id)?;

        Ok(NodeDetails {
            node: node.clone(),
            incoming_edges: graph.incoming_edges(node_id).cloned().collect(),
            outgoing_edges: graph.outgoing_edges(node_id).cloned().collect(),
            resources: node
                .resource_ids
                .iter()
                .filter_map(|id| graph.resource(*id))
                .cloned()
                .collect(),
        })
    }
}
