//! Allow-list matrix of node and edge kinds per graph kind.
//!
//! The whole matrix lives in [`allowed_node_kinds`] and [`allowed_edge_kinds`];
//! validation is a pure lookup against those tables. `knowledge_base` accepts
//! every kind.

use crate::{
    error::GraphError,
    kind::{EdgeKind, GraphKind, NodeKind},
};

const TOPOLOGY_NODES: &[NodeKind] = &[
    NodeKind::Component,
    NodeKind::Module,
    NodeKind::Service,
    NodeKind::Data,
    NodeKind::Api,
    NodeKind::Resource,
    NodeKind::Concept,
];

const TOPOLOGY_EDGES: &[EdgeKind] = &[
    EdgeKind::DependsOn,
    EdgeKind::Imports,
    EdgeKind::Extends,
    EdgeKind::Implements,
    EdgeKind::Calls,
    EdgeKind::References,
    EdgeKind::Contains,
    EdgeKind::AssociatedWith,
];

const TIMELINE_NODES: &[NodeKind] = &[
    NodeKind::Event,
    NodeKind::Decision,
    NodeKind::Iteration,
    NodeKind::Person,
];

const TIMELINE_EDGES: &[EdgeKind] = &[
    EdgeKind::Precedes,
    EdgeKind::LeadsTo,
    EdgeKind::CreatedBy,
    EdgeKind::ModifiedBy,
];

const CHANGELOG_NODES: &[NodeKind] = &[
    NodeKind::Change,
    NodeKind::Feature,
    NodeKind::Iteration,
    NodeKind::Decision,
    NodeKind::Person,
    NodeKind::Module,
    NodeKind::Component,
];

const CHANGELOG_EDGES: &[EdgeKind] = &[
    EdgeKind::Precedes,
    EdgeKind::LeadsTo,
    EdgeKind::ModifiedBy,
    EdgeKind::CreatedBy,
    EdgeKind::PartOf,
    EdgeKind::References,
];

const REQUIREMENT_NODES: &[NodeKind] = &[
    NodeKind::Requirement,
    NodeKind::Feature,
    NodeKind::Component,
    NodeKind::Module,
    NodeKind::Service,
    NodeKind::Api,
    NodeKind::Decision,
];

const REQUIREMENT_EDGES: &[EdgeKind] = &[
    EdgeKind::ImplementsReq,
    EdgeKind::DependsOn,
    EdgeKind::PartOf,
    EdgeKind::Contains,
    EdgeKind::References,
    EdgeKind::AssociatedWith,
];

const ONTOLOGY_NODES: &[NodeKind] = &[
    NodeKind::Concept,
    NodeKind::Resource,
    NodeKind::Data,
    NodeKind::Event,
    NodeKind::Person,
];

const ONTOLOGY_EDGES: &[EdgeKind] = &[
    EdgeKind::Extends,
    EdgeKind::PartOf,
    EdgeKind::AssociatedWith,
    EdgeKind::References,
    EdgeKind::Contains,
    EdgeKind::TransformsTo,
];

/// Node kinds a graph of `graph_kind` accepts.
pub fn allowed_node_kinds(graph_kind: GraphKind) -> &'static [NodeKind] {
    match graph_kind {
        GraphKind::Topology => TOPOLOGY_NODES,
        GraphKind::Timeline => TIMELINE_NODES,
        GraphKind::Changelog => CHANGELOG_NODES,
        GraphKind::Requirement => REQUIREMENT_NODES,
        GraphKind::Ontology => ONTOLOGY_NODES,
        GraphKind::KnowledgeBase => NodeKind::ALL,
    }
}

/// Edge kinds a graph of `graph_kind` accepts.
pub fn allowed_edge_kinds(graph_kind: GraphKind) -> &'static [EdgeKind] {
    match graph_kind {
        GraphKind::Topology => TOPOLOGY_EDGES,
        GraphKind::Timeline => TIMELINE_EDGES,
        GraphKind::Changelog => CHANGELOG_EDGES,
        GraphKind::Requirement => REQUIREMENT_EDGES,
        GraphKind::Ontology => ONTOLOGY_EDGES,
        GraphKind::KnowledgeBase => EdgeKind::ALL,
    }
}

/// Checks `node_kind` against the allow-list of `graph_kind`.
///
/// # Errors
///
/// Returns [`GraphError::TypeMismatch`] if the kind is not permitted.
pub fn validate_node_kind(graph_kind: GraphKind, node_kind: NodeKind) -> Result<(), GraphError> {
    if allowed_node_kinds(graph_kind).contains(&node_kind) {
        Ok(())
    } else {
        Err(GraphError::TypeMismatch(format!(
            "node kind `{node_kind}` is not allowed in a `{graph_kind}` graph"
        )))
    }
}

/// Checks `edge_kind` against the allow-list of `graph_kind`.
///
/// # Errors
///
/// Returns [`GraphError::TypeMismatch`] if the kind is not permitted.
pub fn validate_edge_kind(graph_kind: GraphKind, edge_kind: EdgeKind) -> Result<(), GraphError> {
    if allowed_edge_kinds(graph_kind).contains(&edge_kind) {
        Ok(())
    } else {
        Err(GraphError::TypeMismatch(format!(
            "edge kind `{edge_kind}` is not allowed in a `{graph_kind}` graph"
        )))
    }
}
