//! Cartograph - a registry of typed, versioned graphs.
//!
//! Graphs of nodes, edges and attached resources are kept in a [`GraphStore`],
//! validated against the per-kind allow-lists of `cartograph-core`, persisted
//! through a [`PersistenceGateway`](persistence::PersistenceGateway) and
//! rendered to SVG with a force-directed layout.
//!
//! # Examples
//!
//! ```rust
//! use cartograph::{
//!     GraphStore,
//!     config::AppConfig,
//!     kind::{EdgeKind, GraphKind, NodeKind},
//!     persistence::MemoryGateway,
//!     store::{GraphFilter, NewEdge, NewNode},
//! };
//!
//! let mut store = GraphStore::open(MemoryGateway::new(), &AppConfig::default())
//!     .expect("Failed to open store");
//!
//! let graph = store
//!     .create_graph("Sys", Some(GraphKind::Topology), None)
//!     .expect("Failed to create graph");
//! let a = store
//!     .add_node(graph.id, NewNode::new(NodeKind::Component, "A"))
//!     .expect("Failed to add node");
//! let b = store
//!     .add_node(graph.id, NewNode::new(NodeKind::Component, "B"))
//!     .expect("Failed to add node");
//! store
//!     .add_edge(graph.id, NewEdge::new(EdgeKind::DependsOn, a.id, b.id))
//!     .expect("Failed to add edge");
//!
//! let summaries = store.list_graphs(&GraphFilter::default());
//! assert_eq!(summaries[0].nodes_count, 2);
//! assert_eq!(summaries[0].edges_count, 1);
//! ```

pub mod config;
pub mod export;
pub mod layout;
pub mod persistence;
pub mod store;

pub use cartograph_core::{
    ErrorKind, GraphError, color, geometry, identifier, kind, matrix, model, status,
};

pub use store::GraphStore;
