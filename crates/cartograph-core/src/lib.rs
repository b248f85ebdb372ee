//! Cartograph Core Types and Definitions
//!
//! This crate provides the domain model of the Cartograph graph registry:
//!
//! - **Identifiers**: Typed UUID-backed ids ([`identifier`] module)
//! - **Kinds**: Closed enumerations of graph, node, edge and resource kinds ([`kind`] module)
//! - **Matrix**: Per-graph-kind allow-lists of node and edge kinds ([`matrix`] module)
//! - **Status**: The draft/published/archived lifecycle ([`status`] module)
//! - **Model**: Graph, node, edge and resource entities ([`model`] module)
//! - **Errors**: The [`GraphError`] taxonomy shared by every operation
//! - **Colors** and **Geometry**: Primitives used by layout and rendering

pub mod color;
pub mod error;
pub mod geometry;
pub mod identifier;
pub mod kind;
pub mod matrix;
pub mod model;
pub mod status;

pub use error::{ErrorKind, GraphError};
