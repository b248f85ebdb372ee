//! Rendering of laid-out graphs into visualization artifacts.

pub mod svg;

use cartograph_core::{GraphError, model::Graph};

use crate::layout::Layout;

/// Turns a graph plus its layout into a serialized artifact.
pub trait Exporter {
    /// Renders `graph` positioned by `layout`.
    ///
    /// Nodes or edge endpoints missing from `layout` are skipped rather than
    /// reported, so a partial layout still renders.
    fn export_graph(&self, graph: &Graph, layout: &Layout) -> Result<String, GraphError>;
}
