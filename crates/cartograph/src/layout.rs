//! Node placement for rendering.
//!
//! A [`Layout`] maps every node of a graph to a point inside a fixed-size
//! canvas. Positions are computed by the force-directed [`Engine`], which
//! needs no coordinates from the caller.

mod force;

pub use force::Engine;

use indexmap::IndexMap;

use cartograph_core::{
    geometry::{Point, Size},
    identifier::NodeId,
};

/// Positions of a graph's nodes inside a canvas.
///
/// Positions are node centers, kept in node list order.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    size: Size,
    node_radius: f32,
    positions: IndexMap<NodeId, Point>,
}

impl Layout {
    pub fn new(size: Size, node_radius: f32, positions: IndexMap<NodeId, Point>) -> Self {
        Self {
            size,
            node_radius,
            positions,
        }
    }

    /// Canvas size the positions were computed for.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Radius of every node circle.
    pub fn node_radius(&self) -> f32 {
        self.node_radius
    }

    /// Center of `node`, if it was laid out.
    pub fn position(&self, node: NodeId) -> Option<Point> {
        self.positions.get(&node).copied()
    }

    /// All positions in node list order.
    pub fn positions(&self) -> impl Iterator<Item = (NodeId, Point)> + '_ {
        self.positions.iter().map(|(id, point)| (*id, *point))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
