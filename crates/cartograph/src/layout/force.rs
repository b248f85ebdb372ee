//! Force-directed layout engine
//!
//! Nodes start evenly spaced on a circle around the canvas center and are then
//! relaxed for a fixed number of iterations under three forces:
//!
//! - repulsion between every pair of nodes, falling off with the squared distance
//! - attraction along every edge, growing with the edge length
//! - a centering pull on nodes that drift outside the initial circle
//!
//! There is no randomness: identical node order, edges, canvas and parameters
//! always produce identical positions. Initial angles depend on node list
//! position, so reordering nodes changes the result.

use std::{collections::HashMap, f32::consts::TAU};

use indexmap::IndexMap;
use log::debug;

use cartograph_core::{
    geometry::{Point, Size},
    identifier::NodeId,
    model::Graph,
};

use crate::{config::LayoutConfig, layout::Layout};

/// Total repulsion shared among all nodes of a graph.
const REPULSION_BUDGET: f32 = 10_000.0;

/// Initial circle radius as a fraction of the smaller canvas dimension.
const INITIAL_RADIUS_RATIO: f32 = 0.4;

/// Floor for pairwise distances so coincident nodes do not divide by zero.
const MIN_DISTANCE: f32 = 0.01;

/// Force layout engine for graphs.
#[derive(Debug, Clone)]
pub struct Engine {
    size: Size,
    iterations: usize,
    node_radius: f32,
    spring_length: f32,
    damping_factor: f32,
    centering_strength: f32,
}

impl Engine {
    /// Create a new engine for a canvas of the given size with default parameters
    pub fn new(size: Size) -> Self {
        Self {
            size,
            iterations: 50,
            node_radius: 30.0,
            spring_length: 30.0,
            damping_factor: 0.9,
            centering_strength: 0.1,
        }
    }

    /// Create an engine from layout configuration
    pub fn from_config(config: &LayoutConfig) -> Self {
        let mut engine = Self::new(Size::new(config.width(), config.height()));
        engine
            .set_iterations(config.iterations())
            .set_node_radius(config.node_radius())
            .set_spring_length(config.spring_length())
            .set_damping_factor(config.damping())
            .set_centering_strength(config.centering_strength());
        engine
    }

    /// Set the number of iterations for the force simulation
    pub fn set_iterations(&mut self, iterations: usize) -> &mut Self {
        self.iterations = iterations;
        self
    }

    /// Set the radius of node circles, which also bounds how close to the
    /// canvas edge a node may sit
    pub fn set_node_radius(&mut self, radius: f32) -> &mut Self {
        self.node_radius = radius;
        self
    }

    /// Set the spring length dividing edge attraction
    pub fn set_spring_length(&mut self, length: f32) -> &mut Self {
        self.spring_length = length;
        self
    }

    /// Set the damping factor for the simulation
    pub fn set_damping_factor(&mut self, factor: f32) -> &mut Self {
        self.damping_factor = factor;
        self
    }

    /// Set the centering strength
    pub fn set_centering_strength(&mut self, strength: f32) -> &mut Self {
        self.centering_strength = strength;
        self
    }

    pub fn size(&self) -> Size {
        self.size
    }

    fn initial_radius(&self) -> f32 {
        INITIAL_RADIUS_RATIO * self.size.min_dimension()
    }

    /// Place nodes evenly on a circle around the canvas center
    fn initialize_positions(&self, node_count: usize) -> Vec<Point> {
        let center = self.size.center();
        let radius = self.initial_radius();

        (0..node_count)
            .map(|i| {
                let angle = TAU * i as f32 / node_count as f32;
                center.add_point(Point::from_polar(radius, angle))
            })
            .collect()
    }

    /// Keep a node center at least one radius away from every canvas edge
    fn clamp_to_canvas(&self, point: Point) -> Point {
        let r = self.node_radius;
        let max_x = (self.size.width() - r).max(r);
        let max_y = (self.size.height() - r).max(r);
        point.clamp(Point::new(r, r), Point::new(max_x, max_y))
    }

    /// Run force-directed layout algorithm
    fn run_force_simulation(&self, graph: &Graph) -> Vec<Point> {
        let node_count = graph.nodes.len();
        let mut positions = self.initialize_positions(node_count);

        // A lone node has nothing to push against or pull toward.
        if node_count < 2 {
            return positions
                .into_iter()
                .map(|point| self.clamp_to_canvas(point))
                .collect();
        }

        let indices: HashMap<NodeId, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id, idx))
            .collect();

        let center = self.size.center();
        let initial_radius = self.initial_radius();
        let repulsion = REPULSION_BUDGET / node_count as f32;

        for _ in 0..self.iterations {
            let mut forces = vec![Point::default(); node_count];

            // Repulsive forces between all nodes
            for i in 0..node_count {
                for j in (i + 1)..node_count {
                    let delta = positions[i].sub_point(positions[j]);
                    let distance = delta.hypot().max(MIN_DISTANCE);
                    let magnitude = repulsion / (distance * distance);
                    let push = delta.scale(magnitude / distance);

                    forces[i] = forces[i].add_point(push);
                    forces[j] = forces[j].sub_point(push);
                }
            }

            // Attractive forces along edges
            for edge in &graph.edges {
                let (Some(&source), Some(&target)) =
                    (indices.get(&edge.source), indices.get(&edge.target))
                else {
                    continue;
                };

                let delta = positions[target].sub_point(positions[source]);
                let distance = delta.hypot();
                if distance < MIN_DISTANCE {
                    continue;
                }
                let magnitude = distance / self.spring_length;
                let pull = delta.scale(magnitude / distance);

                forces[source] = forces[source].add_point(pull);
                forces[target] = forces[target].sub_point(pull);
            }

            // Centering force for nodes outside the initial circle
            for (idx, position) in positions.iter().enumerate() {
                let offset = position.sub_point(center);
                let distance = offset.hypot();
                if distance > initial_radius {
                    let excess = distance - initial_radius;
                    let pull = offset.scale(excess * self.centering_strength / distance);
                    forces[idx] = forces[idx].sub_point(pull);
                }
            }

            for (position, force) in positions.iter_mut().zip(&forces) {
                let moved = position.add_point(force.scale(self.damping_factor));
                *position = self.clamp_to_canvas(moved);
            }
        }

        positions
    }

    /// Compute positions for every node of `graph`
    pub fn calculate(&self, graph: &Graph) -> Layout {
        debug!(
            graph_id:% = graph.id,
            nodes_count = graph.nodes.len(),
            edges_count = graph.edges.len(),
            iterations = self.iterations;
            "Running force layout"
        );

        let positions: IndexMap<NodeId, Point> = graph
            .nodes
            .iter()
            .map(|node| node.id)
            .zip(self.run_force_simulation(graph))
            .collect();

        Layout::new(self.size, self.node_radius, positions)
    }
}
