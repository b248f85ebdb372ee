//! SVG rendering of laid-out graphs.
//!
//! The document is assembled in a fixed order:
//!
//! 1. root `<svg>` sized to the layout canvas
//! 2. arrowhead marker definition
//! 3. style block
//! 4. background rectangle
//! 5. one line (plus optional label) per edge, in edge list order
//! 6. one labeled circle per node, in node list order
//! 7. the legend
//!
//! Elements whose node position is missing from the layout are skipped.

mod arrows;
mod legend;
mod palette;

pub use palette::Palette;

use std::borrow::Cow;

use log::{debug, info};
use svg::{
    Document,
    node::element::{Circle, Group, Rectangle, Style, Text},
};

use cartograph_core::{GraphError, color::Color, geometry::Point, model::Graph, model::Node};

use crate::{config::StyleConfig, export::Exporter, layout::Layout};

/// Node names longer than this are cut and suffixed with [`ELLIPSIS`].
pub const MAX_LABEL_CHARS: usize = 15;

const ELLIPSIS: &str = "...";

const DEFAULT_BACKGROUND: &str = "#ffffff";

const STYLESHEET: &str = "\
.edge { stroke: #999999; stroke-width: 1.5; }
.edge-label { font-family: Arial, sans-serif; font-size: 11px; fill: #555555; }
.node circle { stroke: #ffffff; stroke-width: 2; }
.node-label { font-family: Arial, sans-serif; font-size: 12px; fill: #222222; pointer-events: none; }
.legend-box { fill: #ffffff; fill-opacity: 0.9; stroke: #cccccc; }
.legend-title { font-family: Arial, sans-serif; font-size: 12px; font-weight: bold; fill: #333333; }
.legend-label { font-family: Arial, sans-serif; font-size: 11px; fill: #333333; }
";

/// SVG exporter for graphs.
#[derive(Debug, Clone)]
pub struct Svg {
    palette: Palette,
    background: Color,
}

impl Default for Svg {
    fn default() -> Self {
        Self::new(Palette::default(), None)
    }
}

impl Svg {
    /// Creates an exporter; `background` defaults to white.
    pub fn new(palette: Palette, background: Option<Color>) -> Self {
        let background = background.unwrap_or_else(|| {
            Color::new(DEFAULT_BACKGROUND).expect("default background is a valid color")
        });
        Self {
            palette,
            background,
        }
    }

    /// Creates an exporter from style configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured colors are invalid.
    pub fn from_style(style: &StyleConfig) -> Result<Self, String> {
        Ok(Self::new(style.palette()?, style.background_color()?))
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    fn render_node(&self, node: &Node, position: Point, radius: f32) -> Group {
        let circle = Circle::new()
            .set("cx", position.x())
            .set("cy", position.y())
            .set("r", radius)
            .set("fill", self.palette.color_for(node.kind));

        let label = Text::new(truncate_label(&node.name))
            .set("class", "node-label")
            .set("x", position.x())
            .set("y", position.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "middle");

        Group::new()
            .set("class", format!("node node-{}", node.kind))
            .set("data-node-id", node.id.to_string())
            .add(circle)
            .add(label)
    }

    /// Build the SVG document for `graph` positioned by `layout`
    pub fn render_document(&self, graph: &Graph, layout: &Layout) -> Document {
        let size = layout.size();
        let radius = layout.node_radius();

        let mut doc = Document::new()
            .set("viewBox", format!("0 0 {} {}", size.width(), size.height()))
            .set("width", size.width())
            .set("height", size.height())
            .add(arrows::create_marker_definitions())
            .add(Style::new(STYLESHEET))
            .add(
                Rectangle::new()
                    .set("class", "background")
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", self.background),
            );

        let mut edges = Group::new().set("class", "edges");
        for edge in &graph.edges {
            let (Some(source), Some(target)) =
                (layout.position(edge.source), layout.position(edge.target))
            else {
                debug!(edge_id:% = edge.id; "Skipping edge without laid-out endpoints");
                continue;
            };
            edges = edges.add(arrows::create_edge(edge, source, target, radius));
        }
        doc = doc.add(edges);

        let mut nodes = Group::new().set("class", "nodes");
        for node in &graph.nodes {
            let Some(position) = layout.position(node.id) else {
                debug!(node_id:% = node.id; "Skipping node without position");
                continue;
            };
            nodes = nodes.add(self.render_node(node, position, radius));
        }
        doc = doc.add(nodes);

        doc.add(legend::create_legend(&self.palette, size))
    }
}

impl Exporter for Svg {
    fn export_graph(&self, graph: &Graph, layout: &Layout) -> Result<String, GraphError> {
        let doc = self.render_document(graph, layout);
        let content = doc.to_string();
        info!(
            graph_id:% = graph.id,
            bytes = content.len();
            "SVG rendered"
        );
        Ok(content)
    }
}

/// Shortens names longer than [`MAX_LABEL_CHARS`] characters.
fn truncate_label(name: &str) -> Cow<'_, str> {
    if name.chars().count() <= MAX_LABEL_CHARS {
        return Cow::Borrowed(name);
    }
    let mut short: String = name.chars().take(MAX_LABEL_CHARS).collect();
    short.push_str(ELLIPSIS);
    Cow::Owned(short)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use indexmap::IndexMap;

    use super::*;
    use cartograph_core::{
        geometry::Size,
        kind::{EdgeKind, GraphKind, NodeKind},
        model::Edge,
    };

    fn two_node_graph() -> (Graph, Layout) {
        let now = Utc::now();
        let mut graph = Graph::new("Sys", GraphKind::Topology, None, now);
        let a = Node::new(NodeKind::Component, "A", now);
        let b = Node::new(NodeKind::Service, "Billing service backend", now);
        let mut edge = Edge::new(EdgeKind::DependsOn, a.id, b.id, now);
        edge.label = Some("uses & <calls>".to_string());

        let mut positions = IndexMap::new();
        positions.insert(a.id, Point::new(100.0, 100.0));
        positions.insert(b.id, Point::new(300.0, 100.0));

        graph.nodes.push(a);
        graph.nodes.push(b);
        graph.edges.push(edge);
        (graph, Layout::new(Size::new(1200.0, 800.0), 30.0, positions))
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short"), "short");
        assert_eq!(truncate_label("exactly15chars!"), "exactly15chars!");
        assert_eq!(truncate_label("Billing service backend"), "Billing service...");
        assert_eq!(truncate_label(&"ä".repeat(16)), "ä".repeat(15) + "...");
    }

    #[test]
    fn test_document_contains_all_parts() {
        let (graph, layout) = two_node_graph();
        let svg = Svg::default().export_graph(&graph, &layout).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"1200\""));
        assert!(svg.contains("height=\"800\""));
        assert!(svg.contains("id=\"arrowhead\""));
        assert!(svg.contains("<style"));
        assert!(svg.contains("class=\"background\""));
        assert_eq!(svg.matches("<line").count(), 1);
        assert_eq!(svg.matches("class=\"node node-").count(), 2);
        assert!(svg.contains("Billing service..."));
        assert!(svg.contains("class=\"legend\""));
        assert_eq!(
            svg.matches("class=\"legend-label\"").count(),
            NodeKind::ALL.len()
        );
        assert!(svg.contains("requirement"));
    }

    #[test]
    fn test_edge_label_is_escaped() {
        let (graph, layout) = two_node_graph();
        let svg = Svg::default().export_graph(&graph, &layout).unwrap();
        assert!(svg.contains("class=\"edge-label\""));
        assert!(svg.contains("&lt;calls"));
        assert!(!svg.contains("<calls>"));
    }

    #[test]
    fn test_missing_positions_are_skipped() {
        let (mut graph, layout) = two_node_graph();
        let now = Utc::now();
        let orphan = Node::new(NodeKind::Data, "orphan", now);
        graph
            .edges
            .push(Edge::new(EdgeKind::Calls, graph.nodes[0].id, orphan.id, now));
        graph.nodes.push(orphan);

        let svg = Svg::default().export_graph(&graph, &layout).unwrap();
        assert_eq!(svg.matches("<line").count(), 1);
        assert_eq!(svg.matches("class=\"node node-").count(), 2);
        assert!(!svg.contains("orphan"));
    }

    #[test]
    fn test_empty_graph_still_renders_legend() {
        let graph = Graph::new("empty", GraphKind::Timeline, None, Utc::now());
        let layout = Layout::new(Size::new(640.0, 480.0), 30.0, IndexMap::new());
        let svg = Svg::default().export_graph(&graph, &layout).unwrap();
        assert!(svg.contains("viewBox=\"0 0 640 480\""));
        assert!(svg.contains("class=\"legend\""));
        assert_eq!(svg.matches("<line").count(), 0);
    }
}
