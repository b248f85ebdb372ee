use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use svg::node::element::{Definitions, Group, Line, Marker, Path, Text};

use cartograph_core::{geometry::Point, model::Edge};

/// Id of the shared arrowhead marker.
pub const ARROWHEAD_ID: &str = "arrowhead";

/// Extra gap before the target circle so the arrowhead tip stays visible.
const ARROW_GAP: f32 = 5.0;

/// Distance of an edge label from its line, measured perpendicular to it.
const LABEL_OFFSET: f32 = 15.0;

const EDGE_COLOR: &str = "#999999";

/// How far the control points of a self-loop reach, in node radii.
const LOOP_REACH: f32 = 3.0;

/// Creates the arrowhead marker definition referenced by every edge
pub fn create_marker_definitions() -> Definitions {
    let arrowhead = Marker::new()
        .set("id", ARROWHEAD_ID)
        .set("viewBox", "0 0 10 10")
        .set("refX", 10)
        .set("refY", 5)
        .set("markerWidth", 6)
        .set("markerHeight", 6)
        .set("orient", "auto")
        .add(
            Path::new()
                .set("d", "M 0 0 L 10 5 L 0 10 z")
                .set("fill", EDGE_COLOR),
        );

    Definitions::new().add(arrowhead)
}

/// Endpoints of the visible edge segment between two node centers.
///
/// The segment starts on the source circle and stops short of the target
/// circle by the arrowhead gap.
pub fn edge_endpoints(source: Point, target: Point, node_radius: f32) -> (Point, Point) {
    let angle = target.sub_point(source).angle();
    let start = source.add_point(Point::from_polar(node_radius, angle));
    let end = target.sub_point(Point::from_polar(node_radius + ARROW_GAP, angle));
    (start, end)
}

/// Position of an edge label: the segment midpoint pushed off the line.
pub fn label_position(start: Point, end: Point) -> Point {
    let angle = end.sub_point(start).angle();
    start
        .midpoint(end)
        .add_point(Point::from_polar(LABEL_OFFSET, angle - FRAC_PI_2))
}

/// Control points of the loop drawn for an edge whose source is its target.
///
/// The loop leaves the circle up and to the left and re-enters up and to the
/// right, stopping short by the arrowhead gap. Returns start, both control
/// points and end.
pub fn self_loop_points(center: Point, node_radius: f32) -> [Point; 4] {
    let out_angle = -2.0 * FRAC_PI_3;
    let in_angle = -FRAC_PI_3;
    [
        center.add_point(Point::from_polar(node_radius, out_angle)),
        center.add_point(Point::from_polar(node_radius * LOOP_REACH, out_angle)),
        center.add_point(Point::from_polar(node_radius * LOOP_REACH, in_angle)),
        center.add_point(Point::from_polar(node_radius + ARROW_GAP, in_angle)),
    ]
}

fn create_self_loop(edge: &Edge, center: Point, node_radius: f32) -> (Path, Point) {
    let [start, first, second, end] = self_loop_points(center, node_radius);
    let d = format!(
        "M {} {} C {} {} {} {} {} {}",
        start.x(),
        start.y(),
        first.x(),
        first.y(),
        second.x(),
        second.y(),
        end.x(),
        end.y()
    );
    let path = Path::new()
        .set("class", "edge")
        .set("data-edge-id", edge.id.to_string())
        .set("data-kind", edge.kind.as_str())
        .set("d", d)
        .set("fill", "none")
        .set("marker-end", format!("url(#{ARROWHEAD_ID})"));

    // The curve peaks at three quarters of the control point height.
    let top = first.midpoint(second);
    let peak = center.add_point(top.sub_point(center).scale(0.75));
    let label = peak.sub_point(Point::new(0.0, LABEL_OFFSET));
    (path, label)
}

/// Create the line (and optional label) for an edge between two node centers
pub fn create_edge(edge: &Edge, source: Point, target: Point, node_radius: f32) -> Group {
    let (mut group, label_at) = if edge.source == edge.target {
        let (path, label_at) = create_self_loop(edge, source, node_radius);
        (Group::new().add(path), label_at)
    } else {
        let (start, end) = edge_endpoints(source, target, node_radius);
        let line = Line::new()
            .set("class", "edge")
            .set("data-edge-id", edge.id.to_string())
            .set("data-kind", edge.kind.as_str())
            .set("x1", start.x())
            .set("y1", start.y())
            .set("x2", end.x())
            .set("y2", end.y())
            .set("marker-end", format!("url(#{ARROWHEAD_ID})"));
        (Group::new().add(line), label_position(start, end))
    };

    if let Some(label) = &edge.label {
        let text = Text::new(label.as_str())
            .set("class", "edge-label")
            .set("x", label_at.x())
            .set("y", label_at.y())
            .set("text-anchor", "middle");
        group = group.add(text);
    }

    group
}
