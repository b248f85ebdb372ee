use svg::node::element::{Circle, Group, Rectangle, Text};

use cartograph_core::{geometry::Size, kind::NodeKind};

use super::Palette;

const LEGEND_WIDTH: f32 = 150.0;
const LEGEND_MARGIN: f32 = 10.0;
const ROW_HEIGHT: f32 = 20.0;
const HEADER_HEIGHT: f32 = 28.0;
const SWATCH_RADIUS: f32 = 6.0;

/// Creates the legend box listing every node kind with its color swatch.
///
/// The legend sits in the top-right corner of the canvas.
pub fn create_legend(palette: &Palette, canvas: Size) -> Group {
    let height = HEADER_HEIGHT + ROW_HEIGHT * NodeKind::ALL.len() as f32;
    let x = canvas.width() - LEGEND_WIDTH - LEGEND_MARGIN;

    let mut group = Group::new()
        .set("class", "legend")
        .set("transform", format!("translate({x}, {LEGEND_MARGIN})"))
        .add(
            Rectangle::new()
                .set("class", "legend-box")
                .set("width", LEGEND_WIDTH)
                .set("height", height)
                .set("rx", 4),
        )
        .add(
            Text::new("Node kinds")
                .set("class", "legend-title")
                .set("x", 10)
                .set("y", 18),
        );

    for (row, kind) in NodeKind::ALL.iter().enumerate() {
        let y = HEADER_HEIGHT + ROW_HEIGHT * row as f32 + ROW_HEIGHT / 2.0;
        group = group
            .add(
                Circle::new()
                    .set("cx", 16)
                    .set("cy", y)
                    .set("r", SWATCH_RADIUS)
                    .set("fill", palette.color_for(*kind)),
            )
            .add(
                Text::new(kind.as_str())
                    .set("class", "legend-label")
                    .set("x", 30)
                    .set("y", y + 4.0),
            );
    }

    group
}
