use std::collections::HashMap;

use cartograph_core::{color::Color, kind::NodeKind};

/// Fill color of each node kind.
const DEFAULT_COLORS: &[(NodeKind, &str)] = &[
    (NodeKind::Component, "#4a90d9"),
    (NodeKind::Module, "#7b68ee"),
    (NodeKind::Service, "#50c878"),
    (NodeKind::Data, "#f5a623"),
    (NodeKind::Api, "#e94e77"),
    (NodeKind::Concept, "#9b59b6"),
    (NodeKind::Resource, "#1abc9c"),
    (NodeKind::Event, "#e67e22"),
    (NodeKind::Change, "#d4ac0d"),
    (NodeKind::Requirement, "#c0392b"),
    (NodeKind::Feature, "#27ae60"),
    (NodeKind::Iteration, "#3498db"),
    (NodeKind::Decision, "#8e44ad"),
    (NodeKind::Person, "#7f8c8d"),
];

const DEFAULT_FALLBACK: &str = "#95a5a6";

/// Node kind to fill color lookup with a fallback for unmapped kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: HashMap<NodeKind, Color>,
    fallback: Color,
}

impl Palette {
    /// Creates a palette from explicit colors; kinds not in `colors` use `fallback`.
    pub fn new(colors: HashMap<NodeKind, Color>, fallback: Color) -> Self {
        Self { colors, fallback }
    }

    pub fn with_color(mut self, kind: NodeKind, color: Color) -> Self {
        self.colors.insert(kind, color);
        self
    }

    pub fn with_fallback(mut self, fallback: Color) -> Self {
        self.fallback = fallback;
        self
    }

    /// Fill color for `kind`.
    pub fn color_for(&self, kind: NodeKind) -> Color {
        self.colors.get(&kind).copied().unwrap_or(self.fallback)
    }
}

impl Default for Palette {
    fn default() -> Self {
        let colors = DEFAULT_COLORS
            .iter()
            .map(|(kind, color)| {
                (
                    *kind,
                    Color::new(color).expect("built-in palette colors are valid"),
                )
            })
            .collect();
        let fallback = Color::new(DEFAULT_FALLBACK).expect("built-in fallback color is valid");
        Self { colors, fallback }
    }
}
