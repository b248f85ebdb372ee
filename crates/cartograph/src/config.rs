//! Configuration types for the graph store and its renderer.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from TOML
//! or any other serde format. Every field has a default, so partial files are
//! fine.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Canvas size and force simulation parameters.
//! - [`StyleConfig`] - Background, fallback node color and per-kind palette.
//! - [`StoreConfig`] - Behavior of the graph store itself.
//!
//! # Example
//!
//! ```
//! # use cartograph::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().width(), 1200.0);
//! assert!(config.style().palette().is_ok());
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use cartograph_core::{color::Color, kind::NodeKind};

use crate::export::svg::Palette;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Store configuration section.
    #[serde(default)]
    store: StoreConfig,
}

impl AppConfig {
    pub fn new(layout: LayoutConfig, style: StyleConfig, store: StoreConfig) -> Self {
        Self {
            layout,
            style,
            store,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the store configuration.
    pub fn store(&self) -> &StoreConfig {
        &self.store
    }
}

/// Canvas size and force simulation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    width: f32,
    height: f32,
    iterations: usize,
    node_radius: f32,
    spring_length: f32,
    damping: f32,
    centering_strength: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            iterations: 50,
            node_radius: 30.0,
            spring_length: 30.0,
            damping: 0.9,
            centering_strength: 0.1,
        }
    }
}

impl LayoutConfig {
    /// Canvas width in pixels.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Number of force relaxation steps.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Radius of a rendered node circle.
    pub fn node_radius(&self) -> f32 {
        self.node_radius
    }

    /// Divisor turning edge length into attractive force.
    pub fn spring_length(&self) -> f32 {
        self.spring_length
    }

    /// Factor applied to the summed force before moving a node.
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Factor applied to the distance a node strays beyond the initial circle.
    pub fn centering_strength(&self) -> f32 {
        self.centering_strength
    }

    /// Checks that the values describe a usable canvas and simulation.
    ///
    /// # Errors
    ///
    /// Returns a description of the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(format!(
                "canvas size must be positive, got {}x{}",
                self.width, self.height
            ));
        }
        if !self.node_radius.is_finite() || self.node_radius <= 0.0 {
            return Err(format!("node_radius must be positive, got {}", self.node_radius));
        }
        if self.node_radius * 2.0 > self.width.min(self.height) {
            return Err(format!(
                "node_radius {} does not fit a {}x{} canvas",
                self.node_radius, self.width, self.height
            ));
        }
        if !self.spring_length.is_finite() || self.spring_length <= 0.0 {
            return Err(format!(
                "spring_length must be positive, got {}",
                self.spring_length
            ));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(format!("damping must be within 0..=1, got {}", self.damping));
        }
        if !self.centering_strength.is_finite() || self.centering_strength < 0.0 {
            return Err(format!(
                "centering_strength must not be negative, got {}",
                self.centering_strength
            ));
        }
        Ok(())
    }
}

/// Visual styling of rendered graphs.
///
/// Colors are CSS color strings. `palette` maps node kind names to colors and
/// overrides the built-in palette entry by entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    default_node_color: Option<String>,
    palette: BTreeMap<String, String>,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if none is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_deref()
            .map(Color::new)
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Builds the node palette: built-in colors with configured overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown node kinds or unparsable colors.
    pub fn palette(&self) -> Result<Palette, String> {
        let mut palette = Palette::default();

        if let Some(fallback) = &self.default_node_color {
            let color = Color::new(fallback)
                .map_err(|err| format!("Invalid default node color in config: {err}"))?;
            palette = palette.with_fallback(color);
        }

        for (kind, color) in &self.palette {
            let kind: NodeKind = kind
                .parse()
                .map_err(|err| format!("Invalid palette entry in config: {err}"))?;
            let color = Color::new(color)
                .map_err(|err| format!("Invalid palette color for `{kind}` in config: {err}"))?;
            palette = palette.with_color(kind, color);
        }

        Ok(palette)
    }
}

/// Behavior of the graph store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    auto_visualize: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            auto_visualize: true,
        }
    }
}

impl StoreConfig {
    pub fn new(auto_visualize: bool) -> Self {
        Self { auto_visualize }
    }

    /// Whether publishing a graph renders and attaches an SVG visualization.
    pub fn auto_visualize(&self) -> bool {
        self.auto_visualize
    }
}
