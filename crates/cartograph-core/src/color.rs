//! Color handling for rendered graphs.
//!
//! [`Color`] wraps `DynamicColor` from the color crate so that palette entries
//! coming from configuration are validated as CSS colors once, up front, and
//! can then be written straight into SVG attributes.

use std::str::FromStr;

use color::DynamicColor;

/// A validated CSS color.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Color {
    /// Parses a CSS color string such as `"#ff0000"`, `"rgb(255, 0, 0)"` or `"red"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cartograph_core::color::Color;
    ///
    /// let teal = Color::new("#1abc9c").unwrap();
    /// assert!(Color::new("no-such-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("gray").expect("'gray' is a valid CSS color")
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl From<Color> for svg::node::Value {
    fn from(color: Color) -> Self {
        Self::from(color.to_string())
    }
}
