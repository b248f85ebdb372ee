//! Lifecycle status of a graph.
//!
//! ```text
//!   draft ──► published ──► archived
//!     │           ▲ │            ▲
//!     │           └─┘ (re-publish)
//!     └──────────────────────────┘
//! ```
//!
//! `archived` is terminal: nothing leaves it, and every mutation of an
//! archived graph is rejected with [`GraphError::ImmutableState`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Lifecycle status of a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl GraphStatus {
    /// Every status, in lifecycle order.
    pub const ALL: &'static [GraphStatus] = &[Self::Draft, Self::Published, Self::Archived];

    /// Returns the snake_case name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    /// Whether the graph rejects all mutation.
    pub fn is_archived(self) -> bool {
        self == Self::Archived
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Publishing an already published graph is permitted and leaves the
    /// status unchanged.
    pub fn can_transition_to(self, next: GraphStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Published)
                | (Self::Published, Self::Published)
                | (Self::Draft, Self::Archived)
                | (Self::Published, Self::Archived)
        )
    }

    /// Returns `next` if the transition is legal.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ImmutableState`] for any transition out of
    /// `archived` or back to `draft`.
    pub fn transition(self, next: GraphStatus) -> Result<GraphStatus, GraphError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(GraphError::ImmutableState(format!(
                "cannot move graph from `{self}` to `{next}`"
            )))
        }
    }
}

impl fmt::Display for GraphStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphStatus {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(GraphError::InvalidInput(format!(
                "unknown graph status `{other}`"
            ))),
        }
    }
}
