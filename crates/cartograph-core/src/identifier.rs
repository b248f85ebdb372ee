//! Typed identifiers for registry entities.
//!
//! Every entity kind gets its own newtype over a random v4 [`Uuid`] so that a
//! node id can never be passed where an edge id is expected. Identifiers
//! serialize as hyphenated strings and parse back from the same form.
//!
//! # Examples
//!
//! ```
//! # use cartograph_core::identifier::NodeId;
//! let id = NodeId::new();
//! let parsed: NodeId = id.to_string().parse().unwrap();
//! assert_eq!(id, parsed);
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GraphError;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a fresh, random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = GraphError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self).map_err(|err| {
                    GraphError::InvalidInput(format!("malformed {} id `{s}`: {err}", $label))
                })
            }
        }
    };
}

define_id!(
    /// Identifier of a [`Graph`](crate::model::Graph).
    GraphId,
    "graph"
);
define_id!(
    /// Identifier of a [`Node`](crate::model::Node).
    NodeId,
    "node"
);
define_id!(
    /// Identifier of an [`Edge`](crate::model::Edge).
    EdgeId,
    "edge"
);
define_id!(
    /// Identifier of a [`Resource`](crate::model::Resource).
    ResourceId,
    "resource"
);
