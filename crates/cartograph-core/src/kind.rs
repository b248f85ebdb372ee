//! Closed enumerations tagging graphs, nodes, edges and resources.
//!
//! Each enumeration has a snake_case wire form used for serialization,
//! `Display` and `FromStr`, plus an `ALL` constant listing its variants in
//! declaration order. Unknown kind strings are reported as
//! [`GraphError::TypeMismatch`]; an unknown resource kind is
//! [`GraphError::InvalidInput`] since it is not subject to the allow-list
//! matrix.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal, $err:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the snake_case name of this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = GraphError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(GraphError::$err(format!(
                        "unknown {} `{other}`",
                        $label
                    ))),
                }
            }
        }
    };
}

closed_enum!(
    /// Domain template constraining which node and edge kinds a graph accepts.
    GraphKind, "graph kind", TypeMismatch {
        Topology => "topology",
        Timeline => "timeline",
        Changelog => "changelog",
        Requirement => "requirement",
        KnowledgeBase => "knowledge_base",
        Ontology => "ontology",
    }
);

closed_enum!(
    /// Semantic role of a node.
    NodeKind, "node kind", TypeMismatch {
        Component => "component",
        Module => "module",
        Service => "service",
        Data => "data",
        Api => "api",
        Concept => "concept",
        Resource => "resource",
        Event => "event",
        Change => "change",
        Requirement => "requirement",
        Feature => "feature",
        Iteration => "iteration",
        Decision => "decision",
        Person => "person",
    }
);

closed_enum!(
    /// Semantic role of a directed edge.
    EdgeKind, "edge kind", TypeMismatch {
        DependsOn => "depends_on",
        Imports => "imports",
        Extends => "extends",
        Implements => "implements",
        Calls => "calls",
        References => "references",
        Contains => "contains",
        AssociatedWith => "associated_with",
        Precedes => "precedes",
        TransformsTo => "transforms_to",
        LeadsTo => "leads_to",
        ImplementsReq => "implements_req",
        CreatedBy => "created_by",
        ModifiedBy => "modified_by",
        PartOf => "part_of",
    }
);

closed_enum!(
    /// Format of a stored resource.
    ResourceKind, "resource kind", InvalidInput {
        Svg => "svg",
        Markdown => "markdown",
        Other => "other",
    }
);

impl ResourceKind {
    /// Whether artifacts of this kind live in the gateway's artifact storage.
    ///
    /// `Other` resources only point at an external path and are never
    /// written or removed by the store.
    pub fn is_stored_artifact(self) -> bool {
        matches!(self, Self::Svg | Self::Markdown)
    }

    /// File extension used for stored artifacts of this kind.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Svg => Some("svg"),
            Self::Markdown => Some("md"),
            Self::Other => None,
        }
    }
}
