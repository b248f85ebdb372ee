//! Command-line argument definitions for the Cartograph CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global arguments select the data directory, configuration
//! file and logging verbosity; the [`Command`] picks the store operation.
//!
//! Node arguments accept either a node id or a node name.

use clap::{Parser, Subcommand};

use cartograph::identifier::GraphId;

/// Command-line arguments for the Cartograph graph registry
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding the registry snapshot and artifacts
    #[arg(long, global = true, default_value = ".cartograph")]
    pub data_dir: String,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List graphs as JSON summaries
    List {
        /// Only graphs with this status (draft, published, archived)
        #[arg(long)]
        status: Option<String>,

        /// Only graphs of this kind
        #[arg(long)]
        kind: Option<String>,
    },

    /// Create a draft graph
    Create {
        name: String,

        /// Graph kind (topology, timeline, changelog, requirement, knowledge_base, ontology)
        #[arg(short, long)]
        kind: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Print a whole graph as JSON
    Show { graph: GraphId },

    /// Add a node to a graph
    AddNode {
        graph: GraphId,

        name: String,

        /// Node kind, e.g. component or event
        #[arg(short, long)]
        kind: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        file_path: Option<String>,
    },

    /// Add an edge between two nodes
    AddEdge {
        graph: GraphId,

        /// Source node id or name
        source: String,

        /// Target node id or name
        target: String,

        /// Edge kind, e.g. depends_on
        #[arg(short, long)]
        kind: String,

        #[arg(short, long)]
        label: Option<String>,

        #[arg(short, long)]
        weight: Option<f64>,
    },

    /// Delete a node and its edges
    DeleteNode {
        graph: GraphId,

        /// Node id or name
        node: String,
    },

    /// Print a node with its edges and resources
    ShowNode {
        graph: GraphId,

        /// Node id or name
        node: String,
    },

    /// Publish a graph, rendering its visualization
    Publish { graph: GraphId },

    /// Archive a graph, making it read-only
    Archive { graph: GraphId },

    /// Render a graph to an SVG file without changing it
    Render {
        graph: GraphId,

        /// Path to the output SVG file
        #[arg(short, long, default_value = "out.svg")]
        output: String,
    },
}
