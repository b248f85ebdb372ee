//! CLI logic for the Cartograph graph registry.
//!
//! Every invocation opens the file-backed store in the data directory, runs
//! one operation and prints its result as pretty JSON.

pub mod error_adapter;

mod args;
mod config;
mod error;

pub use args::{Args, Command};
pub use config::ConfigError;
pub use error::CliError;

use std::{
    fs,
    io::{self, Write},
};

use log::info;
use serde::Serialize;

use cartograph::{
    GraphError, GraphStore,
    identifier::{GraphId, NodeId},
    kind::GraphKind,
    persistence::{JsonFileGateway, PersistenceGateway},
    store::{GraphFilter, NewEdge, NewNode},
};

/// Run the Cartograph CLI application, printing results to stdout
///
/// # Errors
///
/// Returns `CliError` for:
/// - Configuration loading errors
/// - Store errors, tagged with their error kind
/// - File I/O errors
pub fn run(args: &Args) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_output(args, &mut out)
}

/// Run the CLI, writing results to `out`
pub fn run_with_output(args: &Args, out: &mut impl Write) -> Result<(), CliError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let gateway = JsonFileGateway::new(&args.data_dir);
    let mut store = GraphStore::open(gateway, &app_config)?;

    match &args.command {
        Command::List { status, kind } => {
            let mut filter = GraphFilter::default();
            if let Some(status) = status {
                filter = filter.with_status(status.parse()?);
            }
            if let Some(kind) = kind {
                filter = filter.with_kind(kind.parse()?);
            }
            print_json(out, &store.list_graphs(&filter))
        }
        Command::Create {
            name,
            kind,
            description,
        } => {
            let kind = kind.as_deref().map(str::parse::<GraphKind>).transpose()?;
            let graph = store.create_graph(name, kind, description.clone())?;
            print_json(out, &graph)
        }
        Command::Show { graph } => print_json(out, store.get_graph(*graph)?),
        Command::AddNode {
            graph,
            name,
            kind,
            description,
            file_path,
        } => {
            let mut new = NewNode::new(kind.parse()?, name.as_str());
            if let Some(description) = description {
                new = new.with_description(description.as_str());
            }
            if let Some(file_path) = file_path {
                new = new.with_file_path(file_path.as_str());
            }
            let node = store.add_node(*graph, new)?;
            print_json(out, &node)
        }
        Command::AddEdge {
            graph,
            source,
            target,
            kind,
            label,
            weight,
        } => {
            let source = resolve_node(&store, *graph, source)?;
            let target = resolve_node(&store, *graph, target)?;
            let mut new = NewEdge::new(kind.parse()?, source, target);
            new.label = label.clone();
            new.weight = *weight;
            let edge = store.add_edge(*graph, new)?;
            print_json(out, &edge)
        }
        Command::DeleteNode { graph, node } => {
            let node = resolve_node(&store, *graph, node)?;
            let removal = store.delete_node(*graph, node)?;
            print_json(out, &removal)
        }
        Command::ShowNode { graph, node } => {
            let node = resolve_node(&store, *graph, node)?;
            print_json(out, &store.get_node_details(*graph, node)?)
        }
        Command::Publish { graph } => {
            let graph = store.publish_graph(*graph)?;
            print_json(out, &graph)
        }
        Command::Archive { graph } => {
            let graph = store.archive_graph(*graph)?;
            print_json(out, &graph)
        }
        Command::Render { graph, output } => {
            let svg = store.render_graph(*graph)?;
            fs::write(output, svg)?;
            info!(graph_id:% = graph, output_file = output.as_str(); "SVG exported successfully");
            Ok(())
        }
    }
}

/// Resolves a node given either by id or by name.
fn resolve_node<G: PersistenceGateway>(
    store: &GraphStore<G>,
    graph_id: GraphId,
    reference: &str,
) -> Result<NodeId, GraphError> {
    let graph = store.get_graph(graph_id)?;
    let by_id = reference
        .parse::<NodeId>()
        .ok()
        .and_then(|id| graph.node(id));
    by_id
        .or_else(|| graph.node_by_name(reference.trim()))
        .map(|node| node.id)
        .ok_or_else(|| {
            GraphError::NotFound(format!(
                "no node with id or name `{reference}` in graph `{graph_id}`"
            ))
        })
}

fn print_json(out: &mut impl Write, value: &impl Serialize) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
