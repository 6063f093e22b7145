use clap::Parser;
use seeql_core::QueryEngine;
use seeql_tools::logger::setup;
use seeql_tools::{load_graph, read_query, render_result, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
struct AppArgs {
    /// Graph document (JSON) to query
    #[clap(long, env = "SEEQL_GRAPH")]
    graph: PathBuf,
    /// Query text, e.g. "MATCH (n) WHERE n.LOC > 10 RETURN n"
    #[clap(long, conflicts_with = "query_file")]
    query: Option<String>,
    /// File containing the query text
    #[clap(long)]
    query_file: Option<PathBuf>,
    #[clap(long, default_value = "info")]
    log_level: String,
    /// Pretty-print the JSON result
    #[clap(long)]
    pretty: bool,
}

fn run(args: &AppArgs) -> Result<String> {
    let graph = load_graph(&args.graph)?;
    info!(
        "Loaded graph {} with {} nodes and {} edges",
        args.graph.display(),
        graph.node_count(),
        graph.edge_count()
    );
    let query = read_query(args.query.as_deref(), args.query_file.as_deref())?;

    let mut engine = QueryEngine::new(&graph);
    let result = engine.execute(&query)?;
    let rendered = render_result(&result, &graph);
    let output = if args.pretty {
        serde_json::to_string_pretty(&rendered)?
    } else {
        serde_json::to_string(&rendered)?
    };
    Ok(output)
}

fn main() -> ExitCode {
    let args = AppArgs::parse();
    setup(&["seeql", "seeql_core", "seeql_tools"], &args.log_level);
    info!("Received args: {args:?}");

    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
