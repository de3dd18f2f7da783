//! Thin CLI driver (spec SPEC_FULL §10.1).
//!
//! Two subcommands calling straight into the library: `index` runs the
//! Index Builder and prints an [`IndexBuildSummary`](crate::models::IndexBuildSummary)
//! as JSON; `search` opens the [`SearchEngine`](crate::search::SearchEngine)
//! and prints a [`SearchResponse`](crate::models::SearchResponse) as JSON.
//! Both emit a single UTF-8 JSON document on stdout and set the process
//! exit code from the outcome (spec §6's process-interface clause).

mod args;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

pub use args::{Cli, Commands, IndexArgs, SearchArgs, ServeArgs};

use crate::index::build_index;
use crate::models::ResponseStatus;
use crate::search::SearchEngine;

/// Entry point for the CLI binary. Returns the process exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Index(args) => run_index(&args),
        Commands::Search(args) => run_search(&args),
        Commands::Serve(args) => run_serve(&args),
    }
}

fn run_index(args: &IndexArgs) -> Result<i32> {
    match build_index(&args.db_path, &args.output_path) {
        Ok(summary) => {
            serde_json::to_writer(std::io::stdout(), &summary)
                .context("failed to write index summary")?;
            println!();
            Ok(0)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(1)
        }
    }
}

fn run_search(args: &SearchArgs) -> Result<i32> {
    let engine = match SearchEngine::open(&args.index_path) {
        Ok(engine) => engine,
        Err(err) => {
            let response = crate::response::from_error(&err);
            serde_json::to_writer(std::io::stdout(), &response)
                .context("failed to write search response")?;
            println!();
            return Ok(1);
        }
    };

    let request = args::search_request_from_args(args);
    let response = engine.search(&request);
    let exit_code = match response.status {
        ResponseStatus::Success => 0,
        ResponseStatus::Error => 1,
    };

    serde_json::to_writer(std::io::stdout(), &response)
        .context("failed to write search response")?;
    println!();

    Ok(exit_code)
}

fn run_serve(args: &ServeArgs) -> Result<i32> {
    let addr: SocketAddr = args
        .addr
        .parse()
        .with_context(|| format!("invalid --addr value '{}'", args.addr))?;

    let engine = SearchEngine::open(&args.index_path)
        .with_context(|| format!("failed to open index at {}", args.index_path.display()))?;

    println!("Starting otzar-search HTTP server on http://{addr}");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(crate::server::run(addr, engine))?;
    Ok(0)
}
