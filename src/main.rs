//! `otzar-search`: full-text search over a Hebrew book corpus.
//!
//! This binary is a thin driver over the library modules below: the CLI
//! (`cli::run`) and HTTP adapter (`server::run`) are the only external
//! collaborators named by the specification; all search/indexing logic
//! lives in `index`, `search`, `source` and `text`.

mod cli;
mod error;
mod index;
mod models;
mod response;
mod search;
mod server;
mod source;
mod text;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match cli::run() {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
