use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::models::{SearchRequest, DEFAULT_LIMIT};

/// Top-level CLI entrypoint for `otzar-search`.
#[derive(Parser, Debug)]
#[command(
    name = "otzar-search",
    about = "Full-text search over a Hebrew book corpus",
    author = "otzar-search developers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI subcommands (spec SPEC_FULL §10.1).
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a fresh index from the relational source database.
    Index(IndexArgs),
    /// Run one search against an already-built index.
    Search(SearchArgs),
    /// Run the HTTP adapter (spec SPEC_FULL §10.2).
    Serve(ServeArgs),
}

/// Arguments for the `index` subcommand.
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Path to the source SQLite database.
    #[arg(long = "db-path")]
    pub db_path: PathBuf,

    /// Output directory for the built index. Created or truncated.
    #[arg(long = "output-path")]
    pub output_path: PathBuf,
}

/// Arguments for the `search` subcommand.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Path to a previously built index directory.
    #[arg(long = "index-path")]
    pub index_path: PathBuf,

    /// Query text.
    #[arg(long = "query")]
    pub query: String,

    /// Maximum number of hits to return.
    #[arg(long = "limit", default_value_t = DEFAULT_LIMIT)]
    pub limit: i32,

    /// Exact book title filter.
    #[arg(long = "book-filter")]
    pub book_filter: Option<String>,

    /// Partial category-path filter (substring match).
    #[arg(long = "category-filter")]
    pub category_filter: Option<String>,

    /// Enable wildcard mode (`*`/`?` operators, gated off by default).
    #[arg(long = "wildcard-mode")]
    pub wildcard_mode: bool,
}

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind the HTTP server to, e.g. "127.0.0.1:7979".
    #[arg(long = "addr", default_value = "127.0.0.1:7979")]
    pub addr: String,

    /// Path to the index directory served by this process.
    #[arg(long = "index-path")]
    pub index_path: PathBuf,
}

/// Build a [`SearchRequest`] from CLI `SearchArgs`.
pub fn search_request_from_args(args: &SearchArgs) -> SearchRequest {
    SearchRequest {
        query: args.query.clone(),
        limit: args.limit,
        book_filter: args.book_filter.clone(),
        category_filter: args.category_filter.clone(),
        wildcard_mode: args.wildcard_mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_request_carries_all_fields() {
        let args = SearchArgs {
            index_path: PathBuf::from("/tmp/idx"),
            query: "ברא".to_string(),
            limit: 10,
            book_filter: Some("בראשית".to_string()),
            category_filter: Some("תורה".to_string()),
            wildcard_mode: true,
        };

        let request = search_request_from_args(&args);
        assert_eq!(request.query, "ברא");
        assert_eq!(request.limit, 10);
        assert_eq!(request.book_filter.as_deref(), Some("בראשית"));
        assert_eq!(request.category_filter.as_deref(), Some("תורה"));
        assert!(request.wildcard_mode);
    }

    #[test]
    fn search_request_defaults_limit_when_unset() {
        let args = SearchArgs {
            index_path: PathBuf::from("/tmp/idx"),
            query: "ברא".to_string(),
            limit: DEFAULT_LIMIT,
            book_filter: None,
            category_filter: None,
            wildcard_mode: false,
        };

        let request = search_request_from_args(&args);
        assert_eq!(request.limit, DEFAULT_LIMIT);
    }
}
