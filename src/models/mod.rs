//! Wire and domain model types.
//!
//! `SearchRequest`/`SearchResponse`/`Hit` are the Search Request/Response
//! contract (spec §6); the remaining types are the relational source rows
//! and build summary consumed by the index builder.

use serde::{Deserialize, Serialize};

/// Default `limit` when a Search Request omits it.
pub const DEFAULT_LIMIT: i32 = 50;

/// A request to run one search against an open index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,

    #[serde(default = "default_limit")]
    pub limit: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_filter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_filter: Option<String>,

    #[serde(default)]
    pub wildcard_mode: bool,
}

fn default_limit() -> i32 {
    DEFAULT_LIMIT
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            limit: DEFAULT_LIMIT,
            book_filter: None,
            category_filter: None,
            wildcard_mode: false,
        }
    }
}

/// Status discriminant of a [`SearchResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// The externally published search response (spec §6, §4.7).
///
/// `message` is only present when `status` is `error`; `query`, `total_hits`,
/// `elapsed_ms` and `results` are only meaningfully populated on success, and
/// are omitted from the encoded JSON when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub status: ResponseStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_hits: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,

    #[serde(default)]
    pub results: Vec<Hit>,
}

impl SearchResponse {
    /// Build a success response from a completed search.
    pub fn success(query: String, total_hits: u64, elapsed_ms: u64, results: Vec<Hit>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            query: Some(query),
            total_hits: Some(total_hits),
            elapsed_ms: Some(elapsed_ms),
            results,
        }
    }

    /// Build the zero-hit response for a blank query (spec §4.4, §8): the
    /// compiler is never invoked.
    pub fn empty(query: String) -> Self {
        Self::success(query, 0, 0, Vec::new())
    }

    /// Build an error response carrying a human-readable message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: Some(message.into()),
            query: None,
            total_hits: None,
            elapsed_ms: None,
            results: Vec::new(),
        }
    }
}

/// One returned document plus its rank, score and snippet (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    /// 1-based position within this result page.
    pub rank: usize,
    pub line_id: i64,
    pub book_id: i64,
    pub line_index: i32,
    pub book_title: String,
    pub category_path: String,
    pub he_ref: String,
    /// May contain `<mark>...</mark>` markers around matched terms.
    pub snippet: String,
    /// Higher is better.
    pub score: f32,
}

/// Source row: `book(id, title, categoryId)` (spec §6).
#[derive(Debug, Clone)]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub category_id: Option<i64>,
}

/// Source row: `category(id, title, parentId)` (spec §6).
#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: i64,
    pub title: String,
    pub parent_id: Option<i64>,
}

/// Source row: `line(id, bookId, lineIndex, content, heRef)` (spec §6).
#[derive(Debug, Clone)]
pub struct LineRow {
    pub id: i64,
    pub book_id: i64,
    pub line_index: i32,
    pub content: Option<String>,
    pub he_ref: Option<String>,
}

/// Summary of a completed (or attempted) index build, returned by the
/// builder and reported by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexBuildSummary {
    pub db_path: String,
    pub output_path: String,
    pub documents_indexed: u64,
    pub elapsed_ms: u64,
}
