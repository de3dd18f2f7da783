//! Response Encoder (spec §4.7).
//!
//! Maps a library [`Error`] onto the externally published error response
//! shape, never forwarding a Rust `Debug`/backtrace string across the
//! interface (spec §7).

use crate::error::Error;
use crate::models::SearchResponse;

/// Build the `status: error` response for a failure surfaced by the search
/// core. Every [`Error`] variant has a human-readable `Display`.
pub fn from_error(err: &Error) -> SearchResponse {
    SearchResponse::error(err.to_string())
}
