//! Query Compiler (spec §4.4).
//!
//! Translates `{query_text, wildcard_mode, book_filter?, category_filter?}`
//! into an internal query tree: escaped query string (ready for
//! `tantivy::query::QueryParser::parse_query`), a leading-wildcard flag, and
//! the optional filter clauses. One escaping table is shared between the
//! "escape everything" and "escape everything except wildcards" paths (spec
//! §9, to avoid the two modes drifting apart).

use crate::error::{Error, Result};
use crate::text::remove_diacritics;

/// Characters special to the query syntax (spec §4.4).
const SPECIAL_CHARS: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', ':', '/', '\\', '*', '?',
];

fn is_special(c: char) -> bool {
    SPECIAL_CHARS.contains(&c)
}

/// The compiled form of a Search Request's query + filters, ready to be
/// turned into tantivy queries by the search engine.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    /// Escaped query string to parse against `content`/`book_title_search`.
    pub content_query: String,
    /// Whether the parser should permit a leading wildcard (only set in
    /// wildcard mode).
    pub allow_leading_wildcard: bool,
    /// Exact term match on `book_title`, if `book_filter` was non-blank.
    pub book_filter: Option<String>,
    /// Substring (`*<filter>*`) match on `category_path`, if
    /// `category_filter` was non-blank.
    pub category_filter_pattern: Option<String>,
}

/// Compile a query request. Callers must check for a blank `query_text`
/// themselves (spec §4.4: "the compiler is not invoked" for a blank query).
pub fn compile(
    query_text: &str,
    wildcard_mode: bool,
    book_filter: Option<&str>,
    category_filter: Option<&str>,
) -> Result<CompiledQuery> {
    let (content_query, allow_leading_wildcard) = if wildcard_mode {
        (compile_wildcard(query_text)?, true)
    } else {
        (escape_all(query_text), false)
    };

    let book_filter = book_filter
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let category_filter_pattern = category_filter
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("*{s}*"));

    Ok(CompiledQuery {
        content_query,
        allow_leading_wildcard,
        book_filter,
        category_filter_pattern,
    })
}

/// Default mode: backslash-escape every special character (spec §4.4).
fn escape_all(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if is_special(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Wildcard mode: diacritics are removed, the string is split on ASCII
/// space, and each term is classified/validated/escaped independently
/// (spec §4.4 steps 1-4).
fn compile_wildcard(s: &str) -> Result<String> {
    let stripped = remove_diacritics(s);

    let terms: Vec<String> = stripped
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(compile_wildcard_term)
        .collect::<Result<Vec<_>>>()?;

    Ok(terms.join(" "))
}

/// Classify every character of one wildcard-mode term, validate it, and
/// return its escaped form.
fn compile_wildcard_term(term: &str) -> Result<String> {
    let mut out = String::with_capacity(term.len());
    let mut regular_chars = 0usize;
    let mut wildcard_chars = 0usize;

    let mut chars = term.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                    regular_chars += 1;
                }
                None => {
                    // A lone trailing backslash becomes an escaped backslash.
                    out.push('\\');
                    out.push('\\');
                    regular_chars += 1;
                }
            }
        } else if c == '*' || c == '?' {
            wildcard_chars += 1;
            out.push(c);
        } else if is_special(c) {
            out.push('\\');
            out.push(c);
            regular_chars += 1;
        } else {
            out.push(c);
            regular_chars += 1;
        }
    }

    if wildcard_chars > 0 && regular_chars == 0 {
        return Err(Error::InvalidRequest(format!(
            "wildcard term '{term}' has no regular character"
        )));
    }

    Ok(out)
}
