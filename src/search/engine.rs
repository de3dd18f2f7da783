//! Search Engine (spec §4.5).
//!
//! Holds an open read-only index snapshot and the shared analyzer for its
//! lifetime; `search` compiles the request, runs a top-K query, and
//! assembles hits with stored fields, rank, score and snippet.

use std::path::Path;
use std::time::Instant;

use tantivy::collector::{Count, TopDocs};
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, RegexQuery, TermQuery};
use tantivy::schema::{IndexRecordOption, Schema, Value};
use tantivy::{Index, IndexReader, TantivyDocument, Term};

use crate::error::{Error, Result};
use crate::index::{self, Fields};
use crate::models::{Hit, SearchRequest, SearchResponse};
use crate::response;
use crate::search::compiler::{self, CompiledQuery};
use crate::search::snippet::build_snippet;

/// Owns the read-only index handle used to answer searches.
pub struct SearchEngine {
    index: Index,
    reader: IndexReader,
    fields: Fields,
}

impl SearchEngine {
    /// Open a read-only snapshot of the index at `index_path` (spec §4.5
    /// lifecycle). Returns [`Error::NotFound`] if the directory is absent.
    pub fn open(index_path: &Path) -> Result<Self> {
        if !index_path.exists() {
            return Err(Error::NotFound(index_path.display().to_string()));
        }

        let dir = tantivy::directory::MmapDirectory::open(index_path)
            .map_err(|e| Error::InternalError(format!("failed to open index directory: {e}")))?;
        let index = Index::open(dir)
            .map_err(|e| Error::InternalError(format!("failed to open index: {e}")))?;
        index::register_analyzer(&index);

        let schema: Schema = index.schema();
        let fields = index::load_fields(&schema)?;

        let reader = index
            .reader()
            .map_err(|e| Error::InternalError(format!("failed to build index reader: {e}")))?;

        Ok(Self {
            index,
            reader,
            fields,
        })
    }

    /// Run one search (spec §4.5). Never returns `Err`: every failure mode
    /// named by the error-handling design (§7) is folded into an error
    /// response instead.
    pub fn search(&self, request: &SearchRequest) -> SearchResponse {
        let started = Instant::now();

        if request.query.trim().is_empty() {
            return SearchResponse::empty(request.query.clone());
        }

        let compiled = match compiler::compile(
            &request.query,
            request.wildcard_mode,
            request.book_filter.as_deref(),
            request.category_filter.as_deref(),
        ) {
            Ok(c) => c,
            Err(e) => return response::from_error(&e),
        };

        let query = match self.build_query(&compiled, request.wildcard_mode) {
            Ok(q) => q,
            Err(e) => return response::from_error(&e),
        };

        let limit = request.limit.max(1) as usize;
        let searcher = self.reader.searcher();

        let (total_hits, top_docs) =
            match searcher.search(&*query, &(Count, TopDocs::with_limit(limit))) {
                Ok(r) => r,
                Err(e) => {
                    return response::from_error(&Error::InternalError(format!(
                        "search failed: {e}"
                    )))
                }
            };

        let mut results = Vec::with_capacity(top_docs.len());
        for (rank, (score, address)) in top_docs.into_iter().enumerate() {
            let retrieved: TantivyDocument = match searcher.doc(address) {
                Ok(d) => d,
                Err(_) => continue,
            };

            results.push(self.build_hit(rank + 1, score, &retrieved, &request.query));
        }

        SearchResponse::success(
            request.query.clone(),
            total_hits as u64,
            started.elapsed().as_millis() as u64,
            results,
        )
    }

    fn build_hit(&self, rank: usize, score: f32, doc: &TantivyDocument, raw_query: &str) -> Hit {
        let line_id = first_i64(doc, self.fields.line_id);
        let book_id = first_i64(doc, self.fields.book_id);
        let line_index = first_i64(doc, self.fields.line_index) as i32;
        let book_title = first_text(doc, self.fields.book_title);
        let category_path = first_text(doc, self.fields.category_path);
        let he_ref = first_text(doc, self.fields.he_ref);
        let content = first_text(doc, self.fields.content);

        let snippet = build_snippet(&content, raw_query);

        Hit {
            rank,
            line_id,
            book_id,
            line_index,
            book_title,
            category_path,
            he_ref,
            snippet,
            score,
        }
    }

    /// Turn a [`CompiledQuery`] into a concrete tantivy query (spec §4.4
    /// filter composition). Default mode is parsed through the real
    /// `QueryParser` (the whole point of full escaping is to make arbitrary
    /// user text safe for its grammar); wildcard mode is compiled directly
    /// into anchored `RegexQuery`s per term, avoiding cross-version
    /// ambiguity in the parser's own wildcard handling.
    fn build_query(&self, compiled: &CompiledQuery, wildcard_mode: bool) -> Result<Box<dyn Query>> {
        let content_query: Box<dyn Query> = if wildcard_mode {
            self.build_wildcard_query(&compiled.content_query)?
        } else {
            // `content` is the primary full-text target; `book_title_search`
            // is the secondary signal the same analyzed terms also match
            // against (spec §3), so both are queried by the default parser.
            let mut parser = QueryParser::for_index(
                &self.index,
                vec![self.fields.content, self.fields.book_title_search],
            );
            parser.set_conjunction_by_default();
            parser
                .parse_query(&compiled.content_query)
                .map_err(|e| Error::ParseError(e.to_string()))?
        };

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, content_query)];

        if let Some(book_filter) = &compiled.book_filter {
            let term = Term::from_field_text(self.fields.book_title, book_filter);
            let query = TermQuery::new(term, IndexRecordOption::Basic);
            clauses.push((Occur::Must, Box::new(query)));
        }

        if let Some(pattern) = &compiled.category_filter_pattern {
            let regex = glob_to_regex(pattern);
            let query = RegexQuery::from_pattern(&regex, self.fields.category_path)
                .map_err(|e| Error::ParseError(e.to_string()))?;
            clauses.push((Occur::Must, Box::new(query)));
        }

        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    fn build_wildcard_query(&self, content_query: &str) -> Result<Box<dyn Query>> {
        let terms: Vec<&str> = content_query.split(' ').filter(|t| !t.is_empty()).collect();
        if terms.is_empty() {
            return Ok(Box::new(tantivy::query::EmptyQuery));
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(terms.len());
        for term in terms {
            let pattern = format!("^{}$", escaped_term_to_regex(term));
            let regex = RegexQuery::from_pattern(&pattern, self.fields.content)
                .map_err(|e| Error::ParseError(e.to_string()))?;
            clauses.push((Occur::Must, Box::new(regex)));
        }

        Ok(Box::new(BooleanQuery::new(clauses)))
    }
}

fn first_i64(doc: &TantivyDocument, field: tantivy::schema::Field) -> i64 {
    doc.get_first(field).and_then(Value::as_i64).unwrap_or(0)
}

fn first_text(doc: &TantivyDocument, field: tantivy::schema::Field) -> String {
    doc.get_first(field)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

/// Convert an already-escaped wildcard-mode term into a `regex`-crate
/// pattern: literal `*`/`?` become `.*`/`.`, `\X` becomes a regex-escaped
/// literal `X`, and every other character is regex-escaped if needed.
fn escaped_term_to_regex(term: &str) -> String {
    let mut out = String::with_capacity(term.len() * 2);
    let mut chars = term.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push_str(&regex_escape_char(escaped));
                }
            }
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex_escape_char(other)),
        }
    }

    out
}

/// Convert a `*<text>*` substring-filter pattern into an anchorless regex.
fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::new();
    for c in pattern.chars() {
        if c == '*' {
            out.push_str(".*");
        } else {
            out.push_str(&regex_escape_char(c));
        }
    }
    out
}

fn regex_escape_char(c: char) -> String {
    if matches!(
        c,
        '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
    ) {
        format!("\\{c}")
    } else {
        c.to_string()
    }
}
