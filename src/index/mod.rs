//! Index schema and builder (spec §3, §4.3).
//!
//! Schema field layout exactly matches the table in spec §3. The builder
//! truncates the output directory, streams rows from the source database,
//! and performs exactly one commit, so an interrupted build leaves no
//! readable index at the target path (spec §4.3, §6).

use std::path::Path;
use std::time::Instant;

use tantivy::schema::{
    IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, INDEXED, STORED, STRING,
};
use tantivy::{Index, IndexSettings, IndexWriter, TantivyDocument};

use crate::error::{Error, Result};
use crate::models::IndexBuildSummary;
use crate::source::{build_category_paths, SourceDb};
use crate::text::analyzer::{HebrewAnalyzer, ANALYZER_NAME};
use crate::text::strip_markup;

/// Writer heap budget for bulk inserts (spec §4.3: "hundreds of MB").
const WRITER_HEAP_BYTES: usize = 300_000_000;

/// Handles to every field in the indexed-document schema (spec §3).
#[derive(Debug, Clone, Copy)]
pub struct Fields {
    pub line_id: tantivy::schema::Field,
    pub he_ref: tantivy::schema::Field,
    pub line_index: tantivy::schema::Field,
    pub book_id: tantivy::schema::Field,
    pub book_title: tantivy::schema::Field,
    pub category_path: tantivy::schema::Field,
    pub content: tantivy::schema::Field,
    pub book_title_search: tantivy::schema::Field,
}

/// Build the schema described in spec §3's field table.
pub fn build_schema() -> (Schema, Fields) {
    let mut builder = Schema::builder();

    let analyzed = TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(ANALYZER_NAME)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        )
        .set_stored();

    let analyzed_unstored = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(ANALYZER_NAME)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    );

    let line_id = builder.add_i64_field("line_id", STORED);
    let he_ref = builder.add_text_field("he_ref", STORED);
    let line_index = builder.add_i64_field("line_index", STORED);
    let book_id = builder.add_i64_field("book_id", STORED | INDEXED | FAST);
    let book_title = builder.add_text_field("book_title", STRING | STORED);
    let category_path = builder.add_text_field("category_path", STRING | STORED);
    let content = builder.add_text_field("content", analyzed);
    let book_title_search = builder.add_text_field("book_title_search", analyzed_unstored);

    let schema = builder.build();
    let fields = Fields {
        line_id,
        he_ref,
        line_index,
        book_id,
        book_title,
        category_path,
        content,
        book_title_search,
    };

    (schema, fields)
}

/// Recover field handles from an already-open index's schema (used when
/// opening an existing index for search, as opposed to building one).
pub fn load_fields(schema: &Schema) -> Result<Fields> {
    let get = |name: &str| {
        schema
            .get_field(name)
            .map_err(|_| Error::InternalError(format!("index is missing field '{name}'")))
    };

    Ok(Fields {
        line_id: get("line_id")?,
        he_ref: get("he_ref")?,
        line_index: get("line_index")?,
        book_id: get("book_id")?,
        book_title: get("book_title")?,
        category_path: get("category_path")?,
        content: get("content")?,
        book_title_search: get("book_title_search")?,
    })
}

/// Register the Hebrew analyzer on `index` under [`ANALYZER_NAME`]. Must be
/// called both when building and when opening the index for search, so the
/// stored term stream and the query-side analyzer stay identical (spec
/// §4.2, §9 "Analyzer sharing").
pub fn register_analyzer(index: &Index) {
    let analyzer = tantivy::tokenizer::TextAnalyzer::from(HebrewAnalyzer);
    index.tokenizers().register(ANALYZER_NAME, analyzer);
}

/// Build a fresh index at `output_path` from the source database at
/// `db_path` (spec §4.3).
pub fn build_index(db_path: &Path, output_path: &Path) -> Result<IndexBuildSummary> {
    let started = Instant::now();
    tracing::debug!(db_path = %db_path.display(), output_path = %output_path.display(), "starting index build");

    let source = SourceDb::open(db_path)?;

    std::fs::remove_dir_all(output_path).ok();
    std::fs::create_dir_all(output_path)
        .map_err(|e| Error::SourceError(format!("failed to create {}: {e}", output_path.display())))?;

    let (schema, fields) = build_schema();
    let dir = tantivy::directory::MmapDirectory::open(output_path)
        .map_err(|e| Error::SourceError(format!("failed to open index directory: {e}")))?;
    let index = Index::create(dir, schema, IndexSettings::default())
        .map_err(|e| Error::SourceError(format!("failed to create index: {e}")))?;
    register_analyzer(&index);

    let mut writer: IndexWriter = index
        .writer(WRITER_HEAP_BYTES)
        .map_err(|e| Error::SourceError(format!("failed to create index writer: {e}")))?;

    let books = source.load_books()?;
    let categories = source.load_categories()?;
    let category_paths = build_category_paths(&categories);

    let books_by_id: std::collections::HashMap<i64, &crate::models::BookRow> =
        books.iter().map(|b| (b.id, b)).collect();

    let mut documents_indexed: u64 = 0;

    source.for_each_line(|line| {
        let content = match &line.content {
            Some(c) if !c.trim().is_empty() => c,
            _ => return Ok(()),
        };

        let book = books_by_id.get(&line.book_id);
        let book_title = book.map(|b| b.title.as_str()).unwrap_or("");
        let category_path = book
            .and_then(|b| b.category_id)
            .and_then(|cid| category_paths.get(&cid))
            .map(|s| s.as_str())
            .unwrap_or("");

        // Store the tag-stripped content (spec §3: "the stored value is the
        // tag-stripped content, so the engine can highlight into the
        // user-visible string without re-fetching").
        let stripped_content = strip_markup(content);

        let mut doc = TantivyDocument::default();
        doc.add_i64(fields.line_id, line.id);
        doc.add_text(fields.he_ref, line.he_ref.as_deref().unwrap_or(""));
        doc.add_i64(fields.line_index, line.line_index as i64);
        doc.add_i64(fields.book_id, line.book_id);
        doc.add_text(fields.book_title, book_title);
        doc.add_text(fields.category_path, category_path);
        doc.add_text(fields.content, &stripped_content);
        doc.add_text(fields.book_title_search, book_title);

        writer
            .add_document(doc)
            .map_err(|e| Error::SourceError(format!("failed to add document: {e}")))?;

        documents_indexed += 1;
        Ok(())
    })?;

    writer
        .commit()
        .map_err(|e| Error::SourceError(format!("failed to commit index: {e}")))?;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    tracing::info!(
        documents_indexed,
        elapsed_ms,
        output_path = %output_path.display(),
        "index build committed"
    );

    Ok(IndexBuildSummary {
        db_path: db_path.display().to_string(),
        output_path: output_path.display().to_string(),
        documents_indexed,
        elapsed_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use tempfile::tempdir;

    fn write_fixture_db(path: &Path) {
        let conn = Connection::open(path).expect("open sqlite");
        conn.execute_batch(
            "CREATE TABLE book (id INTEGER, title TEXT, categoryId INTEGER);
             CREATE TABLE category (id INTEGER, title TEXT, parentId INTEGER);
             CREATE TABLE line (id INTEGER, bookId INTEGER, lineIndex INTEGER, content TEXT, heRef TEXT);",
        )
        .expect("create schema");

        conn.execute(
            "INSERT INTO category (id, title, parentId) VALUES (1, 'תנ״ך', NULL), (2, 'תורה', 1)",
            [],
        )
        .expect("insert categories");
        conn.execute(
            "INSERT INTO book (id, title, categoryId) VALUES (1, 'בראשית', 2)",
            [],
        )
        .expect("insert book");
        conn.execute(
            "INSERT INTO line (id, bookId, lineIndex, content, heRef) VALUES \
             (1, 1, 0, 'בְּרֵאשִׁית בָּרָא אֱלֹהִים', 'בראשית א א'), \
             (2, 1, 1, '   ', 'בראשית א ב'), \
             (3, 1, 2, NULL, 'בראשית א ג')",
            [],
        )
        .expect("insert lines");
    }

    #[test]
    fn build_skips_blank_and_null_content_lines() {
        let dir = tempdir().expect("tempdir");
        let db_path = dir.path().join("source.sqlite");
        write_fixture_db(&db_path);

        let output_path = dir.path().join("index");
        let summary = build_index(&db_path, &output_path).expect("build index");

        assert_eq!(summary.documents_indexed, 1);
    }

    #[test]
    fn build_fails_cleanly_on_missing_database() {
        let dir = tempdir().expect("tempdir");
        let db_path = dir.path().join("missing.sqlite");
        let output_path = dir.path().join("index");

        let err = build_index(&db_path, &output_path).unwrap_err();
        assert!(matches!(err, Error::SourceError(_)));
    }

    #[test]
    fn stored_content_has_markup_stripped() {
        let dir = tempdir().expect("tempdir");
        let db_path = dir.path().join("source.sqlite");
        let conn = Connection::open(&db_path).expect("open sqlite");
        conn.execute_batch(
            "CREATE TABLE book (id INTEGER, title TEXT, categoryId INTEGER);
             CREATE TABLE category (id INTEGER, title TEXT, parentId INTEGER);
             CREATE TABLE line (id INTEGER, bookId INTEGER, lineIndex INTEGER, content TEXT, heRef TEXT);",
        )
        .expect("create schema");
        conn.execute(
            "INSERT INTO book (id, title, categoryId) VALUES (1, 'בראשית', NULL)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO line (id, bookId, lineIndex, content, heRef) VALUES \
             (1, 1, 0, '<b>ברא</b>שית', 'בראשית א א')",
            [],
        )
        .unwrap();

        let output_path = dir.path().join("index");
        build_index(&db_path, &output_path).expect("build index");

        let dir_handle =
            tantivy::directory::MmapDirectory::open(&output_path).expect("open dir");
        let index = Index::open(dir_handle).expect("open index");
        register_analyzer(&index);
        let fields = load_fields(&index.schema()).expect("load fields");
        let reader = index.reader().expect("reader");
        let searcher = reader.searcher();
        let doc: TantivyDocument = searcher.doc(tantivy::DocAddress::new(0, 0)).expect("doc");
        let stored: &str = doc
            .get_first(fields.content)
            .and_then(tantivy::schema::Value::as_str)
            .unwrap();
        assert!(!stored.contains('<'));
        assert!(!stored.contains('>'));
    }
}
