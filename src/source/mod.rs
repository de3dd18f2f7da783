//! Read-only access to the relational source database (spec §3, §6).
//!
//! Mirrors the teacher's `index::sqlite` connection-open idiom, simplified
//! to a read-only reader: no write pragmas, no schema migration, a single
//! connection used to stream `book`, `category` and `line` rows.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::error::{Error, Result};
use crate::models::{BookRow, CategoryRow, LineRow};

/// Safe chain-depth cap for category path resolution (spec §3, §4.3 step 4):
/// prevents path-building loops in malformed inputs without needing a
/// visited set.
pub const MAX_CATEGORY_DEPTH: usize = 20;

/// A read-only handle on the source database.
pub struct SourceDb {
    conn: Connection,
}

impl SourceDb {
    /// Open `path` read-only. Returns [`Error::SourceError`] if the database
    /// does not exist or cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::SourceError(format!(
                "source database not found at {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| Error::SourceError(format!("failed to open {}: {e}", path.display())))?;

        Ok(Self { conn })
    }

    /// Load every book row into memory.
    pub fn load_books(&self) -> Result<Vec<BookRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, categoryId FROM book")
            .map_err(|e| Error::SourceError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(BookRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    category_id: row.get(2)?,
                })
            })
            .map_err(|e| Error::SourceError(e.to_string()))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::SourceError(e.to_string()))
    }

    /// Load every category row into memory.
    pub fn load_categories(&self) -> Result<Vec<CategoryRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, parentId FROM category")
            .map_err(|e| Error::SourceError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(CategoryRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    parent_id: row.get(2)?,
                })
            })
            .map_err(|e| Error::SourceError(e.to_string()))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::SourceError(e.to_string()))
    }

    /// Stream every line row ordered by `(bookId, lineIndex)`, invoking
    /// `f` for each row. Streaming (rather than collecting) keeps peak
    /// memory bounded for the ~5.45M-row corpus the spec targets.
    pub fn for_each_line<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(LineRow) -> Result<()>,
    {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, bookId, lineIndex, content, heRef FROM line \
                 ORDER BY bookId, lineIndex",
            )
            .map_err(|e| Error::SourceError(e.to_string()))?;

        let mut rows = stmt
            .query([])
            .map_err(|e| Error::SourceError(e.to_string()))?;

        while let Some(row) = rows.next().map_err(|e| Error::SourceError(e.to_string()))? {
            let line = LineRow {
                id: row.get(0).map_err(|e| Error::SourceError(e.to_string()))?,
                book_id: row.get(1).map_err(|e| Error::SourceError(e.to_string()))?,
                line_index: row.get(2).map_err(|e| Error::SourceError(e.to_string()))?,
                content: row.get(3).map_err(|e| Error::SourceError(e.to_string()))?,
                he_ref: row.get(4).map_err(|e| Error::SourceError(e.to_string()))?,
            };
            f(line)?;
        }

        Ok(())
    }
}

/// Precompute `category_id -> category_path` for every category (spec §4.3
/// step 4). Each path is the root-to-leaf titles of the chain joined by `/`.
/// Traversal is capped at [`MAX_CATEGORY_DEPTH`] hops; a malformed cycle
/// falls through the cap and yields a partial path rather than an error.
pub fn build_category_paths(categories: &[CategoryRow]) -> HashMap<i64, String> {
    let by_id: HashMap<i64, &CategoryRow> = categories.iter().map(|c| (c.id, c)).collect();
    let mut paths = HashMap::with_capacity(categories.len());

    for category in categories {
        let mut titles = Vec::new();
        let mut current = Some(category.id);
        let mut hops = 0;

        while let Some(id) = current {
            if hops >= MAX_CATEGORY_DEPTH {
                break;
            }
            let Some(node) = by_id.get(&id) else {
                break;
            };
            titles.push(node.title.clone());
            current = node.parent_id;
            hops += 1;
        }

        titles.reverse();
        paths.insert(category.id, titles.join("/"));
    }

    paths
}
