//! SQLite access layer for content and the search index.
//!
//! [`ContentStore`] wraps one `rusqlite` connection. Every statement goes
//! through [`Connection::prepare_cached`], and everything a rebuild writes
//! runs on this same connection so a single transaction opened on it covers
//! the truncation and every index write.

use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::db::converters::{row_to_element, row_to_element_type, row_to_site};
use crate::db::schema::initialize_database;
use crate::error::{Result, SiteSearchError};
use crate::types::{
    Element, ElementId, ElementType, IndexEntry, IndexStats, NewElement, Site, SiteId,
};

// ---------------------------------------------------------------------------
// SQL constants
// ---------------------------------------------------------------------------

const DISTINCT_ELEMENT_TYPES_SQL: &str = "\
SELECT DISTINCT type FROM elements
WHERE date_deleted IS NULL
ORDER BY type ASC";

const ELEMENTS_AT_SITE_SQL: &str = "\
SELECT e.id, e.type, es.site_id, es.title, es.content, e.status, e.trashed, e.date_deleted
FROM elements e
JOIN element_sites es ON es.element_id = e.id
WHERE e.type = ?1
  AND es.site_id = ?2
  AND e.trashed = 0
  AND e.date_deleted IS NULL
ORDER BY e.id ASC";

const COUNT_ELEMENTS_AT_SITE_SQL: &str = "\
SELECT COUNT(*)
FROM elements e
JOIN element_sites es ON es.element_id = e.id
WHERE e.type = ?1
  AND es.site_id = ?2
  AND e.trashed = 0
  AND e.date_deleted IS NULL";

const ELEMENT_AT_SITE_SQL: &str = "\
SELECT e.id, e.type, es.site_id, es.title, es.content, e.status, e.trashed, e.date_deleted
FROM elements e
JOIN element_sites es ON es.element_id = e.id
WHERE e.id = ?1 AND es.site_id = ?2";

const UPSERT_INDEX_ENTRY_SQL: &str = "\
INSERT INTO search_index (element_id, attribute, site_id, keywords)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(element_id, attribute, site_id) DO UPDATE SET
  keywords = excluded.keywords";

const DELETE_INDEX_ENTRIES_SQL: &str = "\
DELETE FROM search_index WHERE element_id = ?1 AND site_id = ?2";

// ---------------------------------------------------------------------------
// ContentStore
// ---------------------------------------------------------------------------

/// Typed wrapper around the content database.
pub struct ContentStore {
    pub conn: Connection,
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore").finish_non_exhaustive()
    }
}

impl ContentStore {
    /// Open (or create) the database at `db_path` and apply the schema.
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = initialize_database(db_path)?;
        Ok(Self { conn })
    }

    /// Fresh in-memory store with the schema applied.
    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Wrap an already-initialized connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    // -------------------------------------------------------------------
    // Transactions
    // -------------------------------------------------------------------

    /// Begin a transaction on the store connection.
    ///
    /// Fails with [`SiteSearchError::Transaction`] when a transaction is
    /// already open on this connection.
    pub fn begin(&self) -> Result<Transaction<'_>> {
        self.conn
            .unchecked_transaction()
            .map_err(|e| SiteSearchError::Transaction(format!("could not begin: {e}")))
    }

    // -------------------------------------------------------------------
    // Content writes
    // -------------------------------------------------------------------

    pub fn insert_site(&self, site: &Site) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO sites (id, handle, name, is_primary, sort_order) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        stmt.execute(params![
            site.id,
            site.handle,
            site.name,
            site.primary as i32,
            site.sort_order
        ])?;
        Ok(())
    }

    /// Register (or update) an element type's indexing capabilities.
    pub fn register_element_type(&self, element_type: &ElementType) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO element_types (name, localizable, has_titles) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
               localizable = excluded.localizable,
               has_titles = excluded.has_titles",
        )?;
        stmt.execute(params![
            element_type.name,
            element_type.localizable as i32,
            element_type.has_titles as i32
        ])?;
        Ok(())
    }

    /// Insert an element and its per-site rows inside one transaction.
    pub fn insert_element(&self, element: &NewElement) -> Result<ElementId> {
        let tx = self.conn.unchecked_transaction()?;
        let id = {
            let mut ins = tx.prepare_cached(
                "INSERT INTO elements (type, status, trashed, date_deleted)
                 VALUES (?1, ?2, ?3, CASE WHEN ?4 THEN strftime('%s','now') ELSE NULL END)",
            )?;
            ins.execute(params![
                element.element_type,
                element.status.unwrap_or(crate::types::ElementStatus::Live).as_str(),
                element.trashed as i32,
                element.deleted,
            ])?;
            let id = tx.last_insert_rowid();

            let mut ins_site = tx.prepare_cached(
                "INSERT INTO element_sites (element_id, site_id, title, content) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (site_id, title, content) in &element.sites {
                ins_site.execute(params![id, site_id, title, content])?;
            }
            id
        };
        tx.commit()?;
        Ok(id)
    }

    /// Move an element to the trash.
    pub fn trash_element(&self, id: ElementId) -> Result<()> {
        self.conn
            .prepare_cached("UPDATE elements SET trashed = 1 WHERE id = ?1")?
            .execute(params![id])?;
        Ok(())
    }

    /// Soft-delete an element.
    pub fn soft_delete_element(&self, id: ElementId) -> Result<()> {
        self.conn
            .prepare_cached("UPDATE elements SET date_deleted = strftime('%s','now') WHERE id = ?1")?
            .execute(params![id])?;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Content queries
    // -------------------------------------------------------------------

    /// Every site ordered by sort order, then id.
    pub fn all_sites(&self) -> Result<Vec<Site>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, handle, name, is_primary, sort_order FROM sites ORDER BY sort_order ASC, id ASC",
        )?;
        let rows = stmt.query_map([], row_to_site)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// The primary site, if one is flagged.
    pub fn primary_site(&self) -> Result<Option<Site>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, handle, name, is_primary, sort_order FROM sites
             WHERE is_primary = 1 ORDER BY id ASC LIMIT 1",
        )?;
        stmt.query_row([], row_to_site)
            .optional()
            .map_err(Into::into)
    }

    /// Look up a registered element type by name.
    pub fn element_type(&self, name: &str) -> Result<Option<ElementType>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT name, localizable, has_titles FROM element_types WHERE name = ?1",
        )?;
        stmt.query_row(params![name], row_to_element_type)
            .optional()
            .map_err(Into::into)
    }

    /// Distinct type names among non-soft-deleted elements, ascending.
    pub fn distinct_element_types(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(DISTINCT_ELEMENT_TYPES_SQL)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Elements of `element_type` at `site_id`, any status, excluding
    /// trashed and soft-deleted elements, ordered by id.
    pub fn elements_at_site(&self, element_type: &str, site_id: SiteId) -> Result<Vec<Element>> {
        let mut stmt = self.conn.prepare_cached(ELEMENTS_AT_SITE_SQL)?;
        let rows = stmt.query_map(params![element_type, site_id], row_to_element)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Same filter as [`Self::elements_at_site`], counted.
    pub fn count_elements_at_site(&self, element_type: &str, site_id: SiteId) -> Result<u64> {
        let mut stmt = self.conn.prepare_cached(COUNT_ELEMENTS_AT_SITE_SQL)?;
        let count: i64 = stmt.query_row(params![element_type, site_id], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// One element's representation at one site, regardless of lifecycle flags.
    pub fn element_at_site(&self, id: ElementId, site_id: SiteId) -> Result<Option<Element>> {
        let mut stmt = self.conn.prepare_cached(ELEMENT_AT_SITE_SQL)?;
        stmt.query_row(params![id, site_id], row_to_element)
            .optional()
            .map_err(Into::into)
    }

    // -------------------------------------------------------------------
    // Search index
    // -------------------------------------------------------------------

    /// Delete every search index row. Returns the number removed.
    pub fn truncate_search_index(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM search_index", [])?;
        Ok(removed)
    }

    /// Remove all index rows for one element at one site.
    pub fn delete_index_entries(&self, element_id: ElementId, site_id: SiteId) -> Result<usize> {
        let mut stmt = self.conn.prepare_cached(DELETE_INDEX_ENTRIES_SQL)?;
        Ok(stmt.execute(params![element_id, site_id])?)
    }

    /// Insert or replace one attribute's keywords.
    pub fn upsert_index_entry(&self, entry: &IndexEntry) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(UPSERT_INDEX_ENTRY_SQL)?;
        stmt.execute(params![
            entry.element_id,
            entry.attribute,
            entry.site_id,
            entry.keywords
        ])?;
        Ok(())
    }

    /// Every index row in key order.
    pub fn index_entries(&self) -> Result<Vec<IndexEntry>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT element_id, attribute, site_id, keywords FROM search_index
             ORDER BY element_id ASC, site_id ASC, attribute ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(IndexEntry {
                element_id: row.get(0)?,
                attribute: row.get(1)?,
                site_id: row.get(2)?,
                keywords: row.get(3)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    pub fn index_stats(&self) -> Result<IndexStats> {
        let (entries, elements, element_sites): (i64, i64, i64) = self.conn.query_row(
            "SELECT COUNT(*),
                    COUNT(DISTINCT element_id),
                    (SELECT COUNT(*) FROM (SELECT DISTINCT element_id, site_id FROM search_index))
             FROM search_index",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        Ok(IndexStats {
            entries: entries as usize,
            elements: elements as usize,
            element_sites: element_sites as usize,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
