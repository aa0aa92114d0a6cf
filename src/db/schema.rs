//! SQLite schema initialization for sitesearch.
//!
//! The content tables (`sites`, `element_types`, `elements`,
//! `element_sites`) are owned by the surrounding CMS; sitesearch only reads
//! them. `search_index` is the one table a rebuild truncates and rewrites.

use rusqlite::Connection;

// ---------------------------------------------------------------------------
// DDL constants, one statement each.
// ---------------------------------------------------------------------------

const CREATE_SITES: &str = "\
CREATE TABLE IF NOT EXISTS sites (
  id INTEGER PRIMARY KEY,
  handle TEXT NOT NULL UNIQUE,
  name TEXT NOT NULL,
  is_primary INTEGER NOT NULL DEFAULT 0,
  sort_order INTEGER NOT NULL DEFAULT 0
)";

const CREATE_ELEMENT_TYPES: &str = "\
CREATE TABLE IF NOT EXISTS element_types (
  name TEXT PRIMARY KEY,
  localizable INTEGER NOT NULL DEFAULT 0,
  has_titles INTEGER NOT NULL DEFAULT 1
)";

const CREATE_ELEMENTS: &str = "\
CREATE TABLE IF NOT EXISTS elements (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  type TEXT NOT NULL,
  status TEXT NOT NULL DEFAULT 'live',
  trashed INTEGER NOT NULL DEFAULT 0,
  date_deleted INTEGER,
  date_created INTEGER DEFAULT (strftime('%s','now'))
)";

const CREATE_ELEMENT_SITES: &str = "\
CREATE TABLE IF NOT EXISTS element_sites (
  element_id INTEGER NOT NULL,
  site_id INTEGER NOT NULL,
  title TEXT,
  content TEXT,
  PRIMARY KEY (element_id, site_id),
  FOREIGN KEY (element_id) REFERENCES elements(id) ON DELETE CASCADE,
  FOREIGN KEY (site_id) REFERENCES sites(id) ON DELETE CASCADE
)";

const CREATE_SEARCH_INDEX: &str = "\
CREATE TABLE IF NOT EXISTS search_index (
  element_id INTEGER NOT NULL,
  attribute TEXT NOT NULL,
  site_id INTEGER NOT NULL,
  keywords TEXT NOT NULL,
  PRIMARY KEY (element_id, attribute, site_id)
)";

// Indexes ----------------------------------------------------------------

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_elements_type ON elements(type)",
    "CREATE INDEX IF NOT EXISTS idx_elements_deleted ON elements(date_deleted)",
    "CREATE INDEX IF NOT EXISTS idx_element_sites_site ON element_sites(site_id)",
    "CREATE INDEX IF NOT EXISTS idx_search_index_site ON search_index(site_id)",
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Open (or create) the SQLite database at `db_path` and apply the full
/// schema.
///
/// The returned connection has WAL mode, foreign keys, and synchronous
/// NORMAL already configured.
///
/// # Errors
///
/// Returns a `rusqlite::Error` if the database cannot be opened or any DDL
/// statement fails.
pub fn initialize_database(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;

    // -- Pragmas ----------------------------------------------------------
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    apply_schema(&conn)?;
    Ok(conn)
}

/// Apply every DDL statement to an already-open connection.
pub fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_SITES)?;
    conn.execute_batch(CREATE_ELEMENT_TYPES)?;
    conn.execute_batch(CREATE_ELEMENTS)?;
    conn.execute_batch(CREATE_ELEMENT_SITES)?;
    conn.execute_batch(CREATE_SEARCH_INDEX)?;

    for ddl in CREATE_INDEXES {
        conn.execute_batch(ddl)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
