//! Core domain types for sitesearch.
//!
//! Elements are typed, site-scoped pieces of content. Each element type
//! decides whether its elements carry a separate representation per site
//! (localizable) or live only on the primary site.

use serde::{Deserialize, Serialize};

/// Numeric site identifier.
pub type SiteId = i64;

/// Numeric element identifier.
pub type ElementId = i64;

// ---------------------------------------------------------------------------
// Site
// ---------------------------------------------------------------------------

/// A content locale/scope. Exactly one site may be flagged primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub handle: String,
    pub name: String,
    pub primary: bool,
    pub sort_order: i64,
}

impl Site {
    pub fn new(id: SiteId, handle: &str, primary: bool) -> Self {
        Self {
            id,
            handle: handle.to_string(),
            name: handle.to_string(),
            primary,
            sort_order: id,
        }
    }
}

// ---------------------------------------------------------------------------
// ElementType
// ---------------------------------------------------------------------------

/// A class of indexable elements sharing indexing rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementType {
    /// Type identifier as stored on each element row (e.g. `"Article"`).
    pub name: String,
    /// Indexed once per site rather than only under the primary site.
    pub localizable: bool,
    /// Instances expose a human-readable title.
    pub has_titles: bool,
}

impl ElementType {
    pub fn new(name: &str, localizable: bool, has_titles: bool) -> Self {
        Self {
            name: name.to_string(),
            localizable,
            has_titles,
        }
    }

    /// Label used in status messages: the title when this type has titles
    /// and the element carries one, otherwise the element id.
    pub fn label_for(&self, element: &Element) -> String {
        match (&element.title, self.has_titles) {
            (Some(title), true) if !title.is_empty() => title.clone(),
            _ => element.id.to_string(),
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// ElementStatus
// ---------------------------------------------------------------------------

/// Publish/workflow status. Rebuilds index every status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementStatus {
    Live,
    Pending,
    Expired,
    Disabled,
}

impl ElementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Pending => "pending",
            Self::Expired => "expired",
            Self::Disabled => "disabled",
        }
    }

    /// Parse from a string (case-insensitive). Unknown values map to `None`.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "live" | "enabled" => Some(Self::Live),
            "pending" => Some(Self::Pending),
            "expired" => Some(Self::Expired),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ElementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// One element as loaded for a particular site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    /// Name of the element's [`ElementType`].
    pub element_type: String,
    /// Site this representation was loaded for.
    pub site_id: SiteId,
    pub title: Option<String>,
    /// Site-specific searchable body text.
    pub content: Option<String>,
    pub status: ElementStatus,
    /// Soft-deleted.
    pub deleted: bool,
    pub trashed: bool,
}

impl Element {
    /// Whether this element may appear in the search index at all.
    pub fn is_indexable(&self) -> bool {
        !self.deleted && !self.trashed
    }
}

/// A new element to be written by [`crate::store::ContentStore::insert_element`].
#[derive(Debug, Clone, Default)]
pub struct NewElement {
    pub element_type: String,
    pub status: Option<ElementStatus>,
    pub deleted: bool,
    pub trashed: bool,
    /// `(site, title, content)` for every site the element exists on.
    pub sites: Vec<(SiteId, Option<String>, Option<String>)>,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of a successful rebuild run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexSummary {
    /// Element types visited, in visiting order.
    pub element_types: Vec<String>,
    /// Number of (type, site) pairs visited.
    pub sites_visited: usize,
    /// Number of (element, site) writes performed.
    pub elements_indexed: u64,
    pub duration_ms: u64,
}

/// One row of the search index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexEntry {
    pub element_id: ElementId,
    pub attribute: String,
    pub site_id: SiteId,
    pub keywords: String,
}

/// Aggregate statistics about the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Rows in the `search_index` table.
    pub entries: usize,
    /// Distinct indexed elements.
    pub elements: usize,
    /// Distinct (element, site) pairs.
    pub element_sites: usize,
}

impl IndexStats {
    /// Pretty-printed JSON, as shown by `sitesearch stats`.
    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
