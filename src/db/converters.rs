//! Row-to-struct conversions for the content tables.

use rusqlite::Row;

use crate::types::{Element, ElementStatus, ElementType, Site};

/// Columns: `id, handle, name, is_primary, sort_order`.
pub fn row_to_site(row: &Row<'_>) -> rusqlite::Result<Site> {
    Ok(Site {
        id: row.get(0)?,
        handle: row.get(1)?,
        name: row.get(2)?,
        primary: row.get::<_, i64>(3)? != 0,
        sort_order: row.get(4)?,
    })
}

/// Columns: `name, localizable, has_titles`.
pub fn row_to_element_type(row: &Row<'_>) -> rusqlite::Result<ElementType> {
    Ok(ElementType {
        name: row.get(0)?,
        localizable: row.get::<_, i64>(1)? != 0,
        has_titles: row.get::<_, i64>(2)? != 0,
    })
}

/// Columns: `id, type, site_id, title, content, status, trashed, date_deleted`.
///
/// Unknown status strings are read as [`ElementStatus::Disabled`] so a
/// custom workflow state never hides an element from a rebuild.
pub fn row_to_element(row: &Row<'_>) -> rusqlite::Result<Element> {
    let status: String = row.get(5)?;
    Ok(Element {
        id: row.get(0)?,
        element_type: row.get(1)?,
        site_id: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        status: ElementStatus::from_str_loose(&status).unwrap_or(ElementStatus::Disabled),
        trashed: row.get::<_, i64>(6)? != 0,
        deleted: row.get::<_, Option<i64>>(7)?.is_some(),
    })
}
