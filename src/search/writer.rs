//! Per-element index writes.

use tracing::debug;

use crate::error::Result;
use crate::search::keywords::normalize_keywords;
use crate::store::ContentStore;
use crate::types::{Element, IndexEntry, SiteId};

/// Writes one element's searchable keywords for one site.
///
/// `Ok(false)` means the element could not be indexed. The reindexer treats
/// it as fatal for the whole run.
pub trait IndexWriter {
    fn index_element(&self, element: &Element, site_id: SiteId) -> Result<bool>;
}

impl<W: IndexWriter + ?Sized> IndexWriter for &W {
    fn index_element(&self, element: &Element, site_id: SiteId) -> Result<bool> {
        (**self).index_element(element, site_id)
    }
}

/// Default writer: stores normalized `title` and `content` keywords in the
/// store's `search_index` table, on the store's own connection.
#[derive(Debug)]
pub struct KeywordIndexWriter<'a> {
    store: &'a ContentStore,
}

impl<'a> KeywordIndexWriter<'a> {
    pub fn new(store: &'a ContentStore) -> Self {
        Self { store }
    }
}

impl IndexWriter for KeywordIndexWriter<'_> {
    fn index_element(&self, element: &Element, site_id: SiteId) -> Result<bool> {
        if !element.is_indexable() || element.site_id != site_id {
            return Ok(false);
        }

        self.store.delete_index_entries(element.id, site_id)?;

        let attributes = [
            ("title", element.title.as_deref()),
            ("content", element.content.as_deref()),
        ];
        for (attribute, text) in attributes {
            let keywords = normalize_keywords(text.unwrap_or_default());
            self.store.upsert_index_entry(&IndexEntry {
                element_id: element.id,
                attribute: attribute.to_string(),
                site_id,
                keywords,
            })?;
        }
        debug!(element_id = element.id, site_id, "indexed element");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewElement, Site};

    fn setup() -> (ContentStore, i64) {
        let store = ContentStore::in_memory().unwrap();
        store.insert_site(&Site::new(1, "en", true)).unwrap();
        store.insert_site(&Site::new(2, "de", false)).unwrap();
        let id = store
            .insert_element(&NewElement {
                element_type: "Article".into(),
                sites: vec![
                    (1, Some("Hello World".into()), Some("<p>Body text</p>".into())),
                    (2, Some("Hallo Welt".into()), None),
                ],
                ..Default::default()
            })
            .unwrap();
        (store, id)
    }

    #[test]
    fn writes_title_and_content_rows() {
        let (store, id) = setup();
        let writer = KeywordIndexWriter::new(&store);
        let element = store.element_at_site(id, 1).unwrap().unwrap();
        assert!(writer.index_element(&element, 1).unwrap());

        let entries = store.index_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].attribute, "content");
        assert_eq!(entries[0].keywords, " body text ");
        assert_eq!(entries[1].attribute, "title");
        assert_eq!(entries[1].keywords, " hello world ");
    }

    #[test]
    fn rewriting_replaces_previous_rows() {
        let (store, id) = setup();
        let writer = KeywordIndexWriter::new(&store);
        let element = store.element_at_site(id, 2).unwrap().unwrap();
        assert!(writer.index_element(&element, 2).unwrap());
        assert!(writer.index_element(&element, 2).unwrap());
        assert_eq!(store.index_stats().unwrap().entries, 2);
    }

    #[test]
    fn refuses_trashed_element() {
        let (store, id) = setup();
        store.trash_element(id).unwrap();
        let writer = KeywordIndexWriter::new(&store);
        let element = store.element_at_site(id, 1).unwrap().unwrap();
        assert!(!writer.index_element(&element, 1).unwrap());
        assert!(store.index_entries().unwrap().is_empty());
    }

    #[test]
    fn refuses_site_mismatch() {
        let (store, id) = setup();
        let writer = KeywordIndexWriter::new(&store);
        let element = store.element_at_site(id, 1).unwrap().unwrap();
        assert!(!writer.index_element(&element, 2).unwrap());
    }
}
