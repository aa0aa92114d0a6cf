//! Which sites an element type is indexed under.

use std::collections::HashMap;

use crate::error::{Result, SiteSearchError};
use crate::store::ContentStore;
use crate::types::{ElementType, SiteId};

/// Resolves and caches the site list per element type for one run.
///
/// Localizable types are indexed under every site, everything else only
/// under the primary site. A type's localizability cannot change mid-run, so
/// each type is resolved at most once.
#[derive(Debug)]
pub struct SiteResolver<'a> {
    store: &'a ContentStore,
    cache: HashMap<String, Vec<SiteId>>,
}

impl<'a> SiteResolver<'a> {
    pub fn new(store: &'a ContentStore) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    /// Ordered, non-empty site list for `element_type`.
    pub fn sites(&mut self, element_type: &ElementType) -> Result<Vec<SiteId>> {
        if let Some(cached) = self.cache.get(&element_type.name) {
            return Ok(cached.clone());
        }

        let site_ids = if element_type.localizable {
            let all: Vec<SiteId> = self.store.all_sites()?.iter().map(|s| s.id).collect();
            if all.is_empty() {
                return Err(SiteSearchError::configuration(format!(
                    "element type {element_type} is localizable but no sites exist"
                )));
            }
            all
        } else {
            let primary = self.store.primary_site()?.ok_or_else(|| {
                SiteSearchError::configuration(format!(
                    "element type {element_type} needs a primary site but none is designated"
                ))
            })?;
            vec![primary.id]
        };

        self.cache
            .insert(element_type.name.clone(), site_ids.clone());
        Ok(site_ids)
    }

    /// Load an element type's capabilities from the registry.
    pub fn element_type(&self, name: &str) -> Result<ElementType> {
        self.store.element_type(name)?.ok_or_else(|| {
            SiteSearchError::configuration(format!("element type {name} is not registered"))
        })
    }
}
