//! Full search-index rebuild.
//!
//! A run truncates `search_index` and rewrites it element type by element
//! type, site by site, all inside one transaction on the store connection.
//! Any failure rolls the transaction back, which also undoes the
//! truncation, so readers only ever see the previous index or the complete
//! new one.

use std::time::Instant;

use tracing::{debug, info};

use crate::config::schema::{ProgressMode, ReindexConfig};
use crate::error::{Result, SiteSearchError};
use crate::search::progress::{MessageSink, ProgressReporter, ProgressSink};
use crate::search::sites::SiteResolver;
use crate::search::writer::{IndexWriter, KeywordIndexWriter};
use crate::store::ContentStore;
use crate::types::ReindexSummary;

/// Rebuild the whole index with the default keyword writer.
///
/// Returns `Ok(true)` once the new index is committed.
pub fn reindex_all(
    store: &ContentStore,
    progress: Option<&dyn ProgressSink>,
    messages: Option<&dyn MessageSink>,
) -> Result<bool> {
    reindex_all_with_config(store, progress, messages, &ReindexConfig::default())
}

/// [`reindex_all`] with explicit run settings.
pub fn reindex_all_with_config(
    store: &ContentStore,
    progress: Option<&dyn ProgressSink>,
    messages: Option<&dyn MessageSink>,
    config: &ReindexConfig,
) -> Result<bool> {
    let reporter = ProgressReporter::new(progress, messages);
    Reindexer::new(store, KeywordIndexWriter::new(store), reporter)
        .with_config(config.clone())
        .run()
        .map(|_| true)
}

// ---------------------------------------------------------------------------
// Reindexer
// ---------------------------------------------------------------------------

/// Orchestrates one rebuild run over every element type and site.
pub struct Reindexer<'a, W: IndexWriter> {
    store: &'a ContentStore,
    writer: W,
    reporter: ProgressReporter<'a>,
    config: ReindexConfig,
}

impl<W: IndexWriter> std::fmt::Debug for Reindexer<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reindexer")
            .field("reporter", &self.reporter)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a, W: IndexWriter> Reindexer<'a, W> {
    pub fn new(store: &'a ContentStore, writer: W, reporter: ProgressReporter<'a>) -> Self {
        Self {
            store,
            writer,
            reporter,
            config: ReindexConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReindexConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the rebuild. On error the previous index is left untouched and
    /// the error is returned as raised.
    pub fn run(&self) -> Result<ReindexSummary> {
        let started = Instant::now();
        info!("search index rebuild started");

        let tx = match self.store.begin() {
            Ok(tx) => tx,
            Err(e) => {
                self.reporter.error(&format!("Reindexing failed: {e}"));
                return Err(e);
            }
        };

        match self.rebuild() {
            Ok(mut summary) => {
                // A refused commit leaves the transaction open; dropping it
                // rolls back.
                if let Err(e) = tx.commit() {
                    let err = SiteSearchError::Transaction(format!("commit failed: {e}"));
                    self.reporter.error(&format!("Reindexing failed: {err}"));
                    return Err(err);
                }
                summary.duration_ms = started.elapsed().as_millis() as u64;
                info!(
                    types = summary.element_types.len(),
                    sites = summary.sites_visited,
                    elements = summary.elements_indexed,
                    duration_ms = summary.duration_ms,
                    "search index rebuild committed"
                );
                Ok(summary)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback() {
                    let err = SiteSearchError::Transaction(format!(
                        "rollback failed after `{e}`: {rollback}"
                    ));
                    self.reporter.error(&format!("Reindexing failed: {err}"));
                    return Err(err);
                }
                self.reporter.error(&format!("Reindexing failed: {e}"));
                Err(e)
            }
        }
    }

    /// Everything that happens inside the run transaction.
    fn rebuild(&self) -> Result<ReindexSummary> {
        self.reporter.message("Dropping search index");
        let dropped = self.store.truncate_search_index()?;
        debug!(dropped, "search index truncated");

        let mut resolver = SiteResolver::new(self.store);
        let type_names = self.store.distinct_element_types()?;
        // Counting resolves every type before the loop; streaming resolves
        // each type as it is reached.
        let total = match self.config.progress_mode {
            ProgressMode::Counted => self.count(&mut resolver, &type_names)?,
            ProgressMode::Streaming => 0,
        };
        let report_every = self.config.report_every.max(1);

        let mut summary = ReindexSummary::default();
        let mut done: u64 = 0;
        self.reporter.report(done, total);

        for name in &type_names {
            self.reporter
                .message(&format!("Reindexing elements of type: {name}"));
            let element_type = resolver.element_type(name)?;
            let sites = resolver.sites(&element_type)?;

            for site_id in sites {
                self.reporter
                    .message(&format!("Reindexing on site: {site_id}"));
                summary.sites_visited += 1;

                for element in self.store.elements_at_site(&element_type.name, site_id)? {
                    self.reporter.message(&format!(
                        "Indexing element {}",
                        element_type.label_for(&element)
                    ));
                    if !self.writer.index_element(&element, site_id)? {
                        return Err(SiteSearchError::IndexWrite {
                            element_id: element.id,
                            site_id,
                        });
                    }
                    done += 1;
                    if done % report_every == 0 {
                        self.reporter.report(done, total);
                    }
                }
                self.reporter.report(done, total);
            }

            self.reporter.message(&format!(
                "Completed indexing elements of type: {element_type}"
            ));
            summary.element_types.push(element_type.name);
        }

        summary.elements_indexed = done;
        Ok(summary)
    }

    /// Number of writes the run will perform.
    fn count(&self, resolver: &mut SiteResolver<'_>, type_names: &[String]) -> Result<u64> {
        let mut total = 0;
        for name in type_names {
            let element_type = resolver.element_type(name)?;
            for site_id in resolver.sites(&element_type)? {
                total += self.store.count_elements_at_site(name, site_id)?;
            }
        }
        Ok(total)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
