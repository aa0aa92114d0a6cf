//! End-to-end rebuild scenarios against an in-memory content store.
//!
//! Each test seeds sites, element types, and elements, runs a full rebuild,
//! and checks the resulting index through the store API.

use std::cell::RefCell;
use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use sitesearch::config::schema::{ProgressMode, ReindexConfig};
use sitesearch::error::{Result, SiteSearchError};
use sitesearch::queue::jobs::ReindexElementsJob;
use sitesearch::queue::{JobQueue, JobStatus};
use sitesearch::search::{
    reindex_all, IndexWriter, KeywordIndexWriter, ProgressReporter, RecordingSink, Reindexer,
};
use sitesearch::store::ContentStore;
use sitesearch::types::{Element, ElementId, ElementType, IndexEntry, NewElement, Site, SiteId};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Wraps the keyword writer, logging every call and failing the
/// `fail_at`-th one (1-based).
struct TrackingWriter<'a> {
    inner: KeywordIndexWriter<'a>,
    calls: RefCell<Vec<(ElementId, SiteId)>>,
    fail_at: Option<usize>,
}

impl<'a> TrackingWriter<'a> {
    fn new(store: &'a ContentStore, fail_at: Option<usize>) -> Self {
        Self {
            inner: KeywordIndexWriter::new(store),
            calls: RefCell::new(Vec::new()),
            fail_at,
        }
    }

    fn calls(&self) -> Vec<(ElementId, SiteId)> {
        self.calls.borrow().clone()
    }
}

impl IndexWriter for TrackingWriter<'_> {
    fn index_element(&self, element: &Element, site_id: SiteId) -> Result<bool> {
        let call_number = {
            let mut calls = self.calls.borrow_mut();
            calls.push((element.id, site_id));
            calls.len()
        };
        if Some(call_number) == self.fail_at {
            return Ok(false);
        }
        self.inner.index_element(element, site_id)
    }
}

struct Fixture {
    store: ContentStore,
    articles: Vec<ElementId>,
    trashed_article: ElementId,
    setting: ElementId,
}

/// Two sites (1 primary, 2), localizable `Article` with three live articles
/// and one trashed, non-localizable `Setting` with one element.
fn article_and_setting() -> Fixture {
    let store = ContentStore::in_memory().unwrap();
    store.insert_site(&Site::new(1, "en", true)).unwrap();
    store.insert_site(&Site::new(2, "de", false)).unwrap();
    store
        .register_element_type(&ElementType::new("Article", true, true))
        .unwrap();
    store
        .register_element_type(&ElementType::new("Setting", false, false))
        .unwrap();

    let mut articles = Vec::new();
    for (en, de) in [
        ("First post", "Erster Beitrag"),
        ("Second post", "Zweiter Beitrag"),
        ("Third post", "Dritter Beitrag"),
    ] {
        articles.push(
            store
                .insert_element(&NewElement {
                    element_type: "Article".into(),
                    sites: vec![
                        (1, Some(en.into()), Some(format!("{en} body"))),
                        (2, Some(de.into()), Some(format!("{de} Text"))),
                    ],
                    ..Default::default()
                })
                .unwrap(),
        );
    }
    let trashed_article = store
        .insert_element(&NewElement {
            element_type: "Article".into(),
            trashed: true,
            sites: vec![(1, Some("Trashed".into()), None), (2, Some("Weg".into()), None)],
            ..Default::default()
        })
        .unwrap();
    let setting = store
        .insert_element(&NewElement {
            element_type: "Setting".into(),
            sites: vec![(1, None, Some("Site name".into()))],
            ..Default::default()
        })
        .unwrap();

    Fixture {
        store,
        articles,
        trashed_article,
        setting,
    }
}

fn indexed_pairs(store: &ContentStore) -> BTreeSet<(ElementId, SiteId)> {
    store
        .index_entries()
        .unwrap()
        .into_iter()
        .map(|e| (e.element_id, e.site_id))
        .collect()
}

fn stale_entry() -> IndexEntry {
    IndexEntry {
        element_id: 999,
        attribute: "title".into(),
        site_id: 1,
        keywords: " stale ".into(),
    }
}

// ===========================================================================
// 1. Successful rebuild
// ===========================================================================

#[test]
fn rebuild_indexes_every_article_per_site_and_setting_once() {
    let fx = article_and_setting();
    fx.store.upsert_index_entry(&stale_entry()).unwrap();

    let writer = TrackingWriter::new(&fx.store, None);
    let summary = Reindexer::new(&fx.store, &writer, ProgressReporter::silent())
        .run()
        .unwrap();

    let calls = writer.calls();
    let article_calls = calls.iter().filter(|(id, _)| fx.articles.contains(id)).count();
    let setting_calls = calls.iter().filter(|(id, _)| *id == fx.setting).count();
    assert_eq!(article_calls, 6);
    assert_eq!(setting_calls, 1);
    assert_eq!(calls.len(), 7);
    assert!(calls.iter().all(|(id, _)| *id != fx.trashed_article));
    assert_eq!(summary.elements_indexed, 7);

    // The stale row is gone: the index was truncated before rewriting.
    let pairs = indexed_pairs(&fx.store);
    assert!(!pairs.contains(&(999, 1)));
    let mut expected: BTreeSet<(ElementId, SiteId)> = fx
        .articles
        .iter()
        .flat_map(|id| [(*id, 1), (*id, 2)])
        .collect();
    expected.insert((fx.setting, 1));
    assert_eq!(pairs, expected);
}

#[test]
fn reindex_all_returns_true() {
    let fx = article_and_setting();
    assert!(reindex_all(&fx.store, None, None).unwrap());
}

#[test]
fn site_specific_keywords_are_stored() {
    let fx = article_and_setting();
    reindex_all(&fx.store, None, None).unwrap();

    let entries = fx.store.index_entries().unwrap();
    let german_title = entries
        .iter()
        .find(|e| e.element_id == fx.articles[0] && e.site_id == 2 && e.attribute == "title")
        .unwrap();
    assert_eq!(german_title.keywords, " erster beitrag ");
}

#[test]
fn every_status_is_indexed() {
    let fx = article_and_setting();
    let disabled = fx
        .store
        .insert_element(&NewElement {
            element_type: "Article".into(),
            status: sitesearch::types::ElementStatus::from_str_loose("disabled"),
            sites: vec![(1, Some("Draft".into()), None), (2, Some("Entwurf".into()), None)],
            ..Default::default()
        })
        .unwrap();
    reindex_all(&fx.store, None, None).unwrap();
    let pairs = indexed_pairs(&fx.store);
    assert!(pairs.contains(&(disabled, 1)));
    assert!(pairs.contains(&(disabled, 2)));
}

#[test]
fn soft_deleted_elements_are_not_indexed() {
    let fx = article_and_setting();
    fx.store.soft_delete_element(fx.articles[1]).unwrap();
    reindex_all(&fx.store, None, None).unwrap();
    assert!(indexed_pairs(&fx.store)
        .iter()
        .all(|(id, _)| *id != fx.articles[1]));
}

#[test]
fn rebuild_is_idempotent() {
    let fx = article_and_setting();
    reindex_all(&fx.store, None, None).unwrap();
    let first = fx.store.index_entries().unwrap();
    reindex_all(&fx.store, None, None).unwrap();
    let second = fx.store.index_entries().unwrap();
    assert_eq!(first, second);
}

// ===========================================================================
// 2. Failure and rollback
// ===========================================================================

#[test]
fn failed_write_restores_previous_index() {
    let fx = article_and_setting();
    fx.store.upsert_index_entry(&stale_entry()).unwrap();
    let before = fx.store.index_entries().unwrap();

    // Call order: articles at site 1, then at site 2; call 5 is the second
    // article at site 2.
    let writer = TrackingWriter::new(&fx.store, Some(5));
    let console = RecordingSink::new();
    let err = Reindexer::new(
        &fx.store,
        &writer,
        ProgressReporter::new(None, Some(&console)),
    )
    .run()
    .unwrap_err();

    match err {
        SiteSearchError::IndexWrite {
            element_id,
            site_id,
        } => {
            assert_eq!(element_id, fx.articles[1]);
            assert_eq!(site_id, 2);
        }
        other => panic!("expected IndexWrite, got {other:?}"),
    }
    assert_eq!(writer.calls().len(), 5);
    assert_eq!(fx.store.index_entries().unwrap(), before);
    assert_eq!(console.errors().len(), 1);
}

#[test]
fn missing_primary_site_fails_and_keeps_index() {
    let store = ContentStore::in_memory().unwrap();
    store.insert_site(&Site::new(1, "en", false)).unwrap();
    store
        .register_element_type(&ElementType::new("Setting", false, false))
        .unwrap();
    store
        .insert_element(&NewElement {
            element_type: "Setting".into(),
            sites: vec![(1, None, None)],
            ..Default::default()
        })
        .unwrap();
    store.upsert_index_entry(&stale_entry()).unwrap();

    let err = reindex_all(&store, None, None).unwrap_err();
    assert!(matches!(err, SiteSearchError::Configuration(_)));
    assert_eq!(store.index_entries().unwrap(), vec![stale_entry()]);
}

#[test]
fn store_is_usable_after_failed_run() {
    let fx = article_and_setting();
    let writer = TrackingWriter::new(&fx.store, Some(1));
    assert!(Reindexer::new(&fx.store, &writer, ProgressReporter::silent())
        .run()
        .is_err());
    assert!(reindex_all(&fx.store, None, None).unwrap());
    assert_eq!(fx.store.index_stats().unwrap().element_sites, 7);
}

// ===========================================================================
// 3. Progress reporting
// ===========================================================================

#[test]
fn progress_is_monotonic_and_ends_at_indexed_count() {
    let fx = article_and_setting();
    let job = RecordingSink::new();
    let console = RecordingSink::new();
    reindex_all(&fx.store, Some(&job), Some(&console)).unwrap();

    for sink in [&job, &console] {
        let progress = sink.progress();
        assert_eq!(progress.first(), Some(&(0, 7)));
        assert_eq!(progress.last(), Some(&(7, 7)));
        assert!(progress.windows(2).all(|w| w[0].0 <= w[1].0));
    }
}

#[test]
fn per_element_progress_with_report_every_one() {
    let fx = article_and_setting();
    let job = RecordingSink::new();
    let config = ReindexConfig {
        progress_mode: ProgressMode::Counted,
        report_every: 1,
    };
    sitesearch::search::reindex_all_with_config(&fx.store, Some(&job), None, &config).unwrap();

    let done: BTreeSet<u64> = job.progress().iter().map(|(d, _)| *d).collect();
    assert_eq!(done, (0..=7).collect());
}

#[test]
fn rebuild_through_job_queue() {
    let fx = article_and_setting();
    let queue = JobQueue::new();
    let id = queue.run(&ReindexElementsJob::new(&fx.store)).unwrap();

    let entry = queue.get_job(&id).unwrap();
    assert_eq!(entry.description, "Reindexing elements");
    assert_eq!(entry.status, JobStatus::Completed);
    assert_eq!(entry.done, 7);
}
