//! Concrete queue jobs.

use crate::config::schema::ReindexConfig;
use crate::error::Result;
use crate::queue::{Job, JobContext};
use crate::search::progress::MessageSink;
use crate::search::reindexer::reindex_all_with_config;
use crate::store::ContentStore;

/// Rebuilds the whole search index, reporting progress to the job slot.
pub struct ReindexElementsJob<'a> {
    store: &'a ContentStore,
    messages: Option<&'a dyn MessageSink>,
    config: ReindexConfig,
}

impl<'a> ReindexElementsJob<'a> {
    pub const DESCRIPTION: &'static str = "Reindexing elements";

    pub fn new(store: &'a ContentStore) -> Self {
        Self {
            store,
            messages: None,
            config: ReindexConfig::default(),
        }
    }

    /// Also send status lines to a console.
    pub fn with_messages(mut self, messages: &'a dyn MessageSink) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn with_config(mut self, config: ReindexConfig) -> Self {
        self.config = config;
        self
    }
}

impl Job for ReindexElementsJob<'_> {
    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    fn execute(&self, ctx: &JobContext<'_>) -> Result<()> {
        reindex_all_with_config(self.store, Some(ctx), self.messages, &self.config).map(|_| ())
    }
}
