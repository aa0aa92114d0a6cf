//! Search index rebuild: site resolution, progress reporting, index
//! writes, and the orchestrating reindexer.

pub mod keywords;
pub mod progress;
pub mod reindexer;
pub mod sites;
pub mod writer;

pub use progress::{ConsoleSink, MessageSink, ProgressReporter, ProgressSink, RecordingSink};
pub use reindexer::{reindex_all, reindex_all_with_config, Reindexer};
pub use sites::SiteResolver;
pub use writer::{IndexWriter, KeywordIndexWriter};
