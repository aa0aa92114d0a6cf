//! Error types for sitesearch.

use thiserror::Error;

/// Every failure a rebuild run (or its surrounding tooling) can surface.
#[derive(Debug, Error)]
pub enum SiteSearchError {
    /// The index writer reported that an element could not be written.
    #[error("unable to index element {element_id} on site {site_id}")]
    IndexWrite { element_id: i64, site_id: i64 },

    /// Required site or element-type metadata is missing or inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The store failed to commit or roll back the run transaction.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Underlying SQLite failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Config file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Job queue bookkeeping failure.
    #[error("job error: {0}")]
    Job(String),

    /// Output could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SiteSearchError {
    /// Shorthand for a [`SiteSearchError::Configuration`] error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SiteSearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_write_message_names_element_and_site() {
        let err = SiteSearchError::IndexWrite {
            element_id: 42,
            site_id: 2,
        };
        assert_eq!(err.to_string(), "unable to index element 42 on site 2");
    }

    #[test]
    fn database_errors_convert() {
        let err: SiteSearchError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, SiteSearchError::Database(_)));
    }

    #[test]
    fn json_errors_convert() {
        let err: SiteSearchError = serde_json::from_str::<u8>("nope").unwrap_err().into();
        assert!(matches!(err, SiteSearchError::Serialization(_)));
        assert!(err.to_string().starts_with("serialization error:"));
    }

    #[test]
    fn configuration_shorthand() {
        let err = SiteSearchError::configuration("no primary site");
        assert_eq!(err.to_string(), "configuration error: no primary site");
    }
}
