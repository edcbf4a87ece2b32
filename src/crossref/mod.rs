//! Crossref JSON ingestion.
//!
//! Parses the JSON export of the Crossref works API — a document carrying a
//! top-level `items` array — into assembled [`Article`] values plus the
//! batch-wide journal and subject pools they refer into.
//!
//! # Example
//!
//! ```
//! use crossmeta::CrossrefParser;
//!
//! let input = r#"{"items": [
//!     {"title": ["Deep Thought"], "DOI": "10.42/deep",
//!      "publisher": "Magrathea Press",
//!      "container-title": ["Journal of Big Questions"],
//!      "subject": ["Philosophy"],
//!      "type": "journal-article"}
//! ]}"#;
//!
//! let batch = CrossrefParser::new().parse(input).unwrap();
//!
//! assert_eq!(batch.articles.len(), 1);
//! assert_eq!(batch.journals.len(), 1);
//! assert_eq!(batch.subjects.get(0).unwrap().title, "Philosophy");
//! ```

mod extract;
mod parse;
mod structure;

use serde::Serialize;
use serde_json::Value;

use crate::diagnostics::Diagnostic;
use crate::pool::{JournalPool, SubjectPool};
use crate::{Article, Result};
use parse::parse_batch;

/// Configuration for [`CrossrefParser`].
#[derive(Debug, Clone, Default)]
pub struct CrossrefParserConfig {
    /// Keep records that lack a title or DOI, with empty placeholders, rather
    /// than rejecting them with a diagnostic. Off by default: an article
    /// without either field identifies nothing.
    pub keep_incomplete: bool,
}

/// Parser for Crossref works-API JSON.
///
/// Drives one sequential pass over the `items` array, interning journals and
/// subjects into batch-wide pools and tolerating missing or malformed fields
/// per record. Each call to [`parse`](CrossrefParser::parse) is an
/// independent run with fresh pools and counters.
#[derive(Debug, Clone, Default)]
pub struct CrossrefParser {
    config: CrossrefParserConfig,
}

impl CrossrefParser {
    /// Creates a parser with the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossmeta::CrossrefParser;
    /// let parser = CrossrefParser::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: CrossrefParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Parses a JSON string into a batch.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Json`](crate::IngestError::Json) if the input
    /// is not valid JSON, and
    /// [`IngestError::MissingItems`](crate::IngestError::MissingItems) if the
    /// document carries no `items` array (neither at the top level nor under
    /// `message`). Field-level problems never error; they are reported in
    /// [`Batch::diagnostics`].
    pub fn parse(&self, input: &str) -> Result<Batch> {
        let doc: Value = serde_json::from_str(input)?;
        self.parse_value(&doc)
    }

    /// Parses an already-decoded JSON document into a batch.
    pub fn parse_value(&self, doc: &Value) -> Result<Batch> {
        parse_batch(doc, &self.config)
    }
}

/// Everything one ingestion run produces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Batch {
    /// Assembled articles, in input order
    pub articles: Vec<Article>,
    /// Pool of interned journals the articles refer into
    pub journals: JournalPool,
    /// Pool of interned subjects the articles refer into
    pub subjects: SubjectPool,
    /// Recoverable problems encountered during the run
    pub diagnostics: Vec<Diagnostic>,
}
