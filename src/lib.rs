//! A library for ingesting Crossref JSON metadata into a deduplicated domain model.
//!
//! `crossmeta` parses the JSON export of the Crossref works API and materializes
//! it into an in-memory model of articles, authors, journals, subjects, and
//! publication types. Shared reference entities (journals, subjects) are
//! interned: at most one instance per unique title lives in a pool, and every
//! article refers to it by a stable integer identifier.
//!
//! # Key Features
//!
//! - **Entity interning**: journals and subjects are deduplicated across the
//!   whole batch, with dense identifiers assigned on first encounter
//! - **Granular error recovery**: a malformed field never loses the record,
//!   and a malformed record never loses the batch — recoverable problems are
//!   captured as structured [`Diagnostic`] entries instead of errors
//! - **Rich metadata**: authors with ORCIDs and affiliations, publication
//!   dates as compact triples, citation counts, subjects, trial numbers,
//!   and reference lists
//!
//! # Basic Usage
//!
//! ```rust
//! use crossmeta::CrossrefParser;
//!
//! let input = r#"{"items": [
//!     {"title": ["Example Article"], "DOI": "10.1000/example",
//!      "container-title": ["Example Journal"], "publisher": "Example Press"}
//! ]}"#;
//!
//! let parser = CrossrefParser::new();
//! let batch = parser.parse(input).unwrap();
//!
//! assert_eq!(batch.articles[0].title, "Example Article");
//! let journal = batch.journals.get(batch.articles[0].journal_ids[0]).unwrap();
//! assert_eq!(journal.title, "Example Journal");
//! ```
//!
//! # Error Handling
//!
//! Only structural failure — the top-level `items` array missing from the
//! input — aborts a run:
//!
//! ```rust
//! use crossmeta::{CrossrefParser, IngestError};
//!
//! let result = CrossrefParser::new().parse(r#"{"status": "ok"}"#);
//! assert!(matches!(result, Err(IngestError::MissingItems)));
//! ```
//!
//! Everything else — absent fields, wrong-shaped fields, malformed array
//! elements — is absorbed per field and reported through [`Batch::diagnostics`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod crossref;
pub mod diagnostics;
pub mod pool;
mod utils;

// Reexports
pub use crossref::{Batch, CrossrefParser, CrossrefParserConfig};
pub use diagnostics::{Diagnostic, DiagnosticCode};
pub use pool::{Journal, JournalPool, PubTypeTable, PublicationType, Subject, SubjectPool};

/// A specialized Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Represents fatal errors that abort a whole ingestion run.
///
/// Per-field and per-record problems are never surfaced here; they become
/// [`Diagnostic`] entries on the output batch.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing top-level `items` array")]
    MissingItems,
}

/// Represents an author of an article.
///
/// Authors are plain value types and are never interned: two authors with
/// identical names stay independent copies, because name equality does not
/// imply identity (the ORCID that would settle it is frequently absent).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// The author's given name (first name)
    pub given_name: String,
    /// The author's family name (surname)
    pub family_name: String,
    /// ORCID with any `orcid.org` URL prefix stripped
    pub orcid: Option<String>,
    /// Whether the ORCID was independently authenticated
    pub authenticated_orcid: bool,
    /// Affiliations, verbatim in source order
    pub affiliations: Vec<String>,
}

/// A publication date as a compact (year, month, day) triple.
///
/// This matches the integer `date-parts` representation used by the upstream
/// API; it is not a calendar-aware date type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// A single assembled article with its metadata.
///
/// Journals and subjects are held by identifier; resolve them through the
/// [`JournalPool`] and [`SubjectPool`] returned alongside the articles. All
/// fields other than `title` and `doi` default to empty/zero when absent
/// from the source record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Article {
    /// Identifier assigned in batch order
    pub id: u32,
    /// Title of the work
    pub title: String,
    /// Digital Object Identifier
    pub doi: String,
    /// Code into the publication-type table, unset when the type is unknown
    pub type_code: Option<u8>,
    /// Publication dates, online preferred over print
    pub published: Vec<Date>,
    /// Issue dates
    pub issued: Vec<Date>,
    /// Relevance score reported by the upstream API
    pub score: f64,
    /// Volume number
    pub volume: String,
    /// Issue number
    pub issue: String,
    /// Clinical trial registration numbers
    pub trial_numbers: Vec<String>,
    /// Number of works this article references
    pub reference_count: u32,
    /// Number of works referencing this article
    pub cited_by_count: u32,
    /// DOIs of the referenced works
    pub references: Vec<String>,
    /// Identifiers into the subject pool, in source order
    pub subject_ids: Vec<u32>,
    /// Authors, owned, in source order
    pub authors: Vec<Author>,
    /// Identifiers into the journal pool, in source order
    pub journal_ids: Vec<u32>,
}
