//! Interning pools for shared reference entities.
//!
//! Journals and subjects are shared across many articles, so each kind is
//! owned by a single pool: at most one live instance exists per unique title,
//! and articles refer to it by the dense integer identifier assigned when the
//! title was first seen. The pools own all entity storage; nothing outside
//! them holds an entity by reference.
//!
//! Identifier counters start at zero and advance only on first-insert, never
//! on lookup-reuse, so they count how many distinct entities of that kind
//! have existed during the run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A journal, identified by its exact title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    /// Identifier assigned on first encounter
    pub id: u32,
    /// Journal title, the interning key
    pub title: String,
    /// Title of the journal's publisher
    pub publisher: String,
}

/// A topical subject tag, identified by its exact title.
///
/// The subject vocabulary is not known ahead of time; it is discovered
/// incrementally while records are processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Identifier assigned on first encounter
    pub id: u32,
    /// Subject title, the interning key
    pub title: String,
}

/// One entry of the fixed publication-type table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicationType {
    /// Stable numeric code, assigned in declaration order
    pub code: u8,
    /// Name as it appears in the upstream `type` field
    pub name: &'static str,
}

/// Pool of interned journals, keyed by exact title.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JournalPool {
    entries: Vec<Journal>,
    #[serde(skip)]
    by_title: HashMap<String, u32>,
    created: u32,
}

impl JournalPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier of the journal with this title, interning a new
    /// entry built from `(title, publisher)` if none exists yet.
    ///
    /// On a hit the candidate's publisher is discarded in favor of the pooled
    /// instance: the first record to introduce a title fixes its publisher.
    pub fn intern(&mut self, title: &str, publisher: &str) -> u32 {
        if let Some(&id) = self.by_title.get(title) {
            return id;
        }
        let id = self.created;
        self.created += 1;
        self.entries.push(Journal {
            id,
            title: title.to_string(),
            publisher: publisher.to_string(),
        });
        self.by_title.insert(title.to_string(), id);
        id
    }

    /// Resolves an identifier to its pooled journal.
    pub fn get(&self, id: u32) -> Option<&Journal> {
        self.entries.iter().find(|j| j.id == id)
    }

    /// Looks up a journal by exact title without interning.
    pub fn find(&self, title: &str) -> Option<&Journal> {
        self.by_title.get(title).and_then(|&id| self.get(id))
    }

    /// Number of distinct journals interned so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over pooled journals in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Journal> {
        self.entries.iter()
    }
}

/// Pool of interned subjects.
///
/// Lookup is a linear scan over the discovery-ordered entries. That is
/// deliberate: the observed vocabulary stays in the low hundreds, and the
/// scan keeps first-seen order trivially intact. Swapping in a title-keyed
/// map would not change any observable behavior.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubjectPool {
    entries: Vec<Subject>,
    created: u32,
}

impl SubjectPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier of the subject with this title, interning a new
    /// entry if none exists yet.
    pub fn intern(&mut self, title: &str) -> u32 {
        if let Some(existing) = self.entries.iter().find(|s| s.title == title) {
            return existing.id;
        }
        let id = self.created;
        self.created += 1;
        self.entries.push(Subject {
            id,
            title: title.to_string(),
        });
        id
    }

    /// Resolves an identifier to its pooled subject.
    pub fn get(&self, id: u32) -> Option<&Subject> {
        self.entries.iter().find(|s| s.id == id)
    }

    /// Looks up a subject by exact title without interning.
    pub fn find(&self, title: &str) -> Option<&Subject> {
        self.entries.iter().find(|s| s.title == title)
    }

    /// Number of distinct subjects interned so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over pooled subjects in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Subject> {
        self.entries.iter()
    }
}

/// Publication types known to the upstream API.
///
/// This is a closed set defined once at startup, not discovered from data.
/// A `type` value outside this list leaves the article's type code unset.
const PUBLICATION_TYPE_NAMES: [&str; 29] = [
    "book-section",
    "monograph",
    "report",
    "peer-review",
    "book-track",
    "journal-article",
    "book-part",
    "other",
    "book",
    "journal-volume",
    "book-set",
    "reference-entry",
    "proceedings-article",
    "journal",
    "component",
    "book-chapter",
    "proceedings-series",
    "report-series",
    "proceedings",
    "standard",
    "reference-book",
    "posted-content",
    "journal-issue",
    "dissertation",
    "grant",
    "dataset",
    "book-series",
    "edited-book",
    "standard-series",
];

/// The fixed table of publication types, with codes assigned in declaration
/// order.
#[derive(Debug, Clone)]
pub struct PubTypeTable {
    entries: Vec<PublicationType>,
}

impl Default for PubTypeTable {
    fn default() -> Self {
        let entries = PUBLICATION_TYPE_NAMES
            .iter()
            .enumerate()
            .map(|(code, &name)| PublicationType {
                code: code as u8,
                name,
            })
            .collect();
        Self { entries }
    }
}

impl PubTypeTable {
    /// Builds the table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code for a publication-type name, by exact match.
    pub fn code_of(&self, name: &str) -> Option<u8> {
        self.entries
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.code)
    }

    /// Returns the name carried by a code.
    pub fn name_of(&self, code: u8) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|t| t.code == code)
            .map(|t| t.name)
    }

    /// Number of known publication types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
