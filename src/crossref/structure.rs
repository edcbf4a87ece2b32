//! Intermediate per-record structure used during assembly.

use crate::{Article, Author, Date};

/// Staging area for one article, populated field by field during extraction
/// and consumed once into an immutable [`Article`].
///
/// Every field starts at its default; extraction only ever fills fields in.
/// A field whose extraction fails simply keeps its default value.
#[derive(Debug, Clone, Default)]
pub(crate) struct ArticleDraft {
    pub(crate) title: String,
    pub(crate) doi: String,
    pub(crate) type_code: Option<u8>,
    pub(crate) published: Vec<Date>,
    pub(crate) issued: Vec<Date>,
    pub(crate) score: f64,
    pub(crate) volume: String,
    pub(crate) issue: String,
    pub(crate) trial_numbers: Vec<String>,
    pub(crate) reference_count: u32,
    pub(crate) cited_by_count: u32,
    pub(crate) references: Vec<String>,
    pub(crate) subject_ids: Vec<u32>,
    pub(crate) authors: Vec<Author>,
    pub(crate) journal_ids: Vec<u32>,
}

impl ArticleDraft {
    /// Consumes the draft into a finished article with the given identifier.
    pub(crate) fn finish(self, id: u32) -> Article {
        Article {
            id,
            title: self.title,
            doi: self.doi,
            type_code: self.type_code,
            published: self.published,
            issued: self.issued,
            score: self.score,
            volume: self.volume,
            issue: self.issue,
            trial_numbers: self.trial_numbers,
            reference_count: self.reference_count,
            cited_by_count: self.cited_by_count,
            references: self.references,
            subject_ids: self.subject_ids,
            authors: self.authors,
            journal_ids: self.journal_ids,
        }
    }
}
