//! Record-by-record assembly of articles with entity interning.
//!
//! One sequential pass drives the whole batch: each record is read field by
//! field through the extractor, journals and subjects are interned into the
//! batch-wide pools as they are encountered, and the finished article is
//! appended to the output. No field problem escapes the record it occurred
//! in, and no record problem escapes the batch; only a missing top-level
//! `items` array aborts the run.
//!
//! Pool mutations are never rolled back: once a journal or subject has been
//! interned, it stays in the pool for the rest of the run even if a later
//! field of the same record fails to extract.

use serde_json::Value;

use crate::crossref::extract::{
    FieldOutcome, extract_array, extract_bool, extract_f64, extract_str, extract_u32, shape_name,
};
use crate::crossref::structure::ArticleDraft;
use crate::crossref::{Batch, CrossrefParserConfig};
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::pool::{JournalPool, PubTypeTable, SubjectPool};
use crate::utils::strip_orcid_url;
use crate::{Author, Date, IngestError, Result};

/// Parses a decoded Crossref document into a batch.
///
/// The `items` array is expected at the top level; the `message.items`
/// wrapping used by the live REST API is accepted as a fallback. Neither
/// being present is the one fatal condition of a run.
pub(crate) fn parse_batch(doc: &Value, config: &CrossrefParserConfig) -> Result<Batch> {
    let items = doc
        .get("items")
        .or_else(|| doc.get("message").and_then(|m| m.get("items")))
        .and_then(Value::as_array)
        .ok_or(IngestError::MissingItems)?;

    let types = PubTypeTable::new();
    let mut journals = JournalPool::new();
    let mut subjects = SubjectPool::new();
    let mut diagnostics = Vec::new();
    let mut articles = Vec::new();
    let mut articles_created: u32 = 0;

    for item in items {
        let draft = parse_item(
            item,
            &types,
            &mut journals,
            &mut subjects,
            &mut diagnostics,
            config,
        );
        if let Some(draft) = draft {
            let id = articles_created;
            articles_created += 1;
            articles.push(draft.finish(id));
        }
    }

    Ok(Batch {
        articles,
        journals,
        subjects,
        diagnostics,
    })
}

/// Reads fields out of one record, logging shape problems with the record's
/// title as correlation context.
struct FieldReader<'a> {
    diagnostics: &'a mut Vec<Diagnostic>,
    title: String,
}

impl FieldReader<'_> {
    fn log(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(code, message, format!("title: {}", self.title)));
    }

    fn str_field(&mut self, record: &Value, path: &str) -> Option<String> {
        match extract_str(record, path) {
            FieldOutcome::Value(v) => Some(v),
            FieldOutcome::Absent => None,
            FieldOutcome::WrongShape(msg) => {
                self.log(DiagnosticCode::ShapeMismatch, msg);
                None
            }
        }
    }

    fn u32_field(&mut self, record: &Value, path: &str) -> Option<u32> {
        match extract_u32(record, path) {
            FieldOutcome::Value(v) => Some(v),
            FieldOutcome::Absent => None,
            FieldOutcome::WrongShape(msg) => {
                self.log(DiagnosticCode::ShapeMismatch, msg);
                None
            }
        }
    }

    fn f64_field(&mut self, record: &Value, path: &str) -> Option<f64> {
        match extract_f64(record, path) {
            FieldOutcome::Value(v) => Some(v),
            FieldOutcome::Absent => None,
            FieldOutcome::WrongShape(msg) => {
                self.log(DiagnosticCode::ShapeMismatch, msg);
                None
            }
        }
    }

    fn bool_field(&mut self, record: &Value, path: &str) -> Option<bool> {
        match extract_bool(record, path) {
            FieldOutcome::Value(v) => Some(v),
            FieldOutcome::Absent => None,
            FieldOutcome::WrongShape(msg) => {
                self.log(DiagnosticCode::ShapeMismatch, msg);
                None
            }
        }
    }

    fn array_field<'v>(&mut self, record: &'v Value, path: &str) -> Option<&'v [Value]> {
        match extract_array(record, path) {
            FieldOutcome::Value(v) => Some(v),
            FieldOutcome::Absent => None,
            FieldOutcome::WrongShape(msg) => {
                self.log(DiagnosticCode::ShapeMismatch, msg);
                None
            }
        }
    }
}

/// Assembles one record into an article draft, interning shared entities
/// along the way.
///
/// Returns `None` only when the record lacks its title or DOI and the
/// parser is configured to reject such records.
fn parse_item(
    item: &Value,
    types: &PubTypeTable,
    journals: &mut JournalPool,
    subjects: &mut SubjectPool,
    diagnostics: &mut Vec<Diagnostic>,
    config: &CrossrefParserConfig,
) -> Option<ArticleDraft> {
    let mut reader = FieldReader {
        diagnostics,
        title: String::new(),
    };

    // Crossref delivers the title as a one-element array.
    let title = reader.str_field(item, "title.0");
    if let Some(ref t) = title {
        reader.title = t.clone();
    }
    let doi = reader.str_field(item, "DOI");

    if (title.is_none() || doi.is_none()) && !config.keep_incomplete {
        reader.log(
            DiagnosticCode::MissingIdentity,
            "record missing required title or DOI, skipped",
        );
        return None;
    }

    let mut draft = ArticleDraft {
        title: title.unwrap_or_default(),
        doi: doi.unwrap_or_default(),
        ..Default::default()
    };

    let publisher = reader.str_field(item, "publisher").unwrap_or_default();

    if let Some(entries) = reader.array_field(item, "container-title") {
        for journal_title in collect_strings(entries, "container-title", &mut reader) {
            draft
                .journal_ids
                .push(journals.intern(&journal_title, &publisher));
        }
    }

    if let Some(raw_authors) = reader.array_field(item, "author") {
        for raw in raw_authors {
            if !raw.is_object() {
                reader.log(
                    DiagnosticCode::MalformedElement,
                    format!(
                        "expected object element in `author`, found {}",
                        shape_name(raw)
                    ),
                );
                continue;
            }
            draft.authors.push(parse_author(raw, &mut reader));
        }
    }

    if let Some(type_name) = reader.str_field(item, "type") {
        // Unknown type names are left unresolved, never fabricated.
        draft.type_code = types.code_of(&type_name);
    }

    draft.issue = reader.str_field(item, "issue").unwrap_or_default();
    draft.volume = reader.str_field(item, "volume").unwrap_or_default();
    draft.cited_by_count = reader
        .u32_field(item, "is-referenced-by-count")
        .unwrap_or(0);
    draft.reference_count = reader.u32_field(item, "references-count").unwrap_or(0);
    draft.score = reader.f64_field(item, "score").unwrap_or(0.0);

    if let Some(entries) = reader.array_field(item, "issued.date-parts") {
        draft.issued = collect_dates(entries, "issued.date-parts", &mut reader);
    }

    // Online publication dates take precedence over print.
    if let Some(entries) = reader.array_field(item, "published-online.date-parts") {
        draft.published = collect_dates(entries, "published-online.date-parts", &mut reader);
    } else if let Some(entries) = reader.array_field(item, "published-print.date-parts") {
        draft.published = collect_dates(entries, "published-print.date-parts", &mut reader);
    }

    if let Some(entries) = reader.array_field(item, "subject") {
        for subject_title in collect_strings(entries, "subject", &mut reader) {
            draft.subject_ids.push(subjects.intern(&subject_title));
        }
    }

    if let Some(entries) = reader.array_field(item, "clinical-trial-number") {
        draft.trial_numbers = collect_strings(entries, "clinical-trial-number", &mut reader);
    }

    if let Some(entries) = reader.array_field(item, "reference") {
        for raw in entries {
            if !raw.is_object() {
                reader.log(
                    DiagnosticCode::MalformedElement,
                    format!(
                        "expected object element in `reference`, found {}",
                        shape_name(raw)
                    ),
                );
                continue;
            }
            match extract_str(raw, "DOI") {
                FieldOutcome::Value(doi) => draft.references.push(doi),
                // References without DOIs are common and carry nothing we keep.
                FieldOutcome::Absent => {}
                FieldOutcome::WrongShape(msg) => reader.log(DiagnosticCode::ShapeMismatch, msg),
            }
        }
    }

    Some(draft)
}

/// Extracts one author object. Absent names yield empty strings, not a
/// skipped author.
fn parse_author(raw: &Value, reader: &mut FieldReader<'_>) -> Author {
    let orcid = reader
        .str_field(raw, "ORCID")
        .map(|s| strip_orcid_url(&s));
    let authenticated_orcid = reader
        .bool_field(raw, "authenticated-orcid")
        .unwrap_or(false);

    let mut affiliations = Vec::new();
    if let Some(entries) = reader.array_field(raw, "affiliation") {
        affiliations = collect_strings(entries, "affiliation", reader);
    }

    Author {
        given_name: reader.str_field(raw, "given").unwrap_or_default(),
        family_name: reader.str_field(raw, "family").unwrap_or_default(),
        orcid,
        authenticated_orcid,
        affiliations,
    }
}

/// Coerces the elements of a string array, logging and skipping bad ones.
fn collect_strings(entries: &[Value], path: &str, reader: &mut FieldReader<'_>) -> Vec<String> {
    let mut values = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.as_str() {
            Some(s) => values.push(s.to_string()),
            None => reader.log(
                DiagnosticCode::MalformedElement,
                format!(
                    "expected string element in `{}`, found {}",
                    path,
                    shape_name(entry)
                ),
            ),
        }
    }
    values
}

/// Coerces the entries of a `date-parts` array, logging and skipping bad
/// ones.
fn collect_dates(entries: &[Value], path: &str, reader: &mut FieldReader<'_>) -> Vec<Date> {
    let mut dates = Vec::with_capacity(entries.len());
    for entry in entries {
        match coerce_date(entry) {
            Some(date) => dates.push(date),
            None => reader.log(
                DiagnosticCode::MalformedElement,
                format!("malformed date entry in `{}`", path),
            ),
        }
    }
    dates
}

/// One date entry is a `[year, month, day]` triple of small unsigned
/// integers; anything else is malformed.
fn coerce_date(entry: &Value) -> Option<Date> {
    let parts = entry.as_array()?;
    if parts.len() != 3 {
        return None;
    }
    Some(Date {
        year: u16::try_from(parts[0].as_u64()?).ok()?,
        month: u8::try_from(parts[1].as_u64()?).ok()?,
        day: u8::try_from(parts[2].as_u64()?).ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    fn parse(doc: Value) -> Batch {
        parse_batch(&doc, &CrossrefParserConfig::default()).unwrap()
    }

    #[rstest]
    #[case(json!([2020, 1, 2]), Some(Date { year: 2020, month: 1, day: 2 }))]
    #[case(json!([2020, 12, 31]), Some(Date { year: 2020, month: 12, day: 31 }))]
    #[case(json!([2020, 1]), None)]
    #[case(json!([2020]), None)]
    #[case(json!([2020, 1, 2, 3]), None)]
    #[case(json!([2020, "1", 2]), None)]
    #[case(json!([-2020, 1, 2]), None)]
    #[case(json!([70000, 1, 2]), None)]
    #[case(json!([2020, 300, 2]), None)]
    #[case(json!("2020-01-02"), None)]
    #[case(json!(null), None)]
    fn test_coerce_date(#[case] entry: Value, #[case] expected: Option<Date>) {
        assert_eq!(coerce_date(&entry), expected);
    }

    #[test]
    fn test_missing_items_is_fatal() {
        let result = parse_batch(&json!({"status": "ok"}), &CrossrefParserConfig::default());
        assert!(matches!(result, Err(IngestError::MissingItems)));

        let result = parse_batch(&json!({"items": "nope"}), &CrossrefParserConfig::default());
        assert!(matches!(result, Err(IngestError::MissingItems)));
    }

    #[test]
    fn test_message_items_fallback() {
        let batch = parse(json!({"message": {"items": [
            {"title": ["T"], "DOI": "10.1/a"}
        ]}}));
        assert_eq!(batch.articles.len(), 1);
    }

    #[test]
    fn test_minimal_record_gets_defaults() {
        let batch = parse(json!({"items": [{"title": ["T"], "DOI": "10.1/a"}]}));

        assert_eq!(batch.articles.len(), 1);
        let article = &batch.articles[0];
        assert_eq!(article.title, "T");
        assert_eq!(article.doi, "10.1/a");
        assert_eq!(article.type_code, None);
        assert_eq!(article.score, 0.0);
        assert!(article.volume.is_empty());
        assert!(article.published.is_empty());
        assert!(article.authors.is_empty());
        assert!(batch.diagnostics.is_empty());
    }

    #[test]
    fn test_incomplete_record_rejected_by_default() {
        let batch = parse(json!({"items": [
            {"DOI": "10.1/no-title"},
            {"title": ["No DOI"]},
            {"title": ["Good"], "DOI": "10.1/good"}
        ]}));

        assert_eq!(batch.articles.len(), 1);
        assert_eq!(batch.articles[0].title, "Good");
        assert_eq!(batch.articles[0].id, 0);
        let identity_diags: Vec<_> = batch
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::MissingIdentity)
            .collect();
        assert_eq!(identity_diags.len(), 2);
        assert_eq!(identity_diags[1].context, "title: No DOI");
    }

    #[test]
    fn test_incomplete_record_kept_when_configured() {
        let config = CrossrefParserConfig {
            keep_incomplete: true,
        };
        let batch = parse_batch(
            &json!({"items": [{"DOI": "10.1/no-title"}]}),
            &config,
        )
        .unwrap();

        assert_eq!(batch.articles.len(), 1);
        assert!(batch.articles[0].title.is_empty());
        assert_eq!(batch.articles[0].doi, "10.1/no-title");
        assert!(batch.diagnostics.is_empty());
    }

    #[test]
    fn test_wrong_shape_field_logged_and_defaulted() {
        let batch = parse(json!({"items": [
            {"title": ["T"], "DOI": "10.1/a", "volume": 12, "score": "high"}
        ]}));

        let article = &batch.articles[0];
        assert!(article.volume.is_empty());
        assert_eq!(article.score, 0.0);
        assert_eq!(batch.diagnostics.len(), 2);
        assert!(
            batch
                .diagnostics
                .iter()
                .all(|d| d.code == DiagnosticCode::ShapeMismatch)
        );
        assert_eq!(batch.diagnostics[0].context, "title: T");
    }

    #[test]
    fn test_journal_interning_across_records() {
        let batch = parse(json!({"items": [
            {"title": ["A"], "DOI": "10.1/a", "publisher": "P1",
             "container-title": ["J1", "J2"]},
            {"title": ["B"], "DOI": "10.1/b", "publisher": "P2",
             "container-title": ["J2", "J3"]}
        ]}));

        assert_eq!(batch.journals.len(), 3);
        assert_eq!(batch.articles[0].journal_ids, vec![0, 1]);
        assert_eq!(batch.articles[1].journal_ids, vec![1, 2]);
        // J2 was introduced by the first record, so it keeps P1.
        assert_eq!(batch.journals.find("J2").unwrap().publisher, "P1");
        assert_eq!(batch.journals.find("J3").unwrap().publisher, "P2");
    }

    #[test]
    fn test_authors_not_deduplicated() {
        let batch = parse(json!({"items": [
            {"title": ["T"], "DOI": "10.1/a", "author": [
                {"given": "John", "family": "Smith"},
                {"given": "John", "family": "Smith"}
            ]}
        ]}));

        assert_eq!(batch.articles[0].authors.len(), 2);
        assert_eq!(
            batch.articles[0].authors[0],
            batch.articles[0].authors[1]
        );
    }

    #[test]
    fn test_author_orcid_and_affiliations() {
        let batch = parse(json!({"items": [
            {"title": ["T"], "DOI": "10.1/a", "author": [
                {"given": "Jane", "family": "Doe",
                 "ORCID": "http://orcid.org/0000-0002-1825-0097",
                 "authenticated-orcid": true,
                 "affiliation": ["University A", "Institute B"]},
                {"family": "Nameless"}
            ]}
        ]}));

        let authors = &batch.articles[0].authors;
        assert_eq!(authors[0].orcid.as_deref(), Some("0000-0002-1825-0097"));
        assert!(authors[0].authenticated_orcid);
        assert_eq!(authors[0].affiliations, vec!["University A", "Institute B"]);
        // Absent name parts become empty strings, not skipped authors.
        assert_eq!(authors[1].given_name, "");
        assert_eq!(authors[1].family_name, "Nameless");
        assert_eq!(authors[1].orcid, None);
        assert!(!authors[1].authenticated_orcid);
    }

    #[test]
    fn test_malformed_author_element_skipped() {
        let batch = parse(json!({"items": [
            {"title": ["T"], "DOI": "10.1/a", "author": [
                "just a string",
                {"given": "Real", "family": "Author"}
            ]}
        ]}));

        assert_eq!(batch.articles[0].authors.len(), 1);
        assert_eq!(batch.articles[0].authors[0].family_name, "Author");
        assert_eq!(batch.diagnostics.len(), 1);
        assert_eq!(
            batch.diagnostics[0].code,
            DiagnosticCode::MalformedElement
        );
    }

    #[test]
    fn test_publication_type_lookup() {
        let batch = parse(json!({"items": [
            {"title": ["A"], "DOI": "10.1/a", "type": "journal-article"},
            {"title": ["B"], "DOI": "10.1/b", "type": "made-up-type"}
        ]}));

        let table = PubTypeTable::new();
        assert_eq!(
            batch.articles[0].type_code,
            table.code_of("journal-article")
        );
        // Unknown names are not fatal and fabricate nothing.
        assert_eq!(batch.articles[1].type_code, None);
        assert!(batch.diagnostics.is_empty());
    }

    #[test]
    fn test_published_online_preferred_over_print() {
        let batch = parse(json!({"items": [
            {"title": ["T"], "DOI": "10.1/a",
             "published-online": {"date-parts": [[2021, 3, 4]]},
             "published-print": {"date-parts": [[2020, 1, 2]]}}
        ]}));

        assert_eq!(
            batch.articles[0].published,
            vec![Date { year: 2021, month: 3, day: 4 }]
        );
    }

    #[test]
    fn test_published_print_fallback() {
        let batch = parse(json!({"items": [
            {"title": ["T"], "DOI": "10.1/a",
             "published-print": {"date-parts": [[2020, 1, 2]]}}
        ]}));

        assert_eq!(
            batch.articles[0].published,
            vec![Date { year: 2020, month: 1, day: 2 }]
        );
    }

    #[test]
    fn test_malformed_date_entry_skipped_not_fatal() {
        let batch = parse(json!({"items": [
            {"title": ["T"], "DOI": "10.1/a",
             "issued": {"date-parts": [[2020, 1, 2], [2021], [2022, 5, 6]]}}
        ]}));

        assert_eq!(
            batch.articles[0].issued,
            vec![
                Date { year: 2020, month: 1, day: 2 },
                Date { year: 2022, month: 5, day: 6 }
            ]
        );
        assert_eq!(batch.diagnostics.len(), 1);
        assert_eq!(
            batch.diagnostics[0].code,
            DiagnosticCode::MalformedElement
        );
    }

    #[test]
    fn test_subject_duplicates_within_record_kept() {
        let batch = parse(json!({"items": [
            {"title": ["T"], "DOI": "10.1/a", "subject": ["Physics", "Physics"]}
        ]}));

        assert_eq!(batch.subjects.len(), 1);
        assert_eq!(batch.articles[0].subject_ids, vec![0, 0]);
    }

    #[test]
    fn test_reference_dois_collected() {
        let batch = parse(json!({"items": [
            {"title": ["T"], "DOI": "10.1/a", "reference": [
                {"DOI": "10.2/ref1"},
                {"key": "no-doi-here"},
                {"DOI": ["wrong", "shape"]},
                {"DOI": "10.2/ref2"}
            ]}
        ]}));

        assert_eq!(batch.articles[0].references, vec!["10.2/ref1", "10.2/ref2"]);
        // The DOI-less reference is silently skipped; the wrong-shaped one is logged.
        assert_eq!(batch.diagnostics.len(), 1);
        assert_eq!(batch.diagnostics[0].code, DiagnosticCode::ShapeMismatch);
    }

    #[test]
    fn test_trial_numbers_verbatim() {
        let batch = parse(json!({"items": [
            {"title": ["T"], "DOI": "10.1/a",
             "clinical-trial-number": ["NCT00000001", "NCT00000001"]}
        ]}));

        assert_eq!(
            batch.articles[0].trial_numbers,
            vec!["NCT00000001", "NCT00000001"]
        );
    }

    #[test]
    fn test_counts_and_score() {
        let batch = parse(json!({"items": [
            {"title": ["T"], "DOI": "10.1/a",
             "references-count": 12, "is-referenced-by-count": 345, "score": 2.25}
        ]}));

        let article = &batch.articles[0];
        assert_eq!(article.reference_count, 12);
        assert_eq!(article.cited_by_count, 345);
        assert_eq!(article.score, 2.25);
    }

    #[test]
    fn test_bad_field_never_blocks_rest_of_record() {
        let batch = parse(json!({"items": [
            {"title": ["T"], "DOI": "10.1/a",
             "container-title": "not-an-array",
             "author": {"given": "wrong"},
             "subject": ["Physics", 7, "Chemistry"],
             "volume": "8"}
        ]}));

        let article = &batch.articles[0];
        assert!(article.journal_ids.is_empty());
        assert!(article.authors.is_empty());
        assert_eq!(article.subject_ids, vec![0, 1]);
        assert_eq!(article.volume, "8");
        assert_eq!(batch.diagnostics.len(), 3);
    }
}
