use once_cell::sync::Lazy;
use regex::Regex;

static ORCID_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://(?:www\.)?orcid\.org/(.+)$").unwrap());

/// Strips the `orcid.org` URL prefix from an ORCID value, if present.
///
/// Crossref delivers ORCIDs as full URLs; only the bare identifier is kept.
/// Values without the prefix are returned trimmed but otherwise untouched.
pub fn strip_orcid_url(orcid: &str) -> String {
    let orcid = orcid.trim();
    match ORCID_URL_REGEX.captures(orcid) {
        Some(captures) => captures[1].to_string(),
        None => orcid.to_string(),
    }
}
