use crate::vrstats::dates::extract_year;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::sync::LazyLock;

static PDF_HREF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.pdf($|\?)").expect("pdf pattern compiles"));

const ELECTION_TOKENS: &[&str] = &[
    "primary",
    "general",
    "municipal",
    "election",
    "vr",
    "voter",
    "stats",
    "statistics",
];

/// One anchor from the listing, reduced to what classification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub href: String,
    pub text: String,
    pub basename: String,
}

impl LinkCandidate {
    pub fn new(href: &str, text: &str) -> Self {
        Self {
            href: href.to_string(),
            text: text.trim().to_string(),
            basename: href_basename(href),
        }
    }
}

/// Last path segment of `href`, percent-decoded, without query or fragment.
pub fn href_basename(href: &str) -> String {
    let without_fragment = href.split('#').next().unwrap_or_default();
    let path = without_fragment.split('?').next().unwrap_or_default();
    let last = path.rsplit('/').next().unwrap_or_default();
    percent_decode_str(last).decode_utf8_lossy().into_owned()
}

pub fn looks_like_pdf(href: &str) -> bool {
    PDF_HREF_REGEX.is_match(href)
}

pub fn looks_election_related(text: &str, basename: &str) -> bool {
    let text = text.to_lowercase();
    let basename = basename.to_lowercase();
    ELECTION_TOKENS
        .iter()
        .any(|tok| text.contains(tok) || basename.contains(tok))
}

pub fn is_archive_document(candidate: &LinkCandidate) -> bool {
    if !looks_like_pdf(&candidate.href) {
        return false;
    }

    let has_year =
        extract_year(&candidate.text).is_some() || extract_year(&candidate.basename).is_some();
    if !has_year {
        return false;
    }

    looks_election_related(&candidate.text, &candidate.basename)
}
