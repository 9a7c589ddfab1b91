//! Pattern rules that recover identity and contact fields
//! from raw résumé text. Pure: no I/O, no failure mode.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_PERSON: &str = "Unknown Person";

/// Only the head of a résumé is searched for the candidate's name. Blank lines
/// do not count; PDF extraction emits them around page and block breaks.
const NAME_LINES: usize = 3;

/// Capitalized two-or-three-word sequence anchored at a line start. Words are
/// separated by spaces or tabs so a match never spans a line break.
static NAME_AT_LINE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([A-Z][a-z]+[ \t]+[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)?)\b")
        .expect("line-start name pattern should compile")
});

static LABELLED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Full Name|Name):[ \t]*([A-Z][a-z]+[ \t]+[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)?)\b")
        .expect("labelled name pattern should compile")
});

static ANY_TWO_WORD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]+[ \t]+[A-Z][a-z]+)\b")
        .expect("two-word name pattern should compile")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}")
        .expect("email pattern should compile")
});

/// Optional `+country` code, optional `(area)` code, then 3-3-4 or 3-4 digits.
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[ .-]?)?(?:\(\d{3}\)[ .-]?)?\b\d{3}[ .-]?(?:\d{3}[ .-]?)?\d{4}\b")
        .expect("phone pattern should compile")
});

static LINKEDIN_PROFILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(https?://)?(?:www\.)?linkedin\.com/in/[A-Za-z0-9_-]+")
        .expect("linkedin profile pattern should compile")
});

static LINKEDIN_ANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(https?://)?(?:www\.)?linkedin\.com/[A-Za-z0-9_-]+")
        .expect("linkedin pattern should compile")
});

static GITHUB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(https?://)?(?:www\.)?github\.com/[A-Za-z0-9_-]+")
        .expect("github url pattern should compile")
});

static GITHUB_USERNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)github\.com/([A-Za-z0-9_-]+)").expect("github username pattern should compile")
});

/// Identity and contact fields recovered from a résumé. Each optional field is
/// absent when its pattern found nothing; a present field always matches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    /// Bare account name for the reputation lookup, distinct from the display URL.
    pub github_username: Option<String>,
}

pub fn extract_contact_info(text: &str) -> ContactInfo {
    ContactInfo {
        name: extract_name(text),
        email: first_match(&EMAIL, text),
        phone: first_match(&PHONE, text),
        linkedin_url: extract_linkedin_url(text),
        github_url: first_url(&GITHUB_URL, text),
        github_username: extract_github_username(text),
    }
}

pub fn extract_name(text: &str) -> String {
    let head = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(NAME_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    [&*NAME_AT_LINE_START, &*LABELLED_NAME, &*ANY_TWO_WORD_NAME]
        .into_iter()
        .find_map(|pattern| first_name_match(pattern, &head))
        .unwrap_or_else(|| UNKNOWN_PERSON.to_string())
}

/// A capitalized run directly followed by `:` is a field label ("Full Name:",
/// "Contact Info:"), never a name.
fn first_name_match(pattern: &Regex, head: &str) -> Option<String> {
    pattern
        .captures_iter(head)
        .filter_map(|caps| caps.get(1))
        .find(|m| !head[m.end()..].starts_with(':'))
        .map(|m| collapse_inner_whitespace(m.as_str()))
}

pub fn extract_github_username(text: &str) -> Option<String> {
    GITHUB_USERNAME
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn extract_linkedin_url(text: &str) -> Option<String> {
    first_url(&LINKEDIN_PROFILE, text).or_else(|| first_url(&LINKEDIN_ANY, text))
}

fn first_match(pattern: &Regex, text: &str) -> Option<String> {
    pattern.find(text).map(|m| m.as_str().to_string())
}

/// First URL match, prefixed with `https://` when written without a scheme.
fn first_url(pattern: &Regex, text: &str) -> Option<String> {
    let caps = pattern.captures(text)?;
    let matched = caps.get(0)?.as_str();
    if caps.get(1).is_some() {
        Some(matched.to_string())
    } else {
        Some(format!("https://{matched}"))
    }
}

fn collapse_inner_whitespace(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}
