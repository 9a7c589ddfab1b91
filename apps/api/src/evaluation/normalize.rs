//! Prepares résumé text for prompt construction.

/// Punctuation that survives normalization alongside letters, digits and whitespace.
const ALLOWED_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '@', '#', '%', '&', '*', '+', '/', '-'];

/// Drops disallowed characters, then collapses whitespace runs to one space and trims.
///
/// Filtering happens before collapsing so that removing a character between
/// two spaces cannot leave a double space behind; this keeps the function
/// idempotent.
pub fn normalize_text(text: &str) -> String {
    let kept: String = text.chars().filter(|&c| is_allowed(c)).collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_allowed(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || ALLOWED_PUNCTUATION.contains(&c)
}
