//! Embedded-JSON extraction for free-form model replies.
//!
//! Models are told to answer with JSON only, but routinely wrap it in prose or
//! markdown fences. These helpers find brace-balanced objects in the reply by
//! tracking nesting depth, skipping braces inside string literals.

use serde::de::DeserializeOwned;

/// Returns the top-level brace-balanced `{...}` spans in `text`, in order.
/// Scanning resumes after each span, so objects nested inside an earlier
/// span are never yielded on their own.
pub fn object_candidates(text: &str) -> impl Iterator<Item = &str> + '_ {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        while let Some(offset) = text[cursor..].find('{') {
            let start = cursor + offset;
            match balanced_end(&text[start..]) {
                Some(len) => {
                    cursor = start + len;
                    return Some(&text[start..cursor]);
                }
                None => cursor = start + 1,
            }
        }
        cursor = text.len();
        None
    })
}

/// Decodes the first balanced object in `text` that deserializes as `T`.
pub fn decode_embedded<T: DeserializeOwned>(text: &str) -> Option<T> {
    object_candidates(text).find_map(|candidate| serde_json::from_str(candidate).ok())
}

/// Given text starting with `{`, returns the byte length of the balanced
/// object, or `None` if it never closes.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}
