//! Sensitive-data redaction
//!
//! Masks the values of configured field names in serialized payloads, in
//! both URL-encoded (`token=abc`) and JSON (`"token":"abc"`) form. The
//! captured value is replaced by its first and last `reservedSize / 2`
//! characters around a fixed mask.
//!
//! Replacement targets the first literal occurrence of a captured value
//! in the working text rather than the matched span, so a sensitive value
//! that also appears earlier as unrelated text masks that occurrence.

use regex::Regex;

use crate::config::FilterWords;

/// Mask inserted between the visible halves
pub const MASK: &str = "********";

/// Visible characters when a field does not configure `reservedSize`
pub const DEFAULT_RESERVED_SIZE: usize = 12;

/// Compiled pattern pair for a set of sensitive field names
#[derive(Debug, Clone)]
pub struct Redactor {
    words: FilterWords,
    url: Regex,
    json: Regex,
}

impl Redactor {
    /// Compile the patterns for `words`. Returns `None` for an empty filter.
    pub fn new(words: &FilterWords) -> Option<Self> {
        if words.is_empty() {
            return None;
        }

        let (url, json) = build_patterns(words);
        // Field names are escaped, so both patterns are always valid.
        let url = Regex::new(&url).ok()?;
        let json = Regex::new(&json).ok()?;

        Some(Self {
            words: words.clone(),
            url,
            json,
        })
    }

    /// Redact every configured field in `text`
    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        for pattern in [&self.url, &self.json] {
            for caps in pattern.captures_iter(text) {
                let (Some(word), Some(value)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let reserved = self
                    .words
                    .get(word.as_str())
                    .and_then(|f| f.reserved_size)
                    .unwrap_or(DEFAULT_RESERVED_SIZE);

                let value = value.as_str();
                result = result.replacen(value, &mask_value(value, reserved), 1);
            }
        }

        result
    }
}

/// Build the `(url, json)` pattern sources for `words`
pub fn build_patterns(words: &FilterWords) -> (String, String) {
    let alternation = words
        .keys()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");

    let url = format!(r"({})=([A-Za-z0-9_-]+)&?", alternation);
    let json = format!(r#"({})"\s*:\s*"([A-Za-z0-9_-]+)""#, alternation);
    (url, json)
}

/// Redact `text` against `words`, compiling the patterns on the spot
pub fn redact(text: &str, words: &FilterWords) -> String {
    match Redactor::new(words) {
        Some(redactor) => redactor.redact(text),
        None => text.to_string(),
    }
}

/// Keep `reserved / 2` characters at each end around the mask.
///
/// When the halves overlap (reserved >= length) characters are repeated
/// rather than rejected; a tail start below zero counts back from the end
/// once more and clamps at zero.
pub fn mask_value(value: &str, reserved: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    let half = reserved / 2;

    let head_end = half.min(len);
    let tail_start = if half <= len {
        len - half
    } else {
        (2 * len).saturating_sub(half)
    };

    let head: String = chars[..head_end].iter().collect();
    let tail: String = chars[tail_start..].iter().collect();
    format!("{}{}{}", head, MASK, tail)
}
