//! Export formatting

use crate::types::LogRecord;

/// Substitute the `d%`, `t%`, `i%`, `l%` and `m%` placeholders of `template`.
///
/// Substitution is a single left-to-right pass, so placeholder-like text
/// inside a substituted value is never expanded again.
pub fn render_template(template: &str, record: &LogRecord, index: usize) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if chars.peek() == Some(&'%') {
            let value = match c {
                'd' => Some(record.timestamp.clone()),
                't' => Some(record.level.code().to_string()),
                'i' => Some(index.to_string()),
                'l' => Some(record.label.clone()),
                'm' => Some(record.message_text()),
                _ => None,
            };
            if let Some(value) = value {
                out.push_str(&value);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }

    out
}
