//! Slugification of display names into stable identifier strings.
//!
//! Column identifiers and user identifiers are both derived from
//! human-entered display names with the same rule: lowercase, keep only
//! latin/cyrillic letters, digits and hyphens, collapse whitespace (and
//! hyphen runs) to a single `-`, and trim edge hyphens. The function is
//! idempotent on its own output, so a stored identifier can be re-slugged
//! safely.

/// Derives an identifier slug from a display name.
///
/// Rules:
/// 1. Lowercase the input.
/// 2. Drop every character that is not `[a-z0-9а-яё]`, whitespace, or `-`.
/// 3. Collapse each run of whitespace and/or hyphens into a single `-`.
/// 4. Trim leading and trailing hyphens.
///
/// Returns an empty string when nothing survives (e.g. all punctuation).
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut gap = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            if !out.is_empty() {
                gap = true;
            }
            continue;
        }
        if matches!(c, 'a'..='z' | '0'..='9' | 'а'..='я' | 'ё') {
            if gap {
                out.push('-');
                gap = false;
            }
            out.push(c);
        }
    }
    out
}
