//! File-name sanitization against an explicit deny-list.

/// Longest file name most filesystems accept, in bytes.
pub const NAME_MAX: usize = 255;

/// Characters rejected by at least one common filesystem (Windows is the strictest).
/// Control characters, NUL included, are rejected separately.
const DENIED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Removes every denied or control character from `name`, trims surrounding
/// whitespace and dots, and caps the result at [`NAME_MAX`] bytes.
///
/// May return an empty string; callers pick a fallback.
pub fn sanitize_file_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| !c.is_control() && !DENIED.contains(c))
        .collect();
    let trimmed = kept.trim_matches(|c: char| c.is_whitespace() || c == '.');
    truncate_utf8(trimmed, NAME_MAX).to_string()
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a character.
pub(crate) fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut take = max;
    while take > 0 && !s.is_char_boundary(take) {
        take -= 1;
    }
    &s[..take]
}
