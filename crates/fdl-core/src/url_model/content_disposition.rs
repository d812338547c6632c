//! Content-Disposition file-name extraction (`filename` and RFC 5987 `filename*`).

use percent_encoding::percent_decode_str;

/// Extracts the file name from a raw Content-Disposition header value.
///
/// `filename*=charset''percent-encoded` wins over a plain `filename` when both
/// are present. Quoted values are unquoted and unescaped.
pub fn parse_content_disposition_filename(header_value: &str) -> Option<String> {
    let mut plain: Option<String> = None;

    for param in header_value.split(';').map(str::trim) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if key.eq_ignore_ascii_case("filename*") {
            if let Some(name) = decode_extended(value) {
                return Some(name);
            }
        } else if key.eq_ignore_ascii_case("filename") {
            let name = unquote(value);
            if !name.is_empty() {
                plain = Some(name);
            }
        }
    }

    plain
}

/// Decodes an RFC 5987 ext-value: `charset'lang'pct-encoded`. Only UTF-8 and
/// ISO-8859-1 style ASCII payloads are accepted; both decode as UTF-8 lossy.
fn decode_extended(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;
    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("iso-8859-1") {
        return None;
    }
    let decoded = percent_decode_str(&unquote(encoded))
        .decode_utf8_lossy()
        .into_owned();
    (!decoded.is_empty()).then_some(decoded)
}

/// Strips surrounding double quotes and resolves `\"` / `\\` escapes.
fn unquote(value: &str) -> String {
    let inner = match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner,
        None => return value.to_string(),
    };
    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    out
}
