//! Utility functions

use percent_encoding::percent_decode_str;

/// Decode a URL query-escaped string.
///
/// `+` decodes to a space and `%XX` to the given byte. A `%` that is not
/// followed by two hex digits, or a result that is not valid UTF-8, is an
/// error.
pub fn query_unescape(s: &str) -> Result<String, String> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                let end = (i + 3).min(bytes.len());
                return Err(format!(
                    "invalid URL escape {:?}",
                    String::from_utf8_lossy(&bytes[i..end])
                ));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = s.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| format!("decoded key is not valid UTF-8: {}", e))
}

/// Split a storage path into its container and key.
///
/// Leading and trailing slashes are ignored and the split happens on the
/// first remaining `/`. Returns `None` when either part would be empty.
pub fn split_storage_path(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.trim_matches('/');
    let (container, key) = trimmed.split_once('/')?;
    if container.is_empty() || key.is_empty() {
        return None;
    }
    Some((container, key))
}

/// Last `/`-separated component of a path
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
