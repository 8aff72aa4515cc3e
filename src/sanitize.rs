//! Turns podcast titles into path segments that are safe on common filesystems.

const FALLBACK: &str = "file";

// Leaves room for the "{id} - " prefix and an extension under a 255 byte name limit.
const MAX_BYTES: usize = 200;

const WINDOWS_RESERVED: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Sanitizes a title for use as a single path segment.
///
/// Path separators and characters rejected by Windows are dropped, whitespace
/// is collapsed, and names that would still be unusable (empty, reserved
/// device names, hidden dot-files) fall back to `file`.
pub fn sanitize(title: &str) -> String {
    let filtered = strip_hostile(title);
    let normalized = filtered.split_whitespace().collect::<Vec<_>>().join(" ");
    let normalized = normalized.trim_end_matches('.');

    let name = if normalized.is_empty()
        || WINDOWS_RESERVED
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(normalized))
    {
        FALLBACK.to_string()
    } else if normalized.starts_with('.') {
        format!("{FALLBACK}{normalized}")
    } else {
        normalized.to_string()
    };

    let truncated = truncate(name, MAX_BYTES);
    truncated.trim_end_matches([' ', '.']).to_string()
}

pub(crate) fn strip_hostile(value: &str) -> String {
    value.chars().filter(|c| !is_hostile(*c)).collect()
}

fn is_hostile(c: char) -> bool {
    c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

fn truncate(mut name: String, max_bytes: usize) -> String {
    if name.len() > max_bytes {
        let mut end = max_bytes;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
    }
    name
}
