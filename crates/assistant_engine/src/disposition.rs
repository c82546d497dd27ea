use std::sync::LazyLock;

use regex::Regex;

const MAX_FILENAME_LEN: usize = 120;
const MAX_EXTENSION_LEN: usize = 16;

static FILENAME_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*(?:"([^"]*)"|([^;\s"]+))"#)
        .expect("filename pattern is valid")
});

/// Extract the `filename` parameter from a `Content-Disposition` header value.
///
/// Quotes are optional and the parameter name is case-insensitive. The
/// extended `filename*=` form is not recognised.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let captures = FILENAME_PARAM.captures(header)?;
    let name = captures.get(1).or_else(|| captures.get(2))?.as_str().trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Name to save a report under: the server's suggestion when usable,
/// otherwise `generated_report_<unix-millis>.pdf`.
pub fn resolve_report_filename(content_disposition: Option<&str>, now_millis: i64) -> String {
    content_disposition
        .and_then(filename_from_content_disposition)
        .and_then(|name| sanitize_filename(&name))
        .unwrap_or_else(|| format!("generated_report_{now_millis}.pdf"))
}

/// Make a server-provided name safe to create inside the download directory.
///
/// Path separators and characters Windows refuses are replaced, leading and
/// trailing dots and spaces are trimmed. Returns `None` if nothing usable is
/// left.
pub fn sanitize_filename(input: &str) -> Option<String> {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut cleaned = cleaned.trim_matches(&[' ', '.'][..]).to_string();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return None;
    }
    if cleaned.len() > MAX_FILENAME_LEN {
        cleaned = shorten_keeping_extension(&cleaned);
    }
    let stem_len = cleaned.find('.').unwrap_or(cleaned.len());
    if is_reserved_windows_name(&cleaned[..stem_len]) {
        cleaned.insert(stem_len, '_');
    }
    Some(cleaned)
}

/// Cut the stem so the whole name fits `MAX_FILENAME_LEN` bytes. A short
/// extension survives; anything else is cut from the end.
fn shorten_keeping_extension(name: &str) -> String {
    let ext = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_LEN => &name[dot..],
        _ => "",
    };
    let stem = &name[..name.len() - ext.len()];
    let mut cut = MAX_FILENAME_LEN - ext.len();
    while !stem.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{ext}", stem[..cut].trim_end_matches(&[' ', '.'][..]))
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
