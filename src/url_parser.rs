//! Extraction of Drive file/folder identifiers from URLs and free text.

use regex::Regex;
use std::sync::LazyLock;

/// `/d/<id>` path segment, as in file links and editor links.
static FILE_SEGMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("Invalid file segment regex"));

/// `/folders/<id>` path segment, as in folder links.
static FOLDER_SEGMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/folders/([a-zA-Z0-9_-]+)").expect("Invalid folder segment regex")
});

/// Bare Drive identifier. Real IDs are well over 25 characters, which keeps
/// ordinary words in descriptions from matching.
static BARE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{25,}$").expect("Invalid bare ID regex"));

/// Extract a Drive ID from a URL or a bare identifier string.
///
/// Patterns are tried in a fixed priority order:
/// 1. a `/d/<ID>` path segment
/// 2. a `/folders/<ID>` path segment
/// 3. a bare token of at least 25 ID characters
///
/// Returns `None` when nothing matches.
///
/// # Examples
///
/// ```
/// use classroom_dl::url_parser::extract_id;
///
/// let id = extract_id("https://drive.google.com/file/d/1abc123/view");
/// assert_eq!(id.as_deref(), Some("1abc123"));
///
/// assert_eq!(extract_id("short"), None);
/// ```
pub fn extract_id(text: &str) -> Option<String> {
    let trimmed = text.trim();

    if let Some(captures) = FILE_SEGMENT_REGEX.captures(trimmed) {
        if let Some(id) = captures.get(1) {
            return Some(id.as_str().to_string());
        }
    }

    if let Some(captures) = FOLDER_SEGMENT_REGEX.captures(trimmed) {
        if let Some(id) = captures.get(1) {
            return Some(id.as_str().to_string());
        }
    }

    if BARE_ID_REGEX.is_match(trimmed) {
        return Some(trimmed.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_file_segment() {
        let url = "https://drive.google.com/file/d/ABC123-_xyz/view";
        assert_eq!(extract_id(url).unwrap(), "ABC123-_xyz");
    }

    #[test]
    fn test_extract_folder_segment() {
        let url = "https://drive.google.com/drive/folders/FOLDER1?usp=sharing";
        assert_eq!(extract_id(url).unwrap(), "FOLDER1");
    }

    #[test]
    fn test_extract_from_description_text() {
        let text = "Slides here: https://docs.google.com/presentation/d/1a2b3c/edit";
        assert_eq!(extract_id(text).unwrap(), "1a2b3c");
    }

    #[test]
    fn test_bare_id_needs_25_chars() {
        assert_eq!(extract_id("short"), None);
        let id = "1a2b3c4d5e6f7g8h9i0j1a2b3";
        assert_eq!(extract_id(id).unwrap(), id);
    }

    #[test]
    fn test_file_segment_wins_over_folder() {
        let url = "https://x.test/d/FILEID/folders/FOLDERID";
        assert_eq!(extract_id(url).unwrap(), "FILEID");
    }

    #[test]
    fn test_no_match() {
        assert_eq!(extract_id(""), None);
        assert_eq!(extract_id("   "), None);
        assert_eq!(extract_id("https://example.com/nothing/here"), None);
    }
}
