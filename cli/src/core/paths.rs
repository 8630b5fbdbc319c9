use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

/// Sentinel folder used for requests that sit at the top of the collection.
pub const ROOT_FOLDER: &str = "root";

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^a-zA-Z0-9]").unwrap();
}

pub fn clean_path_str(s: &str) -> &str {
    #[cfg(windows)]
    {
        if let Some(stripped) = s.strip_prefix(r"\\?\") {
            return stripped;
        }
    }
    s
}

pub fn clean_path(path: &Path) -> String {
    let s = path.display().to_string();
    clean_path_str(&s).to_string()
}

/// Collapses every whitespace run to a single `_`. Characters that are illegal
/// in file names are passed through untouched.
pub fn path_safe_segment(name: &str) -> String {
    WHITESPACE_RUN.replace_all(name, "_").into_owned()
}

/// Lower-case file-name form used by the Cypress specs: every character
/// outside `[a-zA-Z0-9]` becomes `_`.
pub fn safe_name(name: &str) -> String {
    NON_ALPHANUMERIC.replace_all(name, "_").to_lowercase()
}

/// Slash-joined folder key, or the root sentinel for an empty path.
pub fn folder_key(segments: &[String]) -> String {
    if segments.is_empty() {
        ROOT_FOLDER.to_string()
    } else {
        segments.join("/")
    }
}
