//! Project name normalization.

use std::path::Path;

const FALLBACK_NAME: &str = "project";

/// Derive a package-style name from the final segment of `dest`.
///
/// Lower-cases the segment and collapses every run of non-alphanumeric
/// characters into a single `-`, trimming leading and trailing hyphens.
/// Segments with no alphanumeric characters map to `project`.
pub fn normalize_name(dest: &Path) -> String {
    let segment = dest
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    normalize_segment(&segment)
}

/// Normalize a single path segment (see [`normalize_name`]).
pub fn normalize_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut pending_hyphen = false;
    for ch in segment.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if out.is_empty() {
        return FALLBACK_NAME.to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_final_segment_only() {
        assert_eq!(normalize_name(Path::new("/tmp/work/demo-app")), "demo-app");
    }

    #[test]
    fn collapses_separator_runs_and_lowercases() {
        assert_eq!(normalize_segment("My  Cool__App!!"), "my-cool-app");
        assert_eq!(normalize_segment("--Lead.and.trail--"), "lead-and-trail");
    }

    #[test]
    fn symbol_only_segment_falls_back() {
        assert_eq!(normalize_segment("___"), "project");
        assert_eq!(normalize_name(Path::new("/")), "project");
    }
}
