//! Assertion utilities for testing.
//!
//! This module provides helper functions for inspecting composed SVG documents.
//! The renderer writes one element per line, which these helpers rely on.

/// Number of `class="legend-entry"` groups in a document
pub fn legend_entry_count(svg: &str) -> usize {
    svg.matches(r#"class="legend-entry""#).count()
}

/// Number of markers drawn for a category in the map layer.
///
/// Counts the `<path` lines inside the `class="category"` group for `key`. A group
/// with no markers is written as a single self-closing `<g .../>` line.
pub fn markers_in_category(svg: &str, key: &str) -> usize {
    marker_paths(svg, key).len()
}

/// The `<path` lines drawn for a category in the map layer
pub fn marker_paths<'a>(svg: &'a str, key: &str) -> Vec<&'a str> {
    let open = format!(r#"<g class="category" data-category="{}""#, key);
    let mut inside = false;
    let mut paths = Vec::new();

    for line in svg.lines() {
        if line.starts_with(&open) {
            inside = !line.ends_with("/>");
        } else if inside && line.starts_with("</g>") {
            inside = false;
        } else if inside && line.starts_with("<path") {
            paths.push(line);
        }
    }

    paths
}

/// Category keys of the map layer, in draw order
pub fn category_order(svg: &str) -> Vec<String> {
    let prefix = r#"<g class="category" data-category=""#;
    svg.lines()
        .filter_map(|line| line.strip_prefix(prefix))
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

/// Assert that a document contains `needle` exactly `expected` times.
///
/// # Panics
///
/// Panics with the actual count if it differs.
pub fn assert_occurrences(svg: &str, needle: &str, expected: usize) {
    let actual = svg.matches(needle).count();
    assert!(
        actual == expected,
        "Expected {} occurrences of {:?}, found {}",
        expected,
        needle,
        actual
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<svg>
<g class="category" data-category="1" fill="red">
<path d="M0 0"/>
<path d="M1 1"/>
</g>
<g class="category" data-category="10" fill="blue">
<path d="M2 2"/>
</g>
<g class="category" data-category="2" fill="green"/>
<path class="coastline" d="M3 3"/>
<g class="legend-entry" data-category="1">
</g>
</svg>"#;

    #[test]
    fn test_markers_in_category() {
        assert_eq!(markers_in_category(DOC, "1"), 2);
        assert_eq!(markers_in_category(DOC, "10"), 1);
        assert_eq!(markers_in_category(DOC, "2"), 0);
        assert_eq!(markers_in_category(DOC, "3"), 0);
        assert_eq!(marker_paths(DOC, "10"), vec![r#"<path d="M2 2"/>"#]);
    }

    #[test]
    fn test_category_order() {
        assert_eq!(category_order(DOC), vec!["1", "10", "2"]);
        assert_eq!(legend_entry_count(DOC), 1);
        assert_occurrences(DOC, "<path", 4);
    }
}
