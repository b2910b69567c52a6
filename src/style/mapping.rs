//! Category → style lookup.
//!
//! Category keys are always compared as strings after normalization: surrounding
//! whitespace is dropped and numeric-like keys are reduced to their integer form, so
//! a data value `7`, `07` or `7.0` matches a style entry `"7"`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::color::Color;
use super::marker::MarkerStyle;
use crate::error::{GeoScatterError, Result};

/// Canonical form of a category key
pub fn normalize_category_key(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return i.to_string();
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
            return (f as i64).to_string();
        }
    }
    trimmed.to_string()
}

/// Draw/legend order for categories given in first-appearance order.
///
/// When every key is an integer the categories are sorted numerically, otherwise the
/// first-appearance order is kept.
pub fn sort_categories(first_seen: Vec<String>) -> Vec<String> {
    let numeric: Option<Vec<(i64, String)>> = first_seen
        .iter()
        .map(|k| k.parse::<i64>().ok().map(|n| (n, k.clone())))
        .collect();

    match numeric {
        Some(mut pairs) if !pairs.is_empty() => {
            pairs.sort_by_key(|(n, _)| *n);
            pairs.into_iter().map(|(_, k)| k).collect()
        }
        _ => first_seen,
    }
}

#[derive(Debug, Deserialize)]
struct CategoryStyleDef {
    color: Color,
    #[serde(default)]
    marker: Option<MarkerStyle>,
}

/// Color and glyph for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CategoryStyleDef")]
pub struct CategoryStyle {
    pub color: Color,
    pub marker: MarkerStyle,
}

impl CategoryStyle {
    pub fn new(color: Color, marker: MarkerStyle) -> Self {
        Self { color, marker }
    }
}

impl TryFrom<CategoryStyleDef> for CategoryStyle {
    type Error = GeoScatterError;

    fn try_from(def: CategoryStyleDef) -> std::result::Result<Self, Self::Error> {
        // A missing marker selects the composite X-in-square glyph
        let marker = def.marker.unwrap_or_else(MarkerStyle::x_in_square);
        marker.validate()?;
        Ok(Self {
            color: def.color,
            marker,
        })
    }
}

/// Mapping from normalized category key to style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HashMap<String, CategoryStyle>", into = "HashMap<String, CategoryStyle>")]
pub struct StyleMapping {
    entries: HashMap<String, CategoryStyle>,
}

impl StyleMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a style, rejecting keys that collide after normalization
    pub fn insert(&mut self, key: &str, style: CategoryStyle) -> Result<()> {
        let normalized = normalize_category_key(key);
        if self.entries.contains_key(&normalized) {
            return Err(GeoScatterError::InvalidParameter {
                param: "style".to_string(),
                message: format!("Duplicate style entry for category '{}'", normalized),
            });
        }
        self.entries.insert(normalized, style);
        Ok(())
    }

    /// Builder-style insert for literals in code and tests
    pub fn with(mut self, key: &str, style: CategoryStyle) -> Result<Self> {
        self.insert(key, style)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&CategoryStyle> {
        self.entries.get(&normalize_category_key(key))
    }

    /// Like `get`, but a missing key is a `StyleLookup` error
    pub fn lookup(&self, key: &str) -> Result<&CategoryStyle> {
        self.get(key).ok_or_else(|| GeoScatterError::StyleLookup {
            category: normalize_category_key(key),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<HashMap<String, CategoryStyle>> for StyleMapping {
    type Error = GeoScatterError;

    fn try_from(raw: HashMap<String, CategoryStyle>) -> std::result::Result<Self, Self::Error> {
        // Sorted so a collision always reports the same key
        let mut pairs: Vec<(String, CategoryStyle)> = raw.into_iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut mapping = StyleMapping::new();
        for (key, style) in pairs {
            mapping.insert(&key, style)?;
        }
        Ok(mapping)
    }
}

impl From<StyleMapping> for HashMap<String, CategoryStyle> {
    fn from(mapping: StyleMapping) -> Self {
        mapping.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::marker::NamedShape;

    fn red_circle() -> CategoryStyle {
        CategoryStyle::new(Color::rgb(255, 0, 0), MarkerStyle::Named(NamedShape::Circle))
    }

    #[test]
    fn test_normalize_category_key() {
        assert_eq!(normalize_category_key("7"), "7");
        assert_eq!(normalize_category_key(" 07 "), "7");
        assert_eq!(normalize_category_key("7.0"), "7");
        assert_eq!(normalize_category_key("7.5"), "7.5");
        assert_eq!(normalize_category_key("KS-21-3"), "KS-21-3");
        assert_eq!(normalize_category_key(" KH-23-3"), "KH-23-3");
    }

    #[test]
    fn test_sort_numeric_categories() {
        let keys = vec!["10".to_string(), "2".to_string(), "7".to_string(), "1".to_string()];
        assert_eq!(sort_categories(keys), vec!["1", "2", "7", "10"]);
    }

    #[test]
    fn test_non_numeric_categories_keep_first_appearance() {
        let keys = vec![
            "KS-22-15".to_string(),
            "KH-23-3".to_string(),
            "KS-18-5".to_string(),
        ];
        assert_eq!(sort_categories(keys.clone()), keys);

        // One non-numeric key disables numeric sorting for the whole set
        let mixed = vec!["3".to_string(), "A".to_string(), "1".to_string()];
        assert_eq!(sort_categories(mixed.clone()), mixed);
    }

    #[test]
    fn test_lookup() {
        let mapping = StyleMapping::new().with("7", red_circle()).unwrap();
        assert!(mapping.lookup("7").is_ok());
        assert!(mapping.lookup("07").is_ok());

        match mapping.lookup("B") {
            Err(GeoScatterError::StyleLookup { category }) => assert_eq!(category, "B"),
            other => panic!("expected StyleLookup, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_after_normalization() {
        let mapping = StyleMapping::new().with("7", red_circle()).unwrap();
        assert!(mapping.with("7.0", red_circle()).is_err());
    }

    #[test]
    fn test_deserialize_mapping_with_null_marker() {
        let mapping: StyleMapping = serde_json::from_str(
            r#"{
                "1": {"color": "red", "marker": "o"},
                "7": {"color": "pink", "marker": null},
                "9": {"color": "navy"}
            }"#,
        )
        .unwrap();

        assert_eq!(mapping.len(), 3);
        assert_eq!(
            mapping.get("1").unwrap().marker,
            MarkerStyle::Named(NamedShape::Circle)
        );
        assert_eq!(mapping.get("7").unwrap().marker, MarkerStyle::x_in_square());
        assert_eq!(mapping.get("9").unwrap().marker, MarkerStyle::x_in_square());
    }

    #[test]
    fn test_deserialize_rejects_bad_color() {
        let result: std::result::Result<StyleMapping, _> =
            serde_json::from_str(r#"{"1": {"color": "no-such-color", "marker": "o"}}"#);
        assert!(result.is_err());
    }
}
