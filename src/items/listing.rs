use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of the collection rankings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingItem {
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Any further columns the in-page routine scraped.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ListingItem {
    pub fn new(rank: u32, name: impl Into<String>) -> Self {
        Self {
            rank,
            name: name.into(),
            slug: None,
            logo: None,
            extra: Map::new(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Rows seen mid-render carry rank 0 or an empty name.
    pub fn is_complete(&self) -> bool {
        self.rank != 0 && !self.name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_rows_are_incomplete() {
        assert!(!ListingItem::new(0, "Azuki").is_complete());
        assert!(!ListingItem::new(3, "").is_complete());
        assert!(!ListingItem::new(3, "   ").is_complete());
        assert!(ListingItem::new(3, "Azuki").is_complete());
    }

    #[test]
    fn test_keeps_extra_columns() {
        let item: ListingItem = serde_json::from_value(json!({
            "rank": 7,
            "name": "Doodles",
            "slug": "doodles-official",
            "volume": "1,204"
        }))
        .unwrap();
        assert_eq!(item.rank, 7);
        assert_eq!(item.slug.as_deref(), Some("doodles-official"));
        assert_eq!(item.extra.get("volume"), Some(&json!("1,204")));
    }

    #[test]
    fn test_missing_fields_default_to_partial() {
        let item: ListingItem = serde_json::from_value(json!({"slug": "x"})).unwrap();
        assert_eq!(item.rank, 0);
        assert!(item.name.is_empty());
    }
}
