//! # Member
//! One catalog entry (an AI tool, model, agent or infra product).
//!
//! Only `id`, `name` and `url` are required; every other field is optional
//! and omitted from JSON when absent. Field names follow the feed headers
//! (`openSource`, `clicks7d`, `createdAt`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Model,
    Tool,
    Infra,
    Agent,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Model => "model",
            Category::Tool => "tool",
            Category::Infra => "infra",
            Category::Agent => "agent",
        }
    }

    /// Parse a feed value. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Some(Category::Model),
            "tool" => Some(Category::Tool),
            "infra" => Some(Category::Infra),
            "agent" => Some(Category::Agent),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pricing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Price {
    Free,
    Freemium,
    Paid,
}

impl Price {
    pub fn as_str(&self) -> &'static str {
        match self {
            Price::Free => "free",
            Price::Freemium => "freemium",
            Price::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Price::Free),
            "freemium" => Some(Price::Freemium),
            "paid" => Some(Price::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    /// Also the deduplication key.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_source: Option<bool>,
    /// Authoritative quality rating, non-negative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Trailing 7-day click count, non-negative.
    #[serde(default, rename = "clicks7d", skip_serializing_if = "Option::is_none")]
    pub clicks_7d: Option<f64>,
    /// Publish date as it appeared in the feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Member {
    /// Minimal member with only the required fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            category: None,
            price: None,
            open_source: None,
            score: None,
            desc: None,
            logo: None,
            clicks_7d: None,
            created_at: None,
        }
    }

    /// `id`, `name` and `url` all non-empty.
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty() && !self.url.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_uses_feed_field_names_and_skips_absent() {
        let mut m = Member::new("a", "Alpha", "https://a.example");
        m.clicks_7d = Some(5.0);
        m.open_source = Some(true);
        m.created_at = Some("2024-05-01".into());
        m.category = Some(Category::Agent);

        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["clicks7d"], 5.0);
        assert_eq!(v["openSource"], true);
        assert_eq!(v["createdAt"], "2024-05-01");
        assert_eq!(v["category"], "agent");
        assert!(v.get("score").is_none());
        assert!(v.get("price").is_none());
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!(Category::parse(" Infra "), Some(Category::Infra));
        assert_eq!(Category::parse("platform"), None);
        assert_eq!(Price::parse("FREEMIUM"), Some(Price::Freemium));
        assert_eq!(Price::parse(""), None);
    }

    #[test]
    fn validity_requires_id_name_url() {
        assert!(Member::new("a", "A", "u").is_valid());
        assert!(!Member::new("", "A", "u").is_valid());
        assert!(!Member::new("a", " ", "u").is_valid());
        assert!(!Member::new("a", "A", "").is_valid());
    }
}
