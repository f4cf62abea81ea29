//! Listing queries: free-text / category filtering, sort dispatch and limit.

use serde::Deserialize;

use crate::member::Member;
use crate::rank::{sort_members, SortMode};

pub const DEFAULT_LIMIT: usize = 100;

/// Query-string parameters of the member listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub cat: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    /// Kept as text so a malformed value falls back to the default limit.
    #[serde(default)]
    pub limit: Option<String>,
}

impl MemberQuery {
    pub fn sort_mode(&self) -> SortMode {
        match self.sort.as_deref().map(str::trim) {
            None | Some("") => SortMode::Hot,
            Some(s) => SortMode::from_param(s),
        }
    }

    pub fn limit_or(&self, default_limit: usize) -> usize {
        self.limit
            .as_deref()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(default_limit)
    }
}

/// Case-insensitive substring match on `name` or `desc`.
pub fn matches_text(m: &Member, needle_lower: &str) -> bool {
    m.name.to_lowercase().contains(needle_lower)
        || m
            .desc
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle_lower))
}

/// Filter, sort and truncate.
pub fn apply_query(members: Vec<Member>, query: &MemberQuery, default_limit: usize) -> Vec<Member> {
    let needle = query
        .q
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());
    let cat = query
        .cat
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let filtered: Vec<Member> = members
        .into_iter()
        .filter(|m| needle.as_deref().map_or(true, |n| matches_text(m, n)))
        .filter(|m| cat.map_or(true, |c| m.category.is_some_and(|mc| mc.as_str() == c)))
        .collect();

    let mut sorted = sort_members(filtered, query.sort_mode());
    sorted.truncate(query.limit_or(default_limit));
    sorted
}

/// Members whose `id` appears in the comma-separated `ids`, in input order.
pub fn select_ids(members: Vec<Member>, ids: &str) -> Vec<Member> {
    let wanted: Vec<&str> = ids
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if wanted.is_empty() {
        return Vec::new();
    }
    members
        .into_iter()
        .filter(|m| wanted.contains(&m.id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::Category;

    fn catalog() -> Vec<Member> {
        let mut a = Member::new("a", "Alpha Chat", "https://a");
        a.category = Some(Category::Agent);
        a.clicks_7d = Some(10.0);
        let mut b = Member::new("b", "Beta", "https://b");
        b.desc = Some("A CHAT assistant".into());
        b.category = Some(Category::Tool);
        b.clicks_7d = Some(50.0);
        let mut c = Member::new("c", "Gamma", "https://c");
        c.category = Some(Category::Agent);
        c.clicks_7d = Some(30.0);
        vec![a, b, c]
    }

    fn ids(v: &[Member]) -> Vec<&str> {
        v.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn text_query_matches_name_or_desc() {
        let q = MemberQuery {
            q: Some("chat".into()),
            ..Default::default()
        };
        let out = apply_query(catalog(), &q, DEFAULT_LIMIT);
        assert_eq!(ids(&out), vec!["b", "a"]);
    }

    #[test]
    fn category_is_exact() {
        let q = MemberQuery {
            cat: Some("agent".into()),
            sort: Some("clicks".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_query(catalog(), &q, DEFAULT_LIMIT)), vec!["c", "a"]);

        let q = MemberQuery {
            cat: Some("Agent".into()),
            ..Default::default()
        };
        assert!(apply_query(catalog(), &q, DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn limit_truncates_and_bad_limit_uses_default() {
        let q = MemberQuery {
            limit: Some("1".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_query(catalog(), &q, DEFAULT_LIMIT)), vec!["b"]);

        let q = MemberQuery {
            limit: Some("lots".into()),
            ..Default::default()
        };
        assert_eq!(apply_query(catalog(), &q, 2).len(), 2);
    }

    #[test]
    fn unknown_sort_keeps_catalog_order() {
        let q = MemberQuery {
            sort: Some("alphabetical".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_query(catalog(), &q, DEFAULT_LIMIT)), vec!["a", "b", "c"]);
    }

    #[test]
    fn select_ids_keeps_input_order() {
        assert_eq!(ids(&select_ids(catalog(), "c, a,zzz")), vec!["a", "c"]);
        assert!(select_ids(catalog(), " , ").is_empty());
    }
}
