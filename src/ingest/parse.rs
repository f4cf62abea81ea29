// src/ingest/parse.rs
//! CSV feed parsing: header row + data rows into typed [`Member`]s.
//!
//! Coercion is driven by the header name. Rows missing `id`, `name` or
//! `url` are dropped; unparseable values become absent fields.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::member::{Category, Member, Price};

/// Row counters for one parse run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Data rows seen (header excluded).
    pub rows: usize,
    pub kept: usize,
    pub dropped: usize,
}

/// Parse a CSV feed into members, silently dropping invalid rows.
pub fn parse_csv(text: &str) -> Vec<Member> {
    parse_csv_with_stats(text).0
}

pub fn parse_csv_with_stats(text: &str) -> (Vec<Member>, ParseStats) {
    let mut stats = ParseStats::default();
    let text = text.trim();
    if text.lines().count() < 2 {
        return (Vec::new(), stats);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(|s| s.trim().to_string()).collect(),
        Err(e) => {
            tracing::warn!(error = ?e, "feed header row unreadable");
            return (Vec::new(), stats);
        }
    };

    let mut out = Vec::new();
    for result in reader.records() {
        stats.rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = ?e, row = stats.rows, "skipping unreadable feed row");
                stats.dropped += 1;
                continue;
            }
        };
        match member_from_record(&headers, &record) {
            Some(m) => {
                stats.kept += 1;
                out.push(m);
            }
            None => {
                tracing::debug!(row = stats.rows, "dropping feed row without id/name/url");
                stats.dropped += 1;
            }
        }
    }

    (out, stats)
}

fn member_from_record(headers: &[String], record: &StringRecord) -> Option<Member> {
    let mut m = Member::new(String::new(), String::new(), String::new());

    for (idx, header) in headers.iter().enumerate() {
        let value = match record.get(idx).map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => continue,
        };

        match header.as_str() {
            "id" => m.id = value.to_string(),
            "name" => m.name = value.to_string(),
            "url" => m.url = value.to_string(),
            "openSource" => m.open_source = Some(value.eq_ignore_ascii_case("true")),
            "score" => m.score = parse_count(value),
            "clicks7d" => m.clicks_7d = parse_count(value),
            "category" => m.category = Category::parse(value),
            "price" => m.price = Price::parse(value),
            "desc" => m.desc = Some(value.to_string()),
            "logo" => m.logo = Some(value.to_string()),
            "createdAt" => m.created_at = Some(value.to_string()),
            _ => {}
        }
    }

    m.is_valid().then_some(m)
}

/// Non-negative finite number, else absent.
fn parse_count(s: &str) -> Option<f64> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
