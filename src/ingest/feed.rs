// src/ingest/feed.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use std::time::Duration;

use crate::ingest::types::FeedSource;

/// Fetches the CSV feed over HTTP (e.g. a published spreadsheet export).
pub struct HttpFeed {
    url: String,
    client: reqwest::Client,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<String> {
        let t0 = std::time::Instant::now();
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("feed http get()")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!(
                "feed http status {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            ));
        }

        let body = resp.text().await.context("feed http .text()")?;
        histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Serves a fixed feed body. Used for local fixtures and tests.
pub struct StaticFeed {
    body: String,
}

impl StaticFeed {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch(&self) -> Result<String> {
        Ok(self.body.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
