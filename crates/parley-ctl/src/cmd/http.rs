//! Shared HTTP request helpers for CLI commands.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Broker API client. Every request carries the gate cookie.
#[derive(Clone)]
pub struct ApiClient {
    base: String,
    cookie: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(server: &str, cookie: &str) -> Self {
        Self {
            base: format!("{}/api", server.trim_end_matches('/')),
            cookie: cookie.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// URL for an API route. Each segment is percent-encoded, so channel
    /// names containing `/`, `?` or `#` stay one path segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url =
            Url::parse(&self.base).with_context(|| format!("invalid server URL {}", self.base))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("server URL cannot carry a path: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get_json<R>(&self, segments: &[&str]) -> Result<R>
    where
        R: for<'de> Deserialize<'de>,
    {
        let url = self.endpoint(segments)?;
        let resp = self
            .client
            .get(url.clone())
            .header(reqwest::header::COOKIE, &self.cookie)
            .send()
            .await
            .with_context(|| format!("failed to connect to parleyd at {} (is it running?)", url))?;
        decode(resp).await
    }

    pub async fn post_json_body<T, R>(&self, segments: &[&str], body: &T) -> Result<R>
    where
        T: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let url = self.endpoint(segments)?;
        let resp = self
            .client
            .post(url.clone())
            .header(reqwest::header::COOKIE, &self.cookie)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to connect to parleyd at {} (is it running?)", url))?;
        decode(resp).await
    }
}

async fn decode<R>(resp: reqwest::Response) -> Result<R>
where
    R: for<'de> Deserialize<'de>,
{
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("broker returned {}: {}", status, body);
    }
    resp.json::<R>().await.context("failed to parse response")
}
