//! Upstream HTTP access.

use async_trait::async_trait;
use reqwest::Client;

use crate::Result;
use crate::bridge::Fetch;

/// Plain-GET client for the catalog site and the link pages it points at.
#[derive(Clone)]
pub struct Catalog {
    client: Client,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Fetch a page, requiring a 2xx status.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Fetch`] over a running instance: joins the origin-relative URL onto a
/// base. Any completed exchange yields its body, whatever the status code.
pub struct HttpFetch {
    client: Client,
    base: String,
}

impl HttpFetch {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn get(&self, url: &str) -> Result<String> {
        let absolute = format!("{}{}", self.base, url);
        let response = self.client.get(&absolute).send().await?;
        Ok(response.text().await?)
    }
}
