//! Short-link unwrapping through an AllOrigins-style fetch proxy.
//!
//! Share links (`maps.app.goo.gl/...`) only reveal their coordinates after a
//! redirect. The proxy follows the redirect server-side and answers with the
//! final URL and the page body.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ProviderError;
use crate::traits::{LinkUnwrapper, UnwrappedLink};

#[derive(Debug, Clone)]
pub struct LinkProxyConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for LinkProxyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.allorigins.win".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinkProxyClient {
    config: LinkProxyConfig,
    client: reqwest::Client,
}

impl LinkProxyClient {
    pub fn new(config: LinkProxyConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl LinkUnwrapper for LinkProxyClient {
    async fn unwrap_link(&self, url: &str) -> Result<UnwrappedLink, ProviderError> {
        let endpoint = format!("{}/get", self.config.base_url.trim_end_matches('/'));
        let body = self
            .client
            .get(endpoint)
            .query(&[("url", url)])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())?
            .json::<ProxyResponse>()
            .await?;

        let final_url = body
            .status
            .and_then(|status| status.url)
            .filter(|url| !url.is_empty());

        Ok(UnwrappedLink {
            final_url,
            body: body.contents.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    #[serde(default)]
    contents: Option<String>,
    #[serde(default)]
    status: Option<ProxyStatus>,
}

#[derive(Debug, Deserialize)]
struct ProxyStatus {
    #[serde(default)]
    url: Option<String>,
}
