//! Network fetching for assets that are not served from cache.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::{Client, Method};
use std::time::Duration;

use super::traits::{AssetRequest, AssetResponse};

/// Something that can perform a request against the network.
#[async_trait]
pub trait Fetch: Send + Sync {
  async fn fetch(&self, request: AssetRequest) -> Result<AssetResponse>;
}

/// HTTP fetcher backed by reqwest.
#[derive(Clone)]
pub struct HttpFetcher {
  client: Client,
}

impl HttpFetcher {
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(concat!("doable/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client })
  }
}

#[async_trait]
impl Fetch for HttpFetcher {
  /// Any status is a response; only transport failures are errors.
  async fn fetch(&self, request: AssetRequest) -> Result<AssetResponse> {
    let method = Method::from_bytes(request.method.as_bytes())
      .map_err(|e| eyre!("Invalid method {}: {}", request.method, e))?;

    let response = self
      .client
      .request(method, request.url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", request.url, e))?;

    let url = response.url().to_string();
    let status = response.status().as_u16();
    let headers: Vec<(String, String)> = response
      .headers()
      .iter()
      .filter_map(|(name, value)| {
        value
          .to_str()
          .ok()
          .map(|v| (name.as_str().to_string(), v.to_string()))
      })
      .collect();

    let body = response
      .bytes()
      .await
      .map_err(|e| eyre!("Failed to read body of {}: {}", url, e))?;

    let asset = AssetResponse::new(url, status, body.to_vec());
    Ok(
      headers
        .iter()
        .fold(asset, |asset, (name, value)| asset.with_header(name, value)),
    )
  }
}
