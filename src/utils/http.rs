// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use serde_json::Value;

use crate::error::Result;
use crate::models::FetcherConfig;

/// Create a configured asynchronous HTTP client.
///
/// A timeout is only applied when one is configured.
pub fn create_client(config: &FetcherConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// GET `url` and parse the body as JSON. Non-2xx statuses are errors.
pub async fn fetch_json(client: &reqwest::Client, url: url::Url) -> Result<Value> {
    let text = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(serde_json::from_str(&text)?)
}
