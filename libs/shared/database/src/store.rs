use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Row-addressable table store speaking the PostgREST dialect: every table
/// is reachable under `/rest/v1/<table>` and rows are filtered through
/// query-string operators (`eq.`, `in.(...)`, `order=`).
pub struct TableStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl TableStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.storage_url.clone(),
            service_key: config.storage_service_key.clone(),
        }
    }

    fn headers(&self, representation: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.service_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if representation {
            headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        }

        headers
    }

    async fn request<T>(
        &self,
        method: Method,
        table: &str,
        query: &str,
        body: Option<Value>,
        representation: bool,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = if query.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, table, query)
        };
        debug!("Making {} request to {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.headers(representation));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Storage API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Storage authentication error: {}", error_text),
                404 => anyhow!("Storage resource not found: {}", error_text),
                _ => anyhow!("Storage API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Fetch rows matching a filter query, e.g. `doctor=eq.X&order=start_time.asc`.
    pub async fn select<T>(&self, table: &str, query: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, table, query, None, false).await
    }

    /// Insert one row or a JSON array of rows; returns the created rows.
    pub async fn insert<T>(&self, table: &str, body: Value) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.request(Method::POST, table, "", Some(body), true).await
    }

    /// Patch every row matching the filter query; returns the updated rows.
    pub async fn update<T>(&self, table: &str, query: &str, body: Value) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, table, query, Some(body), true)
            .await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Build an `eq.` filter with a percent-encoded value. Doctor and location
/// names carry spaces and punctuation, so raw interpolation would corrupt
/// the query string.
pub fn eq_filter(column: &str, value: &str) -> String {
    format!("{}=eq.{}", column, urlencoding::encode(value))
}
