use crate::auth::get_auth_headers;
use crate::card::SearchPayload;
use crate::config::Settings;
use crate::error::SearchError;
use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client, Method};
use tracing::debug;
use url::Url;

/// The remote card search, seen as one async call.
#[async_trait]
pub trait CardSearch: Send + Sync {
    async fn search_cards(&self, filter: &str) -> Result<SearchPayload, SearchError>;
}

/// HTTP search against a swu-db style endpoint
/// (`GET {base}/cards/search?q=<filter>`).
#[derive(Debug, Clone)]
pub struct SwuDbClient {
    client: Client,
    base_url: Url,
    headers: HeaderMap,
}

impl SwuDbClient {
    pub fn new(settings: &Settings) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(settings.request_timeout).build()?;
        let headers = get_auth_headers(settings.api_token.as_deref())?;
        Ok(Self::with_client(client, settings.api_base_url.clone(), headers))
    }

    pub fn with_client(client: Client, base_url: Url, headers: HeaderMap) -> Self {
        SwuDbClient {
            client,
            base_url,
            headers,
        }
    }

    pub fn search_url(&self, filter: &str) -> Result<Url, SearchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SearchError::new(&format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["cards", "search"]);
        url.query_pairs_mut().append_pair("q", filter);
        Ok(url)
    }
}

#[async_trait]
impl CardSearch for SwuDbClient {
    async fn search_cards(&self, filter: &str) -> Result<SearchPayload, SearchError> {
        let url = self.search_url(filter)?;
        debug!(%url, "searching cards");
        let request = self
            .client
            .request(Method::GET, url)
            .headers(self.headers.clone());

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status { status });
        }
        let body = response.text().await?;
        let payload: SearchPayload = serde_json::from_str(&body)?;
        Ok(payload)
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
