use crate::error::SearchError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

/// Headers sent with every search request. The token is optional; the public
/// endpoint answers without one.
pub fn get_auth_headers(token: Option<&str>) -> Result<HeaderMap, SearchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(token)?);
    }
    Ok(headers)
}
