use crate::fetch::client::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that sets a fixed group of headers on every
/// request before handing it to `inner`.
///
/// Used for endpoints that check `origin` / `referer` and expect the request
/// to look like it came from their own booking form.
pub struct WithHeaders<C> {
    pub inner: C,
    pub headers: HeaderMap,
}

impl<C> WithHeaders<C> {
    /// Builds the wrapper from `(name, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if a name or value is not a valid HTTP header.
    pub fn new(inner: C, pairs: &[(&str, &str)]) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("invalid header name '{name}'"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid value for header '{name}'"))?;
            headers.insert(name, value);
        }
        Ok(Self { inner, headers })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for WithHeaders<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        for (name, value) in &self.headers {
            req.headers_mut().insert(name.clone(), value.clone());
        }
        self.inner.execute(req).await
    }
}
