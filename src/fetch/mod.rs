//! HTTP plumbing shared by every provider.
//!
//! Providers only see the [`HttpClient`] trait, so tests can swap the real
//! [`BasicClient`] for canned responses.

mod basic;
mod client;
mod headers;

pub use basic::{BasicClient, USER_AGENT};
pub use client::HttpClient;
pub use headers::WithHeaders;

use anyhow::{Context, Result, bail};
use reqwest::header::{self, HeaderValue};
use reqwest::{Method, Request};
use tracing::debug;

/// GETs `url` and returns the body as text.
///
/// # Errors
///
/// Fails on transport errors, non-2xx statuses and undecodable bodies.
pub async fn fetch_text<C: HttpClient>(client: &C, url: &str) -> Result<String> {
    let req = Request::new(
        Method::GET,
        url.parse().with_context(|| format!("invalid url '{url}'"))?,
    );

    send(client, req).await
}

/// POSTs `fields` as an urlencoded form to `url` and returns the body as text.
pub async fn post_form<C: HttpClient>(
    client: &C,
    url: &str,
    fields: &[(&str, &str)],
) -> Result<String> {
    let mut req = Request::new(
        Method::POST,
        url.parse().with_context(|| format!("invalid url '{url}'"))?,
    );

    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    req.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    *req.body_mut() = Some(body.into());

    send(client, req).await
}

async fn send<C: HttpClient>(client: &C, req: Request) -> Result<String> {
    let url = req.url().clone();
    let resp = client.execute(req).await?;

    let status = resp.status();
    if !status.is_success() {
        bail!("{url} returned status {status}");
    }

    let body = resp.text().await?;
    debug!(%url, bytes = body.len(), "Response body received");
    Ok(body)
}
