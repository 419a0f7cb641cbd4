//! Small HTTP helpers: JSON and text POSTs, GETs with query parameters.
//!
//! Every request carries `Cache-Control: no-cache`. Clients built here time
//! out after [`DEFAULT_TIMEOUT`] unless told otherwise.

use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// A client with the given timeout, or [`DEFAULT_TIMEOUT`].
pub fn client(timeout: Option<Duration>) -> Result<Client, HttpError> {
    base_builder(timeout).build().map_err(HttpError::Client)
}

/// A client that accepts self-signed and otherwise invalid certificates.
///
/// Only for talking to development servers.
pub fn insecure_client(timeout: Option<Duration>) -> Result<Client, HttpError> {
    warn!("Building HTTP client with certificate validation disabled");
    base_builder(timeout)
        .danger_accept_invalid_certs(true)
        .build()
        .map_err(HttpError::Client)
}

fn base_builder(timeout: Option<Duration>) -> ClientBuilder {
    Client::builder().timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
}

/// POST `body` as a JSON object.
pub async fn post_json(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
    body: &Map<String, Value>,
) -> Result<Response, HttpError> {
    let url = parse_url(url)?;
    debug!(%url, "POST json");
    let request = client.post(url).json(body);
    send(request, headers).await
}

/// POST `text` as a UTF-8 body.
pub async fn post_text(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
    text: &str,
) -> Result<Response, HttpError> {
    let url = parse_url(url)?;
    debug!(%url, "POST text");
    let request = client
        .post(url)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(text.to_owned());
    send(request, headers).await
}

/// GET with `params` as the query string.
///
/// `params` replace any query already present in `url`. Values are
/// form-encoded, so a literal `+` goes out as `%2B` and is not read back as a
/// space by the server.
pub async fn get_with_query(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
    params: &[(&str, &str)],
) -> Result<Response, HttpError> {
    let url = with_query(parse_url(url)?, params);
    debug!(%url, "GET");
    send(client.get(url), headers).await
}

#[must_use]
pub fn status_code(response: &Response) -> u16 {
    response.status().as_u16()
}

fn parse_url(url: &str) -> Result<Url, HttpError> {
    Url::parse(url).map_err(|source| HttpError::InvalidUrl {
        url: url.to_owned(),
        source,
    })
}

fn with_query(mut url: Url, params: &[(&str, &str)]) -> Url {
    url.set_query(None);
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    url
}

fn header_map(headers: &[(&str, &str)]) -> Result<HeaderMap, HttpError> {
    let mut map = HeaderMap::with_capacity(headers.len() + 1);
    map.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    for (name, value) in headers {
        let invalid = || HttpError::InvalidHeader {
            name: (*name).to_owned(),
        };
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(name, value);
    }
    Ok(map)
}

async fn send(request: RequestBuilder, headers: &[(&str, &str)]) -> Result<Response, HttpError> {
    let response = request.headers(header_map(headers)?).send().await?;
    debug!(status = status_code(&response), "Response received");
    Ok(response)
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::{HttpError, header_map, with_query};

    #[test]
    fn query_values_encode_plus() {
        let url = Url::parse("https://example.com/search").unwrap();
        let url = with_query(url, &[("q", "a+b c"), ("lang", "en")]);
        assert_eq!(url.query(), Some("q=a%2Bb+c&lang=en"));
    }

    #[test]
    fn params_replace_existing_query() {
        let url = Url::parse("https://example.com/search?stale=1#top").unwrap();
        let url = with_query(url, &[("q", "kit")]);
        assert_eq!(url.as_str(), "https://example.com/search?q=kit#top");

        let url = Url::parse("https://example.com/search?stale=1").unwrap();
        assert_eq!(with_query(url, &[]).as_str(), "https://example.com/search");
    }

    #[test]
    fn headers_include_no_cache_and_reject_garbage() {
        let map = header_map(&[("X-Token", "abc")]).unwrap();
        assert_eq!(map["cache-control"], "no-cache");
        assert_eq!(map["x-token"], "abc");

        assert!(matches!(
            header_map(&[("bad header", "x")]),
            Err(HttpError::InvalidHeader { name }) if name == "bad header"
        ));
        assert!(header_map(&[("X-Ok", "line\nbreak")]).is_err());
    }
}
