use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use hyper::body::to_bytes;
use hyper::client::HttpConnector;
use hyper::header::RETRY_AFTER;
use hyper::{Body, Client, Request, StatusCode};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use tokio::time::timeout;
use webpki_roots::TLS_SERVER_ROOTS;

use crate::traits::{AdapterError, AdapterResult};

pub(crate) type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Browser-like agent; the public suggestion and listing endpoints reject empty agents.
pub(crate) const USER_AGENT: &str = "creator-studio-tools/0.2 (+https://github.com/creator-studio)";

#[allow(clippy::unnecessary_wraps)]
pub(crate) fn build_https_client() -> AdapterResult<HyperClient> {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));

    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let connector = HttpsConnector::from((http, Arc::new(config)));

    Ok(Client::builder().build::<_, Body>(connector))
}

/// Sends a request under a deadline and returns the successful body.
///
/// Non-2xx answers become [`AdapterError::Response`], except 429 which becomes
/// [`AdapterError::RateLimited`].
pub(crate) async fn execute(
    client: &HyperClient,
    request: Request<Body>,
    deadline: Duration,
    provider: &'static str,
) -> AdapterResult<Bytes> {
    let response = timeout(deadline, client.request(request))
        .await
        .map_err(|_| AdapterError::Timeout {
            provider,
            after: deadline,
        })?
        .map_err(|err| AdapterError::transport(format!("{provider} request failed: {err}")))?;

    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs);

    let bytes = timeout(deadline, to_bytes(response.into_body()))
        .await
        .map_err(|_| AdapterError::Timeout {
            provider,
            after: deadline,
        })?
        .map_err(|err| {
            AdapterError::transport(format!("failed to read {provider} response: {err}"))
        })?;

    tracing::debug!(provider, %status, bytes = bytes.len(), "provider responded");

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AdapterError::RateLimited { retry_after });
    }

    if !status.is_success() {
        let reason = String::from_utf8_lossy(&bytes);
        return Err(AdapterError::response(format!(
            "{provider} returned {status}: {}",
            truncate(&reason, 512)
        )));
    }

    Ok(bytes)
}

/// Validates and normalises a base URL so it ends with a slash.
pub(crate) fn sanitize_base_url(input: &str, provider: &'static str) -> AdapterResult<String> {
    let mut base = input.trim().to_owned();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(AdapterError::configuration(format!(
            "{provider} base URL must start with http:// or https://"
        )));
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    base.parse::<hyper::Uri>().map_err(|err| {
        AdapterError::configuration(format!("invalid {provider} base URL: {err}"))
    })?;
    Ok(base)
}

/// Percent-encodes a query component.
pub(crate) fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte));
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_requires_scheme() {
        let err = sanitize_base_url("example.com", "test").expect_err("missing scheme");
        assert!(matches!(err, AdapterError::Configuration { .. }));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        assert_eq!(
            sanitize_base_url("https://example.com/api", "test").unwrap(),
            "https://example.com/api/"
        );
    }

    #[test]
    fn encodes_query_components() {
        assert_eq!(encode_query("home coffee & tea"), "home+coffee+%26+tea");
        assert_eq!(encode_query("café"), "caf%C3%A9");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
