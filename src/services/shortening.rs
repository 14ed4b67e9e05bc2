use anyhow::{anyhow, Context, Result};
use std::future::Future;
use thiserror::Error;

/// An external shortening service reachable over plain HTTP GET.
///
/// Services respond with the short URL as a plain-text body; some signal
/// failure through a recognizable marker inside an otherwise OK response.
#[derive(Debug, Clone, Copy)]
pub struct ShortenEndpoint {
    pub name: &'static str,
    pub base: &'static str,
    pub error_marker: Option<&'static str>,
}

/// Shortening services in priority order; the first entry is primary.
pub const ENDPOINTS: &[ShortenEndpoint] = &[
    ShortenEndpoint {
        name: "is.gd",
        base: "https://is.gd/create.php",
        error_marker: Some("Error"),
    },
    ShortenEndpoint {
        name: "v.gd",
        base: "https://v.gd/create.php",
        error_marker: None,
    },
];

/// Errors surfaced by the shortening workflow
#[derive(Error, Debug)]
pub enum ShortenError {
    #[error("All shortening services failed")]
    AllServicesFailed,
}

/// Status flag and body of a completed GET.
#[derive(Debug, Clone)]
pub struct FetchedText {
    pub ok: bool,
    pub body: String,
}

/// Transport seam for the shortening requests.
///
/// The orchestration logic never touches the network directly, so tests
/// drive it with a scripted fetcher.
pub trait TextFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedText>> + Send;
}

/// reqwest-backed fetcher used by the application.
#[derive(Debug, Clone)]
pub struct HttpTextFetcher {
    client: reqwest::Client,
}

impl HttpTextFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTextFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TextFetcher for HttpTextFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedText>> + Send {
        let request = self.client.get(url);
        async move {
            let response = request.send().await.context("Request failed")?;
            let ok = response.status().is_success();
            let body = response.text().await.context("Failed to read body")?;
            Ok(FetchedText { ok, body })
        }
    }
}

/// Build the request URL for one endpoint, percent-encoding the target.
pub fn build_request_url(endpoint: &ShortenEndpoint, target: &str) -> Result<String> {
    let url = reqwest::Url::parse_with_params(
        endpoint.base,
        &[("format", "simple"), ("url", target)],
    )
    .with_context(|| format!("Invalid endpoint base: {}", endpoint.base))?;
    Ok(url.to_string())
}

/// Decide whether a response counts as a success for this endpoint.
///
/// A service succeeds when the HTTP status was OK, the body is non-empty
/// and the body does not contain the endpoint's error marker.
pub fn accept_response(endpoint: &ShortenEndpoint, fetched: &FetchedText) -> Option<String> {
    if !fetched.ok {
        return None;
    }

    let body = fetched.body.trim();
    if body.is_empty() {
        return None;
    }

    if let Some(marker) = endpoint.error_marker {
        if fetched.body.contains(marker) {
            return None;
        }
    }

    Some(body.to_string())
}

/// Sends the target URL to the shortening services in priority order and
/// returns the first success.
///
/// Per-service failures (network errors, non-OK statuses, error markers)
/// are swallowed and logged; only after every endpoint has failed does the
/// aggregate error surface. No retry, no backoff, no custom timeout.
pub struct ShortenerService<F> {
    fetcher: F,
}

impl<F: TextFetcher> ShortenerService<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub async fn shorten(&self, target: &str) -> Result<String, ShortenError> {
        for endpoint in ENDPOINTS {
            match self.try_endpoint(endpoint, target).await {
                Ok(short_url) => {
                    tracing::info!("{} shortened {} to {}", endpoint.name, target, short_url);
                    return Ok(short_url);
                }
                Err(e) => {
                    tracing::warn!("Shortening via {} failed: {}", endpoint.name, e);
                }
            }
        }

        Err(ShortenError::AllServicesFailed)
    }

    async fn try_endpoint(&self, endpoint: &ShortenEndpoint, target: &str) -> Result<String> {
        let request_url = build_request_url(endpoint, target)?;
        let fetched = self.fetcher.fetch(&request_url).await?;

        accept_response(endpoint, &fetched)
            .ok_or_else(|| anyhow!("{} rejected the request", endpoint.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted fetcher: responses keyed by endpoint host, calls recorded.
    struct StubFetcher {
        responses: Vec<(&'static str, Result<FetchedText, String>)>,
        calls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(responses: Vec<(&'static str, Result<FetchedText, String>)>) -> Self {
            Self {
                responses,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextFetcher for StubFetcher {
        fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedText>> + Send {
            self.calls.lock().unwrap().push(url.to_string());
            let result = self
                .responses
                .iter()
                .find(|(host, _)| url.contains(host))
                .map(|(_, r)| r.clone())
                .unwrap_or_else(|| Err("unexpected host".to_string()));
            async move { result.map_err(|e| anyhow!(e)) }
        }
    }

    fn ok(body: &str) -> Result<FetchedText, String> {
        Ok(FetchedText {
            ok: true,
            body: body.to_string(),
        })
    }

    #[test]
    fn test_endpoint_priority_order() {
        assert_eq!(ENDPOINTS[0].name, "is.gd");
        assert_eq!(ENDPOINTS[1].name, "v.gd");
    }

    #[test]
    fn test_build_request_url_percent_encodes() {
        let url = build_request_url(&ENDPOINTS[0], "https://example.com/page?a=1").unwrap();
        assert!(url.starts_with("https://is.gd/create.php?"));
        assert!(url.contains("format=simple"));
        assert!(url.contains("url=https%3A%2F%2Fexample.com%2Fpage%3Fa%3D1"));
    }

    #[test]
    fn test_accept_response_trims_body() {
        let result = accept_response(
            &ENDPOINTS[0],
            &FetchedText {
                ok: true,
                body: "https://is.gd/abc123\n".to_string(),
            },
        );
        assert_eq!(result, Some("https://is.gd/abc123".to_string()));
    }

    #[test]
    fn test_accept_response_rejects_marker_and_failure() {
        let marker = accept_response(
            &ENDPOINTS[0],
            &FetchedText {
                ok: true,
                body: "Error: long URL rejected".to_string(),
            },
        );
        assert_eq!(marker, None);

        let failed = accept_response(
            &ENDPOINTS[0],
            &FetchedText {
                ok: false,
                body: "https://is.gd/abc123".to_string(),
            },
        );
        assert_eq!(failed, None);

        let empty = accept_response(
            &ENDPOINTS[1],
            &FetchedText {
                ok: true,
                body: "   ".to_string(),
            },
        );
        assert_eq!(empty, None);
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let fetcher = StubFetcher::new(vec![
            ("is.gd", ok("https://is.gd/abc123")),
            ("v.gd", ok("https://v.gd/zzz")),
        ]);
        let service = ShortenerService::new(fetcher);

        let short = service.shorten("https://example.com").await.unwrap();
        assert_eq!(short, "https://is.gd/abc123");

        let calls = service.fetcher.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("is.gd"));
    }

    #[tokio::test]
    async fn test_fallback_after_primary_failure() {
        let fetcher = StubFetcher::new(vec![
            ("is.gd", Err("connection refused".to_string())),
            ("v.gd", ok("https://is.gd/abc123")),
        ]);
        let service = ShortenerService::new(fetcher);

        let short = service.shorten("https://example.com").await.unwrap();
        assert_eq!(short, "https://is.gd/abc123");

        let calls = service.fetcher.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains("is.gd"));
        assert!(calls[1].contains("v.gd"));
    }

    #[tokio::test]
    async fn test_error_marker_triggers_fallback() {
        let fetcher = StubFetcher::new(vec![
            ("is.gd", ok("Error: please try again later")),
            ("v.gd", ok("https://v.gd/ok")),
        ]);
        let service = ShortenerService::new(fetcher);

        let short = service.shorten("https://example.com").await.unwrap();
        assert_eq!(short, "https://v.gd/ok");
    }

    #[tokio::test]
    async fn test_all_failures_aggregate() {
        let fetcher = StubFetcher::new(vec![
            ("is.gd", Err("timeout".to_string())),
            ("v.gd", Err("timeout".to_string())),
        ]);
        let service = ShortenerService::new(fetcher);

        let result = service.shorten("https://example.com").await;
        assert!(matches!(result, Err(ShortenError::AllServicesFailed)));
    }
}
