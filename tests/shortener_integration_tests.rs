//! Integration tests for the shortening fallback workflow
//!
//! These tests drive the orchestration through a scripted fetcher so no
//! network is involved:
//! - Strict priority order with first-success-wins
//! - Primary failure falling back to the secondary service
//! - Aggregate error after every service fails
//! - Error-marker bodies counting as failures

use anyhow::{anyhow, Result};
use qrstudio::services::{FetchedText, ShortenError, ShortenerService, TextFetcher, ENDPOINTS};
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Fetcher that answers per endpoint host and records the order of calls.
struct ScriptedFetcher {
    responses: Vec<(&'static str, Result<FetchedText, String>)>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    fn new(
        responses: Vec<(&'static str, Result<FetchedText, String>)>,
    ) -> (Self, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                responses,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl TextFetcher for ScriptedFetcher {
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

fn http_error() -> Result<FetchedText, String> {
    Ok(FetchedText {
        ok: false,
        body: "502 Bad Gateway".to_string(),
    })
}

#[tokio::test]
async fn test_primary_success_returns_without_fallback() {
    let (fetcher, calls) = ScriptedFetcher::new(vec![
        ("is.gd", ok("https://is.gd/primary")),
        ("v.gd", ok("https://v.gd/fallback")),
    ]);
    let service = ShortenerService::new(fetcher);

    let short = service.shorten("https://example.com").await.unwrap();
    assert_eq!(short, "https://is.gd/primary");

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("is.gd"));
}

#[tokio::test]
async fn test_fallback_result_surfaces_when_primary_times_out() {
    let (fetcher, _calls) = ScriptedFetcher::new(vec![
        ("is.gd", Err("connect timeout".to_string())),
        ("v.gd", ok("https://is.gd/abc123")),
    ]);
    let service = ShortenerService::new(fetcher);

    // The displayed short URL is exactly the fallback's body
    let short = service.shorten("https://example.com").await.unwrap();
    assert_eq!(short, "https://is.gd/abc123");
}

#[tokio::test]
async fn test_services_tried_in_priority_order() {
    let (fetcher, calls) = ScriptedFetcher::new(vec![
        ("is.gd", http_error()),
        ("v.gd", ok("https://v.gd/ok")),
    ]);
    let service = ShortenerService::new(fetcher);

    service.shorten("https://example.com").await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].contains("is.gd"));
    assert!(calls[1].contains("v.gd"));
}

#[tokio::test]
async fn test_error_marker_body_counts_as_failure() {
    let (fetcher, _calls) = ScriptedFetcher::new(vec![
        ("is.gd", ok("Error: Sorry, the URL you entered is invalid")),
        ("v.gd", ok("https://v.gd/ok")),
    ]);
    let service = ShortenerService::new(fetcher);

    let short = service.shorten("https://example.com").await.unwrap();
    assert_eq!(short, "https://v.gd/ok");
}

#[tokio::test]
async fn test_all_services_failing_yields_aggregate_error() {
    let (fetcher, calls) = ScriptedFetcher::new(vec![
        ("is.gd", Err("dns failure".to_string())),
        ("v.gd", http_error()),
    ]);
    let service = ShortenerService::new(fetcher);

    let result = service.shorten("https://example.com").await;
    assert!(matches!(result, Err(ShortenError::AllServicesFailed)));

    // Both endpoints were attempted before giving up
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_requests_carry_encoded_target() {
    let (fetcher, calls) = ScriptedFetcher::new(vec![("is.gd", ok("https://is.gd/x"))]);
    let service = ShortenerService::new(fetcher);

    service
        .shorten("https://example.com/path?q=hello world")
        .await
        .unwrap();

    let calls = calls.lock().unwrap();
    assert!(calls[0].contains("format=simple"));
    assert!(calls[0].contains("url=https%3A%2F%2Fexample.com"));
    // The raw target never appears unencoded in the query
    assert!(!calls[0].contains("url=https://example.com"));
}

#[test]
fn test_endpoint_table_matches_observed_services() {
    assert_eq!(ENDPOINTS.len(), 2);
    assert_eq!(ENDPOINTS[0].name, "is.gd");
    assert_eq!(ENDPOINTS[0].error_marker, Some("Error"));
    assert_eq!(ENDPOINTS[1].name, "v.gd");
    assert_eq!(ENDPOINTS[1].error_marker, None);
}
