//! Origin resolution: the first, standalone step of every run.
//!
//! The target URL is fetched with redirects disabled at the transport level so
//! each hop can be recorded. The last URL of the chain becomes the resolved
//! URL that every platform dispatch is issued against.

use std::time::Instant;

use tracing::{debug, info, warn};
use url::Url;

use crate::config::CollectorConfig;
use crate::error::CollectError;
use crate::http_client::{HttpClient, HttpClientFactory, HttpRequest, HttpResponse};
use crate::platform::PlatformDescriptor;
use crate::stat::{RawStat, COMPLETED_IN, FETCHED_IN, URLS};

/// Outcome of resolving the target page.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginResolution {
    /// Final URL of the redirect chain, or the input URL when resolution failed.
    pub resolved_url: String,
    /// Every URL requested, starting with the input URL.
    pub visited: Vec<String>,
    pub stat: Result<RawStat, CollectError>,
}

/// Fetches `url`, follows redirects, and parses the final page with `origin`.
pub async fn resolve(
    url: &str,
    origin: &PlatformDescriptor,
    config: &CollectorConfig,
    factory: &dyn HttpClientFactory,
) -> OriginResolution {
    let started = Instant::now();
    let name = origin.name();
    let mut visited = Vec::new();

    let outcome = match build_client(name, config, factory) {
        Ok(client) => follow(url, name, config, client.as_ref(), &mut visited).await,
        Err(error) => Err(error),
    };

    let (resolved_url, stat) = match outcome {
        Ok((final_url, response)) => {
            let fetched_in = started.elapsed().as_secs_f64();
            let stat = origin
                .parse(&response)
                .map_err(|error| CollectError::parse(name, error))
                .map(|mut stat| {
                    stat.insert(FETCHED_IN, fetched_in);
                    stat.insert(COMPLETED_IN, started.elapsed().as_secs_f64());
                    if visited.len() > 1 {
                        stat.insert(URLS, visited.clone());
                    }
                    stat.named(name)
                });
            (final_url, stat)
        }
        Err(error) => (url.to_owned(), Err(error)),
    };

    match &stat {
        Ok(_) => info!(
            platform = name,
            resolved_url = %resolved_url,
            hops = visited.len().saturating_sub(1),
            "resolved origin"
        ),
        Err(error) => warn!(
            platform = name,
            code = error.code(),
            "origin resolution failed, continuing with input URL: {error}"
        ),
    }

    OriginResolution {
        resolved_url,
        visited,
        stat,
    }
}

fn build_client(
    name: &str,
    config: &CollectorConfig,
    factory: &dyn HttpClientFactory,
) -> Result<std::sync::Arc<dyn HttpClient>, CollectError> {
    let settings = config.origin_settings(name)?;
    factory
        .build(&settings)
        .map_err(|error| CollectError::Config {
            platform: name.to_owned(),
            proxy: config.proxy.clone().unwrap_or_default(),
            message: error.to_string(),
        })
}

async fn follow(
    url: &str,
    name: &str,
    config: &CollectorConfig,
    client: &dyn HttpClient,
    visited: &mut Vec<String>,
) -> Result<(String, HttpResponse), CollectError> {
    let mut current = url.to_owned();

    loop {
        visited.push(current.clone());
        debug!(platform = name, url = %current, "fetching origin");

        let request =
            HttpRequest::get(current.as_str()).with_header("user-agent", &config.origin_user_agent);
        let response = client
            .execute(request)
            .await
            .map_err(|error| CollectError::Transport {
                platform: name.to_owned(),
                url: current.clone(),
                message: error.to_string(),
            })?;

        if response.is_success() {
            return Ok((current, response));
        }

        let next = match response.location() {
            Some(location) if response.is_redirect() => location,
            _ => {
                return Err(CollectError::HttpStatus {
                    platform: name.to_owned(),
                    url: current,
                    status: response.status,
                })
            }
        };

        if visited.len() > config.max_redirects {
            return Err(CollectError::Transport {
                platform: name.to_owned(),
                url: current,
                message: format!("stopped after {} redirects", config.max_redirects),
            });
        }

        current = join_location(&current, next).map_err(|message| CollectError::Transport {
            platform: name.to_owned(),
            url: current.clone(),
            message,
        })?;
    }
}

/// Resolves a `Location` header, which may be relative, against `base`.
fn join_location(base: &str, location: &str) -> Result<String, String> {
    let base = Url::parse(base).map_err(|error| format!("invalid URL: {error}"))?;
    base.join(location)
        .map(String::from)
        .map_err(|error| format!("invalid redirect location '{location}': {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectErrorKind;
    use crate::http_client::ScriptedHttpClient;
    use crate::parsers::origin_platform;
    use crate::value::StatValue;

    const PAGE: &str = r#"<html><head><title>Landing</title></head></html>"#;

    #[tokio::test]
    async fn single_fetch_has_no_urls_attribute() {
        let scripted = ScriptedHttpClient::new().respond("https://a.test/", HttpResponse::ok(PAGE));

        let resolution = resolve(
            "https://a.test/",
            &origin_platform(),
            &CollectorConfig::new(),
            &scripted,
        )
        .await;

        let stat = resolution.stat.expect("origin should resolve");
        assert_eq!(resolution.resolved_url, "https://a.test/");
        assert_eq!(stat.name, "origin");
        assert_eq!(stat.get("title").and_then(StatValue::as_text), Some("Landing"));
        assert!(stat.get(FETCHED_IN).and_then(StatValue::as_float).is_some());
        assert!(stat.get(COMPLETED_IN).is_some());
        assert_eq!(stat.get(URLS), None);
    }

    #[tokio::test]
    async fn relative_redirects_are_resolved_against_current_url() {
        let scripted = ScriptedHttpClient::new()
            .respond("https://a.test/old", HttpResponse::redirect(301, "/new?x=1"))
            .respond("https://a.test/new?x=1", HttpResponse::ok(PAGE));

        let resolution = resolve(
            "https://a.test/old",
            &origin_platform(),
            &CollectorConfig::new(),
            &scripted,
        )
        .await;

        assert_eq!(resolution.resolved_url, "https://a.test/new?x=1");
        assert_eq!(
            resolution.visited,
            vec![String::from("https://a.test/old"), String::from("https://a.test/new?x=1")]
        );
        let stat = resolution.stat.expect("origin should resolve");
        assert_eq!(
            stat.get(URLS),
            Some(&StatValue::from(resolution.visited.clone()))
        );
    }

    #[tokio::test]
    async fn requests_carry_origin_user_agent() {
        let scripted = ScriptedHttpClient::new().respond("https://a.test/", HttpResponse::ok(PAGE));

        resolve(
            "https://a.test/",
            &origin_platform(),
            &CollectorConfig::new(),
            &scripted,
        )
        .await;

        let requests = scripted.recorded_requests();
        assert_eq!(requests[0].header("user-agent"), Some("Googlebot-News"));
    }

    #[tokio::test]
    async fn failed_origin_keeps_input_url() {
        let scripted = ScriptedHttpClient::new()
            .respond("https://a.test/", HttpResponse::new(503, "unavailable"));

        let resolution = resolve(
            "https://a.test/",
            &origin_platform(),
            &CollectorConfig::new(),
            &scripted,
        )
        .await;

        assert_eq!(resolution.resolved_url, "https://a.test/");
        let error = resolution.stat.expect_err("503 should fail");
        assert_eq!(error.kind(), CollectErrorKind::HttpStatus);
        assert_eq!(error.platform(), "origin");
    }

    #[tokio::test]
    async fn redirect_loops_stop_at_the_configured_limit() {
        let scripted = ScriptedHttpClient::new()
            .respond("https://a.test/", HttpResponse::redirect(302, "https://b.test/"))
            .respond("https://b.test/", HttpResponse::redirect(302, "https://a.test/"));
        let config = CollectorConfig::new().with_max_redirects(3);

        let resolution = resolve("https://a.test/", &origin_platform(), &config, &scripted).await;

        assert_eq!(resolution.visited.len(), 4);
        assert_eq!(
            resolution.stat.expect_err("loop should fail").kind(),
            CollectErrorKind::Transport
        );
        assert_eq!(resolution.resolved_url, "https://a.test/");
    }

    #[test]
    fn join_location_handles_absolute_and_relative_targets() {
        assert_eq!(
            join_location("https://a.test/x/y", "z").expect("relative joins"),
            "https://a.test/x/z"
        );
        assert_eq!(
            join_location("https://a.test/x", "https://b.test/").expect("absolute joins"),
            "https://b.test/"
        );
    }
}
