use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::config::CollectorConfig;
use crate::error::CollectError;
use crate::http_client::{HttpClientFactory, HttpRequest};
use crate::platform::PlatformDescriptor;
use crate::stat::{RawStat, COMPLETED_IN, FETCHED_IN};

/// Issues one request for `platform` against `resolved_url` and parses it.
///
/// A non-2xx status is reported as an error and the body is never parsed.
pub async fn dispatch(
    platform: &PlatformDescriptor,
    resolved_url: &str,
    config: &CollectorConfig,
    factory: &dyn HttpClientFactory,
) -> Result<RawStat, CollectError> {
    let started = Instant::now();
    let name = platform.name();
    let url = platform.request_url(resolved_url);

    let settings = config.dispatch_settings(name)?;
    let client = factory
        .build(&settings)
        .map_err(|error| CollectError::Config {
            platform: name.to_owned(),
            proxy: config.proxy.clone().unwrap_or_default(),
            message: error.to_string(),
        })?;

    let mut request = HttpRequest::get(url.as_str()).with_header("user-agent", config.user_agent());
    if let Some(format) = platform.content_format() {
        request = request.with_header("content-type", format.mime_type());
    }

    debug!(platform = name, url = %url, "dispatching");
    let response = client
        .execute(request)
        .await
        .map_err(|error| CollectError::Transport {
            platform: name.to_owned(),
            url: url.clone(),
            message: error.to_string(),
        })?;
    let fetched_in = started.elapsed().as_secs_f64();

    if !response.is_success() {
        return Err(CollectError::HttpStatus {
            platform: name.to_owned(),
            url,
            status: response.status,
        });
    }

    let mut stat = platform
        .parse(&response)
        .map_err(|error| CollectError::parse(name, error))?;
    stat.insert(FETCHED_IN, fetched_in);
    stat.insert(COMPLETED_IN, started.elapsed().as_secs_f64());
    Ok(stat.named(name))
}

/// Runs [`dispatch`] and reports its outcome on exactly one of the channels.
pub(crate) async fn dispatch_and_report(
    platform: Arc<PlatformDescriptor>,
    resolved_url: Arc<str>,
    config: Arc<CollectorConfig>,
    factory: Arc<dyn HttpClientFactory>,
    results: UnboundedSender<RawStat>,
    errors: UnboundedSender<CollectError>,
) {
    let outcome = dispatch(&platform, &resolved_url, &config, factory.as_ref()).await;

    // A closed receiver means the join is gone; nobody is left to tell.
    match outcome {
        Ok(stat) => {
            let _ = results.send(stat);
        }
        Err(error) => {
            let _ = errors.send(error);
        }
    }
}
