use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{ClientSettings, RedirectPolicy};

/// GET request issued against a platform or origin page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Fully-read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are stored lowercase.
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn redirect(status: u16, location: impl Into<String>) -> Self {
        Self::new(status, "").with_header("location", location)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    pub const fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 303 | 307 | 308)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    timed_out: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn timed_out(&self) -> bool {
        self.timed_out
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// Transport contract used by the resolver and dispatcher.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a>;
}

/// Builds one client per call so no transport state leaks between runs.
pub trait HttpClientFactory: Send + Sync {
    fn build(&self, settings: &ClientSettings) -> Result<Arc<dyn HttpClient>, HttpError>;
}

/// Production HTTP client using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, HttpError> {
        let redirects = match settings.redirects {
            RedirectPolicy::Follow(hops) => reqwest::redirect::Policy::limited(hops),
            RedirectPolicy::Manual => reqwest::redirect::Policy::none(),
        };

        let mut builder = reqwest::Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .redirect(redirects);

        if let Some(proxy) = &settings.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| HttpError::new(format!("invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| HttpError::new(format!("unable to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            let mut builder = self.client.get(&request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::timeout(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_owned(), value.to_owned()))
                })
                .collect();
            let body = response.text().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::timeout(format!("response body timeout: {e}"))
                } else {
                    HttpError::new(format!("failed to read response body: {e}"))
                }
            })?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}

/// Factory producing a fresh reqwest client for every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestClientFactory;

impl HttpClientFactory for ReqwestClientFactory {
    fn build(&self, settings: &ClientSettings) -> Result<Arc<dyn HttpClient>, HttpError> {
        Ok(Arc::new(ReqwestHttpClient::from_settings(settings)?))
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond(HttpResponse),
    Fail(HttpError),
}

#[derive(Debug, Clone)]
struct ScriptedRoute {
    outcome: Scripted,
    delay: Duration,
}

#[derive(Debug, Default)]
struct ScriptedState {
    routes: HashMap<String, ScriptedRoute>,
    requests: Vec<HttpRequest>,
    settings: Vec<ClientSettings>,
}

/// Deterministic offline transport.
///
/// Responses are keyed by exact URL; unknown URLs answer `404`. Delays longer
/// than the timeout of the settings the client was built with surface as
/// timeout errors, just like a real client would report them. Clones share
/// routes and recordings, and the type doubles as its own factory.
#[derive(Debug, Clone)]
pub struct ScriptedHttpClient {
    state: Arc<Mutex<ScriptedState>>,
    timeout: Option<Duration>,
}

impl Default for ScriptedHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptedState::default())),
            timeout: None,
        }
    }

    pub fn respond(self, url: impl Into<String>, response: HttpResponse) -> Self {
        self.route(url, Scripted::Respond(response), Duration::ZERO)
    }

    pub fn respond_after(
        self,
        url: impl Into<String>,
        response: HttpResponse,
        delay: Duration,
    ) -> Self {
        self.route(url, Scripted::Respond(response), delay)
    }

    pub fn fail(self, url: impl Into<String>, error: HttpError) -> Self {
        self.route(url, Scripted::Fail(error), Duration::ZERO)
    }

    /// Requests seen so far, in arrival order.
    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    pub fn recorded_urls(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }

    /// Settings of every client built through the factory interface.
    pub fn recorded_settings(&self) -> Vec<ClientSettings> {
        self.lock().settings.clone()
    }

    fn route(self, url: impl Into<String>, outcome: Scripted, delay: Duration) -> Self {
        self.lock()
            .routes
            .insert(url.into(), ScriptedRoute { outcome, delay });
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let route = {
            let mut state = self.lock();
            let route = state.routes.get(&request.url).cloned();
            state.requests.push(request.clone());
            route
        };
        let timeout = self.timeout;

        Box::pin(async move {
            let Some(route) = route else {
                return Ok(HttpResponse::new(404, "not found"));
            };

            if !route.delay.is_zero() {
                match timeout {
                    Some(limit) if route.delay > limit => {
                        tokio::time::sleep(limit).await;
                        return Err(HttpError::timeout(format!(
                            "request timeout after {}ms",
                            limit.as_millis()
                        )));
                    }
                    _ => tokio::time::sleep(route.delay).await,
                }
            }

            match route.outcome {
                Scripted::Respond(response) => Ok(response),
                Scripted::Fail(error) => Err(error),
            }
        })
    }
}

impl HttpClientFactory for ScriptedHttpClient {
    fn build(&self, settings: &ClientSettings) -> Result<Arc<dyn HttpClient>, HttpError> {
        self.lock().settings.push(settings.clone());
        Ok(Arc::new(Self {
            state: Arc::clone(&self.state),
            timeout: Some(settings.timeout),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(timeout: Duration) -> ClientSettings {
        ClientSettings {
            proxy: None,
            timeout,
            accept_invalid_certs: true,
            redirects: RedirectPolicy::Manual,
        }
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let request = HttpRequest::get("https://example.test/")
            .with_header("Content-Type", "application/json");
        let response = HttpResponse::redirect(301, "https://example.test/next");

        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(response.header("Location"), Some("https://example.test/next"));
        assert_eq!(response.content_type(), None);
        assert!(response.is_redirect());
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn scripted_client_answers_404_for_unknown_urls() {
        let scripted = ScriptedHttpClient::new().respond("https://a.test/", HttpResponse::ok("hi"));
        let client = scripted
            .build(&settings(Duration::from_secs(1)))
            .expect("client should build");

        let known = client
            .execute(HttpRequest::get("https://a.test/"))
            .await
            .expect("known route responds");
        let unknown = client
            .execute(HttpRequest::get("https://b.test/"))
            .await
            .expect("unknown route responds");

        assert_eq!(known.body, "hi");
        assert_eq!(unknown.status, 404);
        assert_eq!(
            scripted.recorded_urls(),
            vec![String::from("https://a.test/"), String::from("https://b.test/")]
        );
    }

    #[tokio::test]
    async fn scripted_client_times_out_slow_routes() {
        let scripted = ScriptedHttpClient::new().respond_after(
            "https://slow.test/",
            HttpResponse::ok("late"),
            Duration::from_millis(200),
        );
        let client = scripted
            .build(&settings(Duration::from_millis(20)))
            .expect("client should build");

        let error = client
            .execute(HttpRequest::get("https://slow.test/"))
            .await
            .expect_err("slow route should time out");

        assert!(error.timed_out());
    }
}
