//! Platform descriptors and the registry the collector dispatches from.
//!
//! # Built-in Platforms
//!
//! | Name | Format | Count source |
//! |------|--------|--------------|
//! | `facebook` | JSON | `total_count` |
//! | `pinterest` | JSONP | `count` |
//! | `linkedin` | JSONP | `count` |
//! | `google_plus` | HTML | `{c: N.` in the button markup |
//! | `reddit` | JSON | `ups + downs` of link submissions |
//! | `buffer` | JSON | `shares` |
//! | `stumbleupon` | JSON | `result.views` |
//! | `pocket` | HTML | `id="cnt"` element |
//! | `tumblr` | JSON | `response.note_count` |
//! | `origin` | HTML | page metadata only, no count |

use std::collections::{BTreeSet, HashSet};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{ParseError, RegistryError};
use crate::http_client::HttpResponse;
use crate::parsers;
use crate::stat::RawStat;

/// Name of the pseudo-platform describing the target page itself.
pub const ORIGIN: &str = "origin";
/// Placeholder substituted with the percent-encoded target URL.
pub const URL_PLACEHOLDER: &str = "{url}";

const RESERVED_NAMES: [&str; 2] = ["meta", "errors"];

/// Payload format a platform answers in; sent as the request content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Json,
    Jsonp,
    Xml,
}

impl ContentFormat {
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Jsonp => "application/javascript",
            Self::Xml => "text/xml",
        }
    }
}

/// Turns a raw platform response into a stat.
pub trait StatParser: Send + Sync {
    fn parse(&self, response: &HttpResponse) -> Result<RawStat, ParseError>;
}

impl<F> StatParser for F
where
    F: Fn(&HttpResponse) -> Result<RawStat, ParseError> + Send + Sync,
{
    fn parse(&self, response: &HttpResponse) -> Result<RawStat, ParseError> {
        self(response)
    }
}

/// Static definition of one external share-count source.
#[derive(Clone, Serialize)]
pub struct PlatformDescriptor {
    name: String,
    enabled: bool,
    url_template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_format: Option<ContentFormat>,
    #[serde(skip)]
    parser: Arc<dyn StatParser>,
}

impl Debug for PlatformDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformDescriptor")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("url_template", &self.url_template)
            .field("content_format", &self.content_format)
            .field("parser", &"<dyn StatParser>")
            .finish()
    }
}

impl PlatformDescriptor {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        parser: impl StatParser + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            url_template: url_template.into(),
            content_format: None,
            parser: Arc::new(parser),
        }
    }

    pub fn with_content_format(mut self, format: ContentFormat) -> Self {
        self.content_format = Some(format);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub const fn content_format(&self) -> Option<ContentFormat> {
        self.content_format
    }

    pub fn is_origin(&self) -> bool {
        self.name == ORIGIN
    }

    /// Request URL for `target`, which is percent-encoded into the template.
    pub fn request_url(&self, target: &str) -> String {
        self.url_template
            .replace(URL_PLACEHOLDER, &urlencoding::encode(target))
    }

    pub fn parse(&self, response: &HttpResponse) -> Result<RawStat, ParseError> {
        self.parser.parse(response)
    }
}

/// Caller-selected platform names; empty means every enabled platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    names: BTreeSet<String>,
}

impl SelectionSet {
    pub fn all() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list, ignoring blanks.
    pub fn parse(raw: &str) -> Self {
        Self::from_names(raw.split(','))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_owned())
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    pub fn is_all(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Validated, immutable platform table.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    platforms: Vec<Arc<PlatformDescriptor>>,
    origin: Arc<PlatformDescriptor>,
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        let origin = Arc::new(parsers::origin_platform());
        let mut platforms: Vec<_> = parsers::builtin_platforms()
            .into_iter()
            .map(Arc::new)
            .collect();
        platforms.push(Arc::clone(&origin));
        Self { platforms, origin }
    }
}

impl PlatformRegistry {
    /// Builds a registry, requiring exactly one `origin` entry and unique names.
    pub fn new(platforms: Vec<PlatformDescriptor>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::with_capacity(platforms.len());
        let mut origins = 0;
        let mut origin_index = 0;

        for (index, platform) in platforms.iter().enumerate() {
            let name = platform.name();
            if name.trim().is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if RESERVED_NAMES.contains(&name) {
                return Err(RegistryError::ReservedName(name.to_owned()));
            }
            if !seen.insert(name) {
                return Err(RegistryError::DuplicateName(name.to_owned()));
            }
            if platform.is_origin() {
                origins += 1;
                origin_index = index;
            } else if !platform.url_template().contains(URL_PLACEHOLDER) {
                return Err(RegistryError::MissingPlaceholder(name.to_owned()));
            }
        }

        if origins != 1 {
            return Err(RegistryError::OriginCount(origins));
        }

        let platforms: Vec<_> = platforms.into_iter().map(Arc::new).collect();
        let origin = Arc::clone(&platforms[origin_index]);
        Ok(Self { platforms, origin })
    }

    pub fn platforms(&self) -> &[Arc<PlatformDescriptor>] {
        &self.platforms
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.platforms.iter().map(|platform| platform.name())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<PlatformDescriptor>> {
        self.platforms.iter().find(|platform| platform.name() == name)
    }

    pub fn origin(&self) -> &Arc<PlatformDescriptor> {
        &self.origin
    }

    /// Platforms to dispatch for `selection`, in registry order.
    pub fn selected(&self, selection: &SelectionSet) -> Vec<Arc<PlatformDescriptor>> {
        self.platforms
            .iter()
            .filter(|platform| is_applicable(platform, selection))
            .cloned()
            .collect()
    }
}

fn is_applicable(platform: &PlatformDescriptor, selection: &SelectionSet) -> bool {
    if platform.is_origin() || !platform.enabled() {
        return false;
    }

    selection.is_all() || selection.contains(platform.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(_: &HttpResponse) -> Result<RawStat, ParseError> {
        Ok(RawStat::with_count(1))
    }

    fn table() -> Vec<PlatformDescriptor> {
        vec![
            PlatformDescriptor::new("alpha", "https://alpha.test/?u={url}", fixed),
            PlatformDescriptor::new("beta", "https://beta.test/?u={url}", fixed).with_enabled(false),
            PlatformDescriptor::new("gamma", "https://gamma.test/?u={url}", fixed)
                .with_content_format(ContentFormat::Jsonp),
            PlatformDescriptor::new(ORIGIN, URL_PLACEHOLDER, fixed),
        ]
    }

    fn names(platforms: &[Arc<PlatformDescriptor>]) -> Vec<&str> {
        platforms.iter().map(|platform| platform.name()).collect()
    }

    #[test]
    fn empty_selection_runs_every_enabled_platform_except_origin() {
        let registry = PlatformRegistry::new(table()).expect("valid table");

        let selected = registry.selected(&SelectionSet::all());

        assert_eq!(names(&selected), vec!["alpha", "gamma"]);
    }

    #[test]
    fn selection_filters_and_never_enables_disabled_platforms() {
        let registry = PlatformRegistry::new(table()).expect("valid table");

        let selected = registry.selected(&SelectionSet::parse("beta, gamma"));

        assert_eq!(names(&selected), vec!["gamma"]);
    }

    #[test]
    fn unknown_or_origin_only_selection_dispatches_nothing() {
        let registry = PlatformRegistry::new(table()).expect("valid table");

        assert!(registry.selected(&SelectionSet::parse("myspace")).is_empty());
        assert!(registry.selected(&SelectionSet::parse("origin")).is_empty());
    }

    #[test]
    fn selection_parse_ignores_blank_entries() {
        let selection = SelectionSet::parse(" alpha ,, ,gamma");

        assert_eq!(selection.names().collect::<Vec<_>>(), vec!["alpha", "gamma"]);
        assert!(SelectionSet::parse("").is_all());
        assert!(SelectionSet::parse(" , ").is_all());
    }

    #[test]
    fn request_url_percent_encodes_target() {
        let platform = PlatformDescriptor::new("alpha", "https://alpha.test/?u={url}", fixed);

        assert_eq!(
            platform.request_url("https://site.test/a?b=c&d=e"),
            "https://alpha.test/?u=https%3A%2F%2Fsite.test%2Fa%3Fb%3Dc%26d%3De"
        );
    }

    #[test]
    fn registry_requires_exactly_one_origin() {
        let mut platforms = table();
        platforms.pop();
        assert_eq!(
            PlatformRegistry::new(platforms).expect_err("origin missing"),
            RegistryError::OriginCount(0)
        );
    }

    #[test]
    fn registry_rejects_duplicates_reserved_names_and_missing_placeholders() {
        let mut duplicated = table();
        duplicated.push(PlatformDescriptor::new("alpha", "https://x.test/{url}", fixed));
        assert_eq!(
            PlatformRegistry::new(duplicated).expect_err("duplicate"),
            RegistryError::DuplicateName(String::from("alpha"))
        );

        let mut reserved = table();
        reserved.push(PlatformDescriptor::new("meta", "https://x.test/{url}", fixed));
        assert_eq!(
            PlatformRegistry::new(reserved).expect_err("reserved"),
            RegistryError::ReservedName(String::from("meta"))
        );

        let mut no_placeholder = table();
        no_placeholder.push(PlatformDescriptor::new("delta", "https://x.test/", fixed));
        assert_eq!(
            PlatformRegistry::new(no_placeholder).expect_err("placeholder"),
            RegistryError::MissingPlaceholder(String::from("delta"))
        );
    }

    #[test]
    fn builtin_registry_is_valid() {
        let builtin = PlatformRegistry::default();
        let descriptors = builtin
            .platforms()
            .iter()
            .map(|platform| platform.as_ref().clone())
            .collect();

        let registry = PlatformRegistry::new(descriptors).expect("builtin table is valid");
        assert_eq!(registry.origin().name(), ORIGIN);
        assert_eq!(registry.names().count(), builtin.platforms().len());
        assert!(registry.get("facebook").is_some());
    }
}
