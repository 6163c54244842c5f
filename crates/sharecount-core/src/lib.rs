//! Core engine for sharecount.
//!
//! This crate contains:
//! - Platform descriptors, the built-in parsers and the platform registry
//! - The origin resolver, request dispatcher and aggregation join
//! - Count normalization and the report combiner
//! - Per-run configuration, structured errors and the HTTP transport seam

pub mod aggregate;
pub mod collector;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod origin;
pub mod parsers;
pub mod platform;
pub mod report;
pub mod stat;
pub mod value;

pub use aggregate::{join_platforms, JoinOutcome};
pub use collector::{collect, Collector};
pub use config::{ClientSettings, CollectorConfig, RedirectPolicy};
pub use dispatch::dispatch;
pub use error::{CollectError, CollectErrorKind, ParseError, RegistryError};
pub use http_client::{
    HttpClient, HttpClientFactory, HttpError, HttpRequest, HttpResponse, ReqwestClientFactory,
    ReqwestHttpClient, ScriptedHttpClient,
};
pub use normalize::{normalize_count, sum_counts};
pub use origin::{resolve, OriginResolution};
pub use parsers::{builtin_platforms, origin_platform, strip_jsonp};
pub use platform::{
    ContentFormat, PlatformDescriptor, PlatformRegistry, SelectionSet, StatParser, ORIGIN,
    URL_PLACEHOLDER,
};
pub use report::{combine, AggregatedReport, ReportMeta};
pub use stat::RawStat;
pub use value::{Attributes, StatValue};
