//! Built-in platform parsers.
//!
//! Each parser is a plain function from a response to a [`RawStat`]; the
//! descriptors returned by [`builtin_platforms`] pair them with endpoints.

mod buffer;
mod facebook;
mod google_plus;
mod linkedin;
mod origin;
mod pinterest;
mod pocket;
mod reddit;
mod stumbleupon;
mod tumblr;

use serde_json::Value;

use crate::error::ParseError;
use crate::platform::{ContentFormat, PlatformDescriptor, ORIGIN, URL_PLACEHOLDER};
use crate::stat::RawStat;

/// Every built-in platform except `origin`, in dispatch order.
pub fn builtin_platforms() -> Vec<PlatformDescriptor> {
    vec![
        PlatformDescriptor::new(
            "facebook",
            "https://api.facebook.com/method/links.getStats?format=json&urls={url}",
            facebook::parse,
        ),
        PlatformDescriptor::new(
            "pinterest",
            "https://api.pinterest.com/v1/urls/count.json?callback=receiveCount&url={url}",
            pinterest::parse,
        )
        .with_content_format(ContentFormat::Jsonp),
        PlatformDescriptor::new(
            "linkedin",
            "https://www.linkedin.com/countserv/count/share?url={url}",
            linkedin::parse,
        )
        .with_content_format(ContentFormat::Jsonp),
        PlatformDescriptor::new(
            "google_plus",
            "https://plusone.google.com/_/+1/fastbutton?url={url}",
            google_plus::parse,
        ),
        PlatformDescriptor::new(
            "reddit",
            "https://www.reddit.com/api/info.json?url={url}",
            reddit::parse,
        ),
        PlatformDescriptor::new(
            "buffer",
            "https://api.bufferapp.com/1/links/shares.json?url={url}",
            buffer::parse,
        ),
        PlatformDescriptor::new(
            "stumbleupon",
            "https://www.stumbleupon.com/services/1.01/badge.getinfo?url={url}",
            stumbleupon::parse,
        ),
        PlatformDescriptor::new(
            "pocket",
            "https://widgets.getpocket.com/v1/button?count=vertical&url={url}",
            pocket::parse,
        ),
        PlatformDescriptor::new(
            "tumblr",
            "https://api.tumblr.com/v2/share/stats?url={url}",
            tumblr::parse,
        )
        .with_content_format(ContentFormat::Json),
    ]
}

/// The page-metadata pseudo-platform, resolved before any dispatch.
pub fn origin_platform() -> PlatformDescriptor {
    PlatformDescriptor::new(ORIGIN, URL_PLACEHOLDER, origin::parse)
}

/// Returns the payload between the first `(` and the last `)`.
pub fn strip_jsonp(body: &str) -> Result<&str, ParseError> {
    let start = body.find('(').ok_or(ParseError::NotJsonp)?;
    let end = body.rfind(')').ok_or(ParseError::NotJsonp)?;
    if end <= start {
        return Err(ParseError::NotJsonp);
    }
    Ok(&body[start + 1..end])
}

fn parse_json(body: &str) -> Result<Value, ParseError> {
    Ok(serde_json::from_str(body)?)
}

/// Stat whose `count` echoes a top-level JSON field, `null` when absent.
fn count_from_field(payload: &Value, field: &str) -> RawStat {
    RawStat::with_count(payload.get(field))
}
