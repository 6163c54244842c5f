use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::error::ParseError;
use crate::http_client::HttpResponse;
use crate::stat::RawStat;

static OPEN_GRAPH: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property^="og:"]"#));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="description"]"#));
static CANONICAL: LazyLock<Selector> = LazyLock::new(|| selector(r#"link[rel="canonical"]"#));

const OPEN_GRAPH_KEYS: [&str; 7] = [
    "title",
    "type",
    "url",
    "description",
    "site_name",
    "locale",
    "determiner",
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector parses")
}

/// Extracts page metadata; the origin never reports a `count`.
///
/// OpenGraph properties win over the plain `<title>` and description tags.
/// Blank values are dropped.
pub(super) fn parse(response: &HttpResponse) -> Result<RawStat, ParseError> {
    let document = Html::parse_document(&response.body);
    let mut stat = RawStat::from_attributes(Default::default());

    for element in document.select(&OPEN_GRAPH) {
        let property = element.value().attr("property").unwrap_or_default();
        let Some(key) = property.strip_prefix("og:") else {
            continue;
        };
        if !OPEN_GRAPH_KEYS.contains(&key) || stat.get(key).is_some() {
            continue;
        }
        if let Some(content) = non_blank(element.value().attr("content")) {
            stat.insert(key, content);
        }
    }

    if stat.get("title").is_none() {
        let title = document
            .select(&TITLE)
            .next()
            .map(|element| element.text().collect::<String>());
        if let Some(title) = non_blank(title.as_deref()) {
            stat.insert("title", title);
        }
    }

    if stat.get("description").is_none() {
        let description = document
            .select(&DESCRIPTION)
            .next()
            .and_then(|element| element.value().attr("content"));
        if let Some(description) = non_blank(description) {
            stat.insert("description", description);
        }
    }

    let canonical = document
        .select(&CANONICAL)
        .next()
        .and_then(|element| element.value().attr("href"));
    if let Some(canonical) = non_blank(canonical) {
        stat.insert("canonical", canonical);
    }

    Ok(stat)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::StatValue;

    fn text<'a>(stat: &'a RawStat, key: &str) -> Option<&'a str> {
        stat.get(key).and_then(StatValue::as_text)
    }

    #[test]
    fn reads_open_graph_properties() {
        let response = HttpResponse::ok(
            r#"<html><head>
                <title>Fallback</title>
                <meta property="og:title" content="Launch day">
                <meta property="og:type" content="article">
                <meta property="og:site_name" content="Example News">
                <meta property="og:image" content="https://cdn.test/a.png">
                <link rel="canonical" href="https://news.test/launch">
            </head></html>"#,
        );

        let stat = parse(&response).expect("page should parse");

        assert_eq!(text(&stat, "title"), Some("Launch day"));
        assert_eq!(text(&stat, "type"), Some("article"));
        assert_eq!(text(&stat, "site_name"), Some("Example News"));
        assert_eq!(text(&stat, "canonical"), Some("https://news.test/launch"));
        assert_eq!(stat.get("image"), None);
        assert_eq!(stat.count(), None);
    }

    #[test]
    fn falls_back_to_plain_tags() {
        let response = HttpResponse::ok(
            r#"<html><head>
                <title> Plain title </title>
                <meta name="description" content="About the page">
                <meta property="og:description" content="  ">
            </head></html>"#,
        );

        let stat = parse(&response).expect("page should parse");

        assert_eq!(text(&stat, "title"), Some("Plain title"));
        assert_eq!(text(&stat, "description"), Some("About the page"));
    }

    #[test]
    fn bare_document_yields_no_attributes() {
        let stat = parse(&HttpResponse::ok("not html at all")).expect("page should parse");
        assert!(stat.attributes.is_empty());
    }
}
