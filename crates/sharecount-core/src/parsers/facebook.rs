use super::parse_json;
use crate::error::ParseError;
use crate::http_client::HttpResponse;
use crate::stat::{RawStat, COUNT};
use crate::value::StatValue;

const COUNTERS: [&str; 6] = [
    "share_count",
    "like_count",
    "comment_count",
    "total_count",
    "click_count",
    "commentsbox_count",
];

pub(super) fn parse(response: &HttpResponse) -> Result<RawStat, ParseError> {
    let payload = parse_json(&response.body)?;
    let entries = payload.as_array().ok_or(ParseError::UnexpectedType {
        field: "links",
        expected: "array",
    })?;
    let first = entries.first().ok_or(ParseError::Empty)?;

    let mut stat = RawStat::from_attributes(Default::default());
    for counter in COUNTERS {
        stat.insert(counter, StatValue::from(first.get(counter)));
    }
    stat.insert(COUNT, StatValue::from(first.get("total_count")));

    Ok(stat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_counters_and_uses_total_as_count() {
        let response = HttpResponse::ok(
            r#"[{"url":"http://a.test","share_count":4,"like_count":5,"comment_count":1,
                "total_count":10,"click_count":0,"commentsbox_count":0}]"#,
        );

        let stat = parse(&response).expect("payload should parse");

        assert_eq!(stat.count(), Some(&StatValue::Int(10)));
        assert_eq!(stat.get("like_count"), Some(&StatValue::Int(5)));
        assert_eq!(stat.get("url"), None);
    }

    #[test]
    fn empty_array_is_an_error() {
        assert_eq!(parse(&HttpResponse::ok("[]")), Err(ParseError::Empty));
    }

    #[test]
    fn object_payload_is_an_error() {
        let error = parse(&HttpResponse::ok(r#"{"error_code":1}"#)).expect_err("not an array");
        assert!(matches!(error, ParseError::UnexpectedType { .. }));
    }
}
