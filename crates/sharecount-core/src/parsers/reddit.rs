use serde_json::Value;

use super::parse_json;
use crate::error::ParseError;
use crate::http_client::HttpResponse;
use crate::stat::{RawStat, COUNT};

/// Sums votes over every link submission (`t3`) of the listing.
pub(super) fn parse(response: &HttpResponse) -> Result<RawStat, ParseError> {
    let payload = parse_json(&response.body)?;
    let children = payload
        .get("data")
        .ok_or(ParseError::MissingField("data"))?
        .get("children")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingField("children"))?;

    let mut ups = 0.0;
    let mut downs = 0.0;
    for child in children {
        if child.get("kind").and_then(Value::as_str) != Some("t3") {
            continue;
        }
        let data = child.get("data").ok_or(ParseError::MissingField("data"))?;
        ups += votes(data, "ups")?;
        downs += votes(data, "downs")?;
    }

    let mut stat = RawStat::from_attributes(Default::default());
    stat.insert("ups", ups);
    stat.insert("downs", downs);
    stat.insert(COUNT, ups + downs);
    Ok(stat)
}

fn votes(data: &Value, field: &'static str) -> Result<f64, ParseError> {
    data.get(field)
        .and_then(Value::as_f64)
        .ok_or(ParseError::UnexpectedType {
            field,
            expected: "number",
        })
}
