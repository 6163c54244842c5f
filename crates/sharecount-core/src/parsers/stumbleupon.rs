use serde_json::Value;

use super::parse_json;
use crate::error::ParseError;
use crate::http_client::HttpResponse;
use crate::stat::RawStat;

/// Views are only reported for indexed URLs, either as a number or as text.
pub(super) fn parse(response: &HttpResponse) -> Result<RawStat, ParseError> {
    let payload = parse_json(&response.body)?;
    let result = payload
        .get("result")
        .ok_or(ParseError::MissingField("result"))?;

    let mut count = 0.0;
    if result.get("in_index").and_then(Value::as_bool) == Some(true) {
        count = match result.get("views") {
            Some(Value::Number(views)) => views.as_f64().unwrap_or(0.0),
            Some(Value::String(views)) => views.trim().parse::<i64>().unwrap_or(0) as f64,
            _ => {
                return Err(ParseError::UnexpectedType {
                    field: "views",
                    expected: "number or numeric string",
                })
            }
        };
    }

    Ok(RawStat::with_count(count))
}
