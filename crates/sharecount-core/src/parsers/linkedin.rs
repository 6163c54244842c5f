use super::{count_from_field, parse_json, strip_jsonp};
use crate::error::ParseError;
use crate::http_client::HttpResponse;
use crate::stat::RawStat;

pub(super) fn parse(response: &HttpResponse) -> Result<RawStat, ParseError> {
    let payload = parse_json(strip_jsonp(&response.body)?)?;
    Ok(count_from_field(&payload, "count"))
}
