use super::{count_from_field, parse_json};
use crate::error::ParseError;
use crate::http_client::HttpResponse;
use crate::stat::RawStat;

pub(super) fn parse(response: &HttpResponse) -> Result<RawStat, ParseError> {
    let payload = parse_json(&response.body)?;
    Ok(count_from_field(&payload, "shares"))
}
