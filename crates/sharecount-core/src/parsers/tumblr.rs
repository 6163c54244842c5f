use super::parse_json;
use crate::error::ParseError;
use crate::http_client::HttpResponse;
use crate::stat::RawStat;
use crate::value::StatValue;

pub(super) fn parse(response: &HttpResponse) -> Result<RawStat, ParseError> {
    let payload = parse_json(&response.body)?;
    let notes = payload
        .get("response")
        .ok_or(ParseError::MissingField("response"))?
        .get("note_count")
        .ok_or(ParseError::MissingField("note_count"))?;

    if !notes.is_number() {
        return Err(ParseError::UnexpectedType {
            field: "note_count",
            expected: "number",
        });
    }

    Ok(RawStat::with_count(StatValue::from(notes.clone())))
}
