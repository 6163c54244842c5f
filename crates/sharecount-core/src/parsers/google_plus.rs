use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;
use crate::http_client::HttpResponse;
use crate::stat::RawStat;

static COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\{c:\s(\d+?)\.").expect("count pattern compiles"));

/// The +1 button embeds its counter as `{c: 12.0` in inline script.
pub(super) fn parse(response: &HttpResponse) -> Result<RawStat, ParseError> {
    let count = match COUNT_PATTERN.captures(&response.body) {
        Some(captures) => captures[1]
            .parse::<i64>()
            .map_err(|_| ParseError::InvalidCount(captures[1].to_owned()))?,
        None => 0,
    };

    Ok(RawStat::with_count(count))
}
