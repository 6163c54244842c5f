use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;
use crate::http_client::HttpResponse;
use crate::stat::RawStat;

static COUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sid="cnt">(\d+)</em>"#).expect("count pattern compiles")
});

pub(super) fn parse(response: &HttpResponse) -> Result<RawStat, ParseError> {
    let count = match COUNT_PATTERN.captures(&response.body) {
        Some(captures) => captures[1]
            .parse::<i64>()
            .map_err(|_| ParseError::InvalidCount(captures[1].to_owned()))?,
        None => 0,
    };

    Ok(RawStat::with_count(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::StatValue;

    #[test]
    fn reads_counter_element() {
        let response = HttpResponse::ok(
            r#"<a class="btn"><span><em id="cnt">73</em></span></a>"#,
        );

        let stat = parse(&response).expect("markup should parse");

        assert_eq!(stat.count(), Some(&StatValue::Int(73)));
    }

    #[test]
    fn oversized_counter_is_an_error() {
        let response = HttpResponse::ok(r#"<em id="cnt">99999999999999999999999</em>"#);

        let error = parse(&response).expect_err("counter overflows i64");

        assert!(matches!(error, ParseError::InvalidCount(_)));
    }
}
