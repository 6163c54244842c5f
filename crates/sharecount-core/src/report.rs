use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CollectError;
use crate::normalize::sum_counts;
use crate::stat::{RawStat, COUNT};
use crate::value::Attributes;

/// Synthesized summary of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportMeta {
    pub total: i64,
}

/// Final result of one collection run.
///
/// Serializes flat: one key per reporting platform, then `meta` and `errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedReport {
    #[serde(flatten)]
    pub platforms: BTreeMap<String, Attributes>,
    pub meta: ReportMeta,
    pub errors: Vec<String>,
}

impl AggregatedReport {
    pub fn platform(&self, name: &str) -> Option<&Attributes> {
        self.platforms.get(name)
    }

    pub fn total(&self) -> i64 {
        self.meta.total
    }
}

/// Merges stats and errors into a report.
///
/// `meta.total` sums every normalized `count`; stats without one add nothing.
/// Errors keep the order they are given in.
pub fn combine(
    stats: impl IntoIterator<Item = RawStat>,
    errors: impl IntoIterator<Item = CollectError>,
) -> AggregatedReport {
    let platforms: BTreeMap<String, Attributes> = stats
        .into_iter()
        .map(|stat| (stat.name, stat.attributes))
        .collect();
    let total = sum_counts(
        platforms
            .values()
            .filter_map(|attributes| attributes.get(COUNT)),
    );

    AggregatedReport {
        platforms,
        meta: ReportMeta { total },
        errors: errors.into_iter().map(|error| error.to_string()).collect(),
    }
}
