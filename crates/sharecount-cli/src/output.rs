use std::io::Write;

use sharecount_core::{AggregatedReport, PlatformDescriptor, PlatformRegistry};

use crate::error::CliError;

/// Writes one report as a single JSON document followed by a newline.
pub fn render(
    writer: &mut impl Write,
    report: &AggregatedReport,
    pretty: bool,
) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    writeln!(writer, "{payload}")?;
    Ok(())
}

/// Writes the platform table, origin included.
pub fn render_platforms(
    writer: &mut impl Write,
    registry: &PlatformRegistry,
    pretty: bool,
) -> Result<(), CliError> {
    let platforms: Vec<&PlatformDescriptor> =
        registry.platforms().iter().map(|platform| &**platform).collect();
    let payload = if pretty {
        serde_json::to_string_pretty(&platforms)?
    } else {
        serde_json::to_string(&platforms)?
    };
    writeln!(writer, "{payload}")?;
    Ok(())
}
