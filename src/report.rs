use std::fmt;
use std::str::FromStr;

use crate::aggregate::AggregateResult;
use crate::prelude::*;
use crate::threshold::ThresholdSpec;

/// Service name prefixed to the status line.
pub const PLUGIN_NAME: &str = "RSS";

/// Plugin protocol outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// Output unit: a binary byte scale, optionally rendered as bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Echoed verbatim after every value in the output.
    label: String,
    /// Bytes per unit, powers of 1024.
    scale: u64,
    bits: bool,
}

impl FromStr for Unit {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let scale = match raw.to_ascii_uppercase().as_str() {
            "B" => 1,
            "KB" | "KIB" => 1 << 10,
            "MB" | "MIB" => 1 << 20,
            "GB" | "GIB" => 1 << 30,
            "TB" | "TIB" => 1 << 40,
            _ => bail!("unknown unit {raw:?}"),
        };
        // Only the final character decides bits vs bytes.
        let bits = raw.ends_with('b');
        Ok(Self {
            label: raw.to_string(),
            scale,
            bits,
        })
    }
}

impl Unit {
    /// Convert a page count to this unit.
    pub fn convert(&self, pages: u64, page_size: u64) -> f64 {
        let mut value = (pages * page_size) as f64 / self.scale as f64;
        if self.bits {
            value *= 8.0;
        }
        value
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Format with up to two fraction digits, trailing zeros trimmed.
fn format_value(value: f64) -> String {
    let formatted = format!("{value:.2}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_owned()
}

fn threshold_suffix(
    warning: Option<&ThresholdSpec>,
    critical: Option<&ThresholdSpec>,
) -> String {
    let mut suffix = String::new();
    if let Some(warning) = warning {
        suffix.push(';');
        suffix.push_str(&warning.to_string());
    }
    if let Some(critical) = critical {
        suffix.push(';');
        suffix.push_str(&critical.to_string());
    }
    suffix
}

/// Produce the final status line and its severity.
///
/// The converted grand total is tested against both ranges; a critical
/// alert outranks a warning. The performance-metrics segment lists every
/// name bucket lexicographically, then the total, all in the same unit.
pub fn render(
    aggregate: &AggregateResult,
    page_size: u64,
    unit: &Unit,
    warning: Option<&ThresholdSpec>,
    critical: Option<&ThresholdSpec>,
) -> (String, Status) {
    let total = unit.convert(aggregate.total_pages, page_size);

    let mut status = Status::Ok;
    if warning.is_some_and(|warning| warning.alerts(total)) {
        status = Status::Warning;
    }
    if critical.is_some_and(|critical| critical.alerts(total)) {
        status = Status::Critical;
    }

    let suffix = threshold_suffix(warning, critical);
    let perfdata = aggregate
        .pages_by_name
        .iter()
        .map(|(name, pages)| {
            let value = format_value(unit.convert(*pages, page_size));
            format!("{name}={value}{}{suffix}", unit.label())
        })
        .chain(std::iter::once(format!(
            "total={}{}{suffix}",
            format_value(total),
            unit.label()
        )))
        .join(" ");

    let line = format!(
        "{PLUGIN_NAME} {status} - {}{} | {perfdata}",
        format_value(total),
        unit.label()
    );
    (line, status)
}
