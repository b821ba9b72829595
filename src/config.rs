use std::path::PathBuf;
use std::time::Duration;

use crate::app::Cli;
use crate::prelude::*;
use crate::report::Unit;
use crate::threshold::ThresholdSpec;

/// Validated configuration record handed to the measurement pipeline.
///
/// All validation that must precede measurement happens here: a missing
/// target name, an unknown unit, or a malformed range is fatal before the
/// process table is ever touched.
#[derive(Debug)]
pub struct Config {
    pub proc_names: Vec<String>,
    pub warning: Option<ThresholdSpec>,
    pub critical: Option<ThresholdSpec>,
    pub timeout: Duration,
    pub unit: Unit,
    /// Bytes per memory page, a system constant read once at startup.
    pub page_size: u64,
    pub proc_root: PathBuf,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if cli.proc_name.is_empty() {
            bail!("no process name given, -P/--proc-name is required");
        }
        let warning = cli
            .warning
            .as_deref()
            .map(str::parse::<ThresholdSpec>)
            .transpose()
            .context("invalid warning range")?;
        let critical = cli
            .critical
            .as_deref()
            .map(str::parse::<ThresholdSpec>)
            .transpose()
            .context("invalid critical range")?;
        let unit: Unit = cli.unit.parse()?;

        Ok(Self {
            proc_names: cli.proc_name.clone(),
            warning,
            critical,
            timeout: Duration::from_secs(cli.timeout),
            unit,
            page_size: procfs::page_size(),
            proc_root: PathBuf::from("/proc"),
        })
    }
}
