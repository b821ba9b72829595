use clap::Parser;
use env_logger::Env;

use crate::config::Config;
use crate::deadline::Deadline;
use crate::prelude::*;
use crate::report::{self, Status};
use crate::{aggregate, snapshot};

/// Report aggregate resident memory (Rss) for the named processes and
/// everything sharing their process groups.
#[derive(Parser, Debug)]
#[command(name = "check_rss", version, about)]
pub struct Cli {
    /// Process name to measure; repeatable, or comma separated
    #[arg(short = 'P', long = "proc-name", value_delimiter = ',')]
    pub proc_name: Vec<String>,

    /// Warning range for the converted total (e.g. 90, 10:, ~:95, 80:90, @10:20)
    #[arg(short, long)]
    pub warning: Option<String>,

    /// Critical range for the converted total
    #[arg(short, long)]
    pub critical: Option<String>,

    /// Abort with UNKNOWN after this many seconds
    #[arg(short, long, default_value_t = 10)]
    pub timeout: u64,

    /// Output unit: B, KB, MB, GB or TB; trailing lowercase 'b' reports bits
    #[arg(short, default_value = "KB")]
    pub unit: String,

    /// Echo page size and per-name page counts while measuring
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run() -> Result<Status> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = Config::from_cli(&cli)?;
    let deadline = Deadline::after(config.timeout);
    debug!("page size: {} bytes", config.page_size);
    debug!("unit: {}", config.unit.label());

    let records = snapshot::read_snapshot(&config.proc_root, &deadline)?;
    deadline.check()?;

    let aggregate = aggregate::aggregate(&records, &config.proc_names);
    for (name, pages) in &aggregate.pages_by_name {
        debug!("{name}: {pages} pages");
    }
    // A zero total means no target matched a live process (or every match
    // reported zero pages); both are reporting failures, not readings.
    if aggregate.total_pages == 0 {
        bail!("no resident memory found for {}", config.proc_names.join(", "));
    }
    deadline.check()?;

    let (line, status) = report::render(
        &aggregate,
        config.page_size,
        &config.unit,
        config.warning.as_ref(),
        config.critical.as_ref(),
    );
    println!("{line}");
    Ok(status)
}

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
}
