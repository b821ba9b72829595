use std::time::{Duration, Instant};

use crate::prelude::*;

/// Wall-clock bound for one run.
///
/// Armed once at startup and consulted at every blocking I/O boundary and
/// between pipeline phases; once expired the run aborts through the ordinary
/// fatal path (UNKNOWN, exit 3).
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
    timeout: Duration,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now() + timeout,
            timeout,
        }
    }

    pub fn check(&self) -> Result<()> {
        if Instant::now() >= self.expires_at {
            bail!("timed out after {}s", self.timeout.as_secs());
        }
        Ok(())
    }
}
