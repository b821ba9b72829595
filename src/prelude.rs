pub use anyhow::{Context, Result, anyhow, bail};
pub use itertools::Itertools;
#[allow(unused_imports)]
pub use log::{debug, error, info, warn};
