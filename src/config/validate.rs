//! Config validation.
//! Rejects values the operations would refuse later, so mistakes surface at load time.

use anyhow::{Result, bail};
use std::path::MAIN_SEPARATOR;

use super::types::Config;

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            bail!("buffer_size must be greater than zero");
        }
        if self.temp_prefix.contains('/') || self.temp_prefix.contains(MAIN_SEPARATOR) {
            bail!("temp_prefix must not contain path separators: '{}'", self.temp_prefix);
        }
        if let Some(t) = self.timeout
            && t.is_zero()
        {
            bail!("timeout_secs must be greater than zero (omit it for no deadline)");
        }
        if let Some(p) = &self.log_file
            && p.is_dir()
        {
            bail!("log_file points at a directory: {}", p.display());
        }
        Ok(())
    }
}
