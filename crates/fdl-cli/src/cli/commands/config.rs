//! `fdl config` – show where the config lives and what is in effect.

use anyhow::Result;
use fdl_core::config::{self, FdlConfig};

pub fn run_config(cfg: &FdlConfig) -> Result<()> {
    let path = config::config_path()?;
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    println!("# temp folder: {}", cfg.temp_root().join(fdl_core::storage::TEMP_FOLDER).display());
    Ok(())
}
