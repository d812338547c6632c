//! CLI command handlers, one file per command.

mod config;
mod get;

pub use config::run_config;
pub use get::run_get;
#[cfg(test)]
pub(crate) use get::{is_url, parse_url_list};
