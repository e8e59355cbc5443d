//! sidcfg library root
//!
//! INI-backed settings store for a console SID player.

pub mod config;
pub mod ini;
pub mod util;

pub use config::{ConfigError, IniConfig, Settings};
pub use ini::{IniError, IniStore};
