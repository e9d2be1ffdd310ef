//! Configuration loading
//!
//! panel.toml is embedded at build time (and validated by build.rs), then
//! parsed here at boot. A parse failure falls back to built-in defaults so
//! a bad edit never bricks the panel.

use defmt::*;

use kpanel_core::config::{parse_config, PanelConfig};

/// Embedded configuration (compiled into firmware)
/// Edit panel.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../panel.toml");

/// Parse the embedded configuration, or fall back to defaults
pub fn load_config() -> PanelConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            warn!("Using built-in defaults");
            PanelConfig::default()
        }
    }
}
