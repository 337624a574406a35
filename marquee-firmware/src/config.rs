//! Configuration loading
//!
//! The sign configuration is compiled in from `sign.toml` and parsed by
//! the no_std parser in `marquee-core`. A broken file falls back to the
//! built-in defaults so the sign still comes up.

use defmt::*;

use marquee_core::config::{parse_config, SignConfig};

/// Embedded configuration (compiled into firmware)
/// Edit sign.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../sign.toml");

/// Load the embedded configuration, or defaults if it does not parse
pub fn load_config() -> SignConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            log_config_summary(&config);
            config
        }
        Err(e) => {
            // build.rs validates sign.toml, so this only trips on parser gaps
            error!("Failed to parse embedded config: {}", e);
            error!("Using default configuration");
            SignConfig::default()
        }
    }
}

fn log_config_summary(config: &SignConfig) {
    debug!("  address pins: {}", config.pins.address);
    debug!(
        "  clock={} red={} green={}",
        config.pins.clock, config.pins.red, config.pins.green
    );
    debug!(
        "  ale={} we={} bank={}",
        config.pins.latch_enable, config.pins.write_enable, config.pins.bank_select
    );
    debug!(
        "  timing: setup {}us, hold {}us",
        config.timing.setup_us, config.timing.hold_us
    );
    debug!(
        "  task: {} lock timeout {}ms, idle {}ms",
        config.task.context, config.task.lock_timeout_ms, config.task.idle_ms
    );
}
