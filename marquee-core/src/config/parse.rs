//! Simple TOML parser for sign configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the sign configuration. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - [section] headers
//! - Comments (# ...)
//!
//! Keys left out keep their default values. The result is validated
//! before it is returned.

use crate::task::ExecContext;

use super::types::{ConfigError, SignConfig, GPIO_COUNT};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Unknown key for the current section
    InvalidKey,
    /// Value could not be parsed
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
    /// Parsed config failed validation
    Config(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Config(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Pins,
    Timing,
    Task,
    Scroll,
}

/// Parse TOML configuration into a validated SignConfig
pub fn parse_config(input: &str) -> Result<SignConfig, ParseError> {
    let mut config = SignConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        apply_value(section, key, value, &mut config)?;
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "pins" => Ok(Section::Pins),
        "timing" => Ok(Section::Timing),
        "task" => Ok(Section::Task),
        "scroll" => Ok(Section::Scroll),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut SignConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Pins => {
            let pin = parse_pin(value)?;
            let pins = &mut config.pins;
            match key {
                "a0" => pins.address[0] = pin,
                "a1" => pins.address[1] = pin,
                "a2" => pins.address[2] = pin,
                "a3" => pins.address[3] = pin,
                "clock" => pins.clock = pin,
                "red" => pins.red = pin,
                "green" => pins.green = pin,
                "latch_enable" => pins.latch_enable = pin,
                "write_enable" => pins.write_enable = pin,
                "bank_select" => pins.bank_select = pin,
                _ => return Err(ParseError::InvalidKey),
            }
        }
        Section::Timing => match key {
            "setup_us" => config.timing.setup_us = parse_int(value)?,
            "hold_us" => config.timing.hold_us = parse_int(value)?,
            _ => return Err(ParseError::InvalidKey),
        },
        Section::Task => match key {
            "lock_timeout_ms" => config.task.lock_timeout_ms = parse_int(value)?,
            "idle_ms" => config.task.idle_ms = parse_int(value)?,
            "context" => config.task.context = parse_context(value)?,
            _ => return Err(ParseError::InvalidKey),
        },
        Section::Scroll => match key {
            "step_delay_ms" => config.scroll.step_delay_ms = parse_int(value)?,
            _ => return Err(ParseError::InvalidKey),
        },
        Section::Root => return Err(ParseError::InvalidKey),
    }
    Ok(())
}

/// Split `key = value`, dropping trailing comments outside strings
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    let value = match value.find('#') {
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_context(value: &str) -> Result<ExecContext, ParseError> {
    match parse_string(value) {
        "core0" => Ok(ExecContext::Core0),
        "core1" => Ok(ExecContext::Core1),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin string like "gpio11"
pub fn parse_pin(value: &str) -> Result<u8, ParseError> {
    let s = parse_string(value.trim());
    let num = s.strip_prefix("gpio").ok_or(ParseError::InvalidPin)?;
    let pin: u8 = num.parse().map_err(|_| ParseError::InvalidPin)?;
    if pin >= GPIO_COUNT {
        return Err(ParseError::InvalidPin);
    }
    Ok(pin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin() {
        assert_eq!(parse_pin("\"gpio11\""), Ok(11));
        assert_eq!(parse_pin("gpio0"), Ok(0));
        assert_eq!(parse_pin("gpio29"), Ok(29));

        assert_eq!(parse_pin("gpio30"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("pin11"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin(""), Err(ParseError::InvalidPin));
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config(""), Ok(SignConfig::default()));
    }

    #[test]
    fn test_parse_full_config() {
        let input = r#"
# Two-panel sign on the breakout board
[pins]
a0 = "gpio12"
a1 = "gpio13"
a2 = "gpio14"
a3 = "gpio15"
clock = "gpio16"   # SCLK
red = "gpio17"
green = "gpio18"
latch_enable = "gpio19"
write_enable = "gpio20"
bank_select = "gpio21"

[timing]
setup_us = 2
hold_us = 3

[task]
lock_timeout_ms = 500
idle_ms = 50
context = "core0"

[scroll]
step_delay_ms = 20
"#;
        let config = parse_config(input).unwrap();
        assert_eq!(config.pins.address, [12, 13, 14, 15]);
        assert_eq!(config.pins.clock, 16);
        assert_eq!(config.pins.bank_select, 21);
        assert_eq!(config.timing.setup_us, 2);
        assert_eq!(config.timing.hold_us, 3);
        assert_eq!(config.task.lock_timeout_ms, 500);
        assert_eq!(config.task.idle_ms, 50);
        assert_eq!(config.task.context, ExecContext::Core0);
        assert_eq!(config.scroll.step_delay_ms, 20);
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(
            parse_config("[wifi]\nssid = \"x\""),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            parse_config("[pins]\nblue = \"gpio3\""),
            Err(ParseError::InvalidKey)
        );
        assert_eq!(parse_config("idle_ms = 3"), Err(ParseError::InvalidKey));
    }

    #[test]
    fn test_bad_values() {
        assert_eq!(
            parse_config("[task]\ncontext = \"core2\""),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[timing]\nsetup_us = fast"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_validation_runs() {
        let input = "[pins]\nred = \"gpio6\"";
        assert_eq!(
            parse_config(input),
            Err(ParseError::Config(ConfigError::DuplicatePin(6)))
        );
    }
}
