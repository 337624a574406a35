//! Build script for marquee-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates sign.toml at compile time

use std::collections::BTreeMap;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted in each section
const SECTIONS: &[(&str, &[&str])] = &[
    (
        "pins",
        &[
            "a0",
            "a1",
            "a2",
            "a3",
            "clock",
            "red",
            "green",
            "latch_enable",
            "write_enable",
            "bank_select",
        ],
    ),
    ("timing", &["setup_us", "hold_us"]),
    ("task", &["lock_timeout_ms", "idle_ms", "context"]),
    ("scroll", &["step_delay_ms"]),
];

/// GPIO count on the RP2040
const GPIO_COUNT: i64 = 30;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate sign.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=sign.toml");

    let config_path = Path::new("sign.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: sign.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds sign.toml as its configuration.             ║\n\
            ║  Please create one in the marquee-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read sign.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in sign.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_layout(&config, &mut errors);
    validate_pins(&config, &mut errors);
    validate_numbers(&config, &mut errors);
    validate_context(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid sign configuration                               ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=sign.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only known sections and keys; no top-level values
fn validate_layout(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (name, value) in root {
        let Some((_, keys)) = SECTIONS.iter().find(|(section, _)| section == name) else {
            errors.push(format!("unknown section or key '{}'", name));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }
}

/// Pins must be "gpioN" strings, in range and unique
fn validate_pins(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(pins) = config.get("pins").and_then(|p| p.as_table()) else {
        return;
    };

    let mut used: BTreeMap<i64, &str> = BTreeMap::new();
    for (key, value) in pins {
        let Some(text) = value.as_str() else {
            errors.push(format!("[pins] {} must be a \"gpioN\" string", key));
            continue;
        };
        let pin = match text.strip_prefix("gpio").and_then(|n| n.parse::<i64>().ok()) {
            Some(pin) if (0..GPIO_COUNT).contains(&pin) => pin,
            _ => {
                errors.push(format!("[pins] {} = '{}' is not gpio0-gpio29", key, text));
                continue;
            }
        };
        if let Some(other) = used.insert(pin, key) {
            errors.push(format!("[pins] gpio{} used by both {} and {}", pin, other, key));
        }
    }
}

/// Numeric settings must be non-negative integers; lock timeout non-zero
fn validate_numbers(config: &toml::Value, errors: &mut Vec<String>) {
    let numeric = [
        ("timing", "setup_us"),
        ("timing", "hold_us"),
        ("task", "lock_timeout_ms"),
        ("task", "idle_ms"),
        ("scroll", "step_delay_ms"),
    ];

    for (section, key) in numeric {
        let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
            continue;
        };
        match value.as_integer() {
            Some(n) if (0..=i64::from(u32::MAX)).contains(&n) => {
                if key == "lock_timeout_ms" && n == 0 {
                    errors.push("[task] lock_timeout_ms must be non-zero".to_string());
                }
            }
            _ => errors.push(format!("[{}] {} must be a non-negative integer", section, key)),
        }
    }
}

fn validate_context(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(value) = config.get("task").and_then(|t| t.get("context")) {
        if !matches!(value.as_str(), Some("core0") | Some("core1")) {
            errors.push("[task] context must be 'core0' or 'core1'".to_string());
        }
    }
}
