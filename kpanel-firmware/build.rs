//! Build script for kpanel-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates panel.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Known keys per section
const SCHEMA: &[(&str, &[&str])] = &[
    ("uart", &["baudrate", "stop_bits", "parity"]),
    (
        "link",
        &["ack_timeout_ms", "retry_limit", "idle_code", "reset_hold_ms"],
    ),
    (
        "app",
        &["blink_interval_ms", "refresh_interval_ms", "stats_interval_ms"],
    ),
];

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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate panel.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=panel.toml");

    let config_path = Path::new("panel.toml");
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: panel.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds panel.toml from the kpanel-firmware         ║\n\
            ║  directory. An empty file selects the built-in defaults.         ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read panel.toml                                ║\n\
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
            report(
                "Invalid TOML syntax in panel.toml",
                &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
            );
            return;
        }
    };

    let mut errors = Vec::new();
    validate_schema(&config, &mut errors);
    validate_ranges(&config, &mut errors);

    if !errors.is_empty() {
        report("Invalid panel configuration", &errors);
    }

    println!("cargo:warning=panel.toml validated successfully");
}

/// Every table and key must be one the firmware parser understands
fn validate_schema(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        errors.push("panel.toml must be a table".to_string());
        return;
    };

    for (section, value) in root {
        let Some((_, keys)) = SCHEMA.iter().find(|(name, _)| *name == section.as_str()) else {
            errors.push(format!("unknown section [{}]", section));
            continue;
        };

        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };

        for (key, value) in table {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", section, key));
            } else if key == "parity" {
                if !matches!(value.as_str(), Some("none" | "even" | "odd")) {
                    errors.push("[uart] parity must be \"none\", \"even\" or \"odd\"".to_string());
                }
            } else if value.as_integer().map_or(true, |v| v < 0) {
                errors.push(format!("[{}] {} must be a non-negative integer", section, key));
            }
        }
    }
}

fn validate_ranges(config: &toml::Value, errors: &mut Vec<String>) {
    let int = |section: &str, key: &str| {
        config
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(toml::Value::as_integer)
    };

    if let Some(stop_bits) = int("uart", "stop_bits") {
        if stop_bits != 1 && stop_bits != 2 {
            errors.push("[uart] stop_bits must be 1 or 2".to_string());
        }
    }
    if int("uart", "baudrate") == Some(0) {
        errors.push("[uart] baudrate must be non-zero".to_string());
    }
    if let Some(hold) = int("link", "reset_hold_ms") {
        if hold < 250 {
            errors.push("[link] reset_hold_ms must be at least 250".to_string());
        }
    }
    if let Some(idle) = int("link", "idle_code") {
        if idle != 0x00 && idle != 0x80 {
            errors.push("[link] idle_code must be 0x00 or 0x80".to_string());
        }
    }
    if int("link", "ack_timeout_ms") == Some(0) {
        errors.push("[link] ack_timeout_ms must be non-zero".to_string());
    }
    if let Some(limit) = int("link", "retry_limit") {
        if limit > i64::from(u16::MAX) {
            errors.push("[link] retry_limit must fit in 16 bits".to_string());
        }
    }
    for key in ["blink_interval_ms", "refresh_interval_ms", "stats_interval_ms"] {
        if int("app", key) == Some(0) {
            errors.push(format!("[app] {} must be non-zero", key));
        }
    }
}

/// Abort the build with a boxed list of problems
fn report(title: &str, lines: &[String]) {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| {
                let truncated = if line.len() > 62 {
                    format!("{}...", &line[..59])
                } else {
                    line.clone()
                };
                format!("║  • {:<62} ║", truncated)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}
