//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SluiceConfig;
use crate::domain::errors::RelayError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SluiceConfig
/// 4. Applies environment variable overrides (SLUICE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use sluice::config::loader::load_config;
///
/// let config = load_config("sluice.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SluiceConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RelayError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RelayError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text, with the same substitution,
/// overrides and validation as [`load_config`]
pub fn parse_config(contents: &str) -> Result<SluiceConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SluiceConfig = toml::from_str(&contents)
        .map_err(|e| RelayError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        RelayError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| RelayError::Configuration(format!("Invalid placeholder pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(RelayError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| RelayError::Configuration(format!("Invalid value for {name}: '{value}'")))
}

/// Applies environment variable overrides using SLUICE_* prefix
///
/// Environment variables follow the pattern: SLUICE_<SECTION>_<KEY>
/// For example: SLUICE_EXPORT_SOURCE_PATH, SLUICE_SLICER_MAX_BYTES
fn apply_env_overrides(config: &mut SluiceConfig) -> Result<()> {
    apply_overrides_from(config, |name| std::env::var(name).ok())
}

fn apply_overrides_from(
    config: &mut SluiceConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    // Application overrides
    if let Some(val) = lookup("SLUICE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Export overrides
    if let Some(val) = lookup("SLUICE_EXPORT_EXPORT_ID") {
        config.export.export_id = Some(val);
    }
    if let Some(val) = lookup("SLUICE_EXPORT_INTERVAL_START") {
        config.export.interval_start = parse_env("SLUICE_EXPORT_INTERVAL_START", &val)?;
    }
    if let Some(val) = lookup("SLUICE_EXPORT_INTERVAL_END") {
        config.export.interval_end = parse_env("SLUICE_EXPORT_INTERVAL_END", &val)?;
    }
    if let Some(val) = lookup("SLUICE_EXPORT_SOURCE_PATH") {
        config.export.source_path = val;
    }
    if let Some(val) = lookup("SLUICE_EXPORT_DESTINATION_PATH") {
        config.export.destination_path = val;
    }
    if let Some(val) = lookup("SLUICE_EXPORT_DRY_RUN") {
        config.export.dry_run = parse_env("SLUICE_EXPORT_DRY_RUN", &val)?;
    }

    // Slicer overrides
    if let Some(val) = lookup("SLUICE_SLICER_MAX_BYTES") {
        config.slicer.max_bytes = parse_env("SLUICE_SLICER_MAX_BYTES", &val)?;
    }
    if let Some(val) = lookup("SLUICE_SLICER_MIN_RECORDS_PER_BATCH") {
        config.slicer.min_records_per_batch =
            parse_env("SLUICE_SLICER_MIN_RECORDS_PER_BATCH", &val)?;
    }

    // Queue and drain overrides
    if let Some(val) = lookup("SLUICE_QUEUE_CAPACITY") {
        config.queue.capacity = parse_env("SLUICE_QUEUE_CAPACITY", &val)?;
    }
    if let Some(val) = lookup("SLUICE_DRAIN_IDLE_TIMEOUT_SECONDS") {
        config.drain.idle_timeout_seconds =
            Some(parse_env("SLUICE_DRAIN_IDLE_TIMEOUT_SECONDS", &val)?);
    }

    // Fault injection overrides
    if let Some(val) = lookup("SLUICE_FAULT_INJECTION_FAIL_AFTER_RECORDS") {
        config.fault_injection.fail_after_records =
            Some(parse_env("SLUICE_FAULT_INJECTION_FAIL_AFTER_RECORDS", &val)?);
    }

    // Logging overrides
    if let Some(val) = lookup("SLUICE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("SLUICE_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = lookup("SLUICE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
