//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DatabaseTarget, SluiceConfig, SourceBackend, StateBackend};
use super::secret::secret_string;
use crate::domain::errors::SluiceError;
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
/// Returns [`SluiceError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, or validation
/// fails.
///
/// # Examples
///
/// ```no_run
/// use sluice::config::loader::load_config;
///
/// let config = load_config("sluice.toml")?;
/// # Ok::<(), sluice::domain::SluiceError>(())
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SluiceConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SluiceError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SluiceError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
///
/// # Errors
///
/// Same as [`load_config`], minus file access.
pub fn parse_config(contents: &str) -> Result<SluiceConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SluiceConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SluiceError::Configuration(format!("Configuration validation failed: {}", e))
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
        .map_err(|e| SluiceError::Configuration(format!("Invalid substitution pattern: {}", e)))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SluiceError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        SluiceError::Configuration(format!("Invalid value '{}' for {}", value, name))
    })
}

/// Applies environment variable overrides using the SLUICE_* prefix
///
/// Variables follow the pattern `SLUICE_<SECTION>_<KEY>`, for example
/// `SLUICE_SOURCE_LOCATION` or `SLUICE_INGEST_BATCH_CEILING`.
fn apply_env_overrides(config: &mut SluiceConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("SLUICE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("SLUICE_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_override("SLUICE_APPLICATION_DRY_RUN", &val)?;
    }

    // Source overrides
    if let Some(val) = var("SLUICE_SOURCE_BACKEND") {
        config.source.backend = match val.to_ascii_lowercase().as_str() {
            "local" => SourceBackend::Local,
            "http" => SourceBackend::Http,
            other => {
                return Err(SluiceError::Configuration(format!(
                    "Invalid value '{}' for SLUICE_SOURCE_BACKEND",
                    other
                )))
            }
        };
    }
    if let Some(val) = var("SLUICE_SOURCE_LOCATION") {
        config.source.location = val;
    }
    if let Some(val) = var("SLUICE_SOURCE_KEY") {
        config.source.key = Some(val);
    }
    if let Some(val) = var("SLUICE_SOURCE_AUTH_TOKEN") {
        config.source.auth_token = Some(secret_string(val));
    }
    if let Some(val) = var("SLUICE_SOURCE_TIMEOUT_SECONDS") {
        config.source.timeout_seconds = parse_override("SLUICE_SOURCE_TIMEOUT_SECONDS", &val)?;
    }

    // Ingest overrides
    if let Some(val) = var("SLUICE_INGEST_BATCH_CEILING") {
        config.ingest.batch_ceiling = parse_override("SLUICE_INGEST_BATCH_CEILING", &val)?;
    }
    if let Some(val) = var("SLUICE_INGEST_FINALIZE_ON_CANCEL") {
        config.ingest.finalize_on_cancel =
            parse_override("SLUICE_INGEST_FINALIZE_ON_CANCEL", &val)?;
    }

    // Database overrides
    if let Some(val) = var("SLUICE_DATABASE_TARGET") {
        config.database_target = match val.to_ascii_lowercase().as_str() {
            "postgresql" => DatabaseTarget::PostgreSQL,
            "memory" => DatabaseTarget::Memory,
            other => {
                return Err(SluiceError::Configuration(format!(
                    "Invalid value '{}' for SLUICE_DATABASE_TARGET",
                    other
                )))
            }
        };
    }
    if let Some(ref mut pg_config) = config.postgresql {
        if let Some(val) = var("SLUICE_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
        if let Some(val) = var("SLUICE_POSTGRESQL_MAX_CONNECTIONS") {
            pg_config.max_connections = parse_override("SLUICE_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
    }

    // State overrides
    if let Some(val) = var("SLUICE_STATE_BACKEND") {
        config.state.backend = match val.to_ascii_lowercase().as_str() {
            "file" => StateBackend::File,
            "database" => StateBackend::Database,
            other => {
                return Err(SluiceError::Configuration(format!(
                    "Invalid value '{}' for SLUICE_STATE_BACKEND",
                    other
                )))
            }
        };
    }
    if let Some(val) = var("SLUICE_STATE_DIRECTORY") {
        config.state.directory = val;
    }

    // Logging overrides
    if let Some(val) = var("SLUICE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("SLUICE_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("SLUICE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("SLUICE_TEST_SUBST_VAR", "test_value");
        let input = "token = \"${SLUICE_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "token = \"test_value\"\n");
        std::env::remove_var("SLUICE_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("SLUICE_TEST_MISSING_VAR");
        let input = "token = \"${SLUICE_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("SLUICE_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("SLUICE_TEST_COMMENTED_VAR");
        let input = "# token = \"${SLUICE_TEST_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(SluiceError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
database_target = "memory"

[application]
log_level = "debug"

[source]
backend = "local"
location = "/data/incoming"
key = "members.csv"

[source.csv]
delimiter = ";"

[ingest]
batch_ceiling = 50
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.source.location, "/data/incoming");
        assert_eq!(config.source.csv.delimiter_byte().unwrap(), b';');
        assert_eq!(config.ingest.batch_ceiling, 50);
        assert!(config.ingest.finalize_on_cancel);
    }

    #[test]
    fn test_parse_config_rejects_invalid_toml() {
        let result = parse_config("database_target = [");
        assert!(matches!(result, Err(SluiceError::Configuration(_))));
    }
}
