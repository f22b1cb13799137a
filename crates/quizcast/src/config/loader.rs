use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::schema::{Config, CONFIG_VERSION};
use crate::error::ConfigError;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "QUIZCAST_CONFIG";

pub const CONFIG_FILE_NAME: &str = "quizcast.json";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut config = load_config_from_str(&content)?;
    config.base_dir = path
        .parent()
        .map(|p| p.to_path_buf())
        .filter(|p| !p.as_os_str().is_empty());
    Ok(config)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Finds the config to use.
///
/// Order: explicit path, `QUIZCAST_CONFIG`, `./quizcast.json`, the platform
/// config directory, then built-in defaults. An explicit path or env value
/// that points at a missing file is an error.
pub fn discover_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        info!("Loading config from {}", path.display());
        return load_config(path);
    }

    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(path);
        info!("Loading config from ${}: {}", CONFIG_ENV_VAR, path.display());
        return load_config(path);
    }

    for candidate in default_locations() {
        if candidate.is_file() {
            info!("Loading config from {}", candidate.display());
            return load_config(candidate);
        }
    }

    debug!("No config file found, using defaults");
    let config = Config::default();
    validate_config(&config)?;
    Ok(config)
}

fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("quizcast").join(CONFIG_FILE_NAME));
    }
    locations
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(invalid(format!(
            "Unsupported config version: {}",
            config.version
        )));
    }

    if config.batch.group_size == 0 {
        return Err(invalid("batch.group_size must be greater than 0"));
    }
    if config.batch.concurrency_per_render == 0 {
        return Err(invalid("batch.concurrency_per_render must be greater than 0"));
    }

    let compositor = &config.compositor;
    if compositor.program.trim().is_empty() {
        return Err(invalid("compositor.program must not be empty"));
    }
    if compositor.composition.trim().is_empty() {
        return Err(invalid("compositor.composition must not be empty"));
    }
    if compositor.concurrency == 0 {
        return Err(invalid("compositor.concurrency must be greater than 0"));
    }
    if compositor.timeout_ms == 0 {
        return Err(invalid("compositor.timeout_ms must be greater than 0"));
    }
    if compositor.height == 0 {
        return Err(invalid("compositor.height must be greater than 0"));
    }

    if config.staging.extension.trim().is_empty() {
        return Err(invalid("staging.extension must not be empty"));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_load_empty_object_uses_defaults() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.compositor.program, "npx");
        assert_eq!(config.compositor.timeout_ms, 120_000);
        assert_eq!(config.batch.group_size, 1);
        assert_eq!(config.staging.prefix, "question_");
    }

    #[test]
    fn test_load_partial_sections() {
        let config_json = r#"
        {
            "version": "1.0",
            "paths": {
                "project_root": "/srv/quiz",
                "records_dir": "records"
            },
            "compositor": {
                "program": "node",
                "base_args": ["render.js"],
                "concurrency": 2
            },
            "batch": { "group_size": 2 }
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.paths.records_dir, "records");
        assert_eq!(config.paths.bundles_dir, "audiogen/output audios");
        assert_eq!(config.compositor.program, "node");
        assert_eq!(config.compositor.base_args, vec!["render.js"]);
        assert_eq!(config.compositor.concurrency, 2);
        assert_eq!(config.compositor.codec, "h264");
        assert_eq!(config.batch.group_size, 2);
    }

    #[test]
    fn test_invalid_version() {
        let result = load_config_from_str(r#"{ "version": "2.0" }"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_zero_group_size_rejected() {
        let result = load_config_from_str(r#"{ "batch": { "group_size": 0 } }"#);
        match result {
            Err(ConfigError::Validation { message }) => {
                assert!(message.contains("group_size"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_program_rejected() {
        let result = load_config_from_str(r#"{ "compositor": { "program": "  " } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_json() {
        let result = load_config_from_str("{ not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_load_config_sets_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("quizcast.json");
        std::fs::write(&path, r#"{ "paths": { "project_root": "." } }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.base_dir.as_deref(), Some(temp_dir.path()));
        assert_eq!(config.project_root(), temp_dir.path().join("."));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/quizcast.json");
        match result {
            Err(ConfigError::ReadFile { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/quizcast.json"));
            }
            other => panic!("Expected ReadFile error, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_discover_prefers_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let explicit = temp_dir.path().join("explicit.json");
        let from_env = temp_dir.path().join("env.json");
        std::fs::write(&explicit, r#"{ "compositor": { "program": "explicit" } }"#).unwrap();
        std::fs::write(&from_env, r#"{ "compositor": { "program": "env" } }"#).unwrap();

        std::env::set_var(CONFIG_ENV_VAR, &from_env);
        let config = discover_config(Some(&explicit)).unwrap();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(config.compositor.program, "explicit");
    }

    #[test]
    #[serial]
    fn test_discover_uses_env_var() {
        let temp_dir = TempDir::new().unwrap();
        let from_env = temp_dir.path().join("env.json");
        std::fs::write(&from_env, r#"{ "compositor": { "program": "env" } }"#).unwrap();

        std::env::set_var(CONFIG_ENV_VAR, &from_env);
        let config = discover_config(None).unwrap();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(config.compositor.program, "env");
    }

    #[test]
    #[serial]
    fn test_discover_env_var_missing_file_is_error() {
        std::env::set_var(CONFIG_ENV_VAR, "/nonexistent/quizcast.json");
        let result = discover_config(None);
        std::env::remove_var(CONFIG_ENV_VAR);

        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
