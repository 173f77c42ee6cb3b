use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::mode::{DEFAULT_ABBREVIATED_THRESHOLD, DEFAULT_DEFERRAL_MARKERS};

/// Name of the project-level override file.
pub const PROJECT_CONFIG_FILE: &str = ".gidkit";

/// Status of config file loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLoadStatus {
    /// Config loaded successfully from existing file
    Loaded,
    /// No config file, using defaults
    Missing,
    /// Error occurred during loading, using defaults.
    Error(String),
}

/// Draft validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Template used when `--template` is not given.
    pub default_template: String,
    /// Open decisions still allowed in abbreviated mode.
    pub abbreviated_threshold: usize,
    /// Words that mark a section as explicitly deferred.
    pub deferral_markers: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            default_template: "gid".to_string(),
            abbreviated_threshold: DEFAULT_ABBREVIATED_THRESHOLD,
            deferral_markers: DEFAULT_DEFERRAL_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Interface map settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Directory created inside the scanned folder when no output is given.
    pub output_dir_name: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            output_dir_name: "_interface_maps".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub map: MapConfig,
}

impl Config {
    /// Expand `~` to home directory in a path string
    pub fn expand_tilde(path: &str) -> PathBuf {
        if let Some(stripped) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(stripped);
        }
        PathBuf::from(path)
    }
}

/// Partial validation configuration for project overrides.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialValidationConfig {
    pub default_template: Option<String>,
    pub abbreviated_threshold: Option<usize>,
    pub deferral_markers: Option<Vec<String>>,
}

/// Partial logging configuration for project overrides.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialLoggingConfig {
    pub level: Option<String>,
}

/// Partial map configuration for project overrides.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialMapConfig {
    pub output_dir_name: Option<String>,
}

/// Project-specific configuration where every field is optional.
/// Parsed from `.gidkit` files. Fields that are `None` inherit from the global config.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialConfig {
    pub validation: PartialValidationConfig,
    pub logging: PartialLoggingConfig,
    pub map: PartialMapConfig,
}

/// Merge a global config with a project-level partial config.
/// Project values override global values where present.
pub fn merge_config(global: &Config, project: &PartialConfig) -> Config {
    Config {
        validation: ValidationConfig {
            default_template: project
                .validation
                .default_template
                .clone()
                .unwrap_or_else(|| global.validation.default_template.clone()),
            abbreviated_threshold: project
                .validation
                .abbreviated_threshold
                .unwrap_or(global.validation.abbreviated_threshold),
            deferral_markers: project
                .validation
                .deferral_markers
                .clone()
                .unwrap_or_else(|| global.validation.deferral_markers.clone()),
        },
        logging: LoggingConfig {
            level: project
                .logging
                .level
                .clone()
                .unwrap_or_else(|| global.logging.level.clone()),
        },
        map: MapConfig {
            output_dir_name: project
                .map
                .output_dir_name
                .clone()
                .unwrap_or_else(|| global.map.output_dir_name.clone()),
        },
    }
}

/// Loaded configuration with metadata
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub project_config_path: Option<PathBuf>,
    pub status: ConfigLoadStatus,
    pub project_error: Option<String>,
}

/// Get the platform-appropriate config directory
fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "gidkit", "gidkit").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the full path to the config file
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.gidkit in current working directory).
pub fn get_project_config_path() -> Option<PathBuf> {
    let path = env::current_dir().ok()?.join(PROJECT_CONFIG_FILE);
    if path.exists() { Some(path) } else { None }
}

/// Load a project config (.gidkit) from the given path.
fn load_project_config(path: &Path) -> Result<PartialConfig, String> {
    let contents = fs::read_to_string(path).map_err(|e| {
        warn!(path = ?path, error = %e, "project_config_read_failed");
        format!("Failed to read {}: {}", PROJECT_CONFIG_FILE, e)
    })?;

    toml::from_str::<PartialConfig>(&contents).map_err(|e| {
        warn!(path = ?path, error = %e, "project_config_parse_failed");
        format!("Invalid {}: {}", PROJECT_CONFIG_FILE, e)
    })
}

/// Load the global config file. A missing file is not an error.
fn load_global_config(config_path: &Path) -> (Config, ConfigLoadStatus) {
    match fs::read_to_string(config_path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(config) => {
                info!(path = ?config_path, "config_loaded");
                (config, ConfigLoadStatus::Loaded)
            }
            Err(e) => {
                warn!(path = ?config_path, error = %e, "config_parse_failed");
                (
                    Config::default(),
                    ConfigLoadStatus::Error(format!("Malformed TOML: {}", e)),
                )
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = ?config_path, "config_missing");
            (Config::default(), ConfigLoadStatus::Missing)
        }
        Err(e) => {
            warn!(path = ?config_path, error = %e, "config_read_failed");
            (
                Config::default(),
                ConfigLoadStatus::Error(format!("Read error: {}", e)),
            )
        }
    }
}

/// Load configuration from file, environment, and defaults
pub fn load_config() -> LoadedConfig {
    let config_path = get_config_path();
    if config_path.is_none() {
        warn!("config_dir_unavailable");
    }
    load_config_from(
        config_path.as_deref(),
        get_project_config_path().as_deref(),
        |key| env::var(key).ok(),
    )
}

/// Load configuration from explicit paths, with environment lookups supplied by the caller.
pub fn load_config_from(
    config_path: Option<&Path>,
    project_config_path: Option<&Path>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> LoadedConfig {
    let (mut config, status) = match config_path {
        Some(path) => load_global_config(path),
        None => (
            Config::default(),
            ConfigLoadStatus::Error("Could not determine config directory".to_string()),
        ),
    };

    let mut project_error = None;
    if let Some(project_path) = project_config_path {
        match load_project_config(project_path) {
            Ok(partial) => {
                config = merge_config(&config, &partial);
                info!(path = ?project_path, "project_config_loaded");
            }
            Err(e) => project_error = Some(e),
        }
    }

    LoadedConfig {
        config: apply_env_overrides(config, env_lookup),
        config_path: config_path.map(Path::to_path_buf),
        project_config_path: project_config_path.map(Path::to_path_buf),
        status,
        project_error,
    }
}

/// Apply environment variable overrides to config
fn apply_env_overrides(mut config: Config, env_lookup: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(template) = env_lookup("GIDKIT_TEMPLATE") {
        debug!("Overriding validation.default_template from GIDKIT_TEMPLATE");
        config.validation.default_template = template;
    }

    if let Some(threshold) = env_lookup("GIDKIT_ABBREVIATED_THRESHOLD") {
        match threshold.trim().parse() {
            Ok(value) => {
                debug!("Overriding validation.abbreviated_threshold from GIDKIT_ABBREVIATED_THRESHOLD");
                config.validation.abbreviated_threshold = value;
            }
            Err(e) => {
                warn!(value = %threshold, error = %e, "env_threshold_invalid");
            }
        }
    }

    if let Some(level) = env_lookup("GIDKIT_LOG") {
        debug!("Overriding logging.level from GIDKIT_LOG");
        config.logging.level = level;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.validation.default_template, "gid");
        assert_eq!(config.validation.abbreviated_threshold, 3);
        assert!(
            config
                .validation
                .deferral_markers
                .contains(&"TBD".to_string())
        );
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.map.output_dir_name, "_interface_maps");
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = Config::expand_tilde("~/.config/test");
        assert!(!expanded.to_string_lossy().starts_with('~'));

        let no_tilde = Config::expand_tilde("/absolute/path");
        assert_eq!(no_tilde, PathBuf::from("/absolute/path"));

        let relative = Config::expand_tilde("./relative/path");
        assert_eq!(relative, PathBuf::from("./relative/path"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
[validation]
default_template = "project-snapshot"
abbreviated_threshold = 5
deferral_markers = ["later", "pending"]

[logging]
level = "debug"

[map]
output_dir_name = "maps"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.validation.default_template, "project-snapshot");
        assert_eq!(config.validation.abbreviated_threshold, 5);
        assert_eq!(config.validation.deferral_markers, vec!["later", "pending"]);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.map.output_dir_name, "maps");
    }

    #[test]
    fn test_config_partial_deserialization() {
        let toml_str = r#"
[validation]
abbreviated_threshold = 2
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.validation.abbreviated_threshold, 2);
        assert_eq!(config.validation.default_template, "gid");
        assert!(!config.validation.deferral_markers.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let toml_str = r#"
[validation]
default_template = "gid-adversarial"
unknown_key = "should be ignored"

[unknown_section]
foo = "bar"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.validation.default_template, "gid-adversarial");
    }

    #[test]
    fn test_partial_config_empty() {
        let partial: PartialConfig = toml::from_str("").unwrap();
        assert!(partial.validation.default_template.is_none());
        assert!(partial.validation.abbreviated_threshold.is_none());
        assert!(partial.validation.deferral_markers.is_none());
        assert!(partial.logging.level.is_none());
        assert!(partial.map.output_dir_name.is_none());
    }

    #[test]
    fn test_partial_config_comment_only() {
        let partial: PartialConfig = toml::from_str("# gidkit project overrides\n").unwrap();
        assert!(partial.validation.default_template.is_none());
    }

    #[test]
    fn test_merge_config_no_overrides() {
        let global = Config::default();
        let merged = merge_config(&global, &PartialConfig::default());

        assert_eq!(
            merged.validation.default_template,
            global.validation.default_template
        );
        assert_eq!(
            merged.validation.abbreviated_threshold,
            global.validation.abbreviated_threshold
        );
        assert_eq!(
            merged.validation.deferral_markers,
            global.validation.deferral_markers
        );
        assert_eq!(merged.logging.level, global.logging.level);
        assert_eq!(merged.map.output_dir_name, global.map.output_dir_name);
    }

    #[test]
    fn test_merge_config_partial_overrides() {
        let global = Config::default();
        let partial: PartialConfig = toml::from_str(
            r#"
[validation]
default_template = "project-snapshot"

[map]
output_dir_name = "docs/maps"
"#,
        )
        .unwrap();
        let merged = merge_config(&global, &partial);

        assert_eq!(merged.validation.default_template, "project-snapshot");
        assert_eq!(merged.map.output_dir_name, "docs/maps");
        assert_eq!(
            merged.validation.abbreviated_threshold,
            global.validation.abbreviated_threshold
        );
        assert_eq!(merged.logging.level, global.logging.level);
    }

    #[test]
    fn test_load_missing_global_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = load_config_from(Some(dir.path().join("config.toml").as_path()), None, no_env);
        assert_eq!(loaded.status, ConfigLoadStatus::Missing);
        assert_eq!(loaded.config.validation.default_template, "gid");
        // Nothing is created on first run.
        assert!(!dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_load_malformed_global_config_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[validation\nbroken").unwrap();
        let loaded = load_config_from(Some(path.as_path()), None, no_env);
        assert!(matches!(loaded.status, ConfigLoadStatus::Error(_)));
        assert_eq!(loaded.config.validation.abbreviated_threshold, 3);
    }

    #[test]
    fn test_project_config_overrides_global() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("config.toml");
        fs::write(
            &global,
            "[validation]\nabbreviated_threshold = 4\n[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();
        let project = dir.path().join(PROJECT_CONFIG_FILE);
        fs::write(&project, "[validation]\nabbreviated_threshold = 1\n").unwrap();

        let loaded = load_config_from(Some(global.as_path()), Some(project.as_path()), no_env);
        assert_eq!(loaded.status, ConfigLoadStatus::Loaded);
        assert_eq!(loaded.config.validation.abbreviated_threshold, 1);
        assert_eq!(loaded.config.logging.level, "warn");
        assert!(loaded.project_error.is_none());
    }

    #[test]
    fn test_invalid_project_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join(PROJECT_CONFIG_FILE);
        fs::write(&project, "validation = 3").unwrap();

        let loaded = load_config_from(None, Some(project.as_path()), no_env);
        assert!(loaded.project_error.is_some());
        assert_eq!(loaded.config.validation.default_template, "gid");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GIDKIT_TEMPLATE", "gid-adversarial"),
            ("GIDKIT_ABBREVIATED_THRESHOLD", "6"),
            ("GIDKIT_LOG", "trace"),
        ]);
        let config = apply_env_overrides(Config::default(), |key| {
            env.get(key).map(|v| v.to_string())
        });
        assert_eq!(config.validation.default_template, "gid-adversarial");
        assert_eq!(config.validation.abbreviated_threshold, 6);
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_invalid_env_threshold_ignored() {
        let config = apply_env_overrides(Config::default(), |key| {
            (key == "GIDKIT_ABBREVIATED_THRESHOLD").then(|| "many".to_string())
        });
        assert_eq!(config.validation.abbreviated_threshold, 3);
    }
}
