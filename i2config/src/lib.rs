//! # i2kit Configuration Module
//!
//! This module provides configuration management for i2kit, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use i2config::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let exec_path = config.get_exec_path();
//! let install_dir = config.get_install_dir();
//!
//! // Update configuration values
//! config.set_command_timeout_secs(60)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("i2kit.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load i2kit configuration"));
}

const ENV_CONFIG_DIR: &str = "I2KIT_CONFIG";
const ENV_PREFIX: &str = "I2KIT_CONFIG__";

// Default values for configuration
const DEFAULT_EXEC_PATH: &str = "C:/Program Files (x86)/TWC/i2/exec.exe";
const DEFAULT_INSTALL_DIR: &str = "C:/Program Files (x86)/TWC/i2";
const DEFAULT_ASYNC_DISPATCH: bool = true;
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Configuration manager for i2kit
///
/// This structure manages the library configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
///
/// # Examples
///
/// ```no_run
/// use i2config::get_config;
///
/// let config = get_config();
/// println!("exec shim: {}", config.get_exec_path());
/// ```
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

// Implémentation manuelle de Clone
impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.data.lock().unwrap().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(".i2kit").exists() {
            return ".i2kit".to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(".i2kit");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        // Default fallback
        ".i2kit".to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        // Create if doesn't exist
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        // Verify it's a directory
        if !path.is_dir() {
            return Err(anyhow!("Le chemin spécifié n'est pas un répertoire"));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        // Test read permission
        fs::read_dir(path)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `I2KIT_CONFIG` environment variable
    /// 3. `.i2kit` in the current directory
    /// 4. `.i2kit` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for
    /// read/write permissions.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created or validated
    pub fn config_dir(directory: &str) -> String {
        let dir_path = Self::find_config_dir(directory);
        let path = Path::new(&dir_path);

        Self::validate_config_dir(path)
            .expect("Impossible de valider le répertoire de configuration");

        dir_path
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    ///
    /// # Arguments
    ///
    /// * `directory` - The directory containing the config.yaml file, or empty to use defaults
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing the loaded `Config` or an error
    pub fn load_config(directory: &str) -> Result<Self> {
        // Obtenir le répertoire de configuration
        let config_dir = Self::config_dir(directory);
        info!(config_dir=%config_dir, "Using config directory");

        // Construire le chemin du fichier config.yaml
        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        // Charger la configuration par défaut
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        // Essayer de charger le fichier de configuration
        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file=%path, "Loaded config file");
            data
        } else {
            info!(config_file=%path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Merger avec la config par défaut
        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = Self::lower_keys_value(default_value);

        // Appliquer les overrides depuis les variables d'environnement
        Self::apply_env_overrides(&mut config_value);

        // Créer la configuration
        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        // Sauvegarder la configuration
        config.save()?;
        Ok(config)
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["device", "exec_path"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        Self::set_value_internal(&mut data, path, value.clone())?;
        drop(data);
        self.save()?;
        Ok(())
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = path[0].to_lowercase();
            let key_value = Value::String(key.clone());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["device", "exec_path"]`)
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing the YAML value or an error if the path doesn't exist
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();

                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                let key_path = key
                    .trim_start_matches(ENV_PREFIX)
                    .split("__")
                    .collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        let new_key = Value::String(s.to_lowercase());
                        let new_val = Self::lower_keys_value(v);
                        new_map.insert(new_key, new_val);
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Gets the path of the device exec shim
    ///
    /// Returns the configured path, or the stock appliance path if not
    /// configured or invalid.
    pub fn get_exec_path(&self) -> String {
        match self.get_value(&["device", "exec_path"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            Ok(_) => {
                tracing::warn!(
                    "Exec path is not a string or empty, using default {}",
                    DEFAULT_EXEC_PATH
                );
                DEFAULT_EXEC_PATH.to_string()
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to get exec path: {}, using default {}",
                    err,
                    DEFAULT_EXEC_PATH
                );
                DEFAULT_EXEC_PATH.to_string()
            }
        }
    }

    /// Sets the path of the device exec shim
    pub fn set_exec_path(&self, path: String) -> Result<()> {
        self.set_value(&["device", "exec_path"], Value::String(path))
    }

    /// Gets the appliance install directory
    ///
    /// Returns the configured directory, or the stock appliance install
    /// directory if not configured or invalid.
    pub fn get_install_dir(&self) -> String {
        match self.get_value(&["device", "install_dir"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => {
                tracing::warn!(
                    "Install dir missing or invalid, using default {}",
                    DEFAULT_INSTALL_DIR
                );
                DEFAULT_INSTALL_DIR.to_string()
            }
        }
    }

    /// Sets the appliance install directory
    pub fn set_install_dir(&self, dir: String) -> Result<()> {
        self.set_value(&["device", "install_dir"], Value::String(dir))
    }

    /// Whether commands are dispatched with the `-async` shim flag
    pub fn get_async_dispatch(&self) -> bool {
        match self.get_value(&["device", "async_dispatch"]) {
            Ok(Value::Bool(b)) => b,
            _ => DEFAULT_ASYNC_DISPATCH,
        }
    }

    /// Enables or disables the `-async` shim flag
    pub fn set_async_dispatch(&self, enabled: bool) -> Result<()> {
        self.set_value(&["device", "async_dispatch"], Value::Bool(enabled))
    }

    /// Gets the per-command dispatch timeout, in seconds
    pub fn get_command_timeout_secs(&self) -> u64 {
        match self.get_value(&["device", "command_timeout_secs"]) {
            Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap(),
            Ok(Value::Number(n)) if n.is_i64() && n.as_i64().unwrap() > 0 => {
                n.as_i64().unwrap() as u64
            }
            Ok(Value::String(s)) => match s.parse::<u64>() {
                Ok(secs) => secs,
                Err(_) => {
                    tracing::warn!(
                        "Invalid command timeout '{}', using default {}",
                        s,
                        DEFAULT_COMMAND_TIMEOUT_SECS
                    );
                    DEFAULT_COMMAND_TIMEOUT_SECS
                }
            },
            _ => DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }

    /// Sets the per-command dispatch timeout, in seconds
    pub fn set_command_timeout_secs(&self, secs: u64) -> Result<()> {
        let n = Number::from(secs);
        self.set_value(&["device", "command_timeout_secs"], Value::Number(n))
    }
}

/// Returns the global configuration instance
///
/// This function provides access to the singleton configuration instance,
/// which is lazily loaded on first access.
///
/// # Examples
///
/// ```no_run
/// use i2config::get_config;
///
/// let config = get_config();
/// let exec_path = config.get_exec_path();
/// ```
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merges external YAML configuration into default configuration
///
/// This function recursively merges two YAML value trees:
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_dir(tag: &str) -> String {
        let dir = env::temp_dir().join(format!(
            "i2kit-test-{}-{}",
            tag,
            std::process::id()
        ));
        dir.to_string_lossy().to_string()
    }

    #[test]
    fn test_defaults_from_embedded_config() {
        let dir = temp_config_dir("defaults");
        let config = Config::load_config(&dir).expect("load_config should succeed");

        assert_eq!(config.get_exec_path(), DEFAULT_EXEC_PATH);
        assert_eq!(config.get_install_dir(), DEFAULT_INSTALL_DIR);
        assert!(config.get_async_dispatch());
        assert_eq!(config.get_command_timeout_secs(), 30);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_set_and_get_roundtrip() {
        let dir = temp_config_dir("roundtrip");
        let config = Config::load_config(&dir).expect("load_config should succeed");

        config
            .set_exec_path("/opt/i2/exec".to_string())
            .expect("set_exec_path should succeed");
        config
            .set_command_timeout_secs(60)
            .expect("set_command_timeout_secs should succeed");
        config
            .set_async_dispatch(false)
            .expect("set_async_dispatch should succeed");

        assert_eq!(config.get_exec_path(), "/opt/i2/exec");
        assert_eq!(config.get_command_timeout_secs(), 60);
        assert!(!config.get_async_dispatch());

        // Reload from disk: values were persisted
        let reloaded = Config::load_config(&dir).expect("reload should succeed");
        assert_eq!(reloaded.get_exec_path(), "/opt/i2/exec");
        assert_eq!(reloaded.get_command_timeout_secs(), 60);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_merge_yaml_overrides_scalars_and_keeps_defaults() {
        let mut default: Value =
            serde_yaml::from_str("device:\n  exec_path: a\n  async_dispatch: true").unwrap();
        let external: Value = serde_yaml::from_str("device:\n  exec_path: b").unwrap();

        merge_yaml(&mut default, &external);

        let merged = Config {
            config_dir: String::new(),
            path: String::new(),
            data: Mutex::new(Config::lower_keys_value(default)),
        };
        assert_eq!(
            merged.get_value(&["device", "exec_path"]).unwrap(),
            Value::String("b".to_string())
        );
        assert_eq!(
            merged.get_value(&["device", "async_dispatch"]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_convert_env_value() {
        assert_eq!(Config::convert_env_value("42"), Value::Number(42.into()));
        assert_eq!(Config::convert_env_value("true"), Value::Bool(true));
        assert_eq!(
            Config::convert_env_value("plain text"),
            Value::String("plain text".to_string())
        );
    }

    #[test]
    fn test_get_value_missing_path() {
        let dir = temp_config_dir("missing");
        let config = Config::load_config(&dir).expect("load_config should succeed");

        assert!(config.get_value(&["device", "no_such_key"]).is_err());

        let _ = fs::remove_dir_all(&dir);
    }
}
