//! # Configuration de pmosoap
//!
//! Chargement d'une configuration YAML :
//! - configuration par défaut intégrée au binaire
//! - fusion avec un fichier `config.yaml` externe optionnel
//! - surcharges par variables d'environnement `PMOSOAP_CONFIG__A__B`
//! - accès global via [`get_config`]
//!
//! ```no_run
//! use pmosoap::config::get_config;
//!
//! let config = get_config();
//! let version = config.get_message_version();
//! println!("Default message version: {}", version);
//! ```
//!
//! Le cœur ne réécrit jamais la configuration sur disque.

use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{Result, anyhow};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Value};
use tracing::{info, warn};

use crate::version::MessageVersion;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmosoap.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load pmosoap configuration"));
}

const ENV_CONFIG_DIR: &str = "PMOSOAP_CONFIG";
const ENV_PREFIX: &str = "PMOSOAP_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmosoap";

const DEFAULT_WRITE_ENCODING: &str = "utf-8";
const DEFAULT_SERIALIZER_KIND: &str = "data_contract";
const DEFAULT_INDENT_SIZE: usize = 2;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

/// Macro to generate a string getter with default
macro_rules! impl_string_config {
    ($getter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.is_empty() => s,
                _ => $default.to_string(),
            }
        }
    };
}

/// Configuration manager for pmosoap
#[derive(Debug)]
pub struct Config {
    path: Option<PathBuf>,
    data: Mutex<Value>,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> Option<PathBuf> {
        // 1. Try provided directory
        if !directory.is_empty() {
            return Some(PathBuf::from(directory));
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return Some(PathBuf::from(env_path));
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return Some(PathBuf::from(CONFIG_DIR_NAME));
        }

        // 4. Try home directory
        home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .filter(|path| path.exists())
    }

    /// Loads the configuration
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PMOSOAP_CONFIG` environment variable
    /// 3. `.pmosoap` in the current directory
    /// 4. `.pmosoap` in the user's home directory
    ///
    /// A missing `config.yaml` is not an error: the embedded defaults apply.
    pub fn load_config(directory: &str) -> Result<Self> {
        let path = Self::find_config_dir(directory).map(|dir| dir.join("config.yaml"));

        let external = match &path {
            Some(p) => match fs::read_to_string(p) {
                Ok(data) => {
                    info!(config_file = %p.display(), "Loaded config file");
                    Some(data)
                }
                Err(_) => {
                    info!(config_file = %p.display(), "Config file not found, using default embedded config");
                    None
                }
            },
            None => None,
        };

        let mut config = Self::from_yaml_str(external.as_deref().unwrap_or(""))?;
        config.path = path;
        Ok(config)
    }

    /// Builds a configuration from YAML merged over the embedded defaults,
    /// then applies environment overrides
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        if !yaml.trim().is_empty() {
            let external: Value = serde_yaml::from_str(yaml)?;
            merge_yaml(&mut value, &lower_keys_value(external));
        }
        let mut value = lower_keys_value(value);
        Self::apply_env_overrides(&mut value);

        Ok(Self {
            path: None,
            data: Mutex::new(value),
        })
    }

    /// Path of the external config file, if one was looked up
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Gets a configuration value at the specified path
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["encoding", "message_version"]`)
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self
            .data
            .lock()
            .map_err(|_| anyhow!("Configuration lock poisoned"))?;
        get_value_internal(&data, path)
    }

    /// Sets a configuration value in memory
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| anyhow!("Configuration lock poisoned"))?;
        set_value_internal(&mut data, path, value)
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = convert_env_value(&value);
                if let Err(err) = set_value_internal(config, &key_path, yaml_value) {
                    warn!(env_var = %key, error = %err, "Ignoring environment override");
                }
            }
        }
    }

    /// Version de message par défaut des encodeurs texte
    pub fn get_message_version(&self) -> MessageVersion {
        match self.get_value(&["encoding", "message_version"]) {
            Ok(Value::String(s)) => s.parse().unwrap_or_else(|err| {
                warn!("Invalid message version '{}': {}, using default", s, err);
                MessageVersion::DEFAULT
            }),
            _ => MessageVersion::DEFAULT,
        }
    }

    impl_string_config!(
        get_write_encoding,
        &["encoding", "write_encoding"],
        DEFAULT_WRITE_ENCODING
    );
    impl_string_config!(
        get_serializer_kind,
        &["serializer", "kind"],
        DEFAULT_SERIALIZER_KIND
    );
    impl_string_config!(
        get_serializer_namespace,
        &["serializer", "namespace"],
        crate::message::SERIALIZATION_NAMESPACE
    );
    impl_string_config!(
        get_log_min_level,
        &["log", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );

    pub fn get_writer_indent(&self) -> bool {
        match self.get_value(&["writer", "indent"]) {
            Ok(Value::Bool(b)) => b,
            _ => false,
        }
    }

    pub fn get_writer_indent_size(&self) -> usize {
        match self.get_value(&["writer", "indent_size"]) {
            Ok(Value::Number(n)) => n
                .as_u64()
                .map(|n| n as usize)
                .unwrap_or(DEFAULT_INDENT_SIZE),
            _ => DEFAULT_INDENT_SIZE,
        }
    }
}

/// Returns the global configuration instance
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
    let mut current = data;
    for (i, key) in path.iter().enumerate() {
        if let Value::Mapping(map) = current {
            let key = key.to_lowercase();
            match map.get(&Value::String(key)) {
                Some(next) => current = next,
                None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
            }
        } else {
            return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
        }
    }
    Ok(current.clone())
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key_value = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key_value, value);
        } else {
            let entry = map
                .entry(key_value)
                .or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

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
