use crate::ast::Attributes;
use crate::{parse, Config, Schema};
use linked_hash_map::LinkedHashMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid toml in {path}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unsupported configuration format for {0}, expected .yml, .yaml or .toml")]
    UnsupportedFormat(PathBuf),
}

/// Declarative configuration file. Schemas loaded this way have no transform hooks or checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub variables: Attributes,
    pub tags: HashMap<String, Schema>,
    pub nodes: HashMap<String, Schema>,
    /// Partial name to file path, relative to the configuration file.
    pub partials: LinkedHashMap<String, PathBuf>,
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

impl ProjectConfig {
    /// Reads a YAML or TOML configuration, chosen by file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|e| e.to_str());

        match extension {
            Some("yml" | "yaml") => {
                serde_yaml::from_str(&read(path)?).map_err(|source| ConfigError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })
            }
            Some("toml") => toml::from_str(&read(path)?).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            }),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Builds an engine config, parsing every partial file relative to `base_dir`.
    pub fn into_config(self, base_dir: &Path) -> Result<Config, ConfigError> {
        let mut config = Config {
            variables: self.variables,
            tags: self.tags,
            nodes: self.nodes,
            ..Config::default()
        };

        for (name, file) in self.partials {
            let path = base_dir.join(file);
            debug!("loading partial {} from {}", name, path.display());
            config.partials.insert(name, parse(&read(&path)?));
        }
        Ok(config)
    }
}

/// Loads a configuration file and resolves its partials next to it.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    ProjectConfig::load(path)?.into_config(base_dir)
}
