use std::fs;
use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::abi::SignatureRegistry;
use crate::domain::hex;
use crate::infrastructure::abi::ContractBinding;

#[derive(Debug, Clone, Deserialize)]
pub struct ContractSpec {
    pub name: String,
    pub address: String,
    /// Path to a JSON ABI or build artifact, relative to the config file
    pub abi: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub contracts: Vec<ContractSpec>,

    /// Directory the config was read from
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl ContractSpec {
    pub fn normalized_address(&self) -> String {
        hex::normalize(&self.address)
    }

    pub fn parsed_address(&self) -> Result<Address> {
        self.normalized_address()
            .parse::<Address>()
            .with_context(|| format!("invalid address for contract `{}`: {}", self.name, self.address))
    }

    /// Read the ABI and bind it to the configured address
    pub fn bind(&self, base_dir: Option<&Path>) -> Result<ContractBinding> {
        let path = resolve(base_dir, &self.abi);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read ABI for `{}` at {}", self.name, path.display()))?;
        let binding = ContractBinding::from_json(self.parsed_address()?, &content)
            .with_context(|| format!("invalid ABI for `{}`", self.name))?;
        Ok(binding)
    }
}

impl Config {
    /// Parse a config file, recording its directory for relative paths
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Bind every configured contract
    pub fn bindings(&self) -> Result<Vec<(String, ContractBinding)>> {
        self.contracts
            .iter()
            .map(|spec| Ok((spec.name.clone(), spec.bind(self.base_dir.as_deref())?)))
            .collect()
    }

    /// Register the signatures of every configured contract
    pub fn registry(&self) -> Result<SignatureRegistry> {
        let mut registry = SignatureRegistry::new();
        for (name, binding) in self.bindings()? {
            registry.insert_descriptor(binding.descriptor());
            debug!(contract = %name, signatures = registry.len(), "registered contract");
        }
        Ok(registry)
    }
}

/// Load the user config, falling back to defaults when absent or unreadable
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Config::default();
    }
    match Config::load_from(&path) {
        Ok(config) => config,
        Err(err) => {
            warn!("ignoring config: {err:#}");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ABIKIT_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("abikit").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("abikit").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "abikit", "abikit")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn resolve(base_dir: Option<&Path>, path: &Path) -> PathBuf {
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}
