use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rootstrap_core::Arch;
use rootstrap_installer::InstallPolicy;
use rootstrap_registry::repository_urls;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_APK_MIN_VERSION: &str = "2.14.0-r0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub work: PathBuf,
    pub mirrors: Vec<String>,
    pub local_repository: bool,
    pub offline: bool,
    pub build_pkgs_on_install: bool,
    pub device_arch: Option<Arch>,
    pub aports: Option<PathBuf>,
    pub build_command: Option<Vec<String>>,
    pub sudo: String,
    pub apk_min_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work: default_work_dir(),
            mirrors: Vec::new(),
            local_repository: true,
            offline: false,
            build_pkgs_on_install: true,
            device_arch: None,
            aports: None,
            build_command: None,
            sudo: "sudo".to_string(),
            apk_min_version: DEFAULT_APK_MIN_VERSION.to_string(),
        }
    }
}

impl Config {
    pub fn sudo_program(&self) -> Option<String> {
        let sudo = self.sudo.trim();
        (!sudo.is_empty()).then(|| sudo.to_string())
    }

    pub fn device_arch(&self) -> Result<Arch> {
        match &self.device_arch {
            Some(arch) => Ok(arch.clone()),
            None => Arch::native(),
        }
    }

    pub fn repository_urls(&self) -> Vec<String> {
        repository_urls(&self.mirrors, self.local_repository)
    }

    pub fn aports_roots(&self) -> Vec<PathBuf> {
        self.aports.iter().cloned().collect()
    }

    pub fn install_policy(&self, offline_flag: bool) -> Result<InstallPolicy> {
        Ok(InstallPolicy {
            offline: self.offline || offline_flag,
            build_disabled: !self.build_pkgs_on_install,
            max_forced_rebuilds: 1,
            apk_min_version: self.apk_min_version.clone(),
            device_arch: self.device_arch()?,
            repository_urls: self.repository_urls(),
        })
    }
}

pub(crate) fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rootstrap")
        .join("config.toml")
}

fn default_work_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rootstrap")
}

pub(crate) fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => default_config_path(),
    };

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
            debug!("config file {} not found, using defaults", path.display());
            return Ok(Config::default());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file: {}", path.display()));
        }
    };
    parse_config(&content).with_context(|| format!("invalid config file: {}", path.display()))
}

pub(crate) fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}
