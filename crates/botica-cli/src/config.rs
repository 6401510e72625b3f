// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use botica_app::TabKind;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: StorageConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default)]
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UiConfig {
    #[serde(default)]
    pub start_tab: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("BOTICA_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }
        let base = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set BOTICA_CONFIG_PATH to the config file")
        })?;
        let app_dir = base.join(botica_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;
        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned; add `version = {CONFIG_VERSION}` and keep values under [storage] and [ui]",
                    path.display()
                )
            })?;
        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {version} in {}; expected version = {CONFIG_VERSION}",
                path.display()
            );
        }
        let config: Self = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            botica_db::validate_db_path(db_path)
                .with_context(|| format!("invalid [storage].db_path in {}", path.display()))?;
        }
        if let Some(start_tab) = &self.ui.start_tab
            && TabKind::parse(start_tab).is_none()
        {
            bail!(
                "unknown [ui].start_tab {start_tab:?} in {}; use \"register\" or \"search\"",
                path.display()
            );
        }
        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => botica_db::default_db_path(),
        }
    }

    pub fn start_tab(&self) -> TabKind {
        self.ui
            .start_tab
            .as_deref()
            .and_then(TabKind::parse)
            .unwrap_or(TabKind::Register)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# botica config\n# Place this file at: {}\n\nversion = {CONFIG_VERSION}\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/botica/botica.db)\n# db_path = \"/absolute/path/to/botica.db\"\n\n[ui]\n# Tab shown at startup: \"register\" or \"search\"\n# start_tab = \"register\"\n",
            path.display(),
        )
    }
}
