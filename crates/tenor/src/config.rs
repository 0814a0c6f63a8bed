// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ENV_HTTP_ADDR: &str = "TENOR_HTTP_ADDR";
pub const ENV_RESULTS_DIR: &str = "TENOR_RESULTS_DIR";
pub const ENV_BODY_LIMIT: &str = "TENOR_BODY_LIMIT_BYTES";
/// Picked up automatically when no `lexicon_path` is configured.
pub const DEFAULT_LEXICON_FILE: &str = "config/vader_lexicon.txt";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TenorConfig {
    #[serde(default)]
    pub server: ServerConfigSection,
    #[serde(default)]
    pub output: OutputConfigSection,
    #[serde(default)]
    pub chart: ChartConfigSection,
    #[serde(default)]
    pub scoring: ScoringConfigSection,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfigSection {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutputConfigSection {
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartConfigSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoringConfigSection {
    /// Extra lexicon in the tab-separated `token<TAB>valence` format, merged
    /// over the built-in table.
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
}

impl ScoringConfigSection {
    /// The configured lexicon, else `DEFAULT_LEXICON_FILE` under `root` if it exists.
    pub fn lexicon_path_under(&self, root: &Path) -> Option<PathBuf> {
        self.lexicon_path.clone().or_else(|| {
            let candidate = root.join(DEFAULT_LEXICON_FILE);
            candidate.is_file().then_some(candidate)
        })
    }
}

fn default_addr() -> String {
    "127.0.0.1:5001".to_string()
}

const fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("test_results")
}

const fn default_true() -> bool {
    true
}

const fn default_width() -> u32 {
    1400
}

const fn default_height() -> u32 {
    700
}

impl Default for ServerConfigSection {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for OutputConfigSection {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
        }
    }
}

impl Default for ChartConfigSection {
    fn default() -> Self {
        Self {
            enabled: true,
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for TenorConfig {
    fn default() -> Self {
        Self {
            server: ServerConfigSection::default(),
            output: OutputConfigSection::default(),
            chart: ChartConfigSection::default(),
            scoring: ScoringConfigSection::default(),
        }
    }
}

impl TenorConfig {
    pub fn load_from_file(config_path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(config_path).map_err(|source| ConfigError::ConfigFileError {
                path: config_path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config/tenor.toml")
    }

    /// A missing file yields the defaults; a file that exists but does not
    /// parse is still an error.
    pub fn load_or_default(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            debug!(path = %config_path.display(), "loading configuration");
            Self::load_from_file(config_path)
        } else {
            warn!(path = %config_path.display(), "configuration file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_HTTP_ADDR) {
            self.server.addr = addr;
        }
        if let Some(dir) = lookup(ENV_RESULTS_DIR) {
            self.output.results_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_BODY_LIMIT) {
            self.server.body_limit_bytes =
                raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_BODY_LIMIT.to_string(),
                    value: raw.clone(),
                })?;
        }
        Ok(())
    }
}
