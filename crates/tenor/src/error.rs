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

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TenorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Transcript error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Lexicon error: {0}")]
    Lexicon(#[from] LexiconError),
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("sentiment model produced a non-finite score for input of {len} bytes")]
    NonFinite { len: usize },
    #[error("sentiment model unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to render chart to '{path}': {message}")]
    Render { path: PathBuf, message: String },
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    ConfigFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML configuration: {source}")]
    TomlParseError {
        #[from]
        source: toml::de::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Failed to read lexicon file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed lexicon entry on line {line}: {content}")]
    MalformedEntry { line: usize, content: String },
}

pub type TenorResult<T> = Result<T, TenorError>;
