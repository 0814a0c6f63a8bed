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

use crate::cli::{Cli, Command};
use crate::http::AnalyzeResponse;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tenor::{AnalysisContext, AnalyzeRequest, TenorConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// File, then environment, then command-line flags.
pub fn resolve_config(cli: &Cli) -> Result<TenorConfig> {
    let mut config = match &cli.config {
        Some(path) => TenorConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TenorConfig::load_or_default(&TenorConfig::default_config_path())?,
    };
    config.apply_env_overrides()?;
    apply_cli_overrides(&mut config, cli.cmd.as_ref());
    Ok(config)
}

pub fn apply_cli_overrides(config: &mut TenorConfig, cmd: Option<&Command>) {
    match cmd {
        Some(Command::Serve { addr, results_dir }) => {
            if let Some(addr) = addr {
                config.server.addr.clone_from(addr);
            }
            if let Some(dir) = results_dir {
                config.output.results_dir.clone_from(dir);
            }
        }
        Some(Command::Analyze { results_dir, .. }) => {
            if let Some(dir) = results_dir {
                config.output.results_dir.clone_from(dir);
            }
        }
        None => {}
    }
}

/// Builds the shared context and makes sure the results folder exists.
pub fn prepare_context(config: &TenorConfig) -> Result<Arc<AnalysisContext>> {
    let ctx = AnalysisContext::from_config(config).context("building analysis context")?;
    ctx.ensure_output_directory().with_context(|| {
        format!("creating results folder {}", ctx.results_dir().display())
    })?;
    info!(
        results = %ctx.results_dir().display(),
        model = ctx.scorer().model_name(),
        charts = config.chart.enabled,
        "analysis context ready"
    );
    Ok(Arc::new(ctx))
}

pub fn run_offline(ctx: &AnalysisContext, input: &Path) -> Result<AnalyzeResponse> {
    let body = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let request = AnalyzeRequest::from_slice(&body)
        .with_context(|| format!("parsing {}", input.display()))?;
    let report = ctx.run(&request.results)?;
    Ok(AnalyzeResponse::from_report(&report))
}
