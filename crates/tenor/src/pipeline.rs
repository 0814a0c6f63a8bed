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

use crate::aggregate::{Aggregation, Aggregator};
use crate::chart::ChartRenderer;
use crate::config::TenorConfig;
use crate::error::TenorResult;
use crate::records::{ConversationRecord, ScoredPair, SummaryStats};
use crate::sentiment::{LexiconModel, SentimentScorer};
use crate::transcript::{transcript_rows, TranscriptRow, TranscriptWriter};
use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Everything one request derives from its records, before any I/O.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub rows: Vec<TranscriptRow>,
    pub series: Vec<ScoredPair>,
    pub stats: SummaryStats,
    pub fallbacks: usize,
}

pub fn process(records: &[ConversationRecord], scorer: &SentimentScorer) -> Analysis {
    let rows = transcript_rows(records);
    let Aggregation {
        pairs,
        stats,
        fallbacks,
    } = Aggregator::new(scorer).aggregate(records);
    Analysis {
        rows,
        series: pairs,
        stats,
        fallbacks,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub stats: SummaryStats,
    pub csv_file: String,
    pub chart_file: Option<String>,
    #[serde(skip)]
    pub csv_path: PathBuf,
    #[serde(skip)]
    pub chart_path: Option<PathBuf>,
}

pub fn csv_file_name(stamp: &str) -> String {
    format!("chat_{stamp}.csv")
}

pub fn chart_file_name(stamp: &str) -> String {
    format!("sentiment_viz_{stamp}.png")
}

pub fn current_stamp() -> String {
    Local::now().format(STAMP_FORMAT).to_string()
}

/// Process-wide state built once at bootstrap and shared by every request.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    results_dir: PathBuf,
    scorer: SentimentScorer,
    renderer: ChartRenderer,
    charts_enabled: bool,
}

impl AnalysisContext {
    pub fn new(results_dir: impl Into<PathBuf>, scorer: SentimentScorer) -> Self {
        Self {
            results_dir: results_dir.into(),
            scorer,
            renderer: ChartRenderer::default(),
            charts_enabled: true,
        }
    }

    pub fn from_config(config: &TenorConfig) -> TenorResult<Self> {
        Self::from_config_in(config, Path::new(""))
    }

    /// Like `from_config`, resolving the default lexicon file against `root`.
    pub fn from_config_in(config: &TenorConfig, root: &Path) -> TenorResult<Self> {
        let model = match config.scoring.lexicon_path_under(root) {
            Some(path) => {
                let model = LexiconModel::from_file(&path)?;
                info!(path = %path.display(), entries = model.len(), "lexicon loaded");
                model
            }
            None => LexiconModel::new(),
        };
        Ok(Self {
            results_dir: config.output.results_dir.clone(),
            scorer: SentimentScorer::with_model(model),
            renderer: ChartRenderer::from_config(&config.chart),
            charts_enabled: config.chart.enabled,
        })
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: ChartRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    #[must_use]
    pub fn with_charts(mut self, enabled: bool) -> Self {
        self.charts_enabled = enabled;
        self
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub const fn scorer(&self) -> &SentimentScorer {
        &self.scorer
    }

    /// Idempotent; called from bootstrap, never from the request path.
    pub fn ensure_output_directory(&self) -> TenorResult<bool> {
        if self.results_dir.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(&self.results_dir)?;
        info!(path = %self.results_dir.display(), "created results folder");
        Ok(true)
    }

    pub fn run(&self, records: &[ConversationRecord]) -> TenorResult<AnalysisReport> {
        self.run_with_stamp(records, &current_stamp())
    }

    /// Transcript first, then scoring, then the chart. Both artifacts share
    /// `stamp` in their file names.
    pub fn run_with_stamp(
        &self,
        records: &[ConversationRecord],
        stamp: &str,
    ) -> TenorResult<AnalysisReport> {
        let analysis = process(records, &self.scorer);

        let csv_file = csv_file_name(stamp);
        let csv_path = self.results_dir.join(&csv_file);
        TranscriptWriter::write_rows(&analysis.rows, &csv_path)?;

        let chart_path = if self.charts_enabled {
            let path = self.results_dir.join(chart_file_name(stamp));
            self.renderer.render(&analysis.series, &path)?
        } else {
            None
        };
        let chart_file = chart_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned());

        if analysis.fallbacks > 0 {
            warn!(fallbacks = analysis.fallbacks, "some messages fell back to a neutral score");
        }
        let stats = analysis.stats;
        info!(
            total = stats.total_questions,
            analysed = stats.ai_responses,
            avg_user = format_args!("{:.3}", stats.avg_user_sentiment),
            avg_ai = format_args!("{:.3}", stats.avg_ai_sentiment),
            avg_gap = format_args!("{:.3}", stats.avg_sentiment_gap),
            csv = %csv_file,
            chart = chart_file.as_deref().unwrap_or("-"),
            "analysis complete"
        );

        Ok(AnalysisReport {
            stats,
            csv_file,
            chart_file,
            csv_path,
            chart_path,
        })
    }
}
