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

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod sentiment;
pub mod transcript;

pub use aggregate::{Aggregation, Aggregator};
pub use chart::{ChartLayout, ChartRenderer};
pub use config::TenorConfig;
pub use error::{ChartError, ConfigError, LexiconError, ModelError, TenorError, TenorResult};
pub use pipeline::{process, Analysis, AnalysisContext, AnalysisReport};
pub use records::{AnalyzeRequest, ConversationRecord, RecordFilter, ScoredPair, SummaryStats};
pub use sentiment::{LexiconModel, ScoreOutcome, SentimentModel, SentimentScore, SentimentScorer};
pub use transcript::{read_transcript, Role, TranscriptRow, TranscriptWriter};
