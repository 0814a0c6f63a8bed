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

pub mod lexicon;
pub mod scorer;

pub use lexicon::LexiconModel;
pub use scorer::{FallbackReason, ScoreOutcome, SentimentScore, SentimentScorer};

use crate::error::ModelError;

/// Black-box text polarity. Implementations return a compound score; the
/// scorer clamps it into [-1, 1] and owns the fail-soft policy.
pub trait SentimentModel: Send + Sync {
    fn polarity(&self, text: &str) -> Result<f64, ModelError>;

    fn name(&self) -> &str {
        "custom"
    }
}
