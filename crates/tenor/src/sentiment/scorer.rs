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

use crate::sentiment::{LexiconModel, SentimentModel};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Texts shorter than this after trimming are too small to carry sentiment.
pub const MIN_SCORABLE_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum ScoreOutcome {
    Model,
    ShortText,
    Fallback(FallbackReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackReason(pub String);

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentScore {
    pub value: f64,
    pub outcome: ScoreOutcome,
}

impl SentimentScore {
    const fn neutral(outcome: ScoreOutcome) -> Self {
        Self {
            value: 0.0,
            outcome,
        }
    }

    pub const fn is_fallback(&self) -> bool {
        matches!(self.outcome, ScoreOutcome::Fallback(_))
    }
}

#[derive(Clone)]
pub struct SentimentScorer {
    model: Arc<dyn SentimentModel>,
}

impl SentimentScorer {
    pub fn new(model: Arc<dyn SentimentModel>) -> Self {
        Self { model }
    }

    pub fn with_model<M: SentimentModel + 'static>(model: M) -> Self {
        Self::new(Arc::new(model))
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn score(&self, text: &str) -> f64 {
        self.assess(text).value
    }

    /// Never fails: short input and model faults both come back as a neutral
    /// score, tagged so callers can tell them apart from a real 0.0.
    pub fn assess(&self, text: &str) -> SentimentScore {
        if text.trim().chars().count() < MIN_SCORABLE_CHARS {
            return SentimentScore::neutral(ScoreOutcome::ShortText);
        }
        match self.model.polarity(text) {
            Ok(value) if value.is_finite() => SentimentScore {
                value: value.clamp(-1.0, 1.0),
                outcome: ScoreOutcome::Model,
            },
            Ok(value) => {
                warn!(model = self.model.name(), %value, "sentiment model returned a non-finite score");
                SentimentScore::neutral(ScoreOutcome::Fallback(FallbackReason(format!(
                    "non-finite score {value}"
                ))))
            }
            Err(e) => {
                warn!(model = self.model.name(), error = %e, "sentiment analysis error");
                SentimentScore::neutral(ScoreOutcome::Fallback(FallbackReason(e.to_string())))
            }
        }
    }
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::with_model(LexiconModel::new())
    }
}

impl fmt::Debug for SentimentScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentScorer")
            .field("model", &self.model.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingModel {
        calls: AtomicUsize,
        value: f64,
    }

    impl SentimentModel for CountingModel {
        fn polarity(&self, _text: &str) -> Result<f64, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value)
        }
    }

    struct BrokenModel;

    impl SentimentModel for BrokenModel {
        fn polarity(&self, _text: &str) -> Result<f64, ModelError> {
            Err(ModelError::Unavailable("lexicon not loaded".into()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn short_text_skips_the_model() {
        let model = Arc::new(CountingModel {
            calls: AtomicUsize::new(0),
            value: 0.5,
        });
        let scorer = SentimentScorer::new(model.clone());
        for text in ["", "  ", "ok", "\t\nhi\n", " é "] {
            let score = scorer.assess(text);
            assert_eq!(score.value, 0.0, "input {text:?}");
            assert_eq!(score.outcome, ScoreOutcome::ShortText);
        }
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);

        assert_eq!(scorer.score("yes"), 0.5);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn three_trimmed_chars_reach_the_model() {
        let model = Arc::new(CountingModel {
            calls: AtomicUsize::new(0),
            value: 0.5,
        });
        let scorer = SentimentScorer::new(model.clone());
        // Inner whitespace counts toward the length.
        let score = scorer.assess(" a b ");
        assert_eq!(score.value, 0.5);
        assert_eq!(score.outcome, ScoreOutcome::Model);
        assert_eq!(scorer.score("héé"), 0.5);
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn model_failure_degrades_to_tagged_neutral() {
        let scorer = SentimentScorer::with_model(BrokenModel);
        let score = scorer.assess("This will not be scored");
        assert_eq!(score.value, 0.0);
        assert!(score.is_fallback());
        assert_eq!(scorer.score("This will not be scored"), 0.0);
    }

    #[test]
    fn non_finite_and_out_of_range_values_are_contained() {
        let nan = SentimentScorer::with_model(CountingModel {
            calls: AtomicUsize::new(0),
            value: f64::NAN,
        });
        assert!(nan.assess("anything").is_fallback());

        let loud = SentimentScorer::with_model(CountingModel {
            calls: AtomicUsize::new(0),
            value: 3.0,
        });
        assert_eq!(loud.score("anything"), 1.0);
    }

    #[test]
    fn genuine_neutral_is_distinguishable_from_fallback() {
        let scorer = SentimentScorer::default();
        let score = scorer.assess("The meeting is on Tuesday");
        assert_eq!(score.value, 0.0);
        assert_eq!(score.outcome, ScoreOutcome::Model);
        assert_eq!(scorer.model_name(), "lexicon");
    }
}
