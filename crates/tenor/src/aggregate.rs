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

use crate::records::{ConversationRecord, RecordFilter, ScoredPair, SummaryStats};
use crate::sentiment::SentimentScorer;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub pairs: Vec<ScoredPair>,
    pub stats: SummaryStats,
    /// Scores that degraded to the neutral fallback after a model fault.
    pub fallbacks: usize,
}

pub struct Aggregator<'a> {
    scorer: &'a SentimentScorer,
}

impl<'a> Aggregator<'a> {
    pub const fn new(scorer: &'a SentimentScorer) -> Self {
        Self { scorer }
    }

    pub fn aggregate(&self, records: &[ConversationRecord]) -> Aggregation {
        let mut pairs = Vec::new();
        let mut total_user = 0.0;
        let mut total_ai = 0.0;
        let mut gaps = Vec::new();
        let mut fallbacks = 0;

        for (idx, record) in RecordFilter::eligible(records) {
            let user = self.scorer.assess(&record.question);
            let ai = self.scorer.assess(&record.answer);
            fallbacks += usize::from(user.is_fallback()) + usize::from(ai.is_fallback());

            total_user += user.value;
            total_ai += ai.value;
            let pair = ScoredPair {
                index: pairs.len() + 1,
                user_sentiment: user.value,
                ai_sentiment: ai.value,
            };
            gaps.push(pair.gap());
            debug!(
                idx,
                pair = pair.index,
                user = pair.user_sentiment,
                ai = pair.ai_sentiment,
                "scored pair"
            );
            pairs.push(pair);
        }

        let ai_responses = pairs.len();
        if ai_responses < records.len() {
            debug!(
                skipped = records.len() - ai_responses,
                "records without a usable answer were skipped"
            );
        }
        let stats = SummaryStats {
            total_questions: records.len(),
            ai_responses,
            avg_user_sentiment: mean_of_total(total_user, ai_responses),
            avg_ai_sentiment: mean_of_total(total_ai, ai_responses),
            avg_sentiment_gap: mean_of_total(gaps.iter().sum(), gaps.len()),
        };
        Aggregation {
            pairs,
            stats,
            fallbacks,
        }
    }
}

fn mean_of_total(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
