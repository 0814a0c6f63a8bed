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

use serde::{Deserialize, Serialize};

/// Answer substrings that mark a capture as failed. Matched case-sensitively.
pub const ERROR_MARKER: &str = "ERROR";
pub const NO_RESPONSE_MARKER: &str = "No response";

/// One captured exchange. Missing keys read as empty strings and unknown keys
/// (`responseLength`, `questionNumber`, ...) are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationRecord {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl ConversationRecord {
    pub fn new(
        timestamp: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub results: Vec<ConversationRecord>,
}

impl AnalyzeRequest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ScoredPair {
    /// 1-based position among eligible records only.
    pub index: usize,
    pub user_sentiment: f64,
    pub ai_sentiment: f64,
}

impl ScoredPair {
    pub fn gap(&self) -> f64 {
        (self.user_sentiment - self.ai_sentiment).abs()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryStats {
    pub total_questions: usize,
    pub ai_responses: usize,
    pub avg_user_sentiment: f64,
    pub avg_ai_sentiment: f64,
    pub avg_sentiment_gap: f64,
}

impl SummaryStats {
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            avg_user_sentiment: round3(self.avg_user_sentiment),
            avg_ai_sentiment: round3(self.avg_ai_sentiment),
            avg_sentiment_gap: round3(self.avg_sentiment_gap),
            ..*self
        }
    }
}

/// Rounds the decimal expansion of `value`, ties to even, so `0.0625` becomes
/// `0.062` and `1.0005` (stored just below the tie) becomes `1.0`.
pub fn round3(value: f64) -> f64 {
    format!("{value:.3}").parse().unwrap_or(value)
}

pub struct RecordFilter;

impl RecordFilter {
    /// Only the answer decides eligibility; the question is never inspected.
    pub fn is_eligible(record: &ConversationRecord) -> bool {
        let answer = record.answer.as_str();
        !answer.is_empty() && !answer.contains(ERROR_MARKER) && !answer.contains(NO_RESPONSE_MARKER)
    }

    /// Eligible records paired with their 1-based position in the full batch.
    pub fn eligible<'a>(
        records: &'a [ConversationRecord],
    ) -> impl Iterator<Item = (usize, &'a ConversationRecord)> + 'a {
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| Self::is_eligible(r))
            .map(|(i, r)| (i + 1, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(text: &str) -> ConversationRecord {
        ConversationRecord::new("2025-01-01T00:00:00Z", "How are you?", text)
    }

    #[test]
    fn eligibility_follows_answer_markers() {
        assert!(RecordFilter::is_eligible(&answer("Fine, thanks.")));
        assert!(!RecordFilter::is_eligible(&answer("")));
        assert!(!RecordFilter::is_eligible(&answer("ERROR: timeout")));
        assert!(!RecordFilter::is_eligible(&answer("an ERROR happened")));
        assert!(!RecordFilter::is_eligible(&answer("No response captured")));
    }

    #[test]
    fn eligible_keeps_batch_positions() {
        let records = vec![
            answer("ERROR: timeout"),
            answer("Fine, thanks."),
            answer(""),
            answer("Sure thing"),
        ];
        let positions: Vec<usize> = RecordFilter::eligible(&records).map(|(idx, _)| idx).collect();
        assert_eq!(positions, vec![2, 4]);
        assert!(RecordFilter::eligible(&[]).next().is_none());
    }

    #[test]
    fn markers_are_case_sensitive() {
        assert!(RecordFilter::is_eligible(&answer("error: timeout")));
        assert!(RecordFilter::is_eligible(&answer("no response yet")));
        assert!(RecordFilter::is_eligible(&answer("Error")));
    }

    #[test]
    fn whitespace_answer_is_still_eligible() {
        assert!(RecordFilter::is_eligible(&answer("   ")));
    }

    #[test]
    fn question_never_excludes() {
        let record = ConversationRecord::new("", "ERROR No response", "Sure thing");
        assert!(RecordFilter::is_eligible(&record));
        let empty_question = ConversationRecord::new("", "", "Sure thing");
        assert!(RecordFilter::is_eligible(&empty_question));
    }

    #[test]
    fn missing_and_unknown_keys_are_tolerated() {
        let payload = r#"{
            "results": [
                {"question": "hi there", "responseLength": 12, "questionNumber": 1},
                {"timestamp": "t", "question": "q", "answer": "a"}
            ],
            "timestamp": "2025-01-01T00:00:00Z",
            "total_questions": 2,
            "save_only_csv": true
        }"#;
        let request: AnalyzeRequest = serde_json::from_str(payload).unwrap();
        assert_eq!(request.results.len(), 2);
        assert_eq!(request.results[0].answer, "");
        assert_eq!(request.results[0].timestamp, "");
        assert_eq!(request.results[1], ConversationRecord::new("t", "q", "a"));

        let empty: AnalyzeRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.results.is_empty());
    }

    #[test]
    fn round3_follows_the_decimal_expansion() {
        assert_eq!(round3(0.0625), 0.062);
        assert_eq!(round3(-0.0625), -0.062);
        assert_eq!(round3(0.1875), 0.188);
        assert_eq!(round3(1.0005), 1.0);
        assert_eq!(round3(-0.476_749), -0.477);
        assert_eq!(round3(0.0), 0.0);
    }

    #[test]
    fn rounding_happens_only_on_request() {
        let stats = SummaryStats {
            total_questions: 3,
            ai_responses: 2,
            avg_user_sentiment: 0.123_456,
            avg_ai_sentiment: -0.987_654,
            avg_sentiment_gap: 1.111_149,
        };
        let rounded = stats.rounded();
        assert_eq!(rounded.avg_user_sentiment, 0.123);
        assert_eq!(rounded.avg_ai_sentiment, -0.988);
        assert_eq!(rounded.avg_sentiment_gap, 1.111);
        assert_eq!(rounded.total_questions, 3);
        assert_eq!(stats.avg_user_sentiment, 0.123_456);
    }
}
