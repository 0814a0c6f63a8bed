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

use anyhow::Result;
use std::fs;
use tenor::chart::ChartLayout;
use tenor::transcript::{transcript_rows, UTF8_BOM};
use tenor::{
    process, read_transcript, AnalysisContext, ChartRenderer, ConversationRecord, Role,
    SentimentScorer,
};

const STAMP: &str = "20250301_101500";

fn context(dir: &std::path::Path) -> AnalysisContext {
    AnalysisContext::new(dir, SentimentScorer::default()).with_renderer(ChartRenderer::new(480, 240))
}

#[test]
fn failed_capture_yields_zero_stats_and_no_chart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let records = vec![ConversationRecord::new(
        "2025-03-01T10:15:00Z",
        "I love this!",
        "ERROR: timeout",
    )];
    let report = context(dir.path()).run_with_stamp(&records, STAMP)?;

    assert_eq!(report.stats.total_questions, 1);
    assert_eq!(report.stats.ai_responses, 0);
    assert_eq!(report.stats.avg_user_sentiment, 0.0);
    assert_eq!(report.stats.avg_ai_sentiment, 0.0);
    assert_eq!(report.stats.avg_sentiment_gap, 0.0);
    assert!(report.chart_file.is_none());
    assert!(!dir.path().join("sentiment_viz_20250301_101500.png").exists());

    let rows = read_transcript(&report.csv_path)?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].user, Role::Human);
    assert_eq!(rows[1].message, "ERROR: timeout");
    Ok(())
}

#[test]
fn negative_question_produces_single_point_chart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let records = vec![ConversationRecord::new(
        "2025-03-01T10:15:00Z",
        "This is terrible",
        "I'm sorry to hear that.",
    )];
    let report = context(dir.path()).run_with_stamp(&records, STAMP)?;

    assert_eq!(report.stats.ai_responses, 1);
    assert!(report.stats.avg_user_sentiment < 0.0);
    assert_eq!(report.csv_file, "chat_20250301_101500.csv");
    assert_eq!(
        report.chart_file.as_deref(),
        Some("sentiment_viz_20250301_101500.png")
    );
    assert!(dir.path().join("sentiment_viz_20250301_101500.png").exists());

    let analysis = process(&records, &SentimentScorer::default());
    let layout = ChartLayout::from_pairs(&analysis.series).unwrap();
    assert_eq!(layout.positions, vec![1]);
    Ok(())
}

#[test]
fn transcript_has_two_rows_per_record_regardless_of_eligibility() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let records = vec![
        ConversationRecord::new("t1", "What is Rust?", "A systems programming language."),
        ConversationRecord::new("t2", "And Go?", "No response"),
        ConversationRecord::new("t3", "Hmm", ""),
        ConversationRecord::new("t4", "Thanks, that was great!", "You're welcome, happy to help."),
        ConversationRecord::new("t5", "", "ERROR"),
    ];
    let report = context(dir.path()).run_with_stamp(&records, STAMP)?;

    let bytes = fs::read(&report.csv_path)?;
    assert!(bytes.starts_with(UTF8_BOM));
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec())?;
    assert_eq!(text.lines().count(), 1 + 2 * records.len());

    assert_eq!(report.stats.total_questions, 5);
    assert_eq!(report.stats.ai_responses, 2);
    Ok(())
}

#[test]
fn gap_matches_reference_computation() {
    let scorer = SentimentScorer::default();
    let records = vec![
        ConversationRecord::new("t1", "I love this!", "That is terrible news."),
        ConversationRecord::new("t2", "This is terrible", "I'm sorry to hear that."),
        ConversationRecord::new("t3", "ok", "Great, glad it helped!"),
        ConversationRecord::new("t4", "skip me", "ERROR: rate limited"),
    ];
    let analysis = process(&records, &scorer);
    assert_eq!(analysis.series.len(), 3);

    let eligible = [&records[0], &records[1], &records[2]];
    let gaps: Vec<f64> = eligible
        .iter()
        .map(|r| (scorer.score(&r.question) - scorer.score(&r.answer)).abs())
        .collect();
    let reference = gaps.iter().sum::<f64>() / gaps.len() as f64;
    assert!((analysis.stats.avg_sentiment_gap - reference).abs() < 1e-12);

    // "ok" is below the scorable length and reads as neutral.
    assert_eq!(analysis.series[2].user_sentiment, 0.0);
}

#[test]
fn transcript_round_trips_in_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let records = vec![
        ConversationRecord::new("2025-03-01T10:00:00Z", "Multi\nline, \"quoted\" question", "Sure."),
        ConversationRecord::new("2025-03-01T10:01:00Z", "Ünïcödé ✓", "   padded   answer   "),
    ];
    let report = context(dir.path()).run_with_stamp(&records, STAMP)?;
    let rows = read_transcript(&report.csv_path)?;
    assert_eq!(rows, transcript_rows(&records));
    assert_eq!(rows[3].msg_length, 2);
    Ok(())
}

#[test]
fn empty_batch_still_writes_a_transcript() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let report = context(dir.path()).run_with_stamp(&[], STAMP)?;
    assert_eq!(report.stats.total_questions, 0);
    assert!(report.chart_file.is_none());
    assert!(read_transcript(&report.csv_path)?.is_empty());
    Ok(())
}
