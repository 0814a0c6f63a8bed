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

use crate::error::TenorResult;
use crate::records::ConversationRecord;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// UTF-8 byte-order mark so spreadsheet tools pick the right encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub const HEADER: [&str; 4] = ["timestamp", "user", "message", "msg_length"];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Ai,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRow {
    pub timestamp: String,
    pub user: Role,
    pub message: String,
    pub msg_length: usize,
}

impl TranscriptRow {
    fn new(timestamp: &str, user: Role, message: &str) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            user,
            message: message.to_string(),
            msg_length: token_count(message),
        }
    }
}

/// Whitespace-separated token count, not characters.
pub fn token_count(message: &str) -> usize {
    message.split_whitespace().count()
}

/// Two rows per record, human then ai, with no eligibility filtering.
pub fn transcript_rows(records: &[ConversationRecord]) -> Vec<TranscriptRow> {
    records
        .iter()
        .flat_map(|record| {
            [
                TranscriptRow::new(&record.timestamp, Role::Human, &record.question),
                TranscriptRow::new(&record.timestamp, Role::Ai, &record.answer),
            ]
        })
        .collect()
}

pub struct TranscriptWriter;

impl TranscriptWriter {
    pub fn write(records: &[ConversationRecord], path: &Path) -> TenorResult<usize> {
        Self::write_rows(&transcript_rows(records), path)
    }

    pub fn write_rows(rows: &[TranscriptRow], path: &Path) -> TenorResult<usize> {
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(UTF8_BOM)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(HEADER)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!(path = %path.display(), rows = rows.len(), "transcript written");
        Ok(rows.len())
    }
}

pub fn read_transcript(path: &Path) -> TenorResult<Vec<TranscriptRow>> {
    let bytes = fs::read(path)?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
    let mut reader = csv::Reader::from_reader(body);
    let rows = reader.deserialize().collect::<Result<Vec<TranscriptRow>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ConversationRecord> {
        vec![
            ConversationRecord::new("2025-03-01T10:00:00Z", "I love this!", "ERROR: timeout"),
            ConversationRecord::new(
                "2025-03-01T10:01:00Z",
                "Quote \"this\", please,\nwith a newline",
                "Ответ на   вопрос",
            ),
            ConversationRecord::new("", "", ""),
        ]
    }

    #[test]
    fn counts_whitespace_tokens() {
        assert_eq!(token_count(""), 0);
        assert_eq!(token_count("   "), 0);
        assert_eq!(token_count("one"), 1);
        assert_eq!(token_count(" two\twords\n"), 2);
        assert_eq!(token_count("I'm sorry to hear that."), 5);
    }

    #[test]
    fn two_rows_per_record_in_input_order() {
        let rows = transcript_rows(&sample());
        assert_eq!(rows.len(), 6);
        let roles: Vec<Role> = rows.iter().map(|r| r.user).collect();
        assert_eq!(
            roles,
            [Role::Human, Role::Ai, Role::Human, Role::Ai, Role::Human, Role::Ai]
        );
        assert_eq!(rows[1].message, "ERROR: timeout");
        assert_eq!(rows[1].msg_length, 2);
        assert_eq!(rows[3].msg_length, 3);
    }

    #[test]
    fn file_starts_with_bom_and_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.csv");
        let written = TranscriptWriter::write(&sample(), &path).unwrap();
        assert_eq!(written, 6);

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("timestamp,user,message,msg_length"));
        assert_eq!(lines.next(), Some("2025-03-01T10:00:00Z,human,I love this!,3"));
        assert_eq!(lines.next(), Some("2025-03-01T10:00:00Z,ai,ERROR: timeout,2"));
    }

    #[test]
    fn round_trip_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.csv");
        let records = sample();
        TranscriptWriter::write(&records, &path).unwrap();
        assert_eq!(read_transcript(&path).unwrap(), transcript_rows(&records));
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chat.csv");
        assert!(TranscriptWriter::write(&sample(), &path).is_err());
    }
}
