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

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tenor::AnalysisReport;

pub const SERVER_NAME: &str = "Tenor Analysis Server";
pub const SUCCESS_MESSAGE: &str = "Analysis complete with sentiment chart";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalyzeResponse {
    pub status: String,
    pub total_questions: usize,
    pub ai_responses: usize,
    pub average_user_sentiment: f64,
    pub average_ai_sentiment: f64,
    pub average_sentiment_gap: f64,
    pub csv_file: String,
    /// `null` when no pair was eligible for charting.
    pub chart_file: Option<String>,
    pub message: String,
}

impl AnalyzeResponse {
    pub fn from_report(report: &AnalysisReport) -> Self {
        let stats = report.stats.rounded();
        Self {
            status: "success".to_string(),
            total_questions: stats.total_questions,
            ai_responses: stats.ai_responses,
            average_user_sentiment: stats.avg_user_sentiment,
            average_ai_sentiment: stats.avg_ai_sentiment,
            average_sentiment_gap: stats.avg_sentiment_gap,
            csv_file: report.csv_file.clone(),
            chart_file: report.chart_file.clone(),
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub server: String,
    pub results_folder: String,
    pub timestamp: String,
}

/// Bad payloads and internal faults share this one shape.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: &'static str,
    pub message: String,
    #[serde(skip)]
    code: StatusCode,
}

impl ApiError {
    pub fn internal(err: &anyhow::Error) -> Self {
        Self {
            status: "error",
            message: format!("{err:#}"),
            code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code;
        let body = Json(self);
        (status, body).into_response()
    }
}
