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

use super::types::{AnalyzeResponse, ApiError, HealthResponse, SERVER_NAME};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use chrono::Local;
use std::sync::Arc;
use tenor::{AnalysisContext, AnalysisReport, AnalyzeRequest};
use tracing::{error, info, info_span};
use uuid::Uuid;

/// Parses and runs one request to completion. Blocking; call off the runtime.
pub fn run_analysis(ctx: &AnalysisContext, body: &[u8]) -> Result<AnalysisReport> {
    let request = AnalyzeRequest::from_slice(body).context("invalid analyze payload")?;
    info!(records = request.results.len(), "received results");
    ctx.run(&request.results).context("analysis pipeline failed")
}

pub async fn analyze(
    State(ctx): State<Arc<AnalysisContext>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("analyze", %request_id);

    let outcome = match body {
        Ok(bytes) => {
            let task_span = span.clone();
            tokio::task::spawn_blocking(move || task_span.in_scope(|| run_analysis(&ctx, &bytes)))
                .await
                .unwrap_or_else(|join| Err(anyhow!(join).context("analysis task aborted")))
        }
        Err(rejection) => {
            Err(anyhow!(rejection.body_text()).context("failed to read request body"))
        }
    };

    match outcome {
        Ok(report) => Ok(Json(AnalyzeResponse::from_report(&report))),
        Err(err) => {
            span.in_scope(|| error!("analysis failed: {err:#}"));
            Err(ApiError::internal(&err))
        }
    }
}

pub async fn health(State(ctx): State<Arc<AnalysisContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        server: SERVER_NAME.to_string(),
        results_folder: ctx.results_dir().display().to_string(),
        timestamp: Local::now().to_rfc3339(),
    })
}
