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

use anyhow::{Context, Result};
use clap::Parser;
use std::future::IntoFuture;
use std::net::SocketAddr;
use tenor::TenorConfig;
use tenor_server::{
    http::build_router, init_tracing, prepare_context, resolve_config, run_offline, Cli, Command,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = resolve_config(&cli)?;
    match &cli.cmd {
        Some(Command::Analyze { input, .. }) => {
            let ctx = prepare_context(&config)?;
            let response = run_offline(&ctx, input)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Some(Command::Serve { .. }) | None => run_server(config).await,
    }
}

async fn run_server(config: TenorConfig) -> Result<()> {
    info!("tenor-server starting");
    let ctx = prepare_context(&config)?;
    let app = build_router(ctx.clone(), config.server.body_limit_bytes);

    let addr: SocketAddr = config
        .server
        .addr
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.server.addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    let local = listener.local_addr()?;
    info!(%local, results = %ctx.results_dir().display(), "analysis server listening");
    info!("  POST http://{local}/analyze");
    info!("  GET  http://{local}/health");

    tokio::select! {
        served = axum::serve(listener, app).into_future() => served?,
        _ = tokio::signal::ctrl_c() => {}
    }
    info!("tenor-server shutting down");
    Ok(())
}
