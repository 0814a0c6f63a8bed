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

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "tenor-server", about = "Conversation sentiment analysis server")]
pub struct Cli {
    /// TOML configuration file. Defaults to config/tenor.toml when present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve {
        #[arg(long)]
        addr: Option<String>,

        #[arg(long, value_name = "DIR")]
        results_dir: Option<PathBuf>,
    },
    /// Run the pipeline once over a saved payload and print the report.
    Analyze {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        #[arg(long, value_name = "DIR")]
        results_dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_optional() {
        let cli = Cli::try_parse_from(["tenor-server", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(cli.cmd.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tenor-server",
            "serve",
            "--addr",
            "0.0.0.0:9000",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(
            cli.cmd,
            Some(Command::Serve {
                addr: Some("0.0.0.0:9000".into()),
                results_dir: None
            })
        );
    }

    #[test]
    fn analyze_requires_input() {
        assert!(Cli::try_parse_from(["tenor-server", "analyze"]).is_err());
        let cli = Cli::try_parse_from(["tenor-server", "analyze", "--input", "payload.json"]).unwrap();
        assert!(matches!(cli.cmd, Some(Command::Analyze { ref input, .. }) if input.ends_with("payload.json")));
    }
}
