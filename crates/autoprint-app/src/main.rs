// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Autoprint: hot-folder print forwarder
//
// Entry point. Parses arguments, initialises logging, then either runs a
// one-shot command or watches until Ctrl-C.

mod cli;
mod logging;
mod supervisor;

use std::process::ExitCode;

use clap::Parser;

use autoprint_print::backend::system_backend;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let list_printers = cli.list_printers;
    let test_page = cli.emit_test_page.clone();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("autoprint: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.log_level, config.log_file.as_deref()) {
        eprintln!("autoprint: {e}");
        return ExitCode::FAILURE;
    }

    let result = if let Some(path) = test_page {
        supervisor::emit_test_page(&path)
    } else if list_printers {
        supervisor::list_printers(system_backend()).await
    } else {
        logging::banner(&config);
        supervisor::run(config).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, fatal = e.is_fatal(), "autoprint failed");
            ExitCode::FAILURE
        }
    }
}
