// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! datum - compile and run scripts from the command line
//!
//! ## Features
//!
//! - Run a script file, inline code or stdin
//! - Dump the concrete syntax tree or the compiled operation tree
//! - Compiler errors point at the offending source

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use datum_script::{AsyncEngine, Engine, Error};
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "datum",
    about = "Compile and run scripts through the datum operation-node compiler",
    version,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Script file to execute (reads stdin when neither a file nor --eval is given)
    script: Option<PathBuf>,

    /// Evaluate script from command line
    #[arg(short = 'e', long = "eval", conflicts_with = "script")]
    eval: Option<String>,

    /// Print the concrete syntax tree instead of running
    #[arg(long)]
    dump_cst: bool,

    /// Print the compiled operation tree instead of running
    #[arg(long)]
    dump_ast: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_filter = if cli.verbose {
        "datum=debug,datum_script=debug"
    } else {
        "datum=warn,datum_script=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let source = read_source(&cli).await?;
    debug!(bytes = source.len(), "loaded source");

    if cli.dump_cst || cli.dump_ast {
        return Ok(dump(&cli, &source));
    }

    let mut engine = Engine::new();
    engine.set_echo(true);
    let engine = AsyncEngine::from(engine);

    match engine.eval(&source).await {
        Ok(value) => {
            if !value.is_null() {
                println!("{}", value);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report(&source, &e)),
    }
}

/// Reads the program from the script file, `--eval` or stdin.
async fn read_source(cli: &Cli) -> anyhow::Result<String> {
    if let Some(code) = &cli.eval {
        return Ok(code.clone());
    }
    if let Some(path) = &cli.script {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut code = String::new();
    std::io::stdin()
        .read_to_string(&mut code)
        .context("failed to read stdin")?;
    Ok(code)
}

fn dump(cli: &Cli, source: &str) -> ExitCode {
    if cli.dump_cst {
        match datum_script::parse(source) {
            Ok(tree) => println!("{}", tree),
            Err(e) => return report(source, &e),
        }
    }
    if cli.dump_ast {
        match datum_script::compile(source) {
            Ok(program) => print!("{}", program),
            Err(e) => return report(source, &e),
        }
    }
    ExitCode::SUCCESS
}

fn report(source: &str, error: &Error) -> ExitCode {
    match error {
        Error::Compile(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            eprintln!("  {} {}", "-->".cyan(), e.fragment(source));
        }
        other => eprintln!("{}: {}", "Error".red().bold(), other),
    }
    ExitCode::FAILURE
}
