// SPDX-License-Identifier: AGPL-3.0-or-later
//! pail CLI
//!
//! The familiar file utilities, working identically on local paths and
//! object-store URIs.

mod commands;

use clap::{Parser, Subcommand};
use pail_backends::BackendRegistry;
use std::process::ExitCode;

use commands::PACKAGE;

#[derive(Parser)]
#[command(name = "pail")]
#[command(author, version, about = "File utilities for local and cloud paths", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List directory contents
    #[command(alias = "dir")]
    Ls(commands::ls::LsArgs),

    /// Copy files and directories
    Cp(commands::cp::CpArgs),

    /// Move (rename) files
    Mv(commands::mv::MvArgs),

    /// Remove files or directories
    Rm(commands::rm::RmArgs),

    /// Concatenate files to standard output
    Cat(commands::cat::CatArgs),

    /// Output the first part of files
    Head(commands::head::HeadArgs),

    /// Output the last part of files
    Tail(commands::tail::TailArgs),

    /// Create directories
    Mkdir(commands::mkdir::MkdirArgs),

    /// Update file timestamps, creating files as needed
    Touch(commands::touch::TouchArgs),

    /// Write standard input to a (possibly remote) file
    Sink(commands::sink::SinkArgs),

    /// Path completion helpers and completion-cache maintenance
    Complete(commands::complete::CompleteArgs),
}

// Current-thread runtime: one invocation is one sequential command, and
// tail's follow loop is a cooperative sleep, not a parallel workload.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PAIL_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = BackendRegistry::standard();

    let result = match cli.command {
        Command::Ls(args) => commands::ls::run(&args, &registry).await,
        Command::Cp(args) => commands::cp::run(&args, &registry).await,
        Command::Mv(args) => commands::mv::run(&args, &registry).await,
        Command::Rm(args) => commands::rm::run(&args, &registry).await,
        Command::Cat(args) => commands::cat::run(&args, &registry).await,
        Command::Head(args) => commands::head::run(&args, &registry).await,
        Command::Tail(args) => commands::tail::run(&args, &registry).await,
        Command::Mkdir(args) => commands::mkdir::run(&args, &registry).await,
        Command::Touch(args) => commands::touch::run(&args, &registry).await,
        Command::Sink(args) => commands::sink::run(&args, &registry).await,
        Command::Complete(args) => commands::complete::run(&args, &registry).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{PACKAGE}: {e}");
            ExitCode::FAILURE
        }
    }
}
