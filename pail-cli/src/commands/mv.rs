// SPDX-License-Identifier: AGPL-3.0-or-later
//! mv: move files, atomically where the backend allows
//!
//! A local-to-local move is one rename syscall. As soon as an object
//! store is involved the move degrades to copy-then-delete, and a
//! failed delete after a successful copy is reported as partial
//! success rather than rolled back.

use clap::Args;
use pail_backends::BackendRegistry;
use pail_core::{PailError, PailResult, UnifiedPath};
use std::process::ExitCode;

use super::transfer::{self, resolve_clobber, TransferOpts, UpdateMode};
use super::{exit_status, PACKAGE};

#[derive(Args, Debug)]
pub struct MvArgs {
    /// Source paths followed by the destination (unless -t is given)
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<String>,

    /// Do not prompt before overwriting
    #[arg(short = 'f', long = "force")]
    force: bool,

    /// Prompt before overwrite
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,

    /// Never overwrite an existing file
    #[arg(short = 'n', long = "no-clobber")]
    no_clobber: bool,

    /// Move only when the source is newer than the destination
    #[arg(short = 'u')]
    update_shorthand: bool,

    /// Control when an existing destination is replaced
    /// (all, none, older)
    #[arg(
        long = "update",
        value_name = "WHEN",
        num_args = 0..=1,
        default_missing_value = "older"
    )]
    update: Option<String>,

    /// Explain what is being done
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Move all sources into DIRECTORY
    #[arg(
        short = 't',
        long = "target-directory",
        value_name = "DIRECTORY",
        conflicts_with = "no_target_directory"
    )]
    target_directory: Option<String>,

    /// Treat the destination as a normal file
    #[arg(short = 'T', long = "no-target-directory")]
    no_target_directory: bool,
}

pub async fn run(args: &MvArgs, registry: &BackendRegistry) -> PailResult<ExitCode> {
    let update = match (&args.update, args.update_shorthand) {
        (Some(word), _) => UpdateMode::parse(word)?,
        (None, true) => UpdateMode::Older,
        (None, false) => UpdateMode::All,
    };

    let (sources, dest_operand) = split_operands(&args.paths, args.target_directory.is_some())?;

    let (base, into_dir) = transfer::resolve_destination(
        registry,
        sources.len(),
        dest_operand,
        args.target_directory.as_deref(),
        args.no_target_directory,
    )
    .await?;

    let opts = TransferOpts {
        registry,
        cmd: "mv",
        recursive: true,
        preserve: true,
        verbose: args.verbose,
        clobber: resolve_clobber(args.force, args.interactive, args.no_clobber),
        update,
    };

    let mut failed = false;
    for source in sources {
        let src = match UnifiedPath::parse(source) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{PACKAGE} mv: {e}");
                failed = true;
                continue;
            }
        };

        let backend = match registry.for_path(&src) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("{PACKAGE} mv: {e}");
                failed = true;
                continue;
            }
        };
        if let Err(e) = backend.stat(&src).await {
            eprintln!("{PACKAGE} mv: cannot stat '{src}': {e}");
            failed = true;
            continue;
        }

        let dst = transfer::final_dest(&base, into_dir, &src);
        match transfer::move_path(&opts, src.clone(), dst.clone()).await {
            Ok(true) => {}
            Ok(false) => failed = true,
            Err(e) => {
                eprintln!("{PACKAGE} mv: cannot move '{src}' to '{dst}': {e}");
                failed = true;
            }
        }
    }
    Ok(exit_status(failed))
}

fn split_operands(paths: &[String], has_target: bool) -> PailResult<(&[String], &str)> {
    if has_target {
        return Ok((paths, ""));
    }
    if paths.len() < 2 {
        return Err(PailError::InvalidArgument(format!(
            "missing destination file operand after '{}'",
            paths.first().map(String::as_str).unwrap_or("")
        )));
    }
    let (dest, sources) = paths.split_last().expect("len checked above");
    Ok((sources, dest))
}
