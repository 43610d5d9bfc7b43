// SPDX-License-Identifier: AGPL-3.0-or-later
//! cp: copy files and directories across storage domains

use clap::Args;
use pail_backends::BackendRegistry;
use pail_core::{PailError, PailResult, UnifiedPath};
use std::process::ExitCode;

use super::transfer::{self, resolve_clobber, TransferOpts, UpdateMode};
use super::{exit_status, PACKAGE};

#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source paths followed by the destination (unless -t is given)
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<String>,

    /// Copy directories recursively
    #[arg(short = 'r', short_alias = 'R', long = "recursive")]
    recursive: bool,

    /// Overwrite without prompting
    #[arg(short = 'f', long = "force")]
    force: bool,

    /// Prompt before overwrite
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,

    /// Never overwrite an existing file
    #[arg(short = 'n', long = "no-clobber")]
    no_clobber: bool,

    /// Preserve mode and timestamps
    #[arg(short = 'p', long = "preserve")]
    preserve: bool,

    /// Explain what is being done
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Copy all sources into DIRECTORY
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

pub async fn run(args: &CpArgs, registry: &BackendRegistry) -> PailResult<ExitCode> {
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
        cmd: "cp",
        recursive: args.recursive,
        preserve: args.preserve,
        verbose: args.verbose,
        clobber: resolve_clobber(args.force, args.interactive, args.no_clobber),
        update: UpdateMode::All,
    };

    let mut failed = false;
    for source in sources {
        let src = match UnifiedPath::parse(source) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{PACKAGE} cp: {e}");
                failed = true;
                continue;
            }
        };
        let dst = transfer::final_dest(&base, into_dir, &src);
        match transfer::copy_path(&opts, src.clone(), dst.clone()).await {
            Ok(true) => {}
            Ok(false) => failed = true,
            Err(e) => {
                eprintln!("{PACKAGE} cp: cannot copy '{src}' to '{dst}': {e}");
                failed = true;
            }
        }
    }
    Ok(exit_status(failed))
}

/// With `-t` every positional is a source; otherwise the last one is
/// the destination.
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
