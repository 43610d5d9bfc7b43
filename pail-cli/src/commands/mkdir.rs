// SPDX-License-Identifier: AGPL-3.0-or-later
//! mkdir: create directories
//!
//! `-p` creates intermediates and tolerates existing directories. On a
//! synthetic-directory backend the "directory" is a zero-byte marker
//! object; `-m` only means something where permission bits exist.

use clap::Args;
use pail_backends::BackendRegistry;
use pail_core::{PailResult, UnifiedPath};
use std::process::ExitCode;
use tracing::debug;

use super::{exit_status, PACKAGE};

#[derive(Args, Debug)]
pub struct MkdirArgs {
    /// Directories to create
    #[arg(value_name = "DIRECTORY", required = true)]
    directory: Vec<String>,

    /// Create parent directories as needed
    #[arg(short = 'p', long = "parents")]
    parents: bool,

    /// Set permission mode (octal) on created directories
    #[arg(short = 'm', long = "mode", value_name = "MODE")]
    mode: Option<String>,

    /// Explain what is being done
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

pub async fn run(args: &MkdirArgs, registry: &BackendRegistry) -> PailResult<ExitCode> {
    let mode = match &args.mode {
        Some(s) => match u32::from_str_radix(s, 8) {
            Ok(m) => Some(m),
            Err(_) => {
                eprintln!("{PACKAGE} mkdir: invalid mode '{s}'");
                return Ok(ExitCode::FAILURE);
            }
        },
        None => None,
    };

    let mut failed = false;
    for operand in &args.directory {
        let path = match UnifiedPath::parse(operand) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{PACKAGE} mkdir: {e}");
                failed = true;
                continue;
            }
        };
        let backend = match registry.for_path(&path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("{PACKAGE} mkdir: {e}");
                failed = true;
                continue;
            }
        };

        // A synthetic-directory backend will happily create any key, so
        // the parent requirement has to be enforced here
        if !args.parents && backend.synthetic_directories() {
            if let Some(parent) = path.parent() {
                match backend.stat(&parent).await {
                    Ok(entry) if entry.is_directory() => {}
                    Ok(_) => {
                        eprintln!(
                            "{PACKAGE} mkdir: cannot create directory '{operand}': Not a directory"
                        );
                        failed = true;
                        continue;
                    }
                    Err(_) => {
                        eprintln!(
                            "{PACKAGE} mkdir: cannot create directory '{operand}': \
                             No such file or directory"
                        );
                        failed = true;
                        continue;
                    }
                }
            }
        }

        if let Err(e) = backend.create_dir(&path, args.parents, args.parents).await {
            eprintln!("{PACKAGE} mkdir: cannot create directory '{operand}': {e}");
            failed = true;
            continue;
        }

        // Permission bits only exist on the local filesystem; elsewhere
        // the flag is meaningless and quietly skipped
        if let Some(mode) = mode {
            match path.as_local() {
                Some(real) => {
                    use std::os::unix::fs::PermissionsExt;
                    if let Err(e) =
                        std::fs::set_permissions(real, std::fs::Permissions::from_mode(mode))
                    {
                        eprintln!("{PACKAGE} mkdir: cannot set mode on '{operand}': {e}");
                        failed = true;
                    }
                }
                None => debug!(%path, "ignoring -m on a backend without permission bits"),
            }
        }

        if args.verbose {
            println!("{PACKAGE} mkdir: created directory '{operand}'");
        }
    }

    Ok(exit_status(failed))
}
