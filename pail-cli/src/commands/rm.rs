// SPDX-License-Identifier: AGPL-3.0-or-later
//! rm: remove files and directories
//!
//! Without `-f` a missing operand is an error. `-r` is required for
//! non-empty directories, `-d` removes empty ones, `-i` prompts per
//! entry and `-I` prompts once for big or recursive removals. A
//! declined prompt keeps the entry and is not an error.

use clap::Args;
use pail_backends::BackendRegistry;
use pail_core::{Entry, PailResult, UnifiedPath};
use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::process::ExitCode;

use super::{exit_status, prompt, PACKAGE};

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Paths to remove
    #[arg(value_name = "FILE", required = true)]
    file: Vec<String>,

    /// Ignore missing operands, never prompt
    #[arg(short = 'f', long = "force")]
    force: bool,

    /// Remove directories and their contents recursively
    #[arg(short = 'r', short_alias = 'R', long = "recursive")]
    recursive: bool,

    /// Remove empty directories
    #[arg(short = 'd', long = "dir")]
    dir: bool,

    /// Prompt before every removal
    #[arg(short = 'i')]
    interactive: bool,

    /// Prompt once before removing more than three files or recursing
    #[arg(short = 'I')]
    one_prompt: bool,

    /// Explain what is being done
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

struct RmCtx<'a> {
    registry: &'a BackendRegistry,
    interactive: bool,
    verbose: bool,
    failed: Cell<bool>,
}

impl RmCtx<'_> {
    fn report(&self, path: &UnifiedPath, err: impl std::fmt::Display) {
        eprintln!("{PACKAGE} rm: cannot remove '{path}': {err}");
        self.failed.set(true);
    }
}

pub async fn run(args: &RmArgs, registry: &BackendRegistry) -> PailResult<ExitCode> {
    // -f disables all prompting, including -i and -I
    let interactive = args.interactive && !args.force;

    if args.one_prompt && !args.force && (args.file.len() > 3 || args.recursive) {
        let question = if args.recursive {
            format!(
                "{PACKAGE} rm: remove {} argument(s) recursively?",
                args.file.len()
            )
        } else {
            format!("{PACKAGE} rm: remove {} arguments?", args.file.len())
        };
        if !prompt::confirm(&question) {
            return Ok(ExitCode::SUCCESS);
        }
    }

    let ctx = RmCtx {
        registry,
        interactive,
        verbose: args.verbose,
        failed: Cell::new(false),
    };

    for operand in &args.file {
        let path = match UnifiedPath::parse(operand) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{PACKAGE} rm: {e}");
                ctx.failed.set(true);
                continue;
            }
        };

        let backend = match registry.for_path(&path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("{PACKAGE} rm: {e}");
                ctx.failed.set(true);
                continue;
            }
        };

        let entry = match backend.stat(&path).await {
            Ok(entry) => entry,
            Err(e) if e.is_not_found() => {
                if !args.force {
                    ctx.report(&path, "No such file or directory");
                }
                continue;
            }
            Err(e) => {
                ctx.report(&path, e);
                continue;
            }
        };

        if entry.is_directory() {
            if args.recursive {
                if let Err(e) = remove_tree(&ctx, &path).await {
                    ctx.report(&path, e);
                }
            } else if args.dir {
                match backend.remove_dir(&path).await {
                    Ok(()) => {
                        if args.verbose {
                            println!("removed directory '{path}'");
                        }
                    }
                    Err(e) => ctx.report(&path, e),
                }
            } else {
                ctx.report(&path, "Is a directory");
            }
        } else if let Err(e) = remove_one(&ctx, &entry).await {
            ctx.report(&path, e);
        }
    }

    Ok(exit_status(ctx.failed.get()))
}

/// Remove a single non-directory entry, honoring `-i`. `Ok(false)`
/// means the user declined and the entry was kept.
async fn remove_one(ctx: &RmCtx<'_>, entry: &Entry) -> PailResult<bool> {
    let path = &entry.path;
    if ctx.interactive && !prompt::confirm(&format!("{PACKAGE} rm: remove file '{path}'?")) {
        return Ok(false);
    }
    ctx.registry.for_path(path)?.remove_file(path).await?;
    if ctx.verbose {
        println!("removed '{path}'");
    }
    Ok(true)
}

/// Depth-first removal. Returns whether the subtree was fully removed;
/// failures are reported (and recorded) as they happen so one bad entry
/// does not stop the rest of the walk.
fn remove_tree<'a>(
    ctx: &'a RmCtx<'a>,
    path: &'a UnifiedPath,
) -> Pin<Box<dyn Future<Output = PailResult<bool>> + 'a>> {
    Box::pin(async move {
        if ctx.interactive
            && !prompt::confirm(&format!("{PACKAGE} rm: descend into directory '{path}'?"))
        {
            return Ok(false);
        }

        let backend = ctx.registry.for_path(path)?;
        let mut all_removed = true;

        for child in backend.list(path).await? {
            let result = if child.is_directory() {
                remove_tree(ctx, &child.path).await
            } else {
                remove_one(ctx, &child).await
            };
            match result {
                Ok(removed) => all_removed &= removed,
                Err(e) => {
                    ctx.report(&child.path, e);
                    all_removed = false;
                }
            }
        }

        // Something below was kept; the directory stays
        if !all_removed {
            return Ok(false);
        }
        if ctx.interactive
            && !prompt::confirm(&format!("{PACKAGE} rm: remove directory '{path}'?"))
        {
            return Ok(false);
        }

        backend.remove_dir(path).await?;
        if ctx.verbose {
            println!("removed directory '{path}'");
        }
        Ok(true)
    })
}
