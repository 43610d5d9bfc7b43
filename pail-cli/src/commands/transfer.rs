// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared copy/move machinery
//!
//! Destination resolution, overwrite policy, and the recursive
//! cross-backend walkers used by both `cp` and `mv`.

use pail_backends::BackendRegistry;
use pail_core::{PailError, PailResult, UnifiedPath, WriteMode};
use std::future::Future;
use std::pin::Pin;

use super::{prompt, PACKAGE};

/// Overwrite policy after reconciling `-f`/`-i`/`-n`.
/// `-n` dominates everything; `-f` suppresses the `-i` prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clobber {
    Plain,
    Never,
    Interactive,
    Force,
}

pub fn resolve_clobber(force: bool, interactive: bool, no_clobber: bool) -> Clobber {
    if no_clobber {
        Clobber::Never
    } else if force {
        Clobber::Force
    } else if interactive {
        Clobber::Interactive
    } else {
        Clobber::Plain
    }
}

/// `mv --update` disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    All,
    Older,
    Never,
}

impl UpdateMode {
    pub fn parse(word: &str) -> PailResult<Self> {
        match word {
            "all" => Ok(Self::All),
            "older" => Ok(Self::Older),
            "none" => Ok(Self::Never),
            other => Err(PailError::InvalidArgument(format!(
                "invalid argument '{other}' for '--update'"
            ))),
        }
    }
}

pub struct TransferOpts<'a> {
    pub registry: &'a BackendRegistry,
    /// Diagnostic prefix: "cp" or "mv"
    pub cmd: &'static str,
    pub recursive: bool,
    pub preserve: bool,
    pub verbose: bool,
    pub clobber: Clobber,
    pub update: UpdateMode,
}

/// Resolve the destination base and whether sources land inside it.
/// Structural failures (multi-source into a non-directory) abort before
/// any operand is touched.
pub async fn resolve_destination(
    registry: &BackendRegistry,
    n_sources: usize,
    dest_operand: &str,
    target_directory: Option<&str>,
    no_target_directory: bool,
) -> PailResult<(UnifiedPath, bool)> {
    if let Some(target) = target_directory {
        let path = UnifiedPath::parse(target)?;
        let backend = registry.for_path(&path)?;
        match backend.stat(&path).await {
            Ok(entry) if entry.is_directory() => {}
            Ok(_) => {
                return Err(PailError::NotADirectory(format!(
                    "target directory '{target}'"
                )))
            }
            Err(e) if e.is_not_found() => backend.create_dir(&path, true, true).await?,
            Err(e) => return Err(e),
        }
        return Ok((path, true));
    }

    let dest = UnifiedPath::parse(dest_operand)?;
    if no_target_directory {
        if n_sources > 1 {
            return Err(PailError::InvalidArgument(format!(
                "extra operand with --no-target-directory ({n_sources} sources)"
            )));
        }
        return Ok((dest, false));
    }

    let backend = registry.for_path(&dest)?;
    let is_dir = match backend.stat(&dest).await {
        Ok(entry) => entry.is_directory(),
        Err(e) if e.is_not_found() => false,
        Err(e) => return Err(e),
    };

    if n_sources > 1 && !is_dir {
        return Err(PailError::NotADirectory(format!(
            "target '{dest_operand}' is not a directory"
        )));
    }

    Ok((dest, is_dir))
}

/// Exact target for one source given the resolved destination base.
pub fn final_dest(base: &UnifiedPath, into_dir: bool, src: &UnifiedPath) -> UnifiedPath {
    if into_dir {
        match src.name() {
            Some(name) => base.join(name),
            None => base.clone(),
        }
    } else {
        base.clone()
    }
}

async fn should_overwrite(opts: &TransferOpts<'_>, dst: &UnifiedPath) -> bool {
    match opts.clobber {
        Clobber::Never => false,
        Clobber::Interactive => prompt::confirm(&format!(
            "{PACKAGE} {}: overwrite '{dst}'?",
            opts.cmd
        )),
        Clobber::Plain | Clobber::Force => true,
    }
}

/// Copy one operand to its exact target. Returns whether the operand
/// fully succeeded; diagnostics for policy refusals are printed here.
pub fn copy_path<'a>(
    opts: &'a TransferOpts<'a>,
    src: UnifiedPath,
    dst: UnifiedPath,
) -> Pin<Box<dyn Future<Output = PailResult<bool>> + 'a>> {
    Box::pin(async move {
        let src_backend = opts.registry.for_path(&src)?;
        let dst_backend = opts.registry.for_path(&dst)?;

        let src_entry = src_backend.stat(&src).await?;

        // The destination's parent must already exist
        if let Some(parent) = dst.parent() {
            let check = match &parent {
                UnifiedPath::Local(p) => !p.as_os_str().is_empty(),
                UnifiedPath::Remote(_) => true,
            };
            if check {
                match dst_backend.stat(&parent).await {
                    Ok(entry) if entry.is_directory() => {}
                    Ok(_) => return Err(PailError::NotADirectory(parent.to_string())),
                    Err(e) if e.is_not_found() => {
                        eprintln!(
                            "{PACKAGE} {}: cannot create '{dst}': No such file or directory",
                            opts.cmd
                        );
                        return Ok(false);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let dst_entry = match dst_backend.stat(&dst).await {
            Ok(entry) => Some(entry),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        if let Some(existing) = &dst_entry {
            // Merging a directory into a directory is not an overwrite
            if !(src_entry.is_directory() && existing.is_directory()) {
                match opts.update {
                    UpdateMode::Never => return Ok(true),
                    UpdateMode::Older => {
                        if let (Some(dm), Some(sm)) =
                            (existing.metadata.modified, src_entry.metadata.modified)
                        {
                            if dm >= sm {
                                return Ok(true);
                            }
                        }
                    }
                    UpdateMode::All => {}
                }
                if !should_overwrite(opts, &dst).await {
                    return Ok(true);
                }
                if existing.is_directory() && !src_entry.is_directory() {
                    eprintln!(
                        "{PACKAGE} {}: cannot overwrite directory '{dst}' with non-directory",
                        opts.cmd
                    );
                    return Ok(false);
                }
                if !existing.is_directory() && src_entry.is_directory() {
                    eprintln!(
                        "{PACKAGE} {}: cannot overwrite non-directory '{dst}' with directory '{src}'",
                        opts.cmd
                    );
                    return Ok(false);
                }
            }
        }

        if src_entry.is_directory() {
            if !opts.recursive {
                eprintln!(
                    "{PACKAGE} {}: -r not specified; omitting directory '{src}'",
                    opts.cmd
                );
                return Ok(false);
            }

            if dst_entry.is_none() {
                dst_backend.create_dir(&dst, true, true).await?;
                if opts.verbose {
                    println!("created directory '{dst}'");
                }
            }

            let mut children = src_backend.list(&src).await?;
            children.sort_by(|a, b| a.name().cmp(&b.name()));

            let mut ok = true;
            for child in children {
                let name = match child.name() {
                    Some(n) => n.to_string(),
                    None => continue,
                };
                let child_dst = dst.join(&name);
                match copy_path(opts, child.path.clone(), child_dst).await {
                    Ok(success) => ok &= success,
                    Err(e) => {
                        eprintln!(
                            "{PACKAGE} {}: cannot copy '{}': {e}",
                            opts.cmd, child.path
                        );
                        ok = false;
                    }
                }
            }
            return Ok(ok);
        }

        if opts.verbose {
            println!("'{src}' -> '{dst}'");
        }

        if src.scheme() == dst.scheme() {
            // Same domain: the backend's native copy (server-side for
            // object stores)
            src_backend.copy(&src, &dst, opts.preserve).await?;
        } else {
            let data = src_backend.read(&src, None).await?;
            dst_backend.write(&dst, data, WriteMode::Overwrite).await?;
        }
        Ok(true)
    })
}

/// Move one operand. Same-domain single objects rename (atomic on the
/// local filesystem); everything else copies then deletes, and a delete
/// failure after a successful copy is reported as partial success.
pub async fn move_path(
    opts: &TransferOpts<'_>,
    src: UnifiedPath,
    dst: UnifiedPath,
) -> PailResult<bool> {
    let src_backend = opts.registry.for_path(&src)?;
    let dst_backend = opts.registry.for_path(&dst)?;

    let src_entry = src_backend.stat(&src).await?;

    let dst_entry = match dst_backend.stat(&dst).await {
        Ok(entry) => Some(entry),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e),
    };

    if let Some(existing) = &dst_entry {
        if !(src_entry.is_directory() && existing.is_directory()) {
            match opts.update {
                UpdateMode::Never => return Ok(true),
                UpdateMode::Older => {
                    if let (Some(dm), Some(sm)) =
                        (existing.metadata.modified, src_entry.metadata.modified)
                    {
                        if dm >= sm {
                            return Ok(true);
                        }
                    }
                }
                UpdateMode::All => {}
            }
            if !should_overwrite(opts, &dst).await {
                return Ok(true);
            }
            if existing.is_directory() && !src_entry.is_directory() {
                eprintln!(
                    "{PACKAGE} mv: cannot overwrite directory '{dst}' with non-directory"
                );
                return Ok(false);
            }
        }
    }

    let same_scheme = src.scheme() == dst.scheme();
    let rename_works = same_scheme
        && (!src_entry.is_directory() || !src_backend.synthetic_directories());

    if rename_works {
        src_backend.rename(&src, &dst).await?;
    } else {
        // Cross-domain (or synthetic-directory tree): copy then delete.
        // Not atomic; a failure between the phases leaves both copies.
        let copy_opts = TransferOpts {
            registry: opts.registry,
            cmd: "mv",
            recursive: true,
            preserve: true,
            verbose: false,
            clobber: Clobber::Force,
            update: UpdateMode::All,
        };
        if !copy_path(&copy_opts, src.clone(), dst.clone()).await? {
            return Ok(false);
        }
        if let Err(e) = delete_recursive(opts.registry, &src).await {
            eprintln!(
                "{PACKAGE} mv: '{src}' was copied to '{dst}' but could not be removed: {e}"
            );
            return Ok(false);
        }
    }

    if opts.verbose {
        println!("renamed '{src}' -> '{dst}'");
    }
    Ok(true)
}

/// Remove a path and everything under it.
pub fn delete_recursive<'a>(
    registry: &'a BackendRegistry,
    path: &'a UnifiedPath,
) -> Pin<Box<dyn Future<Output = PailResult<()>> + 'a>> {
    Box::pin(async move {
        let backend = registry.for_path(path)?;
        let entry = backend.stat(path).await?;
        if entry.is_directory() {
            for child in backend.list(path).await? {
                delete_recursive(registry, &child.path).await?;
            }
            backend.remove_dir(path).await
        } else {
            backend.remove_file(path).await
        }
    })
}
