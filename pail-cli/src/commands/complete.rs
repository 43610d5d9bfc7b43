// SPDX-License-Identifier: AGPL-3.0-or-later
//! complete: path completion and completion-cache maintenance
//!
//! Listing a bucket per keystroke is too slow for interactive
//! completion, so `--update-cache` snapshots a prefix to a depth bound
//! and lookups answer from the snapshot. A lookup that no cached entry
//! covers falls back to one live listing. Cached answers may be stale;
//! the first cached answer prints a one-time notice.

use clap::Args;
use pail_backends::BackendRegistry;
use pail_cache::{CompletionCache, StaleWarning};
use pail_core::{PailError, PailResult, UnifiedPath};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::ExitCode;
use tracing::debug;

use super::{exit_status, PACKAGE};

#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// Path prefixes to complete (or to cache with --update-cache)
    #[arg(value_name = "PREFIX")]
    path: Vec<String>,

    /// Refresh the cache for the given prefixes by listing live
    #[arg(long = "update-cache", conflicts_with = "clear_cache")]
    update_cache: bool,

    /// Drop cached entries for the given prefixes (all when none given)
    #[arg(long = "clear-cache")]
    clear_cache: bool,

    /// How many levels below each prefix to scan (negative: unbounded)
    #[arg(long = "depth", value_name = "N", default_value_t = -1, allow_hyphen_values = true)]
    depth: i64,

    /// Cache file location (defaults to the user cache directory)
    #[arg(long = "cache-file", value_name = "FILE")]
    cache_file: Option<PathBuf>,
}

pub async fn run(args: &CompleteArgs, registry: &BackendRegistry) -> PailResult<ExitCode> {
    let cache_path = match &args.cache_file {
        Some(path) => path.clone(),
        None => CompletionCache::default_path()
            .ok_or_else(|| PailError::Cache("no cache directory available".into()))?,
    };
    let depth = if args.depth < 0 {
        u32::MAX
    } else {
        args.depth as u32
    };

    if args.clear_cache {
        let mut cache = CompletionCache::open(&cache_path)?;
        if args.path.is_empty() {
            cache.delete_file()?;
        } else {
            for operand in &args.path {
                cache.clear(Some(&normalize_prefix(operand)));
            }
            cache.save()?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    if args.update_cache {
        let mut cache = CompletionCache::open(&cache_path)?;
        let mut failed = false;
        for operand in &args.path {
            let path = match UnifiedPath::parse(operand) {
                Ok(p) if p.is_remote() => p,
                Ok(_) => {
                    eprintln!(
                        "{PACKAGE} complete: '{operand}' is not an object-store path; \
                         only remote prefixes are cached"
                    );
                    failed = true;
                    continue;
                }
                Err(e) => {
                    eprintln!("{PACKAGE} complete: {e}");
                    failed = true;
                    continue;
                }
            };

            let mut children = Vec::new();
            match scan(registry, &path, depth, &mut children).await {
                Ok(()) => {
                    cache.update(&normalize_prefix(operand), depth, children);
                }
                Err(e) => {
                    eprintln!("{PACKAGE} complete: cannot list '{operand}': {e}");
                    failed = true;
                }
            }
        }
        cache.save()?;
        return Ok(exit_status(failed));
    }

    // Lookup
    let prefix = args.path.first().map(String::as_str).unwrap_or("");
    let candidates = lookup(registry, &cache_path, prefix).await;
    for candidate in candidates {
        println!("{candidate}");
    }
    Ok(ExitCode::SUCCESS)
}

fn normalize_prefix(operand: &str) -> String {
    format!("{}/", operand.trim_end_matches('/'))
}

/// Depth-bounded scan; directories are recorded with a trailing slash.
/// Depth 0 records only the prefix itself.
fn scan<'a>(
    registry: &'a BackendRegistry,
    path: &'a UnifiedPath,
    depth: u32,
    into: &'a mut Vec<String>,
) -> Pin<Box<dyn Future<Output = PailResult<()>> + 'a>> {
    Box::pin(async move {
        let backend = registry.for_path(path)?;
        let entry = backend.stat(path).await?;
        if !entry.is_directory() {
            into.push(path.to_string());
            return Ok(());
        }
        if depth == 0 {
            into.push(format!("{path}/"));
            return Ok(());
        }

        for child in backend.list(path).await? {
            if child.is_directory() {
                into.push(format!("{}/", child.path));
                if depth > 1 {
                    scan(registry, &child.path, depth - 1, into).await?;
                }
            } else {
                into.push(child.path.to_string());
            }
        }
        Ok(())
    })
}

/// Candidates for a partial path: registered schemes for an empty
/// prefix, the cache when it covers the request, a live listing
/// otherwise. Completion never fails loudly; errors produce no
/// candidates.
async fn lookup(registry: &BackendRegistry, cache_path: &PathBuf, prefix: &str) -> Vec<String> {
    if prefix.is_empty() {
        let mut roots = vec!["-".to_string()];
        let mut schemes: Vec<&str> = registry.schemes();
        schemes.sort_unstable();
        for scheme in schemes {
            if scheme != "file" {
                roots.push(format!("{scheme}://"));
            }
        }
        return roots;
    }

    let is_remote = UnifiedPath::parse(prefix)
        .map(|p| p.is_remote())
        .unwrap_or(false);

    if is_remote {
        if let Ok(cache) = CompletionCache::open(cache_path) {
            if let Some(hits) = cache.lookup(prefix) {
                let warning =
                    StaleWarning::new(cache_path.with_file_name("complete.warned"));
                if warning.should_warn() {
                    eprintln!(
                        "{PACKAGE}: using cached cloud path completion; \
                         run '{PACKAGE} complete --update-cache PREFIX' to refresh"
                    );
                    let _ = warning.mark_warned();
                }
                return hits;
            }
        }
        debug!(%prefix, "no cache coverage; listing live");
    }

    live_candidates(registry, prefix).await.unwrap_or_default()
}

async fn live_candidates(registry: &BackendRegistry, prefix: &str) -> PailResult<Vec<String>> {
    // "dir/" lists everything in dir; "dir/par" lists dir filtered by
    // the partial component
    let (dir, partial) = if prefix.ends_with('/') {
        (UnifiedPath::parse(prefix)?, String::new())
    } else {
        let path = UnifiedPath::parse(prefix)?;
        match path.parent() {
            Some(parent) => {
                let name = path.name().unwrap_or("").to_string();
                (parent, name)
            }
            None => (path, String::new()),
        }
    };

    let backend = registry.for_path(&dir)?;
    let mut candidates = Vec::new();
    for entry in backend.list(&dir).await? {
        let name = match entry.name() {
            Some(n) => n,
            None => continue,
        };
        if !partial.is_empty() && !name.starts_with(&partial) {
            continue;
        }
        if entry.is_directory() {
            candidates.push(format!("{}/", entry.path));
        } else {
            candidates.push(entry.path.to_string());
        }
    }
    candidates.sort_unstable();
    Ok(candidates)
}
