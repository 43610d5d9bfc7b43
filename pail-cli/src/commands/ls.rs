// SPDX-License-Identifier: AGPL-3.0-or-later
//! ls: list directory contents
//!
//! Default order is lexicographic by name; `-S` sorts by size and `-t`
//! by modification time, both descending; `-r` reverses whichever sort
//! is active. Long output degrades gracefully where a backend has no
//! permission bits or ownership to report.

use chrono::{DateTime, Duration, Utc};
use clap::Args;
use console::style;
use pail_backends::BackendRegistry;
use pail_core::{Entry, EntryKind, PailResult, UnifiedPath};
use std::collections::VecDeque;
use std::process::ExitCode;

use super::{exit_status, PACKAGE};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct LsArgs {
    /// Paths to list (defaults to the current directory)
    #[arg(value_name = "FILE")]
    file: Vec<String>,

    /// Do not ignore entries starting with '.'
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Like -a but without '.' and '..'
    #[arg(short = 'A', long = "almost-all")]
    almost_all: bool,

    /// Use long listing format
    #[arg(short = 'l')]
    long: bool,

    /// Human-readable sizes, powers of 1024
    #[arg(short = 'h', long = "human-readable")]
    human_readable: bool,

    /// Human-readable sizes, powers of 1000
    #[arg(long = "si")]
    si: bool,

    /// Reverse the sort order
    #[arg(short = 'r', long = "reverse")]
    reverse: bool,

    /// List subdirectories recursively
    #[arg(short = 'R', long = "recursive")]
    recursive: bool,

    /// Sort by file size, largest first
    #[arg(short = 'S')]
    sort_size: bool,

    /// Sort by modification time, newest first
    #[arg(short = 't')]
    sort_time: bool,

    /// One entry per line
    #[arg(short = '1')]
    one: bool,

    #[arg(long = "help", action = clap::ArgAction::Help, help = "Print help")]
    help: Option<bool>,
}

pub async fn run(args: &LsArgs, registry: &BackendRegistry) -> PailResult<ExitCode> {
    let operands: Vec<String> = if args.file.is_empty() {
        vec![".".to_string()]
    } else {
        args.file.clone()
    };

    let mut failed = false;
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for operand in &operands {
        let path = match UnifiedPath::parse(operand) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{PACKAGE} ls: {e}");
                failed = true;
                continue;
            }
        };
        let backend = match registry.for_path(&path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("{PACKAGE} ls: {e}");
                failed = true;
                continue;
            }
        };
        match backend.stat(&path).await {
            Ok(entry) if entry.is_directory() => dirs.push(path),
            Ok(entry) => files.push(entry),
            Err(e) if e.is_not_found() => {
                eprintln!(
                    "{PACKAGE} ls: cannot access '{operand}': No such file or directory"
                );
                failed = true;
            }
            Err(e) => {
                eprintln!("{PACKAGE} ls: cannot access '{operand}': {e}");
                failed = true;
            }
        }
    }

    // File operands come first, listed by the name they were given
    if !files.is_empty() {
        sort_entries(&mut files, args);
        print_entries(&files, args, true);
    }

    let multiple = operands.len() > 1 || args.recursive;
    let mut first_block = files.is_empty();
    let mut queue: VecDeque<UnifiedPath> = dirs.into();

    while let Some(dir) = queue.pop_front() {
        if !first_block {
            println!();
        }
        first_block = false;

        if multiple {
            println!("{dir}:");
        }

        let backend = registry.for_path(&dir)?;
        let mut entries = match backend.list(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("{PACKAGE} ls: cannot open directory '{dir}': {e}");
                failed = true;
                continue;
            }
        };

        entries.retain(|e| {
            args.all
                || args.almost_all
                || !e.name().map(|n| n.starts_with('.')).unwrap_or(false)
        });
        sort_entries(&mut entries, args);

        if args.recursive {
            // Depth-first: subdirectories come right after their parent,
            // in display order
            for entry in entries.iter().rev() {
                if entry.is_directory() {
                    queue.push_front(entry.path.clone());
                }
            }
        }

        print_entries(&entries, args, false);
    }

    Ok(exit_status(failed))
}

fn sort_entries(entries: &mut [Entry], args: &LsArgs) {
    if args.sort_size {
        entries.sort_by(|a, b| {
            b.size()
                .unwrap_or(0)
                .cmp(&a.size().unwrap_or(0))
                .then_with(|| a.name().cmp(&b.name()))
        });
    } else if args.sort_time {
        entries.sort_by(|a, b| {
            b.metadata
                .modified
                .cmp(&a.metadata.modified)
                .then_with(|| a.name().cmp(&b.name()))
        });
    } else {
        entries.sort_by(|a, b| a.name().cmp(&b.name()));
    }
    if args.reverse {
        entries.reverse();
    }
}

fn print_entries(entries: &[Entry], args: &LsArgs, full_paths: bool) {
    if args.long {
        print_long(entries, args, full_paths);
        return;
    }
    for entry in entries {
        let name = display_name(entry, full_paths);
        if entry.is_directory() {
            println!("{}", style(name).cyan());
        } else {
            println!("{name}");
        }
    }
}

fn display_name(entry: &Entry, full_path: bool) -> String {
    if full_path {
        entry.path.to_string()
    } else {
        entry.name().unwrap_or("?").to_string()
    }
}

fn print_long(entries: &[Entry], args: &LsArgs, full_paths: bool) {
    let rows: Vec<[String; 7]> = entries
        .iter()
        .map(|e| {
            [
                format!("{}{}", kind_char(e.kind), e.metadata.mode_string()),
                e.metadata.nlink.unwrap_or(1).to_string(),
                e.metadata.uid.map(|u| u.to_string()).unwrap_or_else(|| "-".into()),
                e.metadata.gid.map(|g| g.to_string()).unwrap_or_else(|| "-".into()),
                format_size(e.size(), args),
                format_mtime(e.metadata.modified),
                display_name(e, full_paths),
            ]
        })
        .collect();

    let mut widths = [0usize; 6];
    for row in &rows {
        for (i, w) in widths.iter_mut().enumerate() {
            *w = (*w).max(row[i].len());
        }
    }

    for row in &rows {
        println!(
            "{} {:>w1$} {:>w2$} {:>w3$} {:>w4$} {} {}",
            row[0],
            row[1],
            row[2],
            row[3],
            row[4],
            row[5],
            row[6],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
            w4 = widths[4],
        );
    }
}

fn kind_char(kind: EntryKind) -> char {
    match kind {
        EntryKind::Directory => 'd',
        EntryKind::File => '-',
        EntryKind::Symlink => 'l',
        EntryKind::Unknown => '?',
    }
}

fn format_size(size: Option<u64>, args: &LsArgs) -> String {
    match size {
        Some(s) if args.human_readable => human_size(s, 1024),
        Some(s) if args.si => human_size(s, 1000),
        Some(s) => s.to_string(),
        None => "-".to_string(),
    }
}

/// GNU-style human size: shortest form that fits in at most three
/// characters plus the unit letter, rounded up.
fn human_size(size: u64, base: u64) -> String {
    let units: &[&str] = if base == 1024 {
        &["K", "M", "G", "T", "P", "E", "Z", "Y"]
    } else {
        &["k", "M", "G", "T", "P", "E", "Z", "Y"]
    };

    if size < base {
        return size.to_string();
    }

    let mut divisor = base as u128;
    let size = size as u128;
    for (i, unit) in units.iter().enumerate() {
        let next = divisor * base as u128;
        if size < next || i == units.len() - 1 {
            // Tenths, rounded up
            let tenths = (size * 10).div_ceil(divisor);
            if tenths < 100 {
                return format!("{}.{}{}", tenths / 10, tenths % 10, unit);
            }
            let whole = size.div_ceil(divisor);
            return format!("{whole}{unit}");
        }
        divisor = next;
    }
    unreachable!()
}

fn format_mtime(mtime: Option<DateTime<Utc>>) -> String {
    match mtime {
        Some(dt) => {
            let local = dt.with_timezone(&chrono::Local);
            let now = Utc::now();
            // Recent files show the clock time, old ones the year
            if dt > now - Duration::days(183) && dt <= now + Duration::hours(1) {
                local.format("%b %e %H:%M").to_string()
            } else {
                local.format("%b %e  %Y").to_string()
            }
        }
        None => "            ".to_string(),
    }
}
