// SPDX-License-Identifier: AGPL-3.0-or-later
//! tail: output the last part of files
//!
//! `-n N` prints the last N lines, `-n +N` from line N to the end; `-c`
//! does the same over bytes. Follow mode polls for growth with a
//! cooperative sleep between rounds: {opening, reading, waiting,
//! reopening, terminated}. It never exits on its own unless `--pid`
//! names a process that has gone away, or every followed file is gone
//! and `--retry` was not given.

use clap::Args;
use pail_backends::BackendRegistry;
use pail_core::{
    parse::{CountSpec, Sign},
    PailResult, UnifiedPath,
};
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;

use super::head::{parse_spec, print_header, read_operand};
use super::records;
use super::{exit_status, PACKAGE};

#[derive(Args, Debug)]
pub struct TailArgs {
    /// Files to read; '-' reads standard input
    #[arg(value_name = "FILE")]
    file: Vec<String>,

    /// Output the last NUM bytes
    #[arg(
        short = 'c',
        long = "bytes",
        value_name = "NUM",
        conflicts_with = "lines"
    )]
    bytes: Option<String>,

    /// Output the last NUM lines instead of the last 10
    #[arg(short = 'n', long = "lines", value_name = "NUM")]
    lines: Option<String>,

    /// Never print file name headers
    #[arg(short = 'q', long = "quiet", visible_alias = "silent")]
    quiet: bool,

    /// Always print file name headers
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Line delimiter is NUL, not newline
    #[arg(short = 'z', long = "zero-terminated")]
    zero_terminated: bool,

    /// Output appended data as the file grows
    #[arg(short = 'f', long = "follow")]
    follow: bool,

    /// Same as --follow --retry
    #[arg(short = 'F')]
    big_f: bool,

    /// Keep trying to open a file that is inaccessible
    #[arg(long = "retry")]
    retry: bool,

    /// Terminate after process PID dies
    #[arg(long = "pid", value_name = "PID")]
    pid: Option<u32>,

    /// Seconds to sleep between polls
    #[arg(
        short = 's',
        long = "sleep-interval",
        value_name = "N",
        default_value_t = 1.0
    )]
    sleep_interval: f64,

    /// Reopen a file after N polls without growth
    #[arg(long = "max-unchanged-stats", value_name = "N", default_value_t = 5)]
    max_unchanged_stats: u32,
}

struct Followed {
    operand: String,
    path: UnifiedPath,
    offset: u64,
    ino: Option<u64>,
    missing: bool,
    dead: bool,
    unchanged: u32,
}

pub async fn run(args: &TailArgs, registry: &BackendRegistry) -> PailResult<ExitCode> {
    let (spec, byte_mode) = match parse_spec(&args.bytes, &args.lines, "tail")? {
        Some(parsed) => parsed,
        None => return Ok(ExitCode::FAILURE),
    };

    let operands: Vec<String> = if args.file.is_empty() {
        vec!["-".to_string()]
    } else {
        args.file.clone()
    };
    let delim = if args.zero_terminated { 0 } else { b'\n' };
    let headers = (operands.len() > 1 || args.verbose) && !args.quiet;
    let follow = args.follow || args.big_f;
    let retry = args.retry || args.big_f;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failed = false;
    let mut first = true;
    let mut last_header: Option<usize> = None;
    let mut followed: Vec<Followed> = Vec::new();

    for (idx, operand) in operands.iter().enumerate() {
        match read_operand(operand, registry).await {
            Ok(data) => {
                if headers {
                    print_header(&mut out, operand, first)?;
                    last_header = Some(idx);
                }
                first = false;
                out.write_all(select(&data, spec, byte_mode, delim))?;

                if follow && operand != "-" {
                    let path = UnifiedPath::parse(operand)?;
                    let ino = registry
                        .for_path(&path)?
                        .stat(&path)
                        .await
                        .ok()
                        .and_then(|e| e.metadata.ino);
                    followed.push(Followed {
                        operand: operand.clone(),
                        path,
                        offset: data.len() as u64,
                        ino,
                        missing: false,
                        dead: false,
                        unchanged: 0,
                    });
                }
            }
            Err(e) => {
                eprintln!("{PACKAGE} tail: cannot open '{operand}' for reading: {e}");
                failed = true;
                if follow && retry && operand != "-" {
                    // Keep waiting for it to appear
                    if let Ok(path) = UnifiedPath::parse(operand) {
                        followed.push(Followed {
                            operand: operand.clone(),
                            path,
                            offset: 0,
                            ino: None,
                            missing: true,
                            dead: false,
                            unchanged: 0,
                        });
                    }
                }
            }
        }
    }
    out.flush()?;

    if follow && !followed.is_empty() {
        let follow_failed = follow_loop(
            args,
            registry,
            &mut followed,
            headers,
            &mut last_header,
            retry,
            &mut out,
        )
        .await?;
        failed |= follow_failed;
    }

    Ok(exit_status(failed))
}

/// Poll loop. Returns whether following ended in failure (every file
/// unfollowable without --retry).
async fn follow_loop(
    args: &TailArgs,
    registry: &BackendRegistry,
    followed: &mut [Followed],
    headers: bool,
    last_header: &mut Option<usize>,
    retry: bool,
    out: &mut impl Write,
) -> PailResult<bool> {
    let interval = Duration::from_secs_f64(args.sleep_interval.max(0.01));

    loop {
        tokio::time::sleep(interval).await;

        for idx in 0..followed.len() {
            if followed[idx].dead {
                continue;
            }
            if let Err(e) = poll_file(args, registry, followed, idx, headers, last_header, retry, out).await
            {
                eprintln!("{PACKAGE} tail: error reading '{}': {e}", followed[idx].operand);
                followed[idx].dead = true;
            }
        }
        out.flush()?;

        if followed.iter().all(|f| f.dead) {
            eprintln!("{PACKAGE} tail: no files remaining");
            return Ok(true);
        }

        if let Some(pid) = args.pid {
            if !process_alive(pid) {
                debug!(pid, "watched process exited; terminating follow");
                return Ok(false);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn poll_file(
    args: &TailArgs,
    registry: &BackendRegistry,
    followed: &mut [Followed],
    idx: usize,
    headers: bool,
    last_header: &mut Option<usize>,
    retry: bool,
    out: &mut impl Write,
) -> PailResult<()> {
    let backend = registry.for_path(&followed[idx].path)?;

    let entry = match backend.stat(&followed[idx].path).await {
        Ok(entry) => entry,
        Err(e) if e.is_not_found() || e.is_backend_unavailable() => {
            let f = &mut followed[idx];
            if !f.missing {
                eprintln!(
                    "{PACKAGE} tail: '{}' has become inaccessible: {e}",
                    f.operand
                );
                f.missing = true;
            }
            if !retry {
                f.dead = true;
            }
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let size = entry.metadata.size.unwrap_or(0);
    let f = &mut followed[idx];

    if f.missing {
        eprintln!("{PACKAGE} tail: '{}' has appeared; following new file", f.operand);
        f.missing = false;
        f.offset = 0;
        f.ino = entry.metadata.ino;
    } else if let (Some(old), Some(new)) = (f.ino, entry.metadata.ino) {
        // Rotation: same name, different file
        if old != new {
            eprintln!(
                "{PACKAGE} tail: '{}' has been replaced; following new file",
                f.operand
            );
            f.offset = 0;
            f.ino = Some(new);
        }
    }

    if size < f.offset {
        eprintln!("{PACKAGE} tail: {}: file truncated", f.operand);
        f.offset = 0;
    }

    if size > f.offset {
        let data = backend
            .read(&f.path, Some((f.offset, None)))
            .await?;
        if headers && *last_header != Some(idx) {
            print_header(out, &f.operand, false)?;
            *last_header = Some(idx);
        }
        out.write_all(&data)?;
        f.offset += data.len() as u64;
        f.unchanged = 0;
    } else {
        f.unchanged += 1;
        if f.unchanged >= args.max_unchanged_stats {
            // Re-resolve the name in case it was replaced without an
            // observable identity change
            debug!(operand = %f.operand, "no growth after {} polls; reopening", f.unchanged);
            f.ino = entry.metadata.ino;
            f.unchanged = 0;
        }
    }
    Ok(())
}

/// True while the process exists (signal 0 probe; EPERM still means it
/// is alive).
fn process_alive(pid: u32) -> bool {
    let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
    if rc == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
}

fn select<'a>(data: &'a [u8], spec: CountSpec, byte_mode: bool, delim: u8) -> &'a [u8] {
    let n = spec.count;
    if byte_mode {
        match spec.sign {
            Sign::None | Sign::Minus => &data[data.len().saturating_sub(n as usize)..],
            // 1-based offset: +N starts at byte N
            Sign::Plus => &data[data.len().min(n.saturating_sub(1) as usize)..],
        }
    } else {
        match spec.sign {
            Sign::None | Sign::Minus => records::last_records(data, n, delim),
            Sign::Plus => records::from_record(data, n, delim),
        }
    }
}
