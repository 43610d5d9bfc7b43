// SPDX-License-Identifier: AGPL-3.0-or-later
//! head: output the first part of files
//!
//! `-n N` prints the first N lines, `-n +N` from line N to the end,
//! `-n -N` everything but the last N. `-c` does the same over bytes.

use clap::Args;
use pail_backends::BackendRegistry;
use pail_core::{
    parse::{parse_count, CountSpec, Sign},
    PailResult, UnifiedPath,
};
use std::io::{Read, Write};
use std::process::ExitCode;

use super::records;
use super::{exit_status, PACKAGE};

#[derive(Args, Debug)]
pub struct HeadArgs {
    /// Files to read; '-' reads standard input
    #[arg(value_name = "FILE")]
    file: Vec<String>,

    /// Print the first NUM bytes
    #[arg(
        short = 'c',
        long = "bytes",
        value_name = "NUM",
        conflicts_with = "lines"
    )]
    bytes: Option<String>,

    /// Print the first NUM lines instead of the first 10
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
}

pub async fn run(args: &HeadArgs, registry: &BackendRegistry) -> PailResult<ExitCode> {
    let (spec, byte_mode) = match parse_spec(&args.bytes, &args.lines, "head")? {
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

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failed = false;
    let mut first = true;

    for operand in &operands {
        let data = match read_operand(operand, registry).await {
            Ok(data) => data,
            Err(e) => {
                eprintln!("{PACKAGE} head: cannot open '{operand}' for reading: {e}");
                failed = true;
                continue;
            }
        };

        if headers {
            print_header(&mut out, operand, first)?;
        }
        first = false;

        let selected = select(&data, spec, byte_mode, delim);
        out.write_all(selected)?;
    }
    out.flush()?;

    Ok(exit_status(failed))
}

/// Parse `-c`/`-n`, reporting the coreutils diagnostic on failure.
/// `Ok(None)` means the error was already printed.
pub(super) fn parse_spec(
    bytes: &Option<String>,
    lines: &Option<String>,
    cmd: &str,
) -> PailResult<Option<(CountSpec, bool)>> {
    if let Some(s) = bytes {
        return match parse_count(s) {
            Ok(spec) => Ok(Some((spec, true))),
            Err(_) => {
                eprintln!("{PACKAGE} {cmd}: invalid number of bytes: '{s}'");
                Ok(None)
            }
        };
    }
    let s = lines.as_deref().unwrap_or("10");
    match parse_count(s) {
        Ok(spec) => Ok(Some((spec, false))),
        Err(_) => {
            eprintln!("{PACKAGE} {cmd}: invalid number of lines: '{s}'");
            Ok(None)
        }
    }
}

pub(super) async fn read_operand(
    operand: &str,
    registry: &BackendRegistry,
) -> PailResult<Vec<u8>> {
    if operand == "-" {
        let mut data = Vec::new();
        std::io::stdin().lock().read_to_end(&mut data)?;
        return Ok(data);
    }
    let path = UnifiedPath::parse(operand)?;
    let backend = registry.for_path(&path)?;
    Ok(backend.read(&path, None).await?.to_vec())
}

pub(super) fn print_header(
    out: &mut impl Write,
    operand: &str,
    first: bool,
) -> std::io::Result<()> {
    let name = if operand == "-" {
        "standard input"
    } else {
        operand
    };
    if first {
        writeln!(out, "==> {name} <==")
    } else {
        writeln!(out, "\n==> {name} <==")
    }
}

fn select<'a>(data: &'a [u8], spec: CountSpec, byte_mode: bool, delim: u8) -> &'a [u8] {
    let n = spec.count;
    if byte_mode {
        match spec.sign {
            Sign::None => &data[..data.len().min(n as usize)],
            // 1-based offset: +N starts at byte N
            Sign::Plus => &data[data.len().min(n.saturating_sub(1) as usize)..],
            Sign::Minus => &data[..data.len().saturating_sub(n as usize)],
        }
    } else {
        match spec.sign {
            Sign::None => records::first_records(data, n, delim),
            Sign::Plus => records::from_record(data, n, delim),
            Sign::Minus => records::drop_last_records(data, n, delim),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES: &[u8] = b"L1\nL2\nL3\nL4\nL5\nL6\nL7\nL8\nL9\nL10\n";

    fn spec(s: &str) -> CountSpec {
        parse_count(s).unwrap()
    }

    #[test]
    fn test_first_n_lines() {
        assert_eq!(select(LINES, spec("3"), false, b'\n'), b"L1\nL2\nL3\n");
    }

    #[test]
    fn test_plus_n_starts_at_line_n() {
        assert_eq!(
            select(LINES, spec("+3"), false, b'\n'),
            b"L3\nL4\nL5\nL6\nL7\nL8\nL9\nL10\n"
        );
    }

    #[test]
    fn test_minus_n_drops_last_lines() {
        assert_eq!(
            select(b"a\nb\nc\nd\n", spec("-2"), false, b'\n'),
            b"a\nb\n"
        );
    }

    #[test]
    fn test_byte_modes() {
        let data = b"0123456789";
        assert_eq!(select(data, spec("4"), true, b'\n'), b"0123");
        // +N is 1-based: +3 starts at the third byte
        assert_eq!(select(data, spec("+3"), true, b'\n'), b"23456789");
        assert_eq!(select(data, spec("-4"), true, b'\n'), b"012345");
        // Dropping more than the file holds yields nothing
        assert_eq!(select(b"abc", spec("-5"), true, b'\n'), b"");
    }

    #[test]
    fn test_count_past_end() {
        assert_eq!(select(b"ab\ncd\n", spec("10"), false, b'\n'), b"ab\ncd\n");
        assert_eq!(select(b"abc", spec("10"), true, b'\n'), b"abc");
    }
}
