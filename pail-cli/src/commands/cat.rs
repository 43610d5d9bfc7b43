// SPDX-License-Identifier: AGPL-3.0-or-later
//! cat: concatenate files to standard output
//!
//! Line numbering and the blank-line squeeze carry across operands,
//! matching coreutils. `-` reads standard input.

use clap::Args;
use pail_backends::BackendRegistry;
use pail_core::{PailResult, UnifiedPath};
use std::io::{Read, Write};
use std::process::ExitCode;

use super::{exit_status, PACKAGE};

#[derive(Args, Debug)]
pub struct CatArgs {
    /// Files to concatenate; '-' reads standard input
    #[arg(value_name = "FILE")]
    file: Vec<String>,

    /// Equivalent to -vET
    #[arg(short = 'A', long = "show-all")]
    show_all: bool,

    /// Number nonempty output lines (overrides -n)
    #[arg(short = 'b', long = "number-nonblank")]
    number_nonblank: bool,

    /// Equivalent to -vE
    #[arg(short = 'e')]
    e: bool,

    /// Display $ at the end of each line
    #[arg(short = 'E', long = "show-ends")]
    show_ends: bool,

    /// Number all output lines
    #[arg(short = 'n', long = "number")]
    number: bool,

    /// Suppress repeated empty output lines
    #[arg(short = 's', long = "squeeze-blank")]
    squeeze_blank: bool,

    /// Equivalent to -vT
    #[arg(short = 't')]
    t: bool,

    /// Display TAB characters as ^I
    #[arg(short = 'T', long = "show-tabs")]
    show_tabs: bool,

    /// Use ^ and M- notation, except for LFD and TAB
    #[arg(short = 'v', long = "show-nonprinting")]
    show_nonprinting: bool,
}

/// Effective rendering options after expanding the combination flags.
struct Render {
    number: bool,
    number_nonblank: bool,
    show_ends: bool,
    show_tabs: bool,
    show_nonprinting: bool,
    squeeze_blank: bool,
}

impl Render {
    fn from_args(args: &CatArgs) -> Self {
        Self {
            number: args.number || args.number_nonblank,
            number_nonblank: args.number_nonblank,
            show_ends: args.show_ends || args.show_all || args.e,
            show_tabs: args.show_tabs || args.show_all || args.t,
            show_nonprinting: args.show_nonprinting || args.show_all || args.e || args.t,
            squeeze_blank: args.squeeze_blank,
        }
    }

    fn is_plain(&self) -> bool {
        !self.number && !self.show_ends && !self.show_tabs && !self.show_nonprinting
            && !self.squeeze_blank
    }
}

pub async fn run(args: &CatArgs, registry: &BackendRegistry) -> PailResult<ExitCode> {
    let render = Render::from_args(args);
    let operands: Vec<String> = if args.file.is_empty() {
        vec!["-".to_string()]
    } else {
        args.file.clone()
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failed = false;
    let mut line_number: u64 = 1;
    let mut last_was_blank = false;

    for operand in &operands {
        let data = match read_operand(operand, registry).await {
            Ok(data) => data,
            Err(e) => {
                eprintln!("{PACKAGE} cat: {operand}: {e}");
                failed = true;
                continue;
            }
        };

        if render.is_plain() {
            out.write_all(&data)?;
            continue;
        }
        write_rendered(&mut out, &data, &render, &mut line_number, &mut last_was_blank)?;
    }
    out.flush()?;

    Ok(exit_status(failed))
}

async fn read_operand(operand: &str, registry: &BackendRegistry) -> PailResult<Vec<u8>> {
    if operand == "-" {
        let mut data = Vec::new();
        std::io::stdin().lock().read_to_end(&mut data)?;
        return Ok(data);
    }
    let path = UnifiedPath::parse(operand)?;
    let backend = registry.for_path(&path)?;
    Ok(backend.read(&path, None).await?.to_vec())
}

fn write_rendered(
    out: &mut impl Write,
    data: &[u8],
    render: &Render,
    line_number: &mut u64,
    last_was_blank: &mut bool,
) -> std::io::Result<()> {
    let mut rest = data;
    while !rest.is_empty() {
        let (line, had_newline) = match rest.iter().position(|&b| b == b'\n') {
            Some(pos) => (&rest[..pos], true),
            None => (rest, false),
        };
        rest = if had_newline {
            &rest[line.len() + 1..]
        } else {
            &rest[rest.len()..]
        };

        let blank = line.is_empty() && had_newline;
        if render.squeeze_blank && blank && *last_was_blank {
            continue;
        }
        *last_was_blank = blank;

        if render.number && !(render.number_nonblank && blank) {
            write!(out, "{:>6}\t", line_number)?;
            *line_number += 1;
        }

        for &b in line {
            write_byte(out, b, render)?;
        }
        if had_newline {
            if render.show_ends {
                out.write_all(b"$")?;
            }
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn write_byte(out: &mut impl Write, b: u8, render: &Render) -> std::io::Result<()> {
    if b == b'\t' {
        return if render.show_tabs {
            out.write_all(b"^I")
        } else {
            out.write_all(&[b])
        };
    }
    if !render.show_nonprinting {
        return out.write_all(&[b]);
    }
    match b {
        0x20..=0x7e => out.write_all(&[b]),
        0x7f => out.write_all(b"^?"),
        0x00..=0x1f => out.write_all(&[b'^', b + 64]),
        _ => {
            out.write_all(b"M-")?;
            let low = b - 128;
            match low {
                0x7f => out.write_all(b"^?"),
                0x00..=0x1f => out.write_all(&[b'^', low + 64]),
                _ => out.write_all(&[low]),
            }
        }
    }
}
