// SPDX-License-Identifier: AGPL-3.0-or-later
//! sink: write standard input to a file
//!
//! Shell redirection cannot target an object-store URI; `sink` is that
//! missing primitive. Reads stdin to EOF, then writes the bytes to the
//! destination in one shot (overwrite by default, `-a` to append).

use bytes::Bytes;
use clap::Args;
use pail_backends::BackendRegistry;
use pail_core::{PailResult, UnifiedPath, WriteMode};
use std::io::Read;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct SinkArgs {
    /// Destination path
    #[arg(value_name = "FILE")]
    file: String,

    /// Append instead of overwriting
    #[arg(short = 'a', long = "append")]
    append: bool,
}

pub async fn run(args: &SinkArgs, registry: &BackendRegistry) -> PailResult<ExitCode> {
    let path = UnifiedPath::parse(&args.file)?;
    let backend = registry.for_path(&path)?;

    let mut data = Vec::new();
    std::io::stdin().lock().read_to_end(&mut data)?;

    let mode = if args.append {
        WriteMode::Append
    } else {
        WriteMode::Overwrite
    };
    backend.write(&path, Bytes::from(data), mode).await?;

    Ok(ExitCode::SUCCESS)
}
