// SPDX-License-Identifier: AGPL-3.0-or-later
//! touch: update file timestamps, creating files as needed
//!
//! `-d`, `-t` and `-r` supply the stamp; without them times move to
//! "now". Object stores cannot take an explicit stamp: a remote touch
//! refreshes the modification time as a best effort and explicit
//! stamps are reported as unsupported.

use bytes::Bytes;
use clap::Args;
use pail_backends::BackendRegistry;
use pail_core::{
    parse::{parse_datetime, parse_touch_stamp},
    PailResult, TimeSpec, UnifiedPath, WriteMode,
};
use std::process::ExitCode;

use super::{exit_status, PACKAGE};

#[derive(Args, Debug)]
pub struct TouchArgs {
    /// Files to touch
    #[arg(value_name = "FILE", required = true)]
    file: Vec<String>,

    /// Change only the access time
    #[arg(short = 'a')]
    access: bool,

    /// Change only the modification time
    #[arg(short = 'm')]
    modification: bool,

    /// Do not create any files
    #[arg(short = 'c', long = "no-create")]
    no_create: bool,

    /// Parse STRING and use it instead of the current time
    #[arg(short = 'd', long = "date", value_name = "STRING", conflicts_with_all = ["reference", "stamp"])]
    date: Option<String>,

    /// Use this file's times instead of the current time
    #[arg(short = 'r', long = "reference", value_name = "FILE", conflicts_with = "stamp")]
    reference: Option<String>,

    /// Use [[CC]YY]MMDDhhmm[.ss] instead of the current time
    #[arg(short = 't', value_name = "STAMP")]
    stamp: Option<String>,

    /// Which time to change: access, atime, use, modify, mtime
    #[arg(long = "time", value_name = "WORD")]
    time: Option<String>,
}

pub async fn run(args: &TouchArgs, registry: &BackendRegistry) -> PailResult<ExitCode> {
    let (mut set_atime, mut set_mtime) = (args.access, args.modification);
    match args.time.as_deref() {
        Some("access") | Some("atime") | Some("use") => set_atime = true,
        Some("modify") | Some("mtime") => set_mtime = true,
        Some(other) => {
            return Err(pail_core::PailError::InvalidArgument(format!(
                "invalid argument '{other}' for '--time'"
            )))
        }
        None => {}
    }
    if !set_atime && !set_mtime {
        set_atime = true;
        set_mtime = true;
    }

    // Resolve the stamp source once, up front
    let (atime_spec, mtime_spec) = if let Some(date) = &args.date {
        let stamp = TimeSpec::At(parse_datetime(date)?);
        (stamp, stamp)
    } else if let Some(compact) = &args.stamp {
        let stamp = TimeSpec::At(parse_touch_stamp(compact)?);
        (stamp, stamp)
    } else if let Some(reference) = &args.reference {
        let ref_path = UnifiedPath::parse(reference)?;
        let entry = registry.for_path(&ref_path)?.stat(&ref_path).await?;
        let accessed = entry
            .metadata
            .accessed
            .or(entry.metadata.modified)
            .map(TimeSpec::At)
            .unwrap_or(TimeSpec::Now);
        let modified = entry
            .metadata
            .modified
            .map(TimeSpec::At)
            .unwrap_or(TimeSpec::Now);
        (accessed, modified)
    } else {
        (TimeSpec::Now, TimeSpec::Now)
    };

    let mut failed = false;
    for operand in &args.file {
        let path = match UnifiedPath::parse(operand) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{PACKAGE} touch: {e}");
                failed = true;
                continue;
            }
        };
        let backend = match registry.for_path(&path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("{PACKAGE} touch: {e}");
                failed = true;
                continue;
            }
        };

        let exists = match backend.stat(&path).await {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                eprintln!("{PACKAGE} touch: cannot touch '{operand}': {e}");
                failed = true;
                continue;
            }
        };

        if !exists {
            if args.no_create {
                continue;
            }
            if let Err(e) = backend.write(&path, Bytes::new(), WriteMode::Overwrite).await {
                eprintln!("{PACKAGE} touch: cannot touch '{operand}': {e}");
                failed = true;
                continue;
            }
            // A fresh file already carries "now"; only explicit stamps
            // need a second step
            if matches!(atime_spec, TimeSpec::Now) && matches!(mtime_spec, TimeSpec::Now) {
                continue;
            }
        }

        let result = backend
            .set_times(
                &path,
                set_atime.then_some(atime_spec),
                set_mtime.then_some(mtime_spec),
            )
            .await;
        if let Err(e) = result {
            eprintln!("{PACKAGE} touch: cannot touch '{operand}': {e}");
            failed = true;
        }
    }

    Ok(exit_status(failed))
}
