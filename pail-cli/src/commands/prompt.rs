// SPDX-License-Identifier: AGPL-3.0-or-later
//! Interactive confirmations
//!
//! Questions go to stderr and the answer is read from stdin. When stdin
//! is not a terminal the read still happens: EOF, an error, or anything
//! other than an explicit yes counts as a decline, so a piped
//! invocation never hangs and never destroys data by accident.

use std::io::{self, BufRead, Write};

/// Ask a yes/no question. Only `y`/`yes` (any case) is a yes.
pub fn confirm(question: &str) -> bool {
    eprint!("{question} ");
    let _ = io::stderr().flush();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => false,
        Ok(_) => {
            let answer = line.trim().to_ascii_lowercase();
            answer == "y" || answer == "yes"
        }
        Err(_) => false,
    }
}
