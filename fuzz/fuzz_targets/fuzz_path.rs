// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fuzz target for UnifiedPath parsing and manipulation

#![no_main]

use libfuzzer_sys::fuzz_target;
use pail_core::path::UnifiedPath;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to string for path operations
    if let Ok(input) = std::str::from_utf8(data) {
        // Fuzz operand parsing
        if let Ok(path) = UnifiedPath::parse(input) {
            // Exercise various operations
            let _ = path.to_string();
            let _ = path.scheme();
            let _ = path.name();
            let _ = path.parent();
            let _ = path.is_remote();

            // Fuzz join with remaining data
            if let Some(prefix) = input.get(..10) {
                let _ = path.join(prefix);
            }

            // Display output must parse back to an equal path
            if let Ok(reparsed) = UnifiedPath::parse(&path.to_string()) {
                let _ = reparsed == path;
            }
        }
    }
});
