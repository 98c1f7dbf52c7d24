//! Fuzz target for the delimited text parser.
//!
//! The parser must never panic on malformed input, whatever delimiter
//! auto-detection settles on, and every parsed row set must survive field
//! analysis.

#![no_main]

use gridlens::{Parser, analyze_fields_for_chart};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    if let Ok((rows, _)) = Parser::new().parse_bytes(data) {
        let _ = analyze_fields_for_chart(&rows, None);
    }
});
