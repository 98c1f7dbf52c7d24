//! Fuzz target for calculated field formulas.
//!
//! Parsing and evaluation must never panic, and evaluation never yields a
//! non-finite number.

#![no_main]

use std::collections::HashMap;

use gridlens::pivot::parse_formula;
use gridlens::evaluate_formula;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4_096 {
        return;
    }
    let Ok(formula) = std::str::from_utf8(data) else {
        return;
    };

    let _ = parse_formula(formula);

    let mut bindings = HashMap::new();
    bindings.insert("revenue_sum".to_string(), 1_250.0);
    bindings.insert("units_sum".to_string(), 0.0);
    bindings.insert("x".to_string(), -3.5);
    if let Some(value) = evaluate_formula(formula, &bindings) {
        assert!(value.is_finite());
    }
});
