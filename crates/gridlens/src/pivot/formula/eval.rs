//! Formula evaluation against per-cell value bindings.
//!
//! Evaluation never fails: a missing or blank binding, division by zero and
//! any non-finite intermediate all produce `None`, which renders as a blank
//! cell.

use std::collections::HashMap;

use super::ast::{BinaryOp, Expr, Function};
use super::parser::parse_formula;

/// Largest number of decimal places `ROUND` honors.
const MAX_ROUND_DIGITS: f64 = 15.0;

/// Evaluate `expr`, resolving names through `lookup`.
pub fn evaluate(expr: &Expr, lookup: &dyn Fn(&str) -> Option<f64>) -> Option<f64> {
    let value = match expr {
        Expr::Number(n) => Some(*n),
        Expr::Reference(name) => lookup(name),
        Expr::Negate(inner) => evaluate(inner, lookup).map(|v| -v),
        Expr::Binary { op, left, right } => {
            let l = evaluate(left, lookup)?;
            let r = evaluate(right, lookup)?;
            binary(*op, l, r)
        }
        Expr::Call { function, args } => call(*function, args, lookup),
    };
    value.filter(|v| v.is_finite())
}

fn binary(op: BinaryOp, l: f64, r: f64) -> Option<f64> {
    let truth = |b: bool| Some(if b { 1.0 } else { 0.0 });
    match op {
        BinaryOp::Add => Some(l + r),
        BinaryOp::Subtract => Some(l - r),
        BinaryOp::Multiply => Some(l * r),
        BinaryOp::Divide if r == 0.0 => None,
        BinaryOp::Divide => Some(l / r),
        BinaryOp::Power => Some(l.powf(r)),
        BinaryOp::Equal => truth(l == r),
        BinaryOp::NotEqual => truth(l != r),
        BinaryOp::Less => truth(l < r),
        BinaryOp::Greater => truth(l > r),
        BinaryOp::LessEqual => truth(l <= r),
        BinaryOp::GreaterEqual => truth(l >= r),
    }
}

fn call(function: Function, args: &[Expr], lookup: &dyn Fn(&str) -> Option<f64>) -> Option<f64> {
    match function {
        Function::Abs => evaluate(args.first()?, lookup).map(f64::abs),
        // MIN and MAX skip blank arguments, like spreadsheet MIN/MAX.
        Function::Min => args
            .iter()
            .filter_map(|a| evaluate(a, lookup))
            .reduce(f64::min),
        Function::Max => args
            .iter()
            .filter_map(|a| evaluate(a, lookup))
            .reduce(f64::max),
        Function::Round => {
            let value = evaluate(args.first()?, lookup)?;
            let digits = match args.get(1) {
                Some(d) => evaluate(d, lookup)?.trunc().clamp(-MAX_ROUND_DIGITS, MAX_ROUND_DIGITS),
                None => 0.0,
            };
            if digits >= 0.0 {
                let factor = 10f64.powf(digits);
                Some((value * factor).round() / factor)
            } else {
                let factor = 10f64.powf(-digits);
                Some((value / factor).round() * factor)
            }
        }
        Function::If => {
            let condition = evaluate(args.first()?, lookup)?;
            let branch = if condition != 0.0 { args.get(1)? } else { args.get(2)? };
            evaluate(branch, lookup)
        }
    }
}

/// Parse and evaluate `formula` against a name-to-number mapping.
///
/// Returns `None` for syntax errors as well as the evaluation cases above;
/// use [`parse_formula`] to surface syntax errors to a user.
pub fn evaluate_formula(formula: &str, bindings: &HashMap<String, f64>) -> Option<f64> {
    let expr = parse_formula(formula).ok()?;
    evaluate(&expr, &|name: &str| bindings.get(name).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_arithmetic() {
        let b = bindings(&[("revenue_sum", 200.0), ("units_sum", 8.0)]);
        assert_eq!(evaluate_formula("revenue_sum / units_sum", &b), Some(25.0));
        assert_eq!(evaluate_formula("revenue_sum - units_sum * 10", &b), Some(120.0));
        assert_eq!(evaluate_formula("-units_sum + 1", &b), Some(-7.0));
        assert_eq!(evaluate_formula("2 ^ 10", &b), Some(1024.0));
    }

    #[test]
    fn test_divide_by_zero_is_blank() {
        let b = bindings(&[("a", 1.0), ("zero", 0.0)]);
        assert_eq!(evaluate_formula("a / zero", &b), None);
        assert_eq!(evaluate_formula("a / (zero * 5)", &b), None);
    }

    #[test]
    fn test_missing_binding_is_blank() {
        let b = bindings(&[("a", 1.0)]);
        assert_eq!(evaluate_formula("a + ghost", &b), None);
    }

    #[test]
    fn test_non_finite_is_blank() {
        let b = bindings(&[("big", 1e308), ("neg", -8.0)]);
        assert_eq!(evaluate_formula("big * 10", &b), None);
        assert_eq!(evaluate_formula("neg ^ 0.5", &b), None);
    }

    #[test]
    fn test_functions() {
        let b = bindings(&[("a", -2.5), ("b", 4.0)]);
        assert_eq!(evaluate_formula("ABS(a)", &b), Some(2.5));
        assert_eq!(evaluate_formula("min(a, b, 0)", &b), Some(-2.5));
        assert_eq!(evaluate_formula("MAX(a, b)", &b), Some(4.0));
        assert_eq!(evaluate_formula("MAX(a, ghost)", &b), Some(-2.5));
        assert_eq!(evaluate_formula("ROUND(10 / 3, 2)", &b), Some(3.33));
        assert_eq!(evaluate_formula("ROUND(a)", &b), Some(-3.0));
        assert_eq!(evaluate_formula("ROUND(1234, -2)", &b), Some(1200.0));
    }

    #[test]
    fn test_if_is_lazy() {
        let b = bindings(&[("units", 0.0), ("revenue", 50.0)]);
        assert_eq!(evaluate_formula("IF(units > 0, revenue / units, 0)", &b), Some(0.0));
        assert_eq!(evaluate_formula("IF(units = 0, -1, revenue / units)", &b), Some(-1.0));
        assert_eq!(evaluate_formula("IF(ghost, 1, 2)", &b), None);
    }

    #[test]
    fn test_syntax_error_is_blank() {
        assert_eq!(evaluate_formula("1 +", &HashMap::new()), None);
    }
}
