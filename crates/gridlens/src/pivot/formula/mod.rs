//! Calculated-field formulas: lexer, parser and evaluator.
//!
//! Formulas combine the aggregated values of one pivot cell with `+ - * / ^`,
//! comparisons, parentheses and the functions `ABS`, `MIN`, `MAX`, `ROUND`
//! and `IF`.

mod ast;
mod eval;
mod lexer;
mod parser;

use thiserror::Error;

pub use ast::{BinaryOp, Expr, Function};
pub use eval::{evaluate, evaluate_formula};
pub use lexer::{Lexer, Spanned, Token};
pub use parser::{MAX_FORMULA_DEPTH, Parser, parse_formula};

/// Formula syntax errors. Positions are byte offsets into the formula.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {position}")]
    IllegalCharacter { ch: char, position: usize },

    #[error("unterminated reference starting at position {0}")]
    UnterminatedReference(usize),

    #[error("empty reference at position {0}")]
    EmptyReference(usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("expected {expected}, found {found} at position {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{function} expects {expected} argument(s), got {found}")]
    WrongArity {
        function: String,
        expected: String,
        found: usize,
    },

    #[error("formula nests deeper than {0} levels")]
    TooDeep(usize),
}
