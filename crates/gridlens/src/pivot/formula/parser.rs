//! Recursive descent parser for calculated-field formulas.
//!
//! Grammar:
//!   expression     --> comparison
//!   comparison     --> additive ( ("=" | "<>" | "<" | ">" | "<=" | ">=") additive )*
//!   additive       --> multiplicative ( ("+" | "-") multiplicative )*
//!   multiplicative --> unary ( ("*" | "/") unary )*
//!   unary          --> ("-" | "+") unary | power
//!   power          --> primary ( "^" unary )?
//!   primary        --> NUMBER | IDENTIFIER | REFERENCE | call | "(" expression ")"
//!   call           --> IDENTIFIER "(" ( expression ( "," expression )* )? ")"

use super::FormulaError;
use super::ast::{BinaryOp, Expr, Function};
use super::lexer::{Lexer, Spanned, Token};

/// Deepest expression tree the parser builds. Each parenthesis, unary sign,
/// exponent and chained binary operator counts as one level.
pub const MAX_FORMULA_DEPTH: usize = 256;

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, FormulaError> {
        Ok(Self {
            tokens: Lexer::new(source).tokenize()?,
            pos: 0,
            depth: 0,
        })
    }

    /// Parse the whole input as one expression.
    pub fn parse(&mut self) -> Result<Expr, FormulaError> {
        // A leading '=' is tolerated, spreadsheet style.
        if *self.current() == Token::Equal {
            self.advance();
        }
        if *self.current() == Token::Eof {
            return Err(FormulaError::Empty);
        }

        let expr = self.parse_comparison()?;
        if *self.current() != Token::Eof {
            return Err(self.unexpected("an operator or end of formula"));
        }
        Ok(expr)
    }

    fn current(&self) -> &Token {
        // tokenize() always ends with Eof, and advance() never moves past it.
        &self.tokens[self.pos].token
    }

    fn position(&self) -> usize {
        self.tokens[self.pos].position
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), FormulaError> {
        if *self.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", expected)))
        }
    }

    fn unexpected(&self, expected: &str) -> FormulaError {
        FormulaError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current().to_string(),
            position: self.position(),
        }
    }

    fn descend(&mut self) -> Result<(), FormulaError> {
        if self.depth >= MAX_FORMULA_DEPTH {
            return Err(FormulaError::TooDeep(MAX_FORMULA_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, FormulaError> {
        let depth = self.depth;
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current() {
                Token::Equal => BinaryOp::Equal,
                Token::NotEqual => BinaryOp::NotEqual,
                Token::Less => BinaryOp::Less,
                Token::Greater => BinaryOp::Greater,
                Token::LessEqual => BinaryOp::LessEqual,
                Token::GreaterEqual => BinaryOp::GreaterEqual,
                _ => break,
            };
            self.advance();
            // Chains build a left-deep tree.
            self.descend()?;
            let right = self.parse_additive()?;
            left = Self::binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, FormulaError> {
        let depth = self.depth;
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            // Chains build a left-deep tree.
            self.descend()?;
            let right = self.parse_multiplicative()?;
            left = Self::binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, FormulaError> {
        let depth = self.depth;
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current() {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => break,
            };
            self.advance();
            // Chains build a left-deep tree.
            self.descend()?;
            let right = self.parse_unary()?;
            left = Self::binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, FormulaError> {
        self.descend()?;
        let expr = self.parse_signed();
        self.depth -= 1;
        expr
    }

    fn parse_signed(&mut self) -> Result<Expr, FormulaError> {
        match self.current() {
            Token::Minus => {
                self.advance();
                Ok(Expr::Negate(Box::new(self.parse_unary()?)))
            }
            Token::Plus => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    /// Right-associative: `2 ^ 3 ^ 2` is `2 ^ 9`, and `-2 ^ 2` is `-(2 ^ 2)`.
    fn parse_power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.parse_primary()?;
        if *self.current() == Token::Caret {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Self::binary(BinaryOp::Power, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, FormulaError> {
        match self.current().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::Reference(name) => {
                self.advance();
                Ok(Expr::Reference(name))
            }
            Token::Identifier(name) => {
                self.advance();
                if *self.current() == Token::LParen {
                    self.parse_call(&name)
                } else {
                    Ok(Expr::Reference(name))
                }
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_comparison()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected("a number, name or '('")),
        }
    }

    fn parse_call(&mut self, name: &str) -> Result<Expr, FormulaError> {
        let function =
            Function::from_name(name).ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;
        self.expect(Token::LParen)?;

        let mut args = Vec::new();
        if *self.current() != Token::RParen {
            args.push(self.parse_comparison()?);
            while *self.current() == Token::Comma {
                self.advance();
                args.push(self.parse_comparison()?);
            }
        }
        self.expect(Token::RParen)?;

        let (min, max) = function.arity();
        if args.len() < min || max.is_some_and(|m| args.len() > m) {
            let expected = match max {
                Some(m) if m == min => min.to_string(),
                Some(m) => format!("{} to {}", min, m),
                None => format!("at least {}", min),
            };
            return Err(FormulaError::WrongArity {
                function: function.name().to_string(),
                expected,
                found: args.len(),
            });
        }

        Ok(Expr::Call { function, args })
    }
}

/// Parse a formula into an expression tree.
pub fn parse_formula(source: &str) -> Result<Expr, FormulaError> {
    Parser::new(source)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str) -> Box<Expr> {
        Box::new(Expr::Reference(name.to_string()))
    }

    #[test]
    fn test_precedence() {
        let expr = parse_formula("a + b * c").unwrap();
        assert_eq!(expr.to_string(), "([a] + ([b] * [c]))");

        let expr = parse_formula("(a + b) * c").unwrap();
        assert_eq!(expr.to_string(), "(([a] + [b]) * [c])");
    }

    #[test]
    fn test_left_associative_division() {
        let expr = parse_formula("a / b / c").unwrap();
        assert_eq!(expr.to_string(), "(([a] / [b]) / [c])");
    }

    #[test]
    fn test_power_binds_tighter_than_negation() {
        let expr = parse_formula("-2 ^ 2").unwrap();
        assert_eq!(expr.to_string(), "-((2 ^ 2))");
        let expr = parse_formula("2 ^ 3 ^ 2").unwrap();
        assert_eq!(expr.to_string(), "(2 ^ (3 ^ 2))");
    }

    #[test]
    fn test_references() {
        let expr = parse_formula("[Unit Price_avg] * qty").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Multiply,
                left: reference("Unit Price_avg"),
                right: reference("qty"),
            }
        );
        assert_eq!(
            parse_formula("a + b * a").unwrap().references(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_functions() {
        let expr = parse_formula("round(revenue_sum / units_sum, 2)").unwrap();
        assert!(matches!(expr, Expr::Call { function: Function::Round, ref args } if args.len() == 2));

        let expr = parse_formula("IF(a > 0, a, 0)").unwrap();
        assert_eq!(expr.references(), vec!["a"]);
    }

    #[test]
    fn test_leading_equals_is_tolerated() {
        assert_eq!(parse_formula("= 1 + 2").unwrap().to_string(), "(1 + 2)");
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_formula("").unwrap_err(), FormulaError::Empty);
        assert_eq!(parse_formula("   ").unwrap_err(), FormulaError::Empty);
        assert!(matches!(
            parse_formula("a +").unwrap_err(),
            FormulaError::UnexpectedToken { position: 3, .. }
        ));
        assert!(matches!(
            parse_formula("(a + b").unwrap_err(),
            FormulaError::UnexpectedToken { .. }
        ));
        assert!(matches!(parse_formula("a b").unwrap_err(), FormulaError::UnexpectedToken { .. }));
        assert_eq!(
            parse_formula("SQRT(a)").unwrap_err(),
            FormulaError::UnknownFunction("SQRT".to_string())
        );
        assert!(matches!(
            parse_formula("IF(a, b)").unwrap_err(),
            FormulaError::WrongArity { found: 2, .. }
        ));
        assert!(matches!(parse_formula("MAX()").unwrap_err(), FormulaError::WrongArity { .. }));
    }

    #[test]
    fn test_nesting_limit() {
        let too_deep = [
            format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000)),
            format!("{}1", "-".repeat(10_000)),
            format!("2{}", "^2".repeat(10_000)),
            format!("1{}", "+1".repeat(10_000)),
            format!("{}1{}", "ABS(".repeat(10_000), ")".repeat(10_000)),
        ];
        for formula in &too_deep {
            assert_eq!(
                parse_formula(formula).unwrap_err(),
                FormulaError::TooDeep(MAX_FORMULA_DEPTH)
            );
        }
    }

    #[test]
    fn test_nesting_within_limit() {
        let nested = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(parse_formula(&nested).unwrap(), Expr::Number(1.0));

        let terms = format!("1{}", "+1".repeat(100));
        assert!(parse_formula(&terms).is_ok());
        // The counter resets between sibling subexpressions.
        let siblings = vec![format!("{}1{}", "(".repeat(100), ")".repeat(100)); 20].join(" + ");
        assert!(parse_formula(&siblings).is_ok());
    }
}
