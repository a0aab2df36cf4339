//! Formula parser
//!
//! A recursive descent parser over the token stream, with one method per
//! precedence level.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{tokenize, Token};
use rook_sheets_core::{CellRef, RangeRef};

/// Parse a formula string into an AST
///
/// A leading `=` is accepted and ignored, so both a full cell formula and a
/// bare expression body parse.
///
/// # Example
/// ```rust
/// use rook_sheets_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("SUM(A1:A10)").unwrap();
/// let ast = parse_formula("=IF(A1>0,\"Yes\",\"No\")").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<Expr> {
    let body = formula.trim();
    let body = body.strip_prefix('=').unwrap_or(body);
    parse(&tokenize(body))
}

/// Parse a token stream into an AST
///
/// Fails on malformed input: unexpected tokens, unmatched parentheses, or
/// trailing tokens after a complete expression.
pub fn parse(tokens: &[Token]) -> FormulaResult<Expr> {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_comparison()?;

    if !matches!(parser.current(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "unexpected trailing token: {:?}",
            parser.current()
        )));
    }

    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current() == expected {
            self.consume();
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "expected {:?}, got {:?}",
                expected,
                self.current()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Lowest to highest:
    // 1. Comparison: =, <>, <, <=, >, >=
    // 2. Concatenation: &
    // 3. Addition/Subtraction: +, -
    // 4. Multiplication/Division: *, /
    // 5. Unary sign: -, +
    // 6. Exponentiation: ^ (right-associative; its right operand re-enters
    //    the unary level, so -2^2 negates the whole power and 2^-3 parses)
    // 7. Primary: literals, references, function calls, parentheses

    fn parse_comparison(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_concatenation()?;

        loop {
            let op = match self.current() {
                Token::Equal => BinaryOperator::Equal,
                Token::NotEqual => BinaryOperator::NotEqual,
                Token::LessThan => BinaryOperator::LessThan,
                Token::LessEqual => BinaryOperator::LessEqual,
                Token::GreaterThan => BinaryOperator::GreaterThan,
                Token::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };

            self.consume();
            let right = self.parse_concatenation()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_concatenation(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_additive()?;

        while matches!(self.current(), Token::Ampersand) {
            self.consume();
            let right = self.parse_additive()?;
            left = Expr::BinaryOp {
                op: BinaryOperator::Concat,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume();
            let right = self.parse_unary()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        // Prefix minus
        if matches!(self.current(), Token::Minus) {
            self.consume();
            let operand = self.parse_unary()?;
            return Ok(Expr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(operand),
            });
        }

        // Prefix plus (no-op)
        if matches!(self.current(), Token::Plus) {
            self.consume();
            return self.parse_unary();
        }

        self.parse_exponent()
    }

    fn parse_exponent(&mut self) -> FormulaResult<Expr> {
        let left = self.parse_primary()?;

        if matches!(self.current(), Token::Caret) {
            self.consume();
            let right = self.parse_unary()?; // Right associative
            return Ok(Expr::BinaryOp {
                op: BinaryOperator::Power,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        match self.consume() {
            Token::Number(n) => Ok(Expr::Number(n)),

            Token::Str(s) => Ok(Expr::String(s)),

            Token::CellRef(text) => {
                let cell = CellRef::parse(&text)
                    .map_err(|e| FormulaError::Parse(format!("bad cell reference: {}", e)))?;
                Ok(Expr::CellRef(cell))
            }

            Token::RangeRef(start, end) => {
                let start = CellRef::parse(&start)
                    .map_err(|e| FormulaError::Parse(format!("bad range reference: {}", e)))?;
                let end = CellRef::parse(&end)
                    .map_err(|e| FormulaError::Parse(format!("bad range reference: {}", e)))?;
                Ok(Expr::RangeRef(RangeRef::new(start, end)))
            }

            Token::FuncName(name) => self.parse_function_call(name),

            Token::LParen => {
                let expr = self.parse_comparison()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }

            token => Err(FormulaError::Parse(format!(
                "unexpected token: {:?}",
                token
            ))),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<Expr> {
        self.expect(&Token::LParen)?;

        let mut args = Vec::new();

        if !matches!(self.current(), Token::RParen) {
            args.push(self.parse_comparison()?);

            while matches!(self.current(), Token::Comma) {
                self.consume();
                args.push(self.parse_comparison()?);
            }
        }

        self.expect(&Token::RParen)?;

        Ok(Expr::Function {
            name: name.to_uppercase(),
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        let ast = parse_formula("=42").unwrap();
        assert_eq!(ast, Expr::Number(42.0));

        let ast = parse_formula("=3.14").unwrap();
        assert_eq!(ast, Expr::Number(3.14));
    }

    #[test]
    fn test_parse_string() {
        let ast = parse_formula("=\"Hello\"").unwrap();
        assert_eq!(ast, Expr::String("Hello".into()));
    }

    #[test]
    fn test_parse_booleans_as_numbers() {
        assert_eq!(parse_formula("=TRUE").unwrap(), Expr::Number(1.0));
        assert_eq!(parse_formula("=false").unwrap(), Expr::Number(0.0));
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        // 1+(2*3)
        let ast = parse_formula("=1+2*3").unwrap();
        if let Expr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Add);
            assert_eq!(*left, Expr::Number(1.0));
            assert!(matches!(
                *right,
                Expr::BinaryOp {
                    op: BinaryOperator::Multiply,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_exponent_right_associative() {
        // 2^(3^2)
        let ast = parse_formula("=2^3^2").unwrap();
        if let Expr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Power);
            assert_eq!(*left, Expr::Number(2.0));
            assert!(matches!(
                *right,
                Expr::BinaryOp {
                    op: BinaryOperator::Power,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_unary_binds_outside_exponent() {
        // -(2^2), not (-2)^2
        let ast = parse_formula("=-2^2").unwrap();
        if let Expr::UnaryOp { op, operand } = ast {
            assert_eq!(op, UnaryOperator::Negate);
            assert!(matches!(
                *operand,
                Expr::BinaryOp {
                    op: BinaryOperator::Power,
                    ..
                }
            ));
        } else {
            panic!("Expected UnaryOp");
        }
    }

    #[test]
    fn test_parse_unary_plus_is_noop() {
        assert_eq!(parse_formula("=+5").unwrap(), Expr::Number(5.0));
    }

    #[test]
    fn test_parse_exponent_negative_exponent() {
        let ast = parse_formula("=2^-3").unwrap();
        if let Expr::BinaryOp { op, right, .. } = ast {
            assert_eq!(op, BinaryOperator::Power);
            assert!(matches!(
                *right,
                Expr::UnaryOp {
                    op: UnaryOperator::Negate,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_comparison() {
        let ast = parse_formula("=A1>5").unwrap();
        assert!(matches!(
            ast,
            Expr::BinaryOp {
                op: BinaryOperator::GreaterThan,
                ..
            }
        ));

        let ast = parse_formula("=A1<>B1").unwrap();
        assert!(matches!(
            ast,
            Expr::BinaryOp {
                op: BinaryOperator::NotEqual,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_concatenation() {
        let ast = parse_formula("=\"a\"&\"b\"").unwrap();
        assert!(matches!(
            ast,
            Expr::BinaryOp {
                op: BinaryOperator::Concat,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_cell_reference() {
        let ast = parse_formula("=b12").unwrap();
        if let Expr::CellRef(cell) = ast {
            assert_eq!(cell.row, 12);
            assert_eq!(cell.col, 2);
        } else {
            panic!("Expected CellRef");
        }
    }

    #[test]
    fn test_parse_range_reference() {
        let ast = parse_formula("=B3:A1").unwrap();
        if let Expr::RangeRef(range) = ast {
            assert_eq!(range.start, CellRef::new(1, 1));
            assert_eq!(range.end, CellRef::new(3, 2));
        } else {
            panic!("Expected RangeRef");
        }
    }

    #[test]
    fn test_parse_function() {
        let ast = parse_formula("=sum(1,2,3)").unwrap();
        if let Expr::Function { name, args } = ast {
            assert_eq!(name, "SUM");
            assert_eq!(args.len(), 3);
        } else {
            panic!("Expected Function");
        }

        let ast = parse_formula("=SUM()").unwrap();
        if let Expr::Function { name, args } = ast {
            assert_eq!(name, "SUM");
            assert!(args.is_empty());
        } else {
            panic!("Expected Function");
        }
    }

    #[test]
    fn test_parse_nested_function() {
        let ast = parse_formula("=IF(A1>0,SUM(B1:B10),0)").unwrap();
        if let Expr::Function { name, args } = ast {
            assert_eq!(name, "IF");
            assert_eq!(args.len(), 3);
        } else {
            panic!("Expected Function");
        }
    }

    #[test]
    fn test_parse_parentheses() {
        let ast = parse_formula("=(1+2)*3").unwrap();
        if let Expr::BinaryOp { op, left, .. } = ast {
            assert_eq!(op, BinaryOperator::Multiply);
            assert!(matches!(
                *left,
                Expr::BinaryOp {
                    op: BinaryOperator::Add,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_formula("=").is_err());
        assert!(parse_formula("=1+").is_err());
        assert!(parse_formula("=(1+2").is_err());
        assert!(parse_formula("=1 2").is_err());
        assert!(parse_formula("=SUM(1,)").is_err());
        assert!(parse_formula("=,1").is_err());
        // Bare identifier without a call is not an expression
        assert!(parse_formula("=SUM").is_err());
    }
}
