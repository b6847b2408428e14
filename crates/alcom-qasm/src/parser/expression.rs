//! Expression parsing.
//!
//! Precedence from loosest to tightest: `+ -`, `* /`, unary minus, `^`.
//! `^` is right-associative, so `-2^2` is `-(2^2)`.

use alcom_ir::MathFn;

use super::Parser;
use crate::ast::{BinOp, Expression};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_binary_expr(0)
    }

    fn parse_binary_expr(&mut self, min_prec: u8) -> ParseResult<Expression> {
        let mut left = self.parse_unary_expr()?;

        while let Some(op) = self.peek_binary_op() {
            let prec = op_precedence(op);
            if prec < min_prec {
                break;
            }
            self.advance();

            let right = self.parse_binary_expr(prec + 1)?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> ParseResult<Expression> {
        if self.consume(&Token::Minus) {
            let expr = self.parse_unary_expr()?;
            return Ok(Expression::Neg(Box::new(expr)));
        }
        if self.consume(&Token::Plus) {
            return self.parse_unary_expr();
        }
        self.parse_power_expr()
    }

    fn parse_power_expr(&mut self) -> ParseResult<Expression> {
        let base = self.parse_primary_expr()?;
        if self.consume(&Token::Caret) {
            let exponent = self.parse_unary_expr()?;
            return Ok(Expression::Binary {
                op: BinOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_primary_expr(&mut self) -> ParseResult<Expression> {
        let token = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof("expression".into()))?;

        match token {
            Token::Int(v) => Ok(Expression::Int(v)),
            Token::Real(v) => Ok(Expression::Real(v)),
            Token::Pi => Ok(Expression::Pi),
            Token::Identifier(name) => {
                if self.check(&Token::LParen) {
                    let func = MathFn::from_name(&name).ok_or_else(|| {
                        ParseError::UndefinedIdentifier {
                            line: self.line,
                            name: name.clone(),
                        }
                    })?;
                    self.advance();
                    let arg = self.parse_expression()?;
                    self.expect(Token::RParen)?;
                    Ok(Expression::Call {
                        func,
                        arg: Box::new(arg),
                    })
                } else {
                    Ok(Expression::Identifier(name))
                }
            }
            Token::LParen => {
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            other => Err(self.unexpected("expression", &other)),
        }
    }

    fn peek_binary_op(&self) -> Option<BinOp> {
        match self.peek()? {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            _ => None,
        }
    }

    pub(super) fn parse_expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        if self.check(&Token::RParen) {
            return Ok(vec![]);
        }
        let mut exprs = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }
}

fn op_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Add | BinOp::Sub => 1,
        BinOp::Mul | BinOp::Div => 2,
        BinOp::Pow => 3,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{BinOp, Expression, Operation, StatementKind};
    use crate::parser::parse_ast;

    fn first_param(source_expr: &str) -> Expression {
        let source = format!("OPENQASM 2.0;\nqreg q[1];\nrz({source_expr}) q[0];");
        let program = parse_ast(&source).unwrap();
        match &program.statements[1].kind {
            StatementKind::Operation {
                op: Operation::Gate(call),
                ..
            } => call.params[0].clone(),
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let e = first_param("1 + 2 * 3");
        let Expression::Binary { op, right, .. } = e else {
            panic!("expected binary");
        };
        assert_eq!(op, BinOp::Add);
        assert!(matches!(*right, Expression::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        let e = first_param("-2^2");
        let Expression::Neg(inner) = e else {
            panic!("expected negation");
        };
        assert!(matches!(*inner, Expression::Binary { op: BinOp::Pow, .. }));
    }

    #[test]
    fn test_power_is_right_associative() {
        let e = first_param("2^3^2");
        let Expression::Binary { op: BinOp::Pow, right, .. } = e else {
            panic!("expected power");
        };
        assert!(matches!(*right, Expression::Binary { op: BinOp::Pow, .. }));
    }

    #[test]
    fn test_function_call() {
        let e = first_param("cos(pi/4)");
        assert!(matches!(e, Expression::Call { .. }));
    }

    #[test]
    fn test_unknown_function_is_error() {
        let source = "OPENQASM 2.0;\nqreg q[1];\nrz(atan(1)) q[0];";
        assert!(parse_ast(source).is_err());
    }
}
