//! Statement parsing.

use super::Parser;
use crate::ast::{
    Argument, Condition, GateBodyOp, GateCall, GateDef, Operation, Statement, StatementKind,
};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let line = self.peek_line();
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        let kind = match token {
            Token::Include => self.parse_include()?,
            Token::QReg => {
                self.advance();
                let (name, size) = self.parse_register_decl()?;
                StatementKind::QReg { name, size }
            }
            Token::CReg => {
                self.advance();
                let (name, size) = self.parse_register_decl()?;
                StatementKind::CReg { name, size }
            }
            Token::Gate => StatementKind::GateDef(self.parse_gate_def()?),
            Token::Opaque => self.parse_opaque()?,
            Token::Barrier => {
                self.advance();
                let args = self.parse_argument_list()?;
                self.expect(Token::Semicolon)?;
                StatementKind::Barrier(args)
            }
            Token::If => self.parse_if()?,
            Token::Measure | Token::Reset | Token::Identifier(_) => StatementKind::Operation {
                op: self.parse_operation()?,
                condition: None,
            },
            other => {
                self.advance();
                return Err(self.unexpected("statement", &other));
            }
        };

        Ok(Statement { line, kind })
    }

    fn parse_include(&mut self) -> ParseResult<StatementKind> {
        self.expect(Token::Include)?;
        let file = match self.advance() {
            Some(Token::Str(s)) => s,
            Some(other) => return Err(self.unexpected("file name", &other)),
            None => return Err(ParseError::UnexpectedEof("file name".into())),
        };
        self.expect(Token::Semicolon)?;
        Ok(StatementKind::Include(file))
    }

    /// `name[size];` after the `qreg`/`creg` keyword.
    fn parse_register_decl(&mut self) -> ParseResult<(String, u32)> {
        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let size = self.parse_u32()?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;
        Ok((name, size))
    }

    /// Optional `(a, b, ...)` parameter names followed by qubit names.
    fn parse_gate_signature(&mut self) -> ParseResult<(String, Vec<String>, Vec<String>)> {
        let name = self.parse_identifier()?;
        let mut params = Vec::new();
        if self.consume(&Token::LParen) {
            if !self.check(&Token::RParen) {
                params = self.parse_identifier_list()?;
            }
            self.expect(Token::RParen)?;
        }
        let qubits = self.parse_identifier_list()?;
        Ok((name, params, qubits))
    }

    fn parse_gate_def(&mut self) -> ParseResult<GateDef> {
        self.expect(Token::Gate)?;
        let (name, params, qubits) = self.parse_gate_signature()?;
        self.expect(Token::LBrace)?;

        let mut body = Vec::new();
        while !self.consume(&Token::RBrace) {
            match self.peek().cloned() {
                Some(Token::Barrier) => {
                    self.advance();
                    let args = self.parse_identifier_list()?;
                    self.expect(Token::Semicolon)?;
                    body.push(GateBodyOp::Barrier(args));
                }
                Some(Token::Identifier(_)) => {
                    let call = self.parse_gate_call()?;
                    if let Some(arg) = call.args.iter().find(|a| a.index.is_some()) {
                        return Err(ParseError::UnexpectedToken {
                            line: self.line,
                            expected: "qubit argument name".into(),
                            found: format!("{}[..]", arg.register),
                        });
                    }
                    body.push(GateBodyOp::Call(call));
                }
                Some(other) => {
                    self.advance();
                    return Err(self.unexpected("gate call or '}'", &other));
                }
                None => return Err(ParseError::UnexpectedEof("'}'".into())),
            }
        }

        Ok(GateDef {
            name,
            params,
            qubits,
            body,
        })
    }

    fn parse_opaque(&mut self) -> ParseResult<StatementKind> {
        self.expect(Token::Opaque)?;
        let (name, params, qubits) = self.parse_gate_signature()?;
        self.expect(Token::Semicolon)?;
        Ok(StatementKind::Opaque {
            name,
            params,
            qubits,
        })
    }

    /// `if (creg == value) <operation>`
    fn parse_if(&mut self) -> ParseResult<StatementKind> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let register = self.parse_identifier()?;
        self.expect(Token::EqEq)?;
        let value = self.parse_int()?;
        self.expect(Token::RParen)?;

        let op = self.parse_operation()?;
        Ok(StatementKind::Operation {
            op,
            condition: Some(Condition { register, value }),
        })
    }

    fn parse_operation(&mut self) -> ParseResult<Operation> {
        match self.peek().cloned() {
            Some(Token::Measure) => {
                self.advance();
                let qubit = self.parse_argument()?;
                self.expect(Token::Arrow)?;
                let bit = self.parse_argument()?;
                self.expect(Token::Semicolon)?;
                Ok(Operation::Measure { qubit, bit })
            }
            Some(Token::Reset) => {
                self.advance();
                let qubit = self.parse_argument()?;
                self.expect(Token::Semicolon)?;
                Ok(Operation::Reset(qubit))
            }
            Some(Token::Identifier(_)) => Ok(Operation::Gate(self.parse_gate_call()?)),
            Some(other) => {
                self.advance();
                Err(self.unexpected("quantum operation", &other))
            }
            None => Err(ParseError::UnexpectedEof("quantum operation".into())),
        }
    }

    /// `name(params) args;`
    fn parse_gate_call(&mut self) -> ParseResult<GateCall> {
        let name = self.parse_identifier()?;
        let mut params = Vec::new();
        if self.consume(&Token::LParen) {
            params = self.parse_expression_list()?;
            self.expect(Token::RParen)?;
        }
        let args = self.parse_argument_list()?;
        self.expect(Token::Semicolon)?;
        Ok(GateCall { name, params, args })
    }

    fn parse_argument_list(&mut self) -> ParseResult<Vec<Argument>> {
        let mut args = vec![self.parse_argument()?];
        while self.consume(&Token::Comma) {
            args.push(self.parse_argument()?);
        }
        Ok(args)
    }

    fn parse_argument(&mut self) -> ParseResult<Argument> {
        let register = self.parse_identifier()?;
        let index = if self.consume(&Token::LBracket) {
            let index = self.parse_u32()?;
            self.expect(Token::RBracket)?;
            Some(index)
        } else {
            None
        };
        Ok(Argument { register, index })
    }
}
