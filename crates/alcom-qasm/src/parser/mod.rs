//! Parser for OpenQASM 2.0.

mod expression;
mod lowering;
mod statement;

use alcom_ir::Circuit;

use crate::ast::Program;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parse OpenQASM 2.0 source into a circuit.
///
/// Text holding more than one `OPENQASM` header is rejected with
/// [`ParseError::MultipleExperiments`] before any statement is parsed.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let program = parse_ast(source)?;
    lowering::lower_to_circuit(&program)
}

/// Parse OpenQASM 2.0 source into a syntax tree without lowering it.
pub fn parse_ast(source: &str) -> ParseResult<Program> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}

/// Count `OPENQASM` headers, i.e. the experiments in a source text.
pub fn count_experiments(source: &str) -> ParseResult<usize> {
    let tokens = tokenize(source).map_err(|(line, message)| ParseError::Lexer { line, message })?;
    Ok(tokens
        .iter()
        .filter(|t| t.token == Token::OpenQasm)
        .count())
}

pub(super) struct Parser {
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
    pub(super) line: usize,
}

impl Parser {
    fn new(source: &str) -> ParseResult<Self> {
        let tokens = tokenize(source).map_err(|(line, message)| ParseError::Lexer { line, message })?;

        let headers = tokens
            .iter()
            .filter(|t| t.token == Token::OpenQasm)
            .count();
        if headers > 1 {
            return Err(ParseError::MultipleExperiments(headers));
        }

        Ok(Self {
            tokens,
            pos: 0,
            line: 1,
        })
    }

    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Line of the next token, or of the last one at end of input.
    pub(super) fn peek_line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(self.line, |t| t.line)
    }

    pub(super) fn advance(&mut self) -> Option<Token> {
        let spanned = self.tokens.get(self.pos)?;
        self.line = spanned.line;
        let token = spanned.token.clone();
        self.pos += 1;
        Some(token)
    }

    pub(super) fn unexpected(&self, expected: &str, found: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            line: self.line,
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    #[allow(clippy::needless_pass_by_value)]
    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("'{expected}'")))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(self.unexpected(&format!("'{expected}'"), &found));
        }
        Ok(())
    }

    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn parse_program(&mut self) -> ParseResult<Program> {
        if !self.consume(&Token::OpenQasm) {
            return Err(ParseError::MissingHeader);
        }
        let version = self.parse_version()?;
        self.expect(Token::Semicolon)?;

        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program {
            version,
            statements,
        })
    }

    fn parse_version(&mut self) -> ParseResult<String> {
        let (version, major) = match self.advance() {
            Some(Token::Real(v)) => (format!("{v:?}"), v),
            #[allow(clippy::cast_precision_loss)]
            Some(Token::Int(v)) => (format!("{v}.0"), v as f64),
            Some(other) => return Err(self.unexpected("version number", &other)),
            None => return Err(ParseError::UnexpectedEof("version number".into())),
        };
        if major.trunc() != 2.0 {
            return Err(ParseError::InvalidVersion {
                line: self.line,
                version,
            });
        }
        Ok(version)
    }

    pub(super) fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            Some(other) => Err(self.unexpected("identifier", &other)),
            None => Err(ParseError::UnexpectedEof("identifier".into())),
        }
    }

    pub(super) fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.parse_identifier()?);
        }
        Ok(ids)
    }

    pub(super) fn parse_int(&mut self) -> ParseResult<u64> {
        match self.advance() {
            Some(Token::Int(v)) => Ok(v),
            Some(other) => Err(self.unexpected("integer", &other)),
            None => Err(ParseError::UnexpectedEof("integer".into())),
        }
    }

    /// An integer that must fit a register size or index.
    pub(super) fn parse_u32(&mut self) -> ParseResult<u32> {
        let value = self.parse_int()?;
        u32::try_from(value).map_err(|_| ParseError::InvalidExpression {
            line: self.line,
            message: format!("integer {value} is too large"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alcom_ir::{ClbitId, InstructionKind, QubitId, StandardGate};

    #[test]
    fn test_parse_bell() {
        let source = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[2];
            creg c[2];
            h q[0];
            cx q[0], q[1];
            measure q -> c;
        "#;

        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.len(), 4);
        let last = &circuit.instructions()[3];
        assert_eq!(last.kind, InstructionKind::Measure);
        assert_eq!(last.qubits, vec![QubitId(1)]);
        assert_eq!(last.clbits, vec![ClbitId(1)]);
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(parse("qreg q[1];"), Err(ParseError::MissingHeader)));
    }

    #[test]
    fn test_rejects_version_three() {
        let err = parse("OPENQASM 3.0;\nqubit q;").unwrap_err();
        assert!(matches!(err, ParseError::InvalidVersion { line: 1, .. }));
    }

    #[test]
    fn test_rejects_multiple_experiments() {
        let source = "OPENQASM 2.0;\nqreg q[1];\nOPENQASM 2.0;\nqreg r[1];";
        assert!(matches!(
            parse(source),
            Err(ParseError::MultipleExperiments(2))
        ));
        assert_eq!(count_experiments(source).unwrap(), 2);
    }

    #[test]
    fn test_error_reports_line() {
        let source = "OPENQASM 2.0;\nqreg q[2];\n\nfoo q[0];\n";
        let err = parse(source).unwrap_err();
        assert!(matches!(err, ParseError::UnknownGate { line: 4, ref name } if name == "foo"));
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn test_builtin_u_and_cx() {
        let source = "OPENQASM 2.0;\nqreg q[2];\nU(pi, 0, pi) q[0];\nCX q[0], q[1];";
        let circuit = parse(source).unwrap();
        assert!(matches!(
            circuit.instructions()[0].as_gate(),
            Some(StandardGate::U(..))
        ));
        assert_eq!(circuit.instructions()[1].as_gate(), Some(&StandardGate::CX));
    }
}
