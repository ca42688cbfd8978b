//! Assembly source parser
//!
//! Turns the token stream into one [`AssemblyLine`] per source line. The
//! parser only checks syntax; whether a mnemonic exists or a symbol is
//! defined is decided by the passes in [`super`].
//!
//! Grammar, one statement per line:
//!
//! ```text
//! line      := [label ':'] [statement] [comment]
//! statement := NAME '=' expr
//!            | '.' directive args
//!            | MNEMONIC [operand]
//! operand   := 'A' | '#' expr | expr [',' ('X'|'Y')]
//!            | '(' expr ')' | '(' expr ',' 'X' ')' | '(' expr ')' ',' 'Y'
//! expr      := ['<'|'>'] ['-'] term (('+'|'-') term)*
//! term      := $hex | %binary | decimal | NAME
//! ```

use crate::assembler::lexer::{tokenize, Token, TokenStream, TokenType};
use crate::assembler::{AssemblerError, ErrorType};

/// Low/high byte selection applied to a whole expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteSelector {
    /// `<expr`
    Low,
    /// `>expr`
    High,
}

/// A single operand of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A numeric literal. `wide` is true when the literal was written with
    /// more than two hex digits or its value exceeds 255.
    Number { value: u16, wide: bool },
    /// A label or constant reference.
    Symbol(String),
}

/// An additive expression with optional byte selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub selector: Option<ByteSelector>,
    /// Terms with their sign; the first term may be negated.
    pub terms: Vec<(bool, Term)>,
}

impl Expr {
    /// A plain positive literal.
    pub fn number(value: u16) -> Self {
        Expr {
            selector: None,
            terms: vec![(
                false,
                Term::Number {
                    value,
                    wide: value > 0xFF,
                },
            )],
        }
    }
}

/// Operand syntax, before an addressing mode is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Nothing after the mnemonic
    None,
    /// `A`
    Accumulator,
    /// `#expr`
    Immediate(Expr),
    /// `expr` (zero page, absolute, or a branch target)
    Direct(Expr),
    /// `expr,X`
    IndexedX(Expr),
    /// `expr,Y`
    IndexedY(Expr),
    /// `(expr)`
    Indirect(Expr),
    /// `(expr,X)`
    IndirectX(Expr),
    /// `(expr),Y`
    IndirectY(Expr),
}

impl Operand {
    /// The expression inside the operand, if any.
    pub fn expr(&self) -> Option<&Expr> {
        match self {
            Operand::None | Operand::Accumulator => None,
            Operand::Immediate(e)
            | Operand::Direct(e)
            | Operand::IndexedX(e)
            | Operand::IndexedY(e)
            | Operand::Indirect(e)
            | Operand::IndirectX(e)
            | Operand::IndirectY(e) => Some(e),
        }
    }
}

/// One item of a `.byte` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataItem {
    Expr(Expr),
    Text(String),
}

/// What a line does, apart from defining a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `MNEMONIC operand`; the mnemonic is validated later
    Instruction { mnemonic: String, operand: Operand },
    /// `NAME = expr`
    Constant { name: String, value: Expr },
    /// `.org expr`
    Origin(Expr),
    /// `.byte item, ...`
    Byte(Vec<DataItem>),
    /// `.word expr, ...`
    Word(Vec<Expr>),
}

/// A parsed line of assembly source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyLine {
    /// Line number in source file (1-indexed)
    pub line_number: usize,

    /// Label defined on this line and its column
    pub label: Option<(String, usize)>,

    /// Statement on this line, if any
    pub statement: Option<Statement>,

    /// Column where the statement starts
    pub column: usize,

    /// The source text of the line, without the line terminator
    pub text: String,
}

/// Parses a whole source listing.
///
/// Returns the first lexical or syntax error.
///
/// # Examples
///
/// ```
/// use sim6502::assembler::parser::{parse_source, Operand, Statement};
///
/// let lines = parse_source("start: LDA #$01 ; load\n  JMP start").unwrap();
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[0].label.as_ref().map(|(n, _)| n.as_str()), Some("START"));
/// assert!(matches!(
///     &lines[1].statement,
///     Some(Statement::Instruction { mnemonic, operand: Operand::Direct(_) }) if mnemonic == "JMP"
/// ));
/// ```
pub fn parse_source(source: &str) -> Result<Vec<AssemblyLine>, AssemblerError> {
    match parse_prefix(source) {
        (lines, None) => Ok(lines),
        (_, Some(err)) => Err(err),
    }
}

/// Parses `source` up to its first syntax error.
///
/// Returns every line before the failing one, plus the error if there was
/// one, so callers can check the earlier lines first.
pub(crate) fn parse_prefix(source: &str) -> (Vec<AssemblyLine>, Option<AssemblerError>) {
    let texts: Vec<&str> = source
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .collect();
    let line_text = |line: usize| texts.get(line.wrapping_sub(1)).copied().unwrap_or("");

    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(errors) => {
            // tokenize reports at least one error on failure
            let (line, column, message) = errors
                .first()
                .map(|e| {
                    let (line, column) = e.location();
                    (line, column, e.to_string())
                })
                .unwrap_or((1, 0, "invalid source".to_string()));
            let err = AssemblerError::new(ErrorType::SyntaxError, line, column, line_text(line), message);

            // Lexing is line-local, so the lines above the error parse on their own
            let lines = if line > 1 && line <= texts.len() {
                parse_prefix(&texts[..line - 1].join("\n")).0
            } else {
                Vec::new()
            };
            return (lines, Some(err));
        }
    };

    let mut stream = TokenStream::new(tokens);
    let mut lines = Vec::with_capacity(texts.len());

    for (index, text) in texts.iter().enumerate() {
        let line_number = index + 1;
        let mut parser = LineParser {
            stream: &mut stream,
            line_number,
            text,
        };
        match parser.parse_line() {
            Ok(line) => lines.push(line),
            Err(err) => return (lines, Some(err)),
        }

        // Each line ends at a newline or EOF
        if !stream.eat(&TokenType::Newline) && !stream.is_eof() {
            let (line, column) = stream.current_location();
            let err = AssemblerError::new(
                ErrorType::SyntaxError,
                line,
                column,
                line_text(line),
                "unexpected token".to_string(),
            );
            // The line parsed, but trailing tokens make it invalid
            lines.pop();
            return (lines, Some(err));
        }
    }

    (lines, None)
}

struct LineParser<'s, 't> {
    stream: &'s mut TokenStream,
    line_number: usize,
    text: &'t str,
}

impl LineParser<'_, '_> {
    fn error(&self, error_type: ErrorType, column: usize, message: impl Into<String>) -> AssemblerError {
        AssemblerError::new(error_type, self.line_number, column, self.text, message.into())
    }

    fn column(&self) -> usize {
        self.stream.current_location().1
    }

    fn unexpected(&self, expected: &str) -> AssemblerError {
        let found = match self.stream.peek().map(|t| &t.token_type) {
            Some(TokenType::Newline) | Some(TokenType::Eof) | None => "end of line".to_string(),
            Some(other) => describe(other),
        };
        self.error(
            ErrorType::SyntaxError,
            self.column(),
            format!("expected {}, found {}", expected, found),
        )
    }

    fn identifier(&mut self) -> Option<(String, usize)> {
        match self.stream.peek() {
            Some(Token {
                token_type: TokenType::Identifier(name),
                column,
                ..
            }) => {
                let result = (name.clone(), *column);
                self.stream.advance();
                Some(result)
            }
            _ => None,
        }
    }

    fn peek_is(&self, n: usize, token_type: &TokenType) -> bool {
        self.stream
            .peek_n(n)
            .is_some_and(|t| &t.token_type == token_type)
    }

    fn parse_line(&mut self) -> Result<AssemblyLine, AssemblerError> {
        let mut line = AssemblyLine {
            line_number: self.line_number,
            label: None,
            statement: None,
            column: 0,
            text: self.text.to_string(),
        };

        // label:
        if self.peek_is(1, &TokenType::Colon) {
            if let Some(label) = self.identifier() {
                self.stream.advance();
                line.label = Some(label);
            } else {
                return Err(self.error(
                    ErrorType::InvalidLabel,
                    self.column(),
                    "label must start with a letter or underscore",
                ));
            }
        }

        if self.stream.at_line_end() {
            return Ok(line);
        }

        line.column = self.column();
        line.statement = Some(self.parse_statement()?);

        if !self.stream.at_line_end() {
            return Err(self.unexpected("end of line"));
        }
        Ok(line)
    }

    fn parse_statement(&mut self) -> Result<Statement, AssemblerError> {
        if self.stream.eat(&TokenType::Dot) {
            let column = self.column();
            let Some((name, _)) = self.identifier() else {
                return Err(self.error(ErrorType::InvalidDirective, column, "missing directive name"));
            };
            return self.parse_directive(&name, column);
        }

        let Some((name, column)) = self.identifier() else {
            return Err(self.unexpected("instruction, directive or label"));
        };

        if self.stream.eat(&TokenType::Equal) {
            let value = self.parse_expr()?;
            return Ok(Statement::Constant { name, value });
        }

        // DCB is accepted as a spelling of .byte
        if name == "DCB" {
            return self.parse_directive("BYTE", column);
        }

        let operand = self.parse_operand()?;
        Ok(Statement::Instruction {
            mnemonic: name,
            operand,
        })
    }

    fn parse_directive(&mut self, name: &str, column: usize) -> Result<Statement, AssemblerError> {
        match name {
            "ORG" => Ok(Statement::Origin(self.parse_expr()?)),
            "BYTE" | "DB" => {
                let mut items = vec![self.parse_data_item()?];
                while self.stream.eat(&TokenType::Comma) {
                    items.push(self.parse_data_item()?);
                }
                Ok(Statement::Byte(items))
            }
            "WORD" | "DW" => {
                let mut items = vec![self.parse_expr()?];
                while self.stream.eat(&TokenType::Comma) {
                    items.push(self.parse_expr()?);
                }
                Ok(Statement::Word(items))
            }
            other => Err(self.error(
                ErrorType::InvalidDirective,
                column,
                format!("unknown directive '.{}'", other.to_ascii_lowercase()),
            )),
        }
    }

    fn parse_data_item(&mut self) -> Result<DataItem, AssemblerError> {
        if let Some(Token {
            token_type: TokenType::StringLiteral(text),
            ..
        }) = self.stream.peek()
        {
            let text = text.clone();
            self.stream.advance();
            return Ok(DataItem::Text(text));
        }
        self.parse_expr().map(DataItem::Expr)
    }

    /// Consumes `,X` or `,Y` and returns the register letter.
    fn parse_index(&mut self) -> Result<char, AssemblerError> {
        let column = self.column();
        match self.identifier() {
            Some((reg, _)) if reg == "X" => Ok('X'),
            Some((reg, _)) if reg == "Y" => Ok('Y'),
            Some((other, _)) => Err(self.error(
                ErrorType::SyntaxError,
                column,
                format!("expected X or Y, found {}", other),
            )),
            None => Err(self.unexpected("X or Y")),
        }
    }

    fn expect(&mut self, token_type: TokenType, what: &str) -> Result<(), AssemblerError> {
        if self.stream.eat(&token_type) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, AssemblerError> {
        if self.stream.at_line_end() {
            return Ok(Operand::None);
        }

        // `A` alone is the accumulator; labels may not be called A
        if let Some(Token {
            token_type: TokenType::Identifier(name),
            ..
        }) = self.stream.peek()
        {
            if name == "A" && self.stream.peek_n(1).map_or(true, |t| {
                matches!(t.token_type, TokenType::Newline | TokenType::Eof)
            }) {
                self.stream.advance();
                return Ok(Operand::Accumulator);
            }
        }

        if self.stream.eat(&TokenType::Hash) {
            return Ok(Operand::Immediate(self.parse_expr()?));
        }

        if self.stream.eat(&TokenType::LParen) {
            let expr = self.parse_expr()?;
            if self.stream.eat(&TokenType::Comma) {
                let column = self.column();
                if self.parse_index()? != 'X' {
                    return Err(self.error(
                        ErrorType::InvalidAddressingMode,
                        column,
                        "indexed indirect addressing requires X: (addr,X)",
                    ));
                }
                self.expect(TokenType::RParen, "')'")?;
                return Ok(Operand::IndirectX(expr));
            }
            self.expect(TokenType::RParen, "')'")?;
            if self.stream.eat(&TokenType::Comma) {
                let column = self.column();
                if self.parse_index()? != 'Y' {
                    return Err(self.error(
                        ErrorType::InvalidAddressingMode,
                        column,
                        "indirect indexed addressing requires Y: (addr),Y",
                    ));
                }
                return Ok(Operand::IndirectY(expr));
            }
            return Ok(Operand::Indirect(expr));
        }

        let expr = self.parse_expr()?;
        if self.stream.eat(&TokenType::Comma) {
            return Ok(match self.parse_index()? {
                'X' => Operand::IndexedX(expr),
                _ => Operand::IndexedY(expr),
            });
        }
        Ok(Operand::Direct(expr))
    }

    fn parse_expr(&mut self) -> Result<Expr, AssemblerError> {
        let selector = if self.stream.eat(&TokenType::LessThan) {
            Some(ByteSelector::Low)
        } else if self.stream.eat(&TokenType::GreaterThan) {
            Some(ByteSelector::High)
        } else {
            None
        };

        let negative = self.stream.eat(&TokenType::Minus);
        let mut terms = vec![(negative, self.parse_term()?)];

        loop {
            let negative = if self.stream.eat(&TokenType::Plus) {
                false
            } else if self.stream.eat(&TokenType::Minus) {
                true
            } else {
                break;
            };
            terms.push((negative, self.parse_term()?));
        }

        Ok(Expr { selector, terms })
    }

    fn parse_term(&mut self) -> Result<Term, AssemblerError> {
        let Some(token) = self.stream.peek() else {
            return Err(self.unexpected("a number or symbol"));
        };

        let term = match token.token_type {
            TokenType::HexNumber(value) => Term::Number {
                value,
                // `$` plus more than two digits
                wide: token.length > 3 || value > 0xFF,
            },
            TokenType::DecimalNumber(value) | TokenType::BinaryNumber(value) => Term::Number {
                value,
                wide: value > 0xFF,
            },
            TokenType::Identifier(ref name) => Term::Symbol(name.clone()),
            _ => return Err(self.unexpected("a number or symbol")),
        };
        self.stream.advance();
        Ok(term)
    }
}

fn describe(token_type: &TokenType) -> String {
    match token_type {
        TokenType::Identifier(name) => format!("'{}'", name),
        TokenType::DecimalNumber(v) => v.to_string(),
        TokenType::HexNumber(v) => format!("${:X}", v),
        TokenType::BinaryNumber(v) => format!("%{:b}", v),
        TokenType::StringLiteral(s) => format!("\"{}\"", s),
        TokenType::Colon => "':'".into(),
        TokenType::Comma => "','".into(),
        TokenType::Hash => "'#'".into(),
        TokenType::Dollar => "'$'".into(),
        TokenType::Percent => "'%'".into(),
        TokenType::Equal => "'='".into(),
        TokenType::LParen => "'('".into(),
        TokenType::RParen => "')'".into(),
        TokenType::Dot => "'.'".into(),
        TokenType::Plus => "'+'".into(),
        TokenType::Minus => "'-'".into(),
        TokenType::LessThan => "'<'".into(),
        TokenType::GreaterThan => "'>'".into(),
        TokenType::Whitespace | TokenType::Comment(_) => "whitespace".into(),
        TokenType::Newline | TokenType::Eof => "end of line".into(),
    }
}
