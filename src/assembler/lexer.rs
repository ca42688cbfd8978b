//! Lexical analysis for 6502 assembly source
//!
//! This module provides the first phase of assembly: converting source text into
//! a stream of typed tokens. The lexer separates character-level concerns (what is
//! a number? where does a comment start?) from syntactic analysis (is this a valid
//! instruction?), which lives in [`parser`](super::parser).
//!
//! **Lexer responsibilities:**
//! - Recognize token boundaries and classify tokens ([`TokenType`])
//! - Parse numeric literals (`$42` → `HexNumber(0x42)`, `%1010` → `BinaryNumber(10)`)
//! - Track source locations (line, column) for error reporting
//! - Detect lexical errors (invalid hex digits, number overflow, open strings)
//!
//! # Examples
//!
//! ```
//! use sim6502::assembler::lexer::{tokenize, TokenType};
//!
//! let tokens = tokenize("LDA #$42 ; Load accumulator").unwrap();
//!
//! // Tokens: LDA, whitespace, #, $42, whitespace, comment, EOF
//! assert_eq!(tokens.len(), 7);
//! assert_eq!(tokens[0].token_type, TokenType::Identifier("LDA".to_string()));
//! assert_eq!(tokens[2].token_type, TokenType::Hash);
//! assert_eq!(tokens[3].token_type, TokenType::HexNumber(0x42));
//! assert_eq!(tokens[3].length, 3);
//! ```
//!
//! Errors carry their location:
//!
//! ```
//! use sim6502::assembler::lexer::{tokenize, LexerError};
//!
//! let errors = tokenize("LDA $ZZ").unwrap_err();
//! assert_eq!(
//!     errors[0],
//!     LexerError::InvalidHexDigit { ch: 'Z', line: 1, column: 5 }
//! );
//! ```

use thiserror::Error;

/// Errors detected while scanning characters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    #[error("invalid hex digit '{ch}'")]
    InvalidHexDigit { ch: char, line: usize, column: usize },

    #[error("invalid binary digit '{ch}'")]
    InvalidBinaryDigit { ch: char, line: usize, column: usize },

    #[error("number {value} is larger than {max}")]
    NumberTooLarge {
        value: String,
        max: u16,
        line: usize,
        column: usize,
    },

    #[error("unterminated string")]
    UnterminatedString { line: usize, column: usize },

    #[error("unexpected character '{ch}'")]
    UnexpectedCharacter { ch: char, line: usize, column: usize },
}

impl LexerError {
    /// Returns the (line, column) where the error was detected.
    pub fn location(&self) -> (usize, usize) {
        match *self {
            LexerError::InvalidHexDigit { line, column, .. }
            | LexerError::InvalidBinaryDigit { line, column, .. }
            | LexerError::NumberTooLarge { line, column, .. }
            | LexerError::UnterminatedString { line, column }
            | LexerError::UnexpectedCharacter { line, column, .. } => (line, column),
        }
    }
}

/// Classification of lexical tokens in 6502 assembly
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    /// Mnemonics, labels, symbol references, register names (uppercase normalized)
    Identifier(String),

    /// Decimal number literal (0-65535)
    DecimalNumber(u16),
    /// Hexadecimal number literal with $ prefix
    HexNumber(u16),
    /// Binary number literal with % prefix
    BinaryNumber(u16),
    /// Double-quoted text, case preserved
    StringLiteral(String),

    /// `:` label definition suffix
    Colon,
    /// `,` operand separator, indexed addressing
    Comma,
    /// `#` immediate mode prefix
    Hash,
    /// `$` not followed by digits
    Dollar,
    /// `%` not followed by digits
    Percent,
    /// `=` constant assignment
    Equal,
    /// `(` indirect addressing open
    LParen,
    /// `)` indirect addressing close
    RParen,
    /// `.` directive prefix
    Dot,
    /// `+` expression addition
    Plus,
    /// `-` expression subtraction
    Minus,
    /// `<` low byte selector
    LessThan,
    /// `>` high byte selector
    GreaterThan,

    /// Spaces, tabs and carriage returns
    Whitespace,
    /// Line feed
    Newline,
    /// Comment text after semicolon (excluding `;` itself)
    Comment(String),
    /// End of file marker
    Eof,
}

impl TokenType {
    fn punctuation(ch: char) -> Option<TokenType> {
        let token_type = match ch {
            ':' => TokenType::Colon,
            ',' => TokenType::Comma,
            '#' => TokenType::Hash,
            '=' => TokenType::Equal,
            '(' => TokenType::LParen,
            ')' => TokenType::RParen,
            '.' => TokenType::Dot,
            '+' => TokenType::Plus,
            '-' => TokenType::Minus,
            '<' => TokenType::LessThan,
            '>' => TokenType::GreaterThan,
            _ => return None,
        };
        Some(token_type)
    }

    /// True for tokens the parser never looks at.
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenType::Whitespace | TokenType::Comment(_))
    }
}

/// A single lexical token with type, value, and source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token classification and optional parsed value
    pub token_type: TokenType,

    /// Source line number (1-indexed for user display)
    pub line: usize,

    /// Column offset within line (0-indexed)
    pub column: usize,

    /// Length in source characters, including any prefix
    pub length: usize,
}

/// Lexer state for converting source text into tokens
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current: Option<(usize, char)>,
    line: usize,
    line_start: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source text
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.char_indices();
        let current = chars.next();
        Lexer {
            source,
            chars,
            current,
            line: 1,
            line_start: 0,
        }
    }

    fn advance(&mut self) {
        self.current = self.chars.next();
    }

    fn peek(&self) -> Option<char> {
        self.current.map(|(_, ch)| ch)
    }

    fn column(&self) -> usize {
        match self.current {
            Some((pos, _)) => pos - self.line_start,
            None => self.source.len() - self.line_start,
        }
    }

    fn token(&self, token_type: TokenType, column: usize, length: usize) -> Token {
        Token {
            token_type,
            line: self.line,
            column,
            length,
        }
    }

    /// Collects characters while `accept` holds.
    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if !accept(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }

    /// Scan an identifier: [a-zA-Z_][a-zA-Z0-9_]* (uppercase normalized)
    fn scan_identifier(&mut self, start_col: usize) -> Token {
        let identifier = self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        let length = identifier.len();
        self.token(
            TokenType::Identifier(identifier.to_ascii_uppercase()),
            start_col,
            length,
        )
    }

    /// Scans digits after a `$` or `%` prefix, or a bare decimal.
    fn scan_number(
        &mut self,
        start_col: usize,
        prefix: Option<char>,
    ) -> Result<Token, LexerError> {
        let radix: u32 = match prefix {
            Some('$') => 16,
            Some('%') => 2,
            _ => 10,
        };

        let digits = self.take_while(|ch| ch.is_digit(radix));

        // $1G, %102
        if let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() && radix != 10 {
                let (line, column) = (self.line, self.column());
                return Err(match radix {
                    16 => LexerError::InvalidHexDigit { ch, line, column },
                    _ => LexerError::InvalidBinaryDigit { ch, line, column },
                });
            }
        }

        let prefix_len = prefix.map_or(0, |_| 1);
        let value = u16::from_str_radix(&digits, radix).map_err(|_| LexerError::NumberTooLarge {
            value: format!("{}{}", prefix.map(String::from).unwrap_or_default(), digits),
            max: u16::MAX,
            line: self.line,
            column: start_col,
        })?;

        let token_type = match radix {
            16 => TokenType::HexNumber(value),
            2 => TokenType::BinaryNumber(value),
            _ => TokenType::DecimalNumber(value),
        };
        Ok(self.token(token_type, start_col, digits.len() + prefix_len))
    }

    /// Scan a string literal; the opening quote is already consumed.
    fn scan_string(&mut self, start_col: usize) -> Result<Token, LexerError> {
        let text = self.take_while(|ch| ch != '"' && ch != '\n');
        if self.peek() != Some('"') {
            return Err(LexerError::UnterminatedString {
                line: self.line,
                column: start_col,
            });
        }
        self.advance();
        let length = text.chars().count() + 2;
        Ok(self.token(TokenType::StringLiteral(text), start_col, length))
    }

    /// Get the next token from the source
    fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let start_col = self.column();

        match ch {
            ' ' | '\t' | '\r' => {
                let run = self.take_while(|ch| matches!(ch, ' ' | '\t' | '\r'));
                Ok(Some(self.token(TokenType::Whitespace, start_col, run.len())))
            }

            '\n' => {
                self.advance();
                let token = self.token(TokenType::Newline, start_col, 1);
                self.line += 1;
                self.line_start = self
                    .current
                    .map(|(pos, _)| pos)
                    .unwrap_or(self.source.len());
                Ok(Some(token))
            }

            ';' => {
                self.advance();
                let comment = self.take_while(|ch| ch != '\n');
                let length = comment.len() + 1;
                Ok(Some(self.token(TokenType::Comment(comment), start_col, length)))
            }

            '$' | '%' => {
                self.advance();
                match self.peek() {
                    Some(next) if next.is_ascii_alphanumeric() => {
                        Ok(Some(self.scan_number(start_col, Some(ch))?))
                    }
                    _ => {
                        let token_type = if ch == '$' {
                            TokenType::Dollar
                        } else {
                            TokenType::Percent
                        };
                        Ok(Some(self.token(token_type, start_col, 1)))
                    }
                }
            }

            '0'..='9' => Ok(Some(self.scan_number(start_col, None)?)),

            'a'..='z' | 'A'..='Z' | '_' => Ok(Some(self.scan_identifier(start_col))),

            '"' => {
                self.advance();
                Ok(Some(self.scan_string(start_col)?))
            }

            _ => match TokenType::punctuation(ch) {
                Some(token_type) => {
                    self.advance();
                    Ok(Some(self.token(token_type, start_col, 1)))
                }
                None => Err(LexerError::UnexpectedCharacter {
                    ch,
                    line: self.line,
                    column: start_col,
                }),
            },
        }
    }
}

/// Tokenize assembly source text into a vector of tokens
///
/// Scanning continues after an error (skipping to the next whitespace or
/// comment) so that every lexical error in the source is reported.
///
/// # Examples
/// ```
/// use sim6502::assembler::lexer::tokenize;
///
/// let tokens = tokenize("LDA #$42").unwrap();
/// assert_eq!(tokens.len(), 5); // LDA, whitespace, #, $42, EOF
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, Vec<LexerError>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        match lexer.next_token() {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) => {
                tokens.push(Token {
                    token_type: TokenType::Eof,
                    line: lexer.line,
                    column: lexer.column(),
                    length: 0,
                });
                break;
            }
            Err(err) => {
                errors.push(err);
                // Resynchronize at whitespace, newline, or comment
                while let Some(ch) = lexer.peek() {
                    if matches!(ch, ' ' | '\t' | '\r' | '\n' | ';') {
                        break;
                    }
                    lexer.advance();
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

/// Token stream with lookahead for the parser.
///
/// Whitespace and comments are dropped on construction.
///
/// # Examples
/// ```
/// use sim6502::assembler::lexer::{tokenize, TokenStream, TokenType};
///
/// let mut stream = TokenStream::new(tokenize("LDA #$42").unwrap());
/// assert!(matches!(stream.peek().unwrap().token_type, TokenType::Identifier(_)));
/// stream.advance();
/// assert_eq!(stream.peek().unwrap().token_type, TokenType::Hash);
/// ```
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenStream {
            tokens: tokens
                .into_iter()
                .filter(|t| !t.token_type.is_trivia())
                .collect(),
            position: 0,
        }
    }

    /// Peek at the current token without consuming it
    #[must_use]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Peek ahead n tokens; `peek_n(0)` is `peek()`.
    #[must_use]
    pub fn peek_n(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    /// Returns true if the current token has type `token_type`.
    #[must_use]
    pub fn check(&self, token_type: &TokenType) -> bool {
        self.peek().is_some_and(|t| &t.token_type == token_type)
    }

    /// Advance past the current token. Returns false at end of stream.
    pub fn advance(&mut self) -> bool {
        if self.position < self.tokens.len() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the current token if it has type `token_type`.
    pub fn eat(&mut self, token_type: &TokenType) -> bool {
        if self.check(token_type) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// True at a newline, at EOF, or past the end.
    #[must_use]
    pub fn at_line_end(&self) -> bool {
        match self.peek() {
            Some(token) => matches!(token.token_type, TokenType::Newline | TokenType::Eof),
            None => true,
        }
    }

    /// Check if the stream is at end of file
    #[must_use]
    pub fn is_eof(&self) -> bool {
        match self.peek() {
            Some(token) => matches!(token.token_type, TokenType::Eof),
            None => true,
        }
    }

    /// Source location of the current token, for error reporting.
    #[must_use]
    pub fn current_location(&self) -> (usize, usize) {
        match self.peek().or_else(|| self.tokens.last()) {
            Some(token) => (token.line, token.column),
            None => (0, 0),
        }
    }
}
