//! Go source lexer.
//!
//! Produces the full token stream of a file up front, applying Go's
//! automatic semicolon insertion, and sets comments aside (with their line
//! positions) so the parser can attach them to declarations afterwards.

use crate::error::{ParseError, ParseResult};
use crate::token::{Comment, Keyword, Token, TokenKind};

/// Operators and punctuation, longest spelling first so that the first
/// prefix match is the maximal munch.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=",
    "<=", ">=", ":=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<",
    ">>", "&^", "+", "-", "*", "/", "%", "&", "|", "^", "<", ">", "=", "!",
    "(", ")", "[", "]", "{", "}", ",", ";", ".", ":", "~",
];

/// Output of [`tokenize`].
#[derive(Debug, Default)]
pub struct Lexed {
    /// Tokens in source order, always terminated by [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
}

/// Splits `source` into tokens and comments.
///
/// # Errors
///
/// Returns a [`ParseError`] for unterminated literals or comments and for
/// characters that cannot start any Go token.
pub fn tokenize(source: &str) -> ParseResult<Lexed> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    cursor: usize,
    line: usize,
    column: usize,
    /// Set when a line break at this point would terminate a statement.
    insert_semicolon: bool,
    /// Whether a token has been produced on the current line.
    line_has_token: bool,
    out: Lexed,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: 0,
            line: 1,
            column: 1,
            insert_semicolon: false,
            line_has_token: false,
            out: Lexed::default(),
        }
    }

    fn run(mut self) -> ParseResult<Lexed> {
        // A leading byte-order mark is permitted and ignored.
        if self.source.starts_with('\u{feff}') {
            self.cursor = '\u{feff}'.len_utf8();
        }

        loop {
            let Some(ch) = self.peek_char() else {
                if self.insert_semicolon {
                    self.push(TokenKind::Semicolon, self.line, self.column);
                }
                self.push(TokenKind::Eof, self.line, self.column);
                return Ok(self.out);
            };

            match ch {
                '\n' => {
                    if self.insert_semicolon {
                        self.push(TokenKind::Semicolon, self.line, self.column);
                    }
                    self.bump_char();
                    self.line_has_token = false;
                }
                c if c.is_whitespace() => {
                    self.bump_char();
                }
                '/' if self.peek_next_char() == Some('/') => {
                    self.line_comment();
                }
                '/' if self.peek_next_char() == Some('*') => {
                    self.block_comment()?;
                }
                c if is_ident_start(c) => self.identifier_or_keyword(),
                c if c.is_ascii_digit() => self.number(),
                '.' if self
                    .peek_next_char()
                    .is_some_and(|c| c.is_ascii_digit()) =>
                {
                    self.number();
                }
                '"' => self.interpreted_string()?,
                '`' => self.raw_string()?,
                '\'' => self.rune()?,
                _ => self.operator()?,
            }
        }
    }

    fn push(&mut self, kind: TokenKind, line: usize, column: usize) {
        self.insert_semicolon = kind.ends_statement();
        if kind != TokenKind::Semicolon {
            self.line_has_token = true;
        }
        self.out.tokens.push(Token { kind, line, column });
    }

    fn line_comment(&mut self) {
        let (start, line) = (self.cursor, self.line);
        while let Some(ch) = self.peek_char() {
            if ch == '\n' {
                break;
            }
            self.bump_char();
        }
        let text = self.source[start..self.cursor].trim_end().to_owned();
        self.out.comments.push(Comment {
            text,
            line,
            end_line: line,
            trailing: self.line_has_token,
        });
    }

    fn block_comment(&mut self) -> ParseResult<()> {
        let (start, line, column) = (self.cursor, self.line, self.column);
        self.bump_char();
        self.bump_char();
        loop {
            match self.peek_char() {
                Some('*') if self.peek_next_char() == Some('/') => {
                    self.bump_char();
                    self.bump_char();
                    break;
                }
                Some(_) => {
                    self.bump_char();
                }
                None => {
                    return Err(ParseError::new(
                        line,
                        column,
                        "comment not terminated",
                    ));
                }
            }
        }

        let trailing = self.line_has_token;
        // A block comment spanning lines acts like a newline.
        if self.line > line {
            if self.insert_semicolon {
                self.push(TokenKind::Semicolon, line, column);
            }
            self.line_has_token = false;
        }
        self.out.comments.push(Comment {
            text: self.source[start..self.cursor].to_owned(),
            line,
            end_line: self.line,
            trailing,
        });
        Ok(())
    }

    fn identifier_or_keyword(&mut self) {
        let (start, line, column) = (self.cursor, self.line, self.column);
        while self.peek_char().is_some_and(is_ident_continue) {
            self.bump_char();
        }
        let ident = &self.source[start..self.cursor];
        let kind = match Keyword::from_ident(ident) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(ident.to_owned()),
        };
        self.push(kind, line, column);
    }

    /// Lexes any numeric literal. Validation is left to the Go compiler;
    /// only the extent of the literal matters here.
    fn number(&mut self) {
        let (start, line, column) = (self.cursor, self.line, self.column);
        let mut prev = '\0';
        while let Some(ch) = self.peek_char() {
            let exponent_sign = matches!(ch, '+' | '-')
                && matches!(prev, 'e' | 'E' | 'p' | 'P');
            if ch.is_ascii_alphanumeric()
                || ch == '_'
                || ch == '.'
                || exponent_sign
            {
                prev = ch;
                self.bump_char();
            } else {
                break;
            }
        }
        let text = self.source[start..self.cursor].to_owned();
        self.push(TokenKind::Literal(text), line, column);
    }

    fn interpreted_string(&mut self) -> ParseResult<()> {
        self.quoted('"', "string literal not terminated")
    }

    fn rune(&mut self) -> ParseResult<()> {
        self.quoted('\'', "rune literal not terminated")
    }

    fn quoted(&mut self, quote: char, unterminated: &str) -> ParseResult<()> {
        let (start, line, column) = (self.cursor, self.line, self.column);
        self.bump_char();
        loop {
            match self.peek_char() {
                Some('\\') => {
                    self.bump_char();
                    if self.peek_char().is_some_and(|c| c != '\n') {
                        self.bump_char();
                    }
                }
                Some(ch) if ch == quote => {
                    self.bump_char();
                    break;
                }
                Some('\n') | None => {
                    return Err(ParseError::new(line, column, unterminated));
                }
                Some(_) => {
                    self.bump_char();
                }
            }
        }
        let text = self.source[start..self.cursor].to_owned();
        self.push(TokenKind::Literal(text), line, column);
        Ok(())
    }

    fn raw_string(&mut self) -> ParseResult<()> {
        let (start, line, column) = (self.cursor, self.line, self.column);
        self.bump_char();
        loop {
            match self.peek_char() {
                Some('`') => {
                    self.bump_char();
                    break;
                }
                Some(_) => {
                    self.bump_char();
                }
                None => {
                    return Err(ParseError::new(
                        line,
                        column,
                        "raw string literal not terminated",
                    ));
                }
            }
        }
        let text = self.source[start..self.cursor].to_owned();
        self.push(TokenKind::Literal(text), line, column);
        Ok(())
    }

    fn operator(&mut self) -> ParseResult<()> {
        let (line, column) = (self.line, self.column);
        let rest = &self.source[self.cursor..];
        let Some(op) = OPERATORS.iter().copied().find(|op| rest.starts_with(op))
        else {
            let ch = self.peek_char().unwrap_or_default();
            return Err(ParseError::new(
                line,
                column,
                format!("invalid character {ch:?} (U+{:04X})", u32::from(ch)),
            ));
        };

        for _ in 0..op.len() {
            self.bump_char();
        }
        let kind = match op {
            "(" => TokenKind::LParen,
            ")" => TokenKind::RParen,
            "[" => TokenKind::LBracket,
            "]" => TokenKind::RBracket,
            "{" => TokenKind::LBrace,
            "}" => TokenKind::RBrace,
            "," => TokenKind::Comma,
            ";" => TokenKind::Semicolon,
            "." => TokenKind::Dot,
            "..." => TokenKind::Ellipsis,
            "*" => TokenKind::Star,
            "<-" => TokenKind::Arrow,
            other => TokenKind::Op(other),
        };
        self.push(kind, line, column);
        Ok(())
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.cursor..].chars().next()
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut chars = self.source[self.cursor..].chars();
        chars.next();
        chars.next()
    }

    fn bump_char(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.cursor += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}
