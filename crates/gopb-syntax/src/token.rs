//! Token definitions shared by the lexer and parser.

use std::fmt;

/// Go's reserved words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,
}

impl Keyword {
    /// Looks up the keyword spelled by `ident`, if any.
    pub fn from_ident(ident: &str) -> Option<Self> {
        let keyword = match ident {
            "break" => Self::Break,
            "case" => Self::Case,
            "chan" => Self::Chan,
            "const" => Self::Const,
            "continue" => Self::Continue,
            "default" => Self::Default,
            "defer" => Self::Defer,
            "else" => Self::Else,
            "fallthrough" => Self::Fallthrough,
            "for" => Self::For,
            "func" => Self::Func,
            "go" => Self::Go,
            "goto" => Self::Goto,
            "if" => Self::If,
            "import" => Self::Import,
            "interface" => Self::Interface,
            "map" => Self::Map,
            "package" => Self::Package,
            "range" => Self::Range,
            "return" => Self::Return,
            "select" => Self::Select,
            "struct" => Self::Struct,
            "switch" => Self::Switch,
            "type" => Self::Type,
            "var" => Self::Var,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Break => "break",
            Self::Case => "case",
            Self::Chan => "chan",
            Self::Const => "const",
            Self::Continue => "continue",
            Self::Default => "default",
            Self::Defer => "defer",
            Self::Else => "else",
            Self::Fallthrough => "fallthrough",
            Self::For => "for",
            Self::Func => "func",
            Self::Go => "go",
            Self::Goto => "goto",
            Self::If => "if",
            Self::Import => "import",
            Self::Interface => "interface",
            Self::Map => "map",
            Self::Package => "package",
            Self::Range => "range",
            Self::Return => "return",
            Self::Select => "select",
            Self::Struct => "struct",
            Self::Switch => "switch",
            Self::Type => "type",
            Self::Var => "var",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    /// Number, string, raw string or rune literal, kept as written.
    Literal(String),
    Keyword(Keyword),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    /// Explicit `;` or one inserted at a line break.
    Semicolon,
    Dot,
    Ellipsis,
    Star,
    /// `<-`
    Arrow,
    /// Any other operator or punctuation.
    Op(&'static str),
    Eof,
}

impl TokenKind {
    /// Whether a line break directly after this token ends the statement.
    pub(crate) fn ends_statement(&self) -> bool {
        match self {
            Self::Ident(_)
            | Self::Literal(_)
            | Self::RParen
            | Self::RBracket
            | Self::RBrace => true,
            Self::Keyword(kw) => matches!(
                kw,
                Keyword::Break
                    | Keyword::Continue
                    | Keyword::Fallthrough
                    | Keyword::Return
            ),
            Self::Op(op) => matches!(*op, "++" | "--"),
            _ => false,
        }
    }

    pub(crate) fn is_open_delim(&self) -> bool {
        matches!(self, Self::LParen | Self::LBracket | Self::LBrace)
    }

    pub(crate) fn is_close_delim(&self) -> bool {
        matches!(self, Self::RParen | Self::RBracket | Self::RBrace)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "identifier `{name}`"),
            Self::Literal(lit) => write!(f, "literal {lit}"),
            Self::Keyword(kw) => write!(f, "keyword `{}`", kw.as_str()),
            Self::LParen => f.write_str("`(`"),
            Self::RParen => f.write_str("`)`"),
            Self::LBracket => f.write_str("`[`"),
            Self::RBracket => f.write_str("`]`"),
            Self::LBrace => f.write_str("`{`"),
            Self::RBrace => f.write_str("`}`"),
            Self::Comma => f.write_str("`,`"),
            Self::Semicolon => f.write_str("`;` or newline"),
            Self::Dot => f.write_str("`.`"),
            Self::Ellipsis => f.write_str("`...`"),
            Self::Star => f.write_str("`*`"),
            Self::Arrow => f.write_str("`<-`"),
            Self::Op(op) => write!(f, "`{op}`"),
            Self::Eof => f.write_str("end of file"),
        }
    }
}

/// A token with the 1-based position of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

/// A comment as written in the source, markers included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub line: usize,
    pub end_line: usize,
    /// Whether a token precedes the comment on its first line.
    pub trailing: bool,
}
