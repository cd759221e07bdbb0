//! Recursive-descent parser for Go top-level declarations.
//!
//! Function bodies, `import`, `var` and `const` declarations and interface
//! method sets are skipped by delimiter matching; everything that can show
//! up in a signature or a struct is parsed into [`TypeExpr`].

use tracing::{debug, instrument};

use crate::ast::{
    Decl, FuncDecl, Param, SourceFile, StructField, TypeExpr, TypeSpec,
};
use crate::comments::CommentMap;
use crate::error::{ParseError, ParseResult};
use crate::lexer::tokenize;
use crate::token::{Keyword, Token, TokenKind};

/// Parses the top-level declarations of one Go source file.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered. No partial tree is
/// produced.
#[instrument(skip_all, fields(bytes = source.len()))]
pub fn parse_file(source: &str) -> ParseResult<SourceFile> {
    let lexed = tokenize(source)?;
    let mut parser = Parser {
        tokens: lexed.tokens,
        pos: 0,
        comments: CommentMap::new(lexed.comments),
    };
    let file = parser.source_file()?;
    debug!(
        package = %file.package,
        decls = file.decls.len(),
        "parsed source file"
    );
    Ok(file)
}

/// A parameter list entry before Go's grouping rule has been applied.
enum ParamEntry {
    /// A lone identifier: a name in a named list, a type otherwise.
    Bare(String),
    Named(String, TypeExpr),
    Type(TypeExpr),
}

struct Parser {
    /// Always terminated by an `Eof` token.
    tokens: Vec<Token>,
    pos: usize,
    comments: CommentMap,
}

impl Parser {
    fn source_file(&mut self) -> ParseResult<SourceFile> {
        self.expect(&TokenKind::Keyword(Keyword::Package))?;
        let (package, _) = self.expect_ident()?;
        self.expect_decl_end()?;

        let mut decls = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Func) => {
                    decls.push(Decl::Func(self.func_decl()?));
                }
                TokenKind::Keyword(Keyword::Type) => {
                    let specs = self.type_decl()?;
                    decls.extend(specs.into_iter().map(Decl::Type));
                }
                TokenKind::Keyword(
                    Keyword::Import | Keyword::Var | Keyword::Const,
                ) => self.skip_gen_decl()?,
                other => {
                    return Err(self.error(format!(
                        "expected declaration, found {other}"
                    )));
                }
            }
        }

        Ok(SourceFile { package, decls })
    }

    // -----------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------

    fn func_decl(&mut self) -> ParseResult<FuncDecl> {
        let line = self.advance().line;
        let doc = self.comments.doc_before(line);

        let receiver = if self.peek() == &TokenKind::LParen {
            self.params()?.into_iter().next()
        } else {
            None
        };
        let (name, _) = self.expect_ident()?;

        let type_params = if self.peek() == &TokenKind::LBracket {
            self.type_params()?
        } else {
            Vec::new()
        };
        let params = self.params()?;
        let results = self.results()?;
        if self.peek() == &TokenKind::LBrace {
            self.skip_balanced()?;
        }
        self.expect_decl_end()?;

        Ok(FuncDecl {
            name,
            doc,
            receiver,
            type_params,
            params,
            results,
            line,
        })
    }

    fn type_decl(&mut self) -> ParseResult<Vec<TypeSpec>> {
        let line = self.advance().line;
        let group_doc = self.comments.doc_before(line);

        let mut specs = Vec::new();
        if self.eat(&TokenKind::LParen) {
            loop {
                match self.peek() {
                    TokenKind::RParen => {
                        self.advance();
                        break;
                    }
                    TokenKind::Semicolon => {
                        self.advance();
                    }
                    _ => {
                        specs.push(self.type_spec(&group_doc)?);
                        self.expect_element_end(&TokenKind::RParen)?;
                    }
                }
            }
        } else {
            specs.push(self.type_spec(&group_doc)?);
        }
        self.expect_decl_end()?;

        Ok(specs)
    }

    fn type_spec(&mut self, group_doc: &str) -> ParseResult<TypeSpec> {
        let (name, line) = self.expect_ident()?;
        let own_doc = self.comments.doc_before(line);
        let doc = if own_doc.is_empty() {
            group_doc.to_owned()
        } else {
            own_doc
        };

        let type_params = if self.peek() == &TokenKind::LBracket
            && self.starts_type_params()
        {
            self.type_params()?
        } else {
            Vec::new()
        };
        // Aliases are recorded like definitions.
        self.eat(&TokenKind::Op("="));
        let ty = self.type_expr()?;

        Ok(TypeSpec {
            name,
            doc,
            type_params,
            ty,
        })
    }

    /// Distinguishes `Name[T any]` from the array type in `Name [N]T`: a
    /// type parameter list opens with a name followed by a constraint or
    /// another name. `[N]`, `[N*2]` and `[pkg.N]` are array lengths.
    fn starts_type_params(&self) -> bool {
        matches!(self.peek_at(1), TokenKind::Ident(_))
            && matches!(
                self.peek_at(2),
                TokenKind::Ident(_)
                    | TokenKind::Comma
                    | TokenKind::LBracket
                    | TokenKind::Arrow
                    | TokenKind::Op("~")
                    | TokenKind::Keyword(
                        Keyword::Interface
                            | Keyword::Func
                            | Keyword::Map
                            | Keyword::Chan
                            | Keyword::Struct
                    )
            )
    }

    /// Parses `[K comparable, V any]` and returns the parameter names.
    /// Constraints are checked for balance but not retained.
    fn type_params(&mut self) -> ParseResult<Vec<String>> {
        self.expect(&TokenKind::LBracket)?;
        let mut names = Vec::new();
        while self.peek() != &TokenKind::RBracket {
            let (name, _) = self.expect_ident()?;
            names.push(name);
            loop {
                let kind = self.peek().clone();
                match kind {
                    TokenKind::Comma | TokenKind::RBracket => break,
                    TokenKind::Eof => {
                        return Err(self.error("unexpected end of file"));
                    }
                    open if open.is_open_delim() => self.skip_balanced()?,
                    close if close.is_close_delim() => {
                        return Err(self.error(format!("unexpected {close}")));
                    }
                    _ => {
                        self.advance();
                    }
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBracket)?;
        Ok(names)
    }

    fn skip_gen_decl(&mut self) -> ParseResult<()> {
        self.advance();
        if self.peek() == &TokenKind::LParen {
            self.skip_balanced()?;
        } else {
            self.skip_statement()?;
        }
        self.expect_decl_end()
    }

    // -----------------------------------------------------------------
    // Signatures
    // -----------------------------------------------------------------

    fn params(&mut self) -> ParseResult<Vec<Param>> {
        let open = self.expect(&TokenKind::LParen)?;
        let mut entries = Vec::new();
        while self.peek() != &TokenKind::RParen {
            entries.push(self.param_entry()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;

        resolve_params(entries).ok_or_else(|| {
            ParseError::new(
                open.line,
                open.column,
                "mixed named and unnamed parameters",
            )
        })
    }

    fn param_entry(&mut self) -> ParseResult<ParamEntry> {
        let TokenKind::Ident(name) = self.peek().clone() else {
            return Ok(ParamEntry::Type(self.param_type()?));
        };
        match self.peek_at(1) {
            TokenKind::Comma | TokenKind::RParen => {
                self.advance();
                Ok(ParamEntry::Bare(name))
            }
            TokenKind::Dot => Ok(ParamEntry::Type(self.type_expr()?)),
            TokenKind::LBracket
                if self.after_brackets(1, |next| {
                    matches!(next, TokenKind::Comma | TokenKind::RParen)
                }) =>
            {
                Ok(ParamEntry::Type(self.type_expr()?))
            }
            _ => {
                self.advance();
                Ok(ParamEntry::Named(name, self.param_type()?))
            }
        }
    }

    fn param_type(&mut self) -> ParseResult<TypeExpr> {
        if self.eat(&TokenKind::Ellipsis) {
            return Ok(TypeExpr::Variadic(Box::new(self.type_expr()?)));
        }
        self.type_expr()
    }

    fn results(&mut self) -> ParseResult<Vec<Param>> {
        if self.peek() == &TokenKind::LParen {
            return self.params();
        }
        if self.starts_type() {
            let ty = self.type_expr()?;
            return Ok(vec![Param { name: None, ty }]);
        }
        Ok(Vec::new())
    }

    fn starts_type(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Ident(_)
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::Arrow
                | TokenKind::Keyword(
                    Keyword::Map
                        | Keyword::Chan
                        | Keyword::Func
                        | Keyword::Interface
                        | Keyword::Struct
                )
        )
    }

    // -----------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------

    fn type_expr(&mut self) -> ParseResult<TypeExpr> {
        let token = self.advance();
        let ty = match token.kind {
            TokenKind::Ident(name) => {
                let base = if self.eat(&TokenKind::Dot) {
                    let (selector, _) = self.expect_ident()?;
                    TypeExpr::Qualified {
                        package: name,
                        name: selector,
                    }
                } else {
                    TypeExpr::Named(name)
                };
                if self.eat(&TokenKind::LBracket) {
                    let args = self.type_args()?;
                    TypeExpr::Generic {
                        base: Box::new(base),
                        args,
                    }
                } else {
                    base
                }
            }
            TokenKind::Star => TypeExpr::Pointer(Box::new(self.type_expr()?)),
            TokenKind::LBracket => {
                if self.eat(&TokenKind::RBracket) {
                    TypeExpr::Slice(Box::new(self.type_expr()?))
                } else {
                    let len = self.array_len()?;
                    TypeExpr::Array {
                        len,
                        elem: Box::new(self.type_expr()?),
                    }
                }
            }
            TokenKind::Keyword(Keyword::Map) => {
                self.expect(&TokenKind::LBracket)?;
                let key = self.type_expr()?;
                self.expect(&TokenKind::RBracket)?;
                let value = self.type_expr()?;
                TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            TokenKind::Keyword(Keyword::Chan) => {
                self.eat(&TokenKind::Arrow);
                TypeExpr::Chan(Box::new(self.type_expr()?))
            }
            TokenKind::Arrow => {
                self.expect(&TokenKind::Keyword(Keyword::Chan))?;
                TypeExpr::Chan(Box::new(self.type_expr()?))
            }
            TokenKind::Keyword(Keyword::Func) => {
                let params = self.params()?;
                let results = self.results()?;
                TypeExpr::Func { params, results }
            }
            TokenKind::Keyword(Keyword::Interface) => {
                if self.peek() != &TokenKind::LBrace {
                    return Err(self.error(format!(
                        "expected `{{` after interface, found {}",
                        self.peek()
                    )));
                }
                self.skip_balanced()?;
                TypeExpr::Interface
            }
            TokenKind::Keyword(Keyword::Struct) => {
                TypeExpr::Struct(self.struct_fields()?)
            }
            TokenKind::LParen => {
                let inner = self.type_expr()?;
                self.expect(&TokenKind::RParen)?;
                inner
            }
            other => {
                return Err(ParseError::new(
                    token.line,
                    token.column,
                    format!("expected type, found {other}"),
                ));
            }
        };
        Ok(ty)
    }

    /// Parses `A, B]` after the `[` of a type instantiation.
    fn type_args(&mut self) -> ParseResult<Vec<TypeExpr>> {
        let mut args = Vec::new();
        while self.peek() != &TokenKind::RBracket {
            args.push(self.type_expr()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBracket)?;
        Ok(args)
    }

    /// Collects the source text of an array length up to the closing `]`.
    fn array_len(&mut self) -> ParseResult<String> {
        let mut len = String::new();
        let mut depth = 0usize;
        loop {
            let token = self.advance();
            match &token.kind {
                TokenKind::RBracket if depth == 0 => return Ok(len),
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        token.line,
                        token.column,
                        "unexpected end of file in array length",
                    ));
                }
                kind => {
                    if kind.is_open_delim() {
                        depth += 1;
                    } else if kind.is_close_delim() {
                        depth = depth.saturating_sub(1);
                    }
                    len.push_str(&source_text(kind));
                }
            }
        }
    }

    fn struct_fields(&mut self) -> ParseResult<Vec<StructField>> {
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        loop {
            match self.peek() {
                TokenKind::RBrace => {
                    self.advance();
                    return Ok(fields);
                }
                TokenKind::Semicolon => {
                    self.advance();
                }
                _ => {
                    fields.push(self.struct_field()?);
                    self.expect_element_end(&TokenKind::RBrace)?;
                }
            }
        }
    }

    fn struct_field(&mut self) -> ParseResult<StructField> {
        let line = self.current().line;
        let doc = self.comments.doc_before(line);

        let embedded = match (self.peek(), self.peek_at(1)) {
            (TokenKind::Star, _) => true,
            (
                TokenKind::Ident(_),
                TokenKind::Dot
                | TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::Literal(_),
            ) => true,
            (TokenKind::Ident(_), TokenKind::LBracket) => {
                self.after_brackets(1, |next| {
                    matches!(
                        next,
                        TokenKind::Semicolon
                            | TokenKind::RBrace
                            | TokenKind::Literal(_)
                    )
                })
            }
            (TokenKind::Ident(_), _) => false,
            (other, _) => {
                return Err(self.error(format!(
                    "expected field name or embedded type, found {other}"
                )));
            }
        };

        let names = if embedded {
            Vec::new()
        } else {
            let mut names = vec![self.expect_ident()?.0];
            while self.eat(&TokenKind::Comma) {
                names.push(self.expect_ident()?.0);
            }
            names
        };
        let ty = self.type_expr()?;
        // Tags carry no schema meaning.
        if matches!(self.peek(), TokenKind::Literal(_)) {
            self.advance();
        }
        let comment = self.comments.trailing_on(self.prev_line());

        Ok(StructField {
            names,
            ty,
            doc,
            comment,
        })
    }

    // -----------------------------------------------------------------
    // Token cursor
    // -----------------------------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek(&self) -> &TokenKind {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    /// Line of the most recently consumed token.
    fn prev_line(&self) -> usize {
        self.tokens[self.pos.saturating_sub(1)].line
    }

    /// Consumes the current token. The trailing `Eof` is never consumed.
    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> ParseResult<Token> {
        if self.peek() == kind {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {kind}, found {}", self.peek())))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<(String, usize)> {
        if let TokenKind::Ident(name) = self.peek() {
            let name = name.clone();
            let line = self.advance().line;
            return Ok((name, line));
        }
        Err(self.error(format!("expected identifier, found {}", self.peek())))
    }

    /// Top-level declarations end with `;` (usually inserted at the line
    /// break) or at end of file.
    fn expect_decl_end(&mut self) -> ParseResult<()> {
        match self.peek() {
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            other => Err(self.error(format!(
                "expected `;` or newline after declaration, found {other}"
            ))),
        }
    }

    /// Elements of a `(...)` or `{...}` list are separated by `;`, which may
    /// be omitted before the closing delimiter.
    fn expect_element_end(&mut self, close: &TokenKind) -> ParseResult<()> {
        if self.peek() == close {
            return Ok(());
        }
        self.expect(&TokenKind::Semicolon).map(|_| ())
    }

    /// Skips a delimited region starting at the current opening delimiter,
    /// checking that delimiters pair up.
    fn skip_balanced(&mut self) -> ParseResult<()> {
        let mut expected_closers: Vec<TokenKind> = Vec::new();
        loop {
            let token = self.advance();
            match &token.kind {
                TokenKind::LParen => expected_closers.push(TokenKind::RParen),
                TokenKind::LBracket => {
                    expected_closers.push(TokenKind::RBracket);
                }
                TokenKind::LBrace => expected_closers.push(TokenKind::RBrace),
                close if close.is_close_delim() => {
                    if expected_closers.pop().as_ref() != Some(close) {
                        return Err(ParseError::new(
                            token.line,
                            token.column,
                            format!("unexpected {close}"),
                        ));
                    }
                }
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        token.line,
                        token.column,
                        "unexpected end of file",
                    ));
                }
                _ => {}
            }
            if expected_closers.is_empty() {
                return Ok(());
            }
        }
    }

    /// Skips to (not past) the `;` ending the current statement.
    fn skip_statement(&mut self) -> ParseResult<()> {
        loop {
            let kind = self.peek().clone();
            match kind {
                TokenKind::Semicolon | TokenKind::Eof => return Ok(()),
                open if open.is_open_delim() => self.skip_balanced()?,
                close if close.is_close_delim() => {
                    return Err(self.error(format!("unexpected {close}")));
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// For the `[` at `offset`, tests the token after its matching `]`.
    fn after_brackets(
        &self,
        offset: usize,
        follows: impl Fn(&TokenKind) -> bool,
    ) -> bool {
        let mut depth = 0usize;
        for index in self.pos + offset..self.tokens.len() {
            match &self.tokens[index].kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self
                            .tokens
                            .get(index + 1)
                            .is_some_and(|next| follows(&next.kind));
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
        }
        false
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let token = self.current();
        ParseError::new(token.line, token.column, message)
    }
}

/// Applies Go's parameter grouping rule. Returns `None` when named and
/// unnamed parameters are mixed.
fn resolve_params(entries: Vec<ParamEntry>) -> Option<Vec<Param>> {
    let mut params = Vec::with_capacity(entries.len());

    let named = entries
        .iter()
        .any(|entry| matches!(entry, ParamEntry::Named(..)));
    if !named {
        for entry in entries {
            let ty = match entry {
                ParamEntry::Bare(name) => TypeExpr::Named(name),
                ParamEntry::Named(_, ty) | ParamEntry::Type(ty) => ty,
            };
            params.push(Param { name: None, ty });
        }
        return Some(params);
    }

    // In a named list, bare identifiers take the type of the next entry.
    let mut pending = Vec::new();
    for entry in entries {
        match entry {
            ParamEntry::Bare(name) => pending.push(name),
            ParamEntry::Named(name, ty) => {
                params.extend(pending.drain(..).map(|name| Param {
                    name: Some(name),
                    ty: ty.clone(),
                }));
                params.push(Param {
                    name: Some(name),
                    ty,
                });
            }
            ParamEntry::Type(_) => return None,
        }
    }
    pending.is_empty().then_some(params)
}

fn source_text(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Ident(text) | TokenKind::Literal(text) => text.clone(),
        TokenKind::Keyword(kw) => kw.as_str().to_owned(),
        TokenKind::LParen => "(".to_owned(),
        TokenKind::RParen => ")".to_owned(),
        TokenKind::LBracket => "[".to_owned(),
        TokenKind::RBracket => "]".to_owned(),
        TokenKind::LBrace => "{".to_owned(),
        TokenKind::RBrace => "}".to_owned(),
        TokenKind::Comma => ",".to_owned(),
        TokenKind::Semicolon => ";".to_owned(),
        TokenKind::Dot => ".".to_owned(),
        TokenKind::Ellipsis => "...".to_owned(),
        TokenKind::Star => "*".to_owned(),
        TokenKind::Arrow => "<-".to_owned(),
        TokenKind::Op(op) => (*op).to_owned(),
        TokenKind::Eof => String::new(),
    }
}
