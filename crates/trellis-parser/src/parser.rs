//! Parser for Trellis source tokens.
//!
//! This module transforms the token stream from the [`lexer`](crate::lexer)
//! into the spanned parse tree defined in
//! [`parser_types`](crate::parser_types). The public entry point is
//! [`parse_tokens`].
//!
//! The parser recovers at statement boundaries: when a statement fails,
//! a diagnostic is recorded and the parser skips to the next `;` (or
//! the end of the enclosing block, tracking brace depth) and continues,
//! so one pass reports every independent syntax error.

use winnow::{
    Parser as _,
    combinator::{opt, peek},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use trellis_core::document::{Direction, ProfileKind};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    parser_types as types,
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context attached to parser errors: what was being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Expected(&'static str);

type Input<'src, 'tok> = TokenSlice<'tok, PositionedToken<'src>>;
type IResult<O> = Result<O, ErrMode<ContextError<Expected>>>;

fn expected(label: &'static str) -> ErrMode<ContextError<Expected>> {
    let mut e = ContextError::new();
    e.push(Expected(label));
    ErrMode::Backtrack(e)
}

/// Peek at the next token without consuming it.
fn peek_token<'src>(input: &mut Input<'src, '_>) -> Option<Token<'src>> {
    peek(any::<_, ErrMode<ContextError<Expected>>>)
        .parse_next(input)
        .ok()
        .map(|t| t.token.clone())
}

/// Consume one token matching the predicate, returning its span.
fn token_if<'src>(
    input: &mut Input<'src, '_>,
    label: &'static str,
    pred: impl Fn(&Token<'src>) -> bool,
) -> IResult<Span> {
    any.verify(move |t: &PositionedToken<'src>| pred(&t.token))
        .map(|t: &PositionedToken<'src>| t.span)
        .parse_next(input)
        .map_err(|_: ErrMode<ContextError<Expected>>| expected(label))
}

fn semicolon(input: &mut Input<'_, '_>) -> IResult<Span> {
    token_if(input, "`;`", |t| matches!(t, Token::Semicolon))
}

/// Parse an identifier, returning it with its span.
///
/// Keywords are allowed wherever an identifier fits (`style`,
/// `direction` and friends appear as attribute names), mirroring their
/// source spelling.
fn identifier<'src>(input: &mut Input<'src, '_>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|t: &PositionedToken<'src>| {
        let name = match t.token {
            Token::Identifier(name) => name,
            Token::Profile => "profile",
            Token::DirectionKw => "direction",
            Token::StyleKw => "style",
            Token::NodeKw => "node",
            Token::ContainerKw => "container",
            Token::TemplateKw => "template",
            Token::From => "from",
            Token::SourceKw => "source",
            Token::Load => "load",
            Token::Let => "let",
            _ => return None,
        };
        Some(Spanned::new(name, t.span))
    })
    .parse_next(input)
    .map_err(|_: ErrMode<ContextError<Expected>>| expected("identifier"))
}

/// Parse a string literal.
fn string_literal(input: &mut Input<'_, '_>) -> IResult<Spanned<String>> {
    any.verify_map(|t: &PositionedToken<'_>| match &t.token {
        Token::StringLiteral(s) => Some(Spanned::new(s.clone(), t.span)),
        _ => None,
    })
    .parse_next(input)
    .map_err(|_: ErrMode<ContextError<Expected>>| expected("string literal"))
}

/// Parse an entity id: a bare identifier or a quoted string (strings
/// let template bodies carry `${...}` placeholders).
fn entity_id(input: &mut Input<'_, '_>) -> IResult<Spanned<String>> {
    any.verify_map(|t: &PositionedToken<'_>| match &t.token {
        Token::Identifier(name) => Some(Spanned::new((*name).to_string(), t.span)),
        Token::StringLiteral(s) => Some(Spanned::new(s.clone(), t.span)),
        _ => None,
    })
    .parse_next(input)
    .map_err(|_: ErrMode<ContextError<Expected>>| expected("identifier or string id"))
}

/// Parse an attribute value: string, number, bool, identifier
/// reference, or nested object literal.
fn attr_value<'src>(input: &mut Input<'src, '_>) -> IResult<types::AttrValue<'src>> {
    if let Some(token) = peek_token(input) {
        match token {
            Token::StringLiteral(_) => return string_literal(input).map(types::AttrValue::String),
            Token::FloatLiteral(_) => {
                return any
                    .verify_map(|t: &PositionedToken<'src>| match t.token {
                        Token::FloatLiteral(n) => Some(Spanned::new(n, t.span)),
                        _ => None,
                    })
                    .parse_next(input)
                    .map(types::AttrValue::Number)
                    .map_err(|_: ErrMode<ContextError<Expected>>| expected("number"));
            }
            Token::True | Token::False => {
                let value = matches!(token, Token::True);
                let span = token_if(input, "boolean", |t| {
                    matches!(t, Token::True | Token::False)
                })?;
                return Ok(types::AttrValue::Bool(Spanned::new(value, span)));
            }
            Token::LeftBrace => return object_literal(input).map(types::AttrValue::Object),
            _ => {
                return identifier(input)
                    .map(types::AttrValue::Ident)
                    .map_err(|_| expected("value"));
            }
        }
    }
    Err(expected("value"))
}

/// Parse an object literal: `{ key: value, ... }`.
fn object_literal<'src>(input: &mut Input<'src, '_>) -> IResult<Spanned<Vec<types::Attr<'src>>>> {
    let open = token_if(input, "`{`", |t| matches!(t, Token::LeftBrace))?;

    let mut attrs = Vec::new();
    if !matches!(peek_token(input), Some(Token::RightBrace)) {
        loop {
            attrs.push(attr(input)?);
            if opt_comma(input) {
                continue;
            }
            break;
        }
    }

    let close = token_if(input, "`}`", |t| matches!(t, Token::RightBrace))?;
    Ok(Spanned::new(attrs, open.union(close)))
}

/// Parse one `key: value` attribute.
fn attr<'src>(input: &mut Input<'src, '_>) -> IResult<types::Attr<'src>> {
    let name = identifier(input)?;
    token_if(input, "`:`", |t| matches!(t, Token::Colon))?;
    let value = attr_value(input)?;
    Ok(types::Attr { name, value })
}

fn opt_comma(input: &mut Input<'_, '_>) -> bool {
    token_if(input, "`,`", |t| matches!(t, Token::Comma)).is_ok()
}

/// Parse an optional bracketed attribute list: `[ key: value, ... ]`.
fn opt_attr_list<'src>(input: &mut Input<'src, '_>) -> IResult<Vec<types::Attr<'src>>> {
    if token_if(input, "`[`", |t| matches!(t, Token::LeftBracket)).is_err() {
        return Ok(Vec::new());
    }

    let mut attrs = Vec::new();
    if !matches!(peek_token(input), Some(Token::RightBracket)) {
        loop {
            attrs.push(attr(input)?);
            if opt_comma(input) {
                continue;
            }
            break;
        }
    }
    token_if(input, "`]`", |t| matches!(t, Token::RightBracket))?;
    Ok(attrs)
}

/// Parse one end of an edge: `id` or `id.port`.
fn endpoint<'src>(input: &mut Input<'src, '_>) -> IResult<types::EndpointAst<'src>> {
    let id = entity_id(input)?;
    let port = if token_if(input, "`.`", |t| matches!(t, Token::Dot)).is_ok() {
        Some(identifier(input)?)
    } else {
        None
    };
    Ok(types::EndpointAst { id, port })
}

/// Parse the arrow operator of an edge statement.
fn arrow(input: &mut Input<'_, '_>) -> IResult<Spanned<types::ArrowAst>> {
    any.verify_map(|t: &PositionedToken<'_>| {
        let arrow = match t.token {
            Token::Arrow => types::ArrowAst::Right,
            Token::LeftArrow => types::ArrowAst::Left,
            Token::BothArrow => types::ArrowAst::Both,
            Token::PlainEdge => types::ArrowAst::Plain,
            _ => return None,
        };
        Some(Spanned::new(arrow, t.span))
    })
    .parse_next(input)
    .map_err(|_: ErrMode<ContextError<Expected>>| expected("arrow (`->`, `<-`, `<->`, `--`)"))
}

/// The statement contexts that restrict which forms are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Profile,
    Container,
    Template,
}

/// Parser driver holding the diagnostic collector and recovery logic.
struct ParserDriver {
    diagnostics: DiagnosticCollector,
    /// Length of the source, for end-of-input spans.
    eof: usize,
}

impl ParserDriver {
    fn new(eof: usize) -> Self {
        Self {
            diagnostics: DiagnosticCollector::new(),
            eof,
        }
    }

    /// Span of the next token, or a zero-width span at end of input.
    fn next_span(&self, input: &mut Input<'_, '_>) -> Span {
        peek(any::<_, ErrMode<ContextError<Expected>>>)
            .parse_next(input)
            .map(|t| t.span)
            .unwrap_or_else(|_| Span::new(self.eof..self.eof))
    }

    /// Record a syntax error at the current position.
    fn syntax_error(&mut self, input: &mut Input<'_, '_>, err: ErrMode<ContextError<Expected>>) {
        let at_eof = peek_token(input).is_none();
        let span = self.next_span(input);

        let wanted = match &err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => {
                ctx.context().next().map(|Expected(label)| *label)
            }
            ErrMode::Incomplete(_) => None,
        };

        let (code, message) = if at_eof {
            (ErrorCode::E101, "unexpected end of input".to_string())
        } else {
            (
                ErrorCode::E100,
                match wanted {
                    Some(label) => format!("expected {label}"),
                    None => "unexpected token".to_string(),
                },
            )
        };

        self.diagnostics.emit(
            Diagnostic::error(message)
                .with_code(code)
                .with_label(span, code.description()),
        );
    }

    /// Skip to the next statement boundary: past the next `;` at the
    /// current brace depth, or to the `}` that closes the enclosing
    /// block (left unconsumed).
    fn recover(&mut self, input: &mut Input<'_, '_>) {
        let mut depth: usize = 0;
        loop {
            match peek_token(input) {
                None => break,
                Some(Token::Semicolon) if depth == 0 => {
                    let _ = input.next_token();
                    break;
                }
                Some(Token::RightBrace) => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    let _ = input.next_token();
                }
                Some(Token::LeftBrace) => {
                    depth += 1;
                    let _ = input.next_token();
                }
                Some(_) => {
                    let _ = input.next_token();
                }
            }
        }
    }

    /// Parse a whole document: a sequence of profile blocks.
    fn document<'src>(&mut self, input: &mut Input<'src, '_>) -> types::DocumentAst<'src> {
        let mut profiles = Vec::new();

        while peek_token(input).is_some() {
            match self.profile(input) {
                Ok(profile) => profiles.push(profile),
                Err(err) => {
                    self.syntax_error(input, err);
                    // Resynchronize on the next `profile` keyword.
                    while let Some(token) = peek_token(input) {
                        if matches!(token, Token::Profile) {
                            break;
                        }
                        let _ = input.next_token();
                    }
                }
            }
        }

        types::DocumentAst { profiles }
    }

    /// Parse `profile <kind> [title] { statements }`.
    fn profile<'src>(&mut self, input: &mut Input<'src, '_>) -> IResult<types::ProfileAst<'src>> {
        token_if(input, "`profile`", |t| matches!(t, Token::Profile))?;

        let kind_ident = identifier(input).map_err(|_| expected("profile kind"))?;
        let kind = match ProfileKind::parse(kind_ident.inner()) {
            Some(kind) => Spanned::new(kind, kind_ident.span()),
            None => {
                self.diagnostics.emit(
                    Diagnostic::error(format!("unknown profile kind `{}`", kind_ident.inner()))
                        .with_code(ErrorCode::E102)
                        .with_label(kind_ident.span(), ErrorCode::E102.description())
                        .with_help(
                            "supported kinds: flowchart, schematic, logic, pid, sequence, \
                             timeline, wardley, railroad",
                        ),
                );
                // Keep parsing the block under a placeholder so the rest
                // of the document is still checked.
                Spanned::new(ProfileKind::Flowchart, kind_ident.span())
            }
        };

        let title = opt(identifier).parse_next(input)?;

        token_if(input, "`{`", |t| matches!(t, Token::LeftBrace))?;
        let statements = self.body(input, BodyKind::Profile);
        token_if(input, "`}`", |t| matches!(t, Token::RightBrace))?;

        Ok(types::ProfileAst {
            kind,
            title,
            statements,
        })
    }

    /// Parse statements until the closing `}` of the enclosing block,
    /// recovering after each failed statement.
    fn body<'src>(
        &mut self,
        input: &mut Input<'src, '_>,
        kind: BodyKind,
    ) -> Vec<types::Statement<'src>> {
        let mut statements = Vec::new();

        loop {
            match peek_token(input) {
                None | Some(Token::RightBrace) => break,
                Some(_) => {}
            }

            match self.statement(input, kind) {
                Ok(statement) => statements.push(statement),
                Err(err) => {
                    self.syntax_error(input, err);
                    self.recover(input);
                }
            }
        }

        statements
    }

    /// Parse one statement, dispatching on the leading token.
    fn statement<'src>(
        &mut self,
        input: &mut Input<'src, '_>,
        body: BodyKind,
    ) -> IResult<types::Statement<'src>> {
        let Some(token) = peek_token(input) else {
            return Err(expected("statement"));
        };

        let allowed = match (body, &token) {
            // Template bodies hold only the rules to expand.
            (BodyKind::Template, Token::NodeKw) => true,
            (BodyKind::Template, Token::Identifier(_) | Token::StringLiteral(_)) => true,
            (BodyKind::Template, _) => false,
            // Containers hold structure, not profile-level declarations.
            (
                BodyKind::Container,
                Token::NodeKw
                | Token::ContainerKw
                | Token::Identifier(_)
                | Token::StringLiteral(_),
            ) => true,
            (BodyKind::Container, _) => false,
            (BodyKind::Profile, _) => true,
        };
        if !allowed {
            return Err(expected(match body {
                BodyKind::Template => "a node or edge statement",
                BodyKind::Container => "a node, edge, container, or member statement",
                BodyKind::Profile => "statement",
            }));
        }

        match token {
            Token::DirectionKw => self.direction_stmt(input),
            Token::StyleKw => self.style_stmt(input),
            Token::Let => self.let_stmt(input),
            Token::NodeKw => self.node_stmt(input),
            Token::ContainerKw => self.container_stmt(input),
            Token::TemplateKw => self.template_stmt(input),
            Token::SourceKw => self.source_stmt(input),
            Token::Identifier(_) | Token::StringLiteral(_) => {
                self.edge_or_member_stmt(input, body)
            }
            _ => Err(expected("statement")),
        }
    }

    /// `direction: TB;`
    fn direction_stmt<'src>(
        &mut self,
        input: &mut Input<'src, '_>,
    ) -> IResult<types::Statement<'src>> {
        token_if(input, "`direction`", |t| matches!(t, Token::DirectionKw))?;
        token_if(input, "`:`", |t| matches!(t, Token::Colon))?;
        let name = identifier(input).map_err(|_| expected("direction (`TB`, `LR`, `BT`, `RL`)"))?;

        let direction = match Direction::parse(name.inner()) {
            Some(direction) => Spanned::new(direction, name.span()),
            None => {
                self.diagnostics.emit(
                    Diagnostic::error(format!("unknown direction `{}`", name.inner()))
                        .with_code(ErrorCode::E103)
                        .with_label(name.span(), ErrorCode::E103.description())
                        .with_help("use one of `TB`, `LR`, `BT`, `RL`"),
                );
                Spanned::new(Direction::default(), name.span())
            }
        };
        semicolon(input)?;
        Ok(types::Statement::Direction(direction))
    }

    /// `style name [attrs];`
    fn style_stmt<'src>(&mut self, input: &mut Input<'src, '_>) -> IResult<types::Statement<'src>> {
        token_if(input, "`style`", |t| matches!(t, Token::StyleKw))?;
        let name = identifier(input)?;
        let attrs = opt_attr_list(input)?;
        semicolon(input)?;
        Ok(types::Statement::Style(types::StyleStmt { name, attrs }))
    }

    /// `let name = value;`
    fn let_stmt<'src>(&mut self, input: &mut Input<'src, '_>) -> IResult<types::Statement<'src>> {
        token_if(input, "`let`", |t| matches!(t, Token::Let))?;
        let name = identifier(input)?;
        token_if(input, "`=`", |t| matches!(t, Token::Equals))?;
        let value = attr_value(input)?;
        semicolon(input)?;
        Ok(types::Statement::Let(types::LetStmt { name, value }))
    }

    /// `node id [: shape] [attrs];`
    fn node_stmt<'src>(&mut self, input: &mut Input<'src, '_>) -> IResult<types::Statement<'src>> {
        token_if(input, "`node`", |t| matches!(t, Token::NodeKw))?;
        let id = entity_id(input)?;

        let shape = if token_if(input, "`:`", |t| matches!(t, Token::Colon)).is_ok() {
            Some(identifier(input).map_err(|_| expected("shape reference"))?)
        } else {
            None
        };

        let attrs = opt_attr_list(input)?;
        semicolon(input)?;
        Ok(types::Statement::Node(types::NodeStmt { id, shape, attrs }))
    }

    /// An edge statement, or (inside containers) a bare `id;` member
    /// reference.
    fn edge_or_member_stmt<'src>(
        &mut self,
        input: &mut Input<'src, '_>,
        body: BodyKind,
    ) -> IResult<types::Statement<'src>> {
        let source = endpoint(input)?;

        // Bare `id;` is a member reference, only meaningful inside a
        // container body.
        if body == BodyKind::Container
            && source.port.is_none()
            && matches!(peek_token(input), Some(Token::Semicolon))
        {
            semicolon(input)?;
            return Ok(types::Statement::Member(source.id));
        }

        let arrow = arrow(input)?;
        let target = endpoint(input)?;

        let label = if token_if(input, "`:`", |t| matches!(t, Token::Colon)).is_ok() {
            Some(string_literal(input).map_err(|_| expected("edge label string"))?)
        } else {
            None
        };

        let attrs = opt_attr_list(input)?;
        semicolon(input)?;

        Ok(types::Statement::Edge(types::EdgeStmt {
            source,
            arrow,
            target,
            label,
            attrs,
        }))
    }

    /// `container id [attrs] { body }`
    fn container_stmt<'src>(
        &mut self,
        input: &mut Input<'src, '_>,
    ) -> IResult<types::Statement<'src>> {
        token_if(input, "`container`", |t| matches!(t, Token::ContainerKw))?;
        let id = entity_id(input)?;
        let attrs = opt_attr_list(input)?;

        token_if(input, "`{`", |t| matches!(t, Token::LeftBrace))?;
        let body = self.body(input, BodyKind::Container);
        token_if(input, "`}`", |t| matches!(t, Token::RightBrace))?;

        Ok(types::Statement::Container(types::ContainerStmt {
            id,
            attrs,
            body,
        }))
    }

    /// `template name from source { body }`
    fn template_stmt<'src>(
        &mut self,
        input: &mut Input<'src, '_>,
    ) -> IResult<types::Statement<'src>> {
        token_if(input, "`template`", |t| matches!(t, Token::TemplateKw))?;
        let name = identifier(input)?;
        token_if(input, "`from`", |t| matches!(t, Token::From))?;
        let source = identifier(input).map_err(|_| expected("data source name"))?;

        token_if(input, "`{`", |t| matches!(t, Token::LeftBrace))?;
        let body = self.body(input, BodyKind::Template);
        token_if(input, "`}`", |t| matches!(t, Token::RightBrace))?;

        Ok(types::Statement::Template(types::TemplateStmt {
            name,
            source,
            body,
        }))
    }

    /// `source name = load "locator";` or `source name = [ {..}, .. ];`
    fn source_stmt<'src>(
        &mut self,
        input: &mut Input<'src, '_>,
    ) -> IResult<types::Statement<'src>> {
        token_if(input, "`source`", |t| matches!(t, Token::SourceKw))?;
        let name = identifier(input)?;
        token_if(input, "`=`", |t| matches!(t, Token::Equals))?;

        let origin = match peek_token(input) {
            Some(Token::Load) => {
                token_if(input, "`load`", |t| matches!(t, Token::Load))?;
                let locator = string_literal(input).map_err(|_| expected("source locator"))?;
                types::SourceOriginAst::Load(locator)
            }
            Some(Token::LeftBracket) => {
                token_if(input, "`[`", |t| matches!(t, Token::LeftBracket))?;
                let mut records = Vec::new();
                if !matches!(peek_token(input), Some(Token::RightBracket)) {
                    loop {
                        records.push(object_literal(input)?);
                        if opt_comma(input) {
                            continue;
                        }
                        break;
                    }
                }
                token_if(input, "`]`", |t| matches!(t, Token::RightBracket))?;
                types::SourceOriginAst::Inline(records)
            }
            _ => return Err(expected("`load` or an inline record list")),
        };

        semicolon(input)?;
        Ok(types::Statement::Source(types::SourceStmt { name, origin }))
    }
}

/// Parse a token stream into a document parse tree.
///
/// `source_len` is the byte length of the original source, used for
/// end-of-input spans.
pub fn parse_tokens<'src>(
    tokens: &[PositionedToken<'src>],
    source_len: usize,
) -> Result<types::DocumentAst<'src>, ParseError> {
    // The grammar never needs trivia; dropping it here keeps every
    // production free of explicit whitespace handling.
    let significant: Vec<PositionedToken<'src>> = tokens
        .iter()
        .filter(|t| !t.token.is_trivia())
        .cloned()
        .collect();

    let mut input = TokenSlice::new(&significant);
    let mut driver = ParserDriver::new(source_len);
    let document = driver.document(&mut input);
    driver.diagnostics.finish_with(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> Result<types::DocumentAst<'_>, ParseError> {
        let tokens = tokenize(source).expect("lexing should succeed");
        parse_tokens(&tokens, source.len())
    }

    #[test]
    fn test_empty_document() {
        let doc = parse("").unwrap();
        assert!(doc.profiles.is_empty());
    }

    #[test]
    fn test_minimal_profile() {
        let doc = parse("profile flowchart { }").unwrap();
        assert_eq!(doc.profiles.len(), 1);
        assert_eq!(*doc.profiles[0].kind.inner(), ProfileKind::Flowchart);
        assert!(doc.profiles[0].statements.is_empty());
    }

    #[test]
    fn test_profile_title() {
        let doc = parse("profile sequence checkout { }").unwrap();
        assert_eq!(doc.profiles[0].title.as_ref().map(|t| *t.inner()), Some("checkout"));
    }

    #[test]
    fn test_unknown_profile_kind() {
        let err = parse("profile pie { }").unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_nodes_and_edges() {
        let doc = parse(
            r#"
            profile flowchart {
                direction: LR;
                node start: rounded [label: "Start"];
                node stop;
                start -> stop: "go" [route: orthogonal];
            }
            "#,
        )
        .unwrap();

        let statements = &doc.profiles[0].statements;
        assert_eq!(statements.len(), 4);

        match &statements[0] {
            types::Statement::Direction(d) => {
                assert_eq!(*d.inner(), Direction::LeftToRight)
            }
            other => panic!("expected direction, got {other:?}"),
        }
        match &statements[1] {
            types::Statement::Node(node) => {
                assert_eq!(node.id.inner(), "start");
                assert_eq!(node.shape.as_ref().map(|s| *s.inner()), Some("rounded"));
                assert_eq!(node.attrs.len(), 1);
            }
            other => panic!("expected node, got {other:?}"),
        }
        match &statements[2] {
            types::Statement::Node(node) => {
                assert_eq!(node.id.inner(), "stop");
                assert!(node.shape.is_none());
            }
            other => panic!("expected node, got {other:?}"),
        }
        match &statements[3] {
            types::Statement::Edge(edge) => {
                assert_eq!(edge.source.id.inner(), "start");
                assert_eq!(edge.target.id.inner(), "stop");
                assert_eq!(*edge.arrow.inner(), types::ArrowAst::Right);
                assert_eq!(edge.label.as_ref().map(|l| l.inner().as_str()), Some("go"));
                assert_eq!(edge.attrs.len(), 1);
            }
            other => panic!("expected edge, got {other:?}"),
        }
    }

    #[test]
    fn test_anchored_endpoints() {
        let doc = parse("profile schematic { r1.a -- r2.b; }").unwrap();
        match &doc.profiles[0].statements[0] {
            types::Statement::Edge(edge) => {
                assert_eq!(edge.source.port.as_ref().map(|p| *p.inner()), Some("a"));
                assert_eq!(edge.target.port.as_ref().map(|p| *p.inner()), Some("b"));
                assert_eq!(*edge.arrow.inner(), types::ArrowAst::Plain);
            }
            other => panic!("expected edge, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_containers_and_members() {
        let doc = parse(
            r#"
            profile flowchart {
                node outside;
                container outer [label: "Outer"] {
                    node inner;
                    container deep { }
                    outside;
                }
            }
            "#,
        )
        .unwrap();

        match &doc.profiles[0].statements[1] {
            types::Statement::Container(container) => {
                assert_eq!(container.id.inner(), "outer");
                assert_eq!(container.body.len(), 3);
                assert!(matches!(container.body[1], types::Statement::Container(_)));
                match &container.body[2] {
                    types::Statement::Member(member) => assert_eq!(member.inner(), "outside"),
                    other => panic!("expected member, got {other:?}"),
                }
            }
            other => panic!("expected container, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_data_object() {
        let doc = parse(
            r#"
            profile schematic {
                node r1: resistor [data: { pins: { a: net1, b: net2 }, ohms: 470 }];
            }
            "#,
        )
        .unwrap();

        match &doc.profiles[0].statements[0] {
            types::Statement::Node(node) => {
                let data = &node.attrs[0];
                assert_eq!(*data.name.inner(), "data");
                match &data.value {
                    types::AttrValue::Object(object) => {
                        assert_eq!(object.inner().len(), 2);
                        assert!(matches!(
                            object.inner()[0].value,
                            types::AttrValue::Object(_)
                        ));
                    }
                    other => panic!("expected object, got {other:?}"),
                }
            }
            other => panic!("expected node, got {other:?}"),
        }
    }

    #[test]
    fn test_template_and_sources() {
        let doc = parse(
            r#"
            profile flowchart {
                source items = [ { sku: "a1", name: "Bolt" }, { sku: "a2", name: "Nut" } ];
                source remote = load "warehouse.json";
                template stock from items {
                    node "item_${sku}" [label: "Item ${name}"];
                }
            }
            "#,
        )
        .unwrap();

        let statements = &doc.profiles[0].statements;
        match &statements[0] {
            types::Statement::Source(source) => {
                assert_eq!(*source.name.inner(), "items");
                match &source.origin {
                    types::SourceOriginAst::Inline(records) => assert_eq!(records.len(), 2),
                    other => panic!("expected inline records, got {other:?}"),
                }
            }
            other => panic!("expected source, got {other:?}"),
        }
        match &statements[1] {
            types::Statement::Source(source) => match &source.origin {
                types::SourceOriginAst::Load(locator) => {
                    assert_eq!(locator.inner(), "warehouse.json")
                }
                other => panic!("expected load origin, got {other:?}"),
            },
            other => panic!("expected source, got {other:?}"),
        }
        match &statements[2] {
            types::Statement::Template(template) => {
                assert_eq!(*template.name.inner(), "stock");
                assert_eq!(*template.source.inner(), "items");
                assert_eq!(template.body.len(), 1);
                match &template.body[0] {
                    types::Statement::Node(node) => assert_eq!(node.id.inner(), "item_${sku}"),
                    other => panic!("expected node, got {other:?}"),
                }
            }
            other => panic!("expected template, got {other:?}"),
        }
    }

    #[test]
    fn test_style_and_let() {
        let doc = parse(
            r##"
            profile flowchart {
                style emphasis [fill: "#e6f3ff", stroke_width: 2];
                let owner = "platform";
            }
            "##,
        )
        .unwrap();
        assert!(matches!(
            doc.profiles[0].statements[0],
            types::Statement::Style(_)
        ));
        assert!(matches!(
            doc.profiles[0].statements[1],
            types::Statement::Let(_)
        ));
    }

    #[test]
    fn test_recovery_reports_multiple_errors() {
        // Two independent broken statements plus one good one.
        let err = parse(
            r#"
            profile flowchart {
                node ;
                node ok;
                start -> ;
            }
            "#,
        )
        .unwrap_err();

        assert_eq!(err.diagnostics().len(), 2);
        for diag in err.diagnostics() {
            assert_eq!(diag.code(), Some(ErrorCode::E100));
        }
    }

    #[test]
    fn test_statement_not_allowed_in_template() {
        let err = parse(
            r#"
            profile flowchart {
                source items = [];
                template t from items {
                    container bad { }
                }
            }
            "#,
        )
        .unwrap_err();
        assert!(!err.diagnostics().is_empty());
    }

    #[test]
    fn test_eof_error() {
        let err = parse("profile flowchart { node a").unwrap_err();
        assert!(
            err.diagnostics()
                .iter()
                .any(|d| d.code() == Some(ErrorCode::E101))
        );
    }
}
