//! The spanned parse tree produced by the parser.
//!
//! These types mirror the grammar one-to-one and keep every interesting
//! token's source span, so validation can point diagnostics at exact
//! declarations. Elaboration lowers them into the span-free
//! `trellis_core::document` model.

use trellis_core::document::{Direction, ProfileKind};

use crate::span::{Span, Spanned};

/// A whole source text: zero or more profiles.
#[derive(Debug, Default, PartialEq)]
pub struct DocumentAst<'src> {
    pub profiles: Vec<ProfileAst<'src>>,
}

/// One `profile <kind> [title] { ... }` block.
#[derive(Debug, PartialEq)]
pub struct ProfileAst<'src> {
    pub kind: Spanned<ProfileKind>,
    pub title: Option<Spanned<&'src str>>,
    pub statements: Vec<Statement<'src>>,
}

/// A statement inside a profile or container body.
#[derive(Debug, PartialEq)]
pub enum Statement<'src> {
    Direction(Spanned<Direction>),
    Style(StyleStmt<'src>),
    Let(LetStmt<'src>),
    Node(NodeStmt<'src>),
    Edge(EdgeStmt<'src>),
    Container(ContainerStmt<'src>),
    Template(TemplateStmt<'src>),
    Source(SourceStmt<'src>),
    /// A bare `id;` inside a container body: adds an already declared
    /// entity as a child of the enclosing container.
    Member(Spanned<String>),
}

/// `style <name> [attrs];`
#[derive(Debug, PartialEq)]
pub struct StyleStmt<'src> {
    pub name: Spanned<&'src str>,
    pub attrs: Vec<Attr<'src>>,
}

/// `let <name> = <value>;`
#[derive(Debug, PartialEq)]
pub struct LetStmt<'src> {
    pub name: Spanned<&'src str>,
    pub value: AttrValue<'src>,
}

/// `node <id> [: shape] [attrs];`
///
/// Ids may be written as string literals so template bodies can carry
/// `${...}` placeholders.
#[derive(Debug, PartialEq)]
pub struct NodeStmt<'src> {
    pub id: Spanned<String>,
    pub shape: Option<Spanned<&'src str>>,
    pub attrs: Vec<Attr<'src>>,
}

/// The arrow used in an edge statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowAst {
    /// `->`
    Right,
    /// `<-`
    Left,
    /// `<->`
    Both,
    /// `--`
    Plain,
}

/// One end of an edge statement: `id` or `id.port`.
#[derive(Debug, PartialEq)]
pub struct EndpointAst<'src> {
    pub id: Spanned<String>,
    pub port: Option<Spanned<&'src str>>,
}

impl EndpointAst<'_> {
    /// Span of the full endpoint, including the port when present.
    pub fn span(&self) -> Span {
        match &self.port {
            Some(port) => self.id.span().union(port.span()),
            None => self.id.span(),
        }
    }
}

/// `<endpoint> <arrow> <endpoint> [: "label"] [attrs];`
#[derive(Debug, PartialEq)]
pub struct EdgeStmt<'src> {
    pub source: EndpointAst<'src>,
    pub arrow: Spanned<ArrowAst>,
    pub target: EndpointAst<'src>,
    pub label: Option<Spanned<String>>,
    pub attrs: Vec<Attr<'src>>,
}

/// `container <id> [attrs] { ... }`
#[derive(Debug, PartialEq)]
pub struct ContainerStmt<'src> {
    pub id: Spanned<String>,
    pub attrs: Vec<Attr<'src>>,
    pub body: Vec<Statement<'src>>,
}

/// `template <name> from <source> { ... }`; body restricted to node
/// and edge statements by the parser.
#[derive(Debug, PartialEq)]
pub struct TemplateStmt<'src> {
    pub name: Spanned<&'src str>,
    pub source: Spanned<&'src str>,
    pub body: Vec<Statement<'src>>,
}

/// `source <name> = load "locator";` or
/// `source <name> = [ {..}, {..} ];`
#[derive(Debug, PartialEq)]
pub struct SourceStmt<'src> {
    pub name: Spanned<&'src str>,
    pub origin: SourceOriginAst<'src>,
}

#[derive(Debug, PartialEq)]
pub enum SourceOriginAst<'src> {
    Load(Spanned<String>),
    Inline(Vec<Spanned<Vec<Attr<'src>>>>),
}

/// A `key: value` pair in an attribute list or object literal.
#[derive(Debug, PartialEq)]
pub struct Attr<'src> {
    pub name: Spanned<&'src str>,
    pub value: AttrValue<'src>,
}

/// A parsed attribute value.
#[derive(Debug, PartialEq)]
pub enum AttrValue<'src> {
    String(Spanned<String>),
    Number(Spanned<f64>),
    Bool(Spanned<bool>),
    /// A bare identifier used as a reference (style name, routing
    /// hint, net name).
    Ident(Spanned<&'src str>),
    /// A nested `{ key: value, ... }` object literal.
    Object(Spanned<Vec<Attr<'src>>>),
}

impl AttrValue<'_> {
    pub fn span(&self) -> Span {
        match self {
            AttrValue::String(s) => s.span(),
            AttrValue::Number(n) => n.span(),
            AttrValue::Bool(b) => b.span(),
            AttrValue::Ident(i) => i.span(),
            AttrValue::Object(o) => o.span(),
        }
    }
}
