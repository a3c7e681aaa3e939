//! Token types for the Trellis language.

use std::fmt;

use winnow::stream::Location;

use crate::span::Span;

/// Token types for the Trellis language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Keywords
    Profile,
    DirectionKw,
    StyleKw,
    NodeKw,
    ContainerKw,
    TemplateKw,
    From,
    SourceKw,
    Load,
    Let,
    True,
    False,

    // Literals
    StringLiteral(String),
    FloatLiteral(f64),
    Identifier(&'src str),

    // Arrows
    Arrow,       // ->
    LeftArrow,   // <-
    BothArrow,   // <->
    PlainEdge,   // --

    // Punctuation
    Equals,       // =
    Colon,        // :
    Dot,          // .
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Semicolon,    // ;
    Comma,        // ,

    // Comments
    LineComment(&'src str), // // comment

    // Whitespace
    Whitespace,
    Newline,
}

impl Token<'_> {
    /// Whether this token is skipped between grammar tokens.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::LineComment(_)
        )
    }
}

/// A token with position information for winnow integration.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<'src> AsRef<Token<'src>> for PositionedToken<'src> {
    fn as_ref(&self) -> &Token<'src> {
        &self.token
    }
}

impl Location for PositionedToken<'_> {
    fn previous_token_end(&self) -> usize {
        self.span.end()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Profile => write!(f, "profile"),
            Token::DirectionKw => write!(f, "direction"),
            Token::StyleKw => write!(f, "style"),
            Token::NodeKw => write!(f, "node"),
            Token::ContainerKw => write!(f, "container"),
            Token::TemplateKw => write!(f, "template"),
            Token::From => write!(f, "from"),
            Token::SourceKw => write!(f, "source"),
            Token::Load => write!(f, "load"),
            Token::Let => write!(f, "let"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),

            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::FloatLiteral(n) => write!(f, "{n}"),
            Token::Identifier(name) => write!(f, "{name}"),

            Token::Arrow => write!(f, "->"),
            Token::LeftArrow => write!(f, "<-"),
            Token::BothArrow => write!(f, "<->"),
            Token::PlainEdge => write!(f, "--"),

            Token::Equals => write!(f, "="),
            Token::Colon => write!(f, ":"),
            Token::Dot => write!(f, "."),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),

            Token::LineComment(comment) => write!(f, "//{comment}"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => write!(f, "\\n"),
        }
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}
