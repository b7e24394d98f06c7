use std::fmt;

use crate::span::Span;

/// Token types for the Archflow language
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Keywords
    Actors,
    Actor,
    Domains,
    Domain,
    Services,
    Service,
    Exposure,
    Arch,
    UseCase,
    When,
    DataStores,

    // Literals
    StringLiteral(String),
    /// Digits of a `10%` literal, without the percent sign.
    Percentage(&'src str),
    Number(&'src str),
    Identifier(&'src str),

    // Operators
    Arrow,   // ->
    Greater, // >
    Colon,   // :

    // Punctuation
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    LeftParen,    // (
    RightParen,   // )
    Comma,        // ,

    // Comments
    LineComment(&'src str), // // comment

    // Whitespace
    Whitespace,
    Newline,
}

impl Token<'_> {
    /// Source spelling of a keyword token.
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            Token::Actors => "actors",
            Token::Actor => "actor",
            Token::Domains => "domains",
            Token::Domain => "domain",
            Token::Services => "services",
            Token::Service => "service",
            Token::Exposure => "exposure",
            Token::Arch => "arch",
            Token::UseCase => "use_case",
            Token::When => "when",
            Token::DataStores => "data-stores",
            _ => return None,
        };
        Some(text)
    }

    /// Whitespace, newlines, and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::LineComment(_)
        )
    }
}

/// A token with position information for winnow integration
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

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyword) = self.keyword_text() {
            return write!(f, "{keyword}");
        }
        match self {
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Percentage(n) => write!(f, "{n}%"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Identifier(name) => write!(f, "{name}"),

            Token::Arrow => write!(f, "->"),
            Token::Greater => write!(f, ">"),
            Token::Colon => write!(f, ":"),

            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),

            Token::LineComment(comment) => write!(f, "//{comment}"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => write!(f, "\\n"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_display_matches_source_spelling() {
        assert_eq!(Token::UseCase.to_string(), "use_case");
        assert_eq!(Token::DataStores.to_string(), "data-stores");
        assert_eq!(Token::Percentage("90").to_string(), "90%");
        assert_eq!(Token::Identifier("Wallet").keyword_text(), None);
    }

    #[test]
    fn test_trivia() {
        assert!(Token::Newline.is_trivia());
        assert!(Token::LineComment(" note").is_trivia());
        assert!(!Token::Comma.is_trivia());
    }
}
