//! Lexical analyzer for Archflow source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! Whitespace, newlines, and comments are kept as tokens because newlines
//! separate triggers and actions inside `use_case` bodies.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    ascii::digit1,
    combinator::{alt, cut_err, not, opt, peek, preceded, repeat, terminated},
    error::{ContextError, ErrMode},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, none_of, one_of, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()` so a failure carries its code,
/// help text, and the offset where the offending construct began.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = Result<O, ErrMode<ContextError<LexerDiagnostic>>>;

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse an escape sequence in a string starting with backslash.
///
/// Supported escapes: `\n`, `\t`, `\r`, `\\`, `\"`. Anything else is a
/// committed E003 error spanning the backslash and the offending character.
fn string_escape(input: &mut Input<'_>) -> IResult<char> {
    let escape_start = input.current_token_start();

    '\\'.parse_next(input)?;

    let escaped: IResult<char> = one_of(['n', 't', 'r', '\\', '"'])
        .map(|c| match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            other => other,
        })
        .parse_next(input);

    escaped.map_err(|_| {
        let mut e = ContextError::new();
        e.push(LexerDiagnostic {
            code: ErrorCode::E003,
            message: "invalid escape sequence",
            help: Some("valid escapes: `\\n`, `\\t`, `\\r`, `\\\\`, `\\\"`"),
            start: escape_start,
        });
        ErrMode::Cut(e)
    })
}

/// Parse a double-quoted string literal. Strings never span lines.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let string_char = none_of(['"', '\\', '\n', '\r']);

    let string_content =
        repeat(0.., alt((string_escape, string_char))).fold(String::new, |mut acc, ch| {
            acc.push(ch);
            acc
        });

    let start_pos = input.current_token_start();

    '"'.parse_next(input)
        .map_err(|_: ErrMode<ContextError<LexerDiagnostic>>| {
            ErrMode::Backtrack(ContextError::new())
        })?;

    // Commit after the opening quote so the span starts there.
    cut_err(terminated(string_content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"` before the end of the line"),
            start: start_pos,
        })
        .parse_next(input)
        .map(Token::StringLiteral)
}

/// Parse a number (`8080`, `2.5`) or a percentage (`10%`, `12.5%`).
fn numeric<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    ((digit1, opt(('.', digit1))).take(), opt('%'))
        .map(|(digits, percent): (&'a str, Option<char>)| match percent {
            Some(_) => Token::Percentage(digits),
            None => Token::Number(digits),
        })
        .parse_next(input)
}

/// Parse line comment starting with '//'
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded("//", take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

/// Parse keywords with word boundary checking
fn keyword<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    terminated(
        // Plural forms first: the boundary check does not backtrack into `alt`.
        alt((
            alt((
                literal("actors").value(Token::Actors),
                literal("actor").value(Token::Actor),
                literal("domains").value(Token::Domains),
                literal("domain").value(Token::Domain),
                literal("services").value(Token::Services),
                literal("service").value(Token::Service),
                literal("exposure").value(Token::Exposure),
                literal("arch").value(Token::Arch),
                literal("use_case").value(Token::UseCase),
            )),
            literal("when").value(Token::When),
            literal("data-stores").value(Token::DataStores),
        )),
        peek(not(one_of(|c: char| is_word_char(c) || c == '-'))),
    )
    .parse_next(input)
}

/// Hyphen-joined tail of an identifier: `-re-go` in `service-re-go`.
fn hyphen_segments(input: &mut Input<'_>) -> IResult<()> {
    repeat(0.., ('-', take_while(1.., is_word_char)).void()).parse_next(input)
}

/// Parse identifiers: `Wallet`, `order_db`, `service-123-test`.
///
/// A hyphen only continues an identifier when a word character follows it,
/// so `a->b` still lexes the arrow.
fn identifier<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_word_char),
        hyphen_segments,
    )
        .take()
        .map(Token::Identifier)
        .parse_next(input)
}

/// Parse multi-character operators
fn multi_char_operator<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    literal("->").value(Token::Arrow).parse_next(input)
}

/// Parse single character tokens
fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '>'.value(Token::Greater),
        ':'.value(Token::Colon),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        ','.value(Token::Comma),
    ))
    .parse_next(input)
}

/// Parse whitespace (spaces, tabs, carriage returns but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,        // Must come before any single char
        string_literal,      // Must come before any single char
        multi_char_operator, // Must come before identifier hyphens and `>`
        keyword,             // Must come before identifier
        numeric,             // Digits never start an identifier
        identifier,
        single_char_token,
        newline, // Must come before whitespace
        whitespace,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    let span = Span::new(start_pos..end_pos);

    Ok(PositionedToken::new(token, span))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics.emit(Self::convert_err_mode(e, error_pos));

                    // Skip one character and keep going so every error is reported.
                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E002 (unexpected character) when no `LexerDiagnostic`
    /// context was attached.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos);

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Tokenize source text, collecting every lexical error.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens successfully lexed
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_single_token(input: &str, expected: Token<'_>) {
        let mut located_input = LocatingSlice::new(input);
        let result = positioned_token(&mut located_input);
        assert!(result.is_ok(), "Failed to lex: {input}");
        assert_eq!(result.unwrap().token, expected);
    }

    fn significant(input: &str) -> Vec<Token<'_>> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .filter(|t| !t.is_trivia())
            .collect()
    }

    #[test]
    fn test_keywords() {
        assert_single_token("actors", Token::Actors);
        assert_single_token("actor", Token::Actor);
        assert_single_token("domains", Token::Domains);
        assert_single_token("domain", Token::Domain);
        assert_single_token("services", Token::Services);
        assert_single_token("service", Token::Service);
        assert_single_token("exposure", Token::Exposure);
        assert_single_token("arch", Token::Arch);
        assert_single_token("use_case", Token::UseCase);
        assert_single_token("when", Token::When);
        assert_single_token("data-stores", Token::DataStores);
    }

    #[test]
    fn test_keyword_word_boundaries() {
        assert_single_token("domains_v2", Token::Identifier("domains_v2"));
        assert_single_token("actorsList", Token::Identifier("actorsList"));
        assert_single_token("service-re-go-vas", Token::Identifier("service-re-go-vas"));
        assert_single_token("whenever", Token::Identifier("whenever"));
    }

    #[test]
    fn test_identifiers() {
        assert_single_token("Wallet", Token::Identifier("Wallet"));
        assert_single_token("_private", Token::Identifier("_private"));
        assert_single_token("order_db", Token::Identifier("order_db"));
        assert_single_token("service-123-test", Token::Identifier("service-123-test"));
    }

    #[test]
    fn test_identifier_does_not_swallow_arrow() {
        assert_eq!(
            significant("a->b"),
            vec![Token::Identifier("a"), Token::Arrow, Token::Identifier("b")]
        );
    }

    #[test]
    fn test_numbers_and_percentages() {
        assert_single_token("10%", Token::Percentage("10"));
        assert_single_token("12.5%", Token::Percentage("12.5"));
        assert_single_token("8080", Token::Number("8080"));
        assert_single_token("2.5", Token::Number("2.5"));
    }

    #[test]
    fn test_punctuation() {
        assert_single_token("->", Token::Arrow);
        assert_single_token(">", Token::Greater);
        assert_single_token(":", Token::Colon);
        assert_single_token("{", Token::LeftBrace);
        assert_single_token("}", Token::RightBrace);
        assert_single_token("[", Token::LeftBracket);
        assert_single_token("]", Token::RightBracket);
        assert_single_token("(", Token::LeftParen);
        assert_single_token(")", Token::RightParen);
        assert_single_token(",", Token::Comma);
    }

    #[test]
    fn test_string_literals() {
        assert_single_token(
            "\"Order Placed\"",
            Token::StringLiteral("Order Placed".to_string()),
        );
        assert_single_token("\"\"", Token::StringLiteral(String::new()));
        assert_single_token(
            "\"say \\\"hi\\\"\\n\"",
            Token::StringLiteral("say \"hi\"\n".to_string()),
        );
    }

    #[test]
    fn test_comments_and_whitespace() {
        assert_single_token("// orders", Token::LineComment(" orders"));
        assert_single_token("//", Token::LineComment(""));
        assert_single_token(" \t", Token::Whitespace);
        assert_single_token("\n", Token::Newline);
    }

    #[test]
    fn test_deployment_line() {
        assert_eq!(
            significant("deployment: canary(10% -> staging, 90% -> production)"),
            vec![
                Token::Identifier("deployment"),
                Token::Colon,
                Token::Identifier("canary"),
                Token::LeftParen,
                Token::Percentage("10"),
                Token::Arrow,
                Token::Identifier("staging"),
                Token::Comma,
                Token::Percentage("90"),
                Token::Arrow,
                Token::Identifier("production"),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_span_tracking() {
        let tokens = tokenize("when user").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!((tokens[0].span.start(), tokens[0].span.end()), (0, 4));
        assert_eq!((tokens[1].span.start(), tokens[1].span.end()), (4, 5));
        assert_eq!((tokens[2].span.start(), tokens[2].span.end()), (5, 9));
    }

    mod lexer_error_tests {
        use super::*;

        fn assert_error_codes(input: &str, expected_codes: &[ErrorCode]) {
            let result = tokenize(input);
            assert!(
                result.is_err(),
                "Expected lexer to fail on input: '{input}'"
            );
            let parse_error = result.unwrap_err();
            let codes: Vec<_> = parse_error.diagnostics().iter().map(|d| d.code()).collect();
            let expected: Vec<_> = expected_codes.iter().copied().map(Some).collect();
            assert_eq!(codes, expected, "unexpected codes for input '{input}'");
        }

        #[test]
        fn test_unterminated_string() {
            assert_error_codes("\"Order Placed", &[ErrorCode::E001]);
            assert_error_codes("\"", &[ErrorCode::E001]);
        }

        #[test]
        fn test_unterminated_string_span_starts_at_quote() {
            let input = "when \"Order Placed\nx";
            let err = tokenize(input).unwrap_err();
            let span = err.diagnostics()[0].labels()[0].span();
            assert_eq!(span.start(), 5);
            assert_eq!(span.end(), 18);
        }

        #[test]
        fn test_invalid_escape() {
            // Recovery skips one character, so the closing quote opens a new string.
            assert_error_codes("\"bad\\q\"", &[ErrorCode::E003, ErrorCode::E001]);
        }

        #[test]
        fn test_unexpected_characters() {
            assert_error_codes("$", &[ErrorCode::E002]);
            assert_error_codes("=", &[ErrorCode::E002]);
            assert_error_codes("Wallet $ Order ; done", &[ErrorCode::E002, ErrorCode::E002]);
        }

        #[test]
        fn test_mixed_error_types() {
            assert_error_codes(
                "$ \"unterminated\n;",
                &[ErrorCode::E002, ErrorCode::E001, ErrorCode::E002],
            );
        }
    }
}
