//! Parser for Archflow source tokens.
//!
//! This module shapes the token stream from the [`lexer`](super::lexer) into
//! [`Declaration`] records. The public entry point is [`build_declarations`].
//!
//! Newlines are ordinary whitespace everywhere except inside `use_case`
//! bodies, where each trigger and each action occupies exactly one line.

use winnow::{
    Parser as _,
    combinator::{alt, eof, opt, peek, preceded, repeat, separated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    declarations::{
        ActionDecl, ActorDecl, ArchDecl, ComponentDecl, Declaration, DeploymentDecl,
        DeploymentRuleDecl, DomainDecl, ExposureDecl, ModifierDecl, NodeDecl, ScenarioDecl,
        ServiceDecl, ServiceProperty, Text, TriggerDecl, UseCaseDecl,
    },
    error::{Diagnostic, ErrorCode},
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Words that may follow a verb (or a sync target) to introduce the phrase.
const CONNECTORS: &[&str] = &[
    "a", "an", "the", "to", "with", "from", "in", "on", "at", "for", "by", "as", "of", "into",
];

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    ///
    /// Used to calculate start_offset as: `tokens.len() - start_offset_value`
    StartOffset(usize),
}

type Input<'src> = ArchflowTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
/// Type alias for winnow TokenSlice with our positioned tokens
type ArchflowTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Run `f`, committing to its result: any failure becomes a Cut error that
/// remembers where `f` started.
fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

/// Helper to create a Cut error with a label and a specific StartOffset value
fn cut_error_from_offset(
    start_offset: usize,
    label: &'static str,
) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    e.push(Context::StartOffset(start_offset));
    ErrMode::Cut(e)
}

/// Parse whitespace, newlines, and comments
fn ws_comment<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.token.is_trivia())
        .void()
        .parse_next(input)
}

/// Parse zero or more whitespace/comments
fn ws_comments0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., ws_comment).parse_next(input)
}

/// Parse one or more whitespace/comments
fn ws_comments1<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(1.., ws_comment).parse_next(input)
}

/// Parse zero or more whitespace/comments without crossing a line break
fn inline_ws0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(
        0..,
        any.verify(|token: &PositionedToken<'_>| {
            matches!(token.token, Token::Whitespace | Token::LineComment(_))
        })
        .void(),
    )
    .parse_next(input)
}

/// Match a single token by predicate and return its span.
fn token_where<'src>(
    input: &mut Input<'src>,
    label: &'static str,
    predicate: impl Fn(&Token<'_>) -> bool,
) -> IResult<Span> {
    any.verify(|token: &PositionedToken<'_>| predicate(&token.token))
        .map(|token: &PositionedToken<'_>| token.span)
        .context(Context::Label(label))
        .parse_next(input)
}

fn left_brace<'src>(input: &mut Input<'src>) -> IResult<Span> {
    token_where(input, "`{`", |t| matches!(t, Token::LeftBrace))
}

fn right_brace<'src>(input: &mut Input<'src>) -> IResult<Span> {
    token_where(input, "`}`", |t| matches!(t, Token::RightBrace))
}

fn left_bracket<'src>(input: &mut Input<'src>) -> IResult<Span> {
    token_where(input, "`[`", |t| matches!(t, Token::LeftBracket))
}

fn right_bracket<'src>(input: &mut Input<'src>) -> IResult<Span> {
    token_where(input, "`]`", |t| matches!(t, Token::RightBracket))
}

fn left_paren<'src>(input: &mut Input<'src>) -> IResult<Span> {
    token_where(input, "`(`", |t| matches!(t, Token::LeftParen))
}

fn right_paren<'src>(input: &mut Input<'src>) -> IResult<Span> {
    token_where(input, "`)`", |t| matches!(t, Token::RightParen))
}

fn colon<'src>(input: &mut Input<'src>) -> IResult<Span> {
    token_where(input, "`:`", |t| matches!(t, Token::Colon))
}

fn comma<'src>(input: &mut Input<'src>) -> IResult<Span> {
    token_where(input, "`,`", |t| matches!(t, Token::Comma))
}

fn arrow<'src>(input: &mut Input<'src>) -> IResult<Span> {
    token_where(input, "`->`", |t| matches!(t, Token::Arrow))
}

fn greater<'src>(input: &mut Input<'src>) -> IResult<Span> {
    token_where(input, "`>`", |t| matches!(t, Token::Greater))
}

fn newline<'src>(input: &mut Input<'src>) -> IResult<Span> {
    token_where(input, "newline", |t| matches!(t, Token::Newline))
}

fn when_keyword<'src>(input: &mut Input<'src>) -> IResult<Span> {
    token_where(input, "`when`", |t| matches!(t, Token::When))
}

/// Parse an entity name: a bare identifier or a quoted string.
fn entity_name<'src>(input: &mut Input<'src>) -> IResult<Text> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Identifier(name) => Some(Spanned::new((*name).to_string(), token.span)),
        Token::StringLiteral(s) => Some(Spanned::new(s.clone(), token.span)),
        _ => None,
    })
    .context(Context::Label("name"))
    .parse_next(input)
}

/// Parse a bare identifier only.
fn identifier<'src>(input: &mut Input<'src>) -> IResult<Text> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Identifier(name) => Some(Spanned::new((*name).to_string(), token.span)),
        _ => None,
    })
    .context(Context::Label("identifier"))
    .parse_next(input)
}

/// Parse a comma-separated list of names; a trailing comma is allowed.
fn name_list<'src>(input: &mut Input<'src>) -> IResult<Vec<Text>> {
    let names = separated(1.., entity_name, (ws_comments0, comma, ws_comments0))
        .context(Context::Label("name list"))
        .parse_next(input)?;
    opt((ws_comments0, comma)).void().parse_next(input)?;
    Ok(names)
}

/// Parse `{ item item ... }` where items are separated by whitespace.
///
/// Returns the items and the span from `{` to `}`.
fn braced<'src, O>(
    input: &mut Input<'src>,
    mut item: impl FnMut(&mut Input<'src>) -> IResult<O>,
) -> IResult<(Vec<O>, Span)> {
    let open = left_brace(input)?;
    let mut items = Vec::new();

    loop {
        ws_comments0(input)?;
        if let Some(close) = opt(right_brace).parse_next(input)? {
            return Ok((items, open.union(close)));
        }
        items.push(item(input)?);
    }
}

// ============================================================================
// Actors
// ============================================================================

/// Parse an actor kind. `service` is a keyword elsewhere but a kind here.
fn actor_kind<'src>(input: &mut Input<'src>) -> IResult<Text> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Identifier(kind) => Some(Spanned::new((*kind).to_string(), token.span)),
        Token::Service => Some(Spanned::new("service".to_string(), token.span)),
        _ => None,
    })
    .context(Context::Label("actor kind"))
    .parse_next(input)
}

/// Parse `<kind> <Name>`
fn actor_entry<'src>(input: &mut Input<'src>) -> IResult<ActorDecl> {
    let kind = actor_kind(input)?;
    ws_comments1(input)?;
    let name = entity_name(input)?;
    Ok(ActorDecl { kind, name })
}

/// Parse `actor <kind> <Name>`
fn actor_declaration<'src>(input: &mut Input<'src>) -> IResult<Spanned<Declaration>> {
    let start = token_where(input, "`actor`", |t| matches!(t, Token::Actor))?;

    cut_err(input, |input| {
        ws_comments1(input)?;
        let actor = actor_entry(input)?;
        let span = start.union(actor.name.span());
        Ok(Spanned::new(Declaration::Actor(actor), span))
    })
}

/// Parse `actors { <kind> <Name> ... }`
fn actors_block<'src>(input: &mut Input<'src>) -> IResult<Spanned<Declaration>> {
    let start = token_where(input, "`actors`", |t| matches!(t, Token::Actors))?;

    cut_err(input, |input| {
        ws_comments0(input)?;
        let (actors, body) = braced(input, actor_entry)?;
        Ok(Spanned::new(Declaration::Actors(actors), start.union(body)))
    })
}

// ============================================================================
// Domains
// ============================================================================

/// Parse `<Name> { <Sub> ... }`
fn domain_entry<'src>(input: &mut Input<'src>) -> IResult<(DomainDecl, Span)> {
    let name = entity_name(input)?;
    ws_comments0(input)?;
    let (sub_domains, body) = braced(input, entity_name)?;
    let span = name.span().union(body);
    Ok((DomainDecl { name, sub_domains }, span))
}

/// Parse `domain <Name> { <Sub> ... }`
fn domain_declaration<'src>(input: &mut Input<'src>) -> IResult<Spanned<Declaration>> {
    let start = token_where(input, "`domain`", |t| matches!(t, Token::Domain))?;

    cut_err(input, |input| {
        ws_comments1(input)?;
        let (domain, span) = domain_entry(input)?;
        Ok(Spanned::new(Declaration::Domain(domain), start.union(span)))
    })
}

/// Parse `domains { <Name> { ... } ... }`
fn domains_block<'src>(input: &mut Input<'src>) -> IResult<Spanned<Declaration>> {
    let start = token_where(input, "`domains`", |t| matches!(t, Token::Domains))?;

    cut_err(input, |input| {
        ws_comments0(input)?;
        let (entries, body) = braced(input, domain_entry)?;
        let domains = entries.into_iter().map(|(domain, _)| domain).collect();
        Ok(Spanned::new(
            Declaration::Domains(domains),
            start.union(body),
        ))
    })
}

// ============================================================================
// Services
// ============================================================================

/// Parse a deployment rule: `10% -> staging`
fn deployment_rule<'src>(input: &mut Input<'src>) -> IResult<DeploymentRuleDecl> {
    let percentage = any
        .verify_map(|token: &PositionedToken<'_>| match &token.token {
            Token::Percentage(digits) => Some(Spanned::new(format!("{digits}%"), token.span)),
            _ => None,
        })
        .context(Context::Label("percentage"))
        .parse_next(input)?;
    ws_comments0(input)?;
    arrow(input)?;
    ws_comments0(input)?;
    let target = entity_name(input)?;
    Ok(DeploymentRuleDecl { percentage, target })
}

/// Parse `<kind> [ ( <rule>, ... ) ]`
fn deployment<'src>(input: &mut Input<'src>) -> IResult<DeploymentDecl> {
    let kind = identifier(input)?;
    let mut rules = Vec::new();

    if opt((ws_comments0, left_paren)).parse_next(input)?.is_some() {
        rules = cut_err(input, |input| {
            ws_comments0(input)?;
            let rules: Vec<DeploymentRuleDecl> =
                separated(1.., deployment_rule, (ws_comments0, comma, ws_comments0))
                    .parse_next(input)?;
            ws_comments0(input)?;
            right_paren(input)?;
            Ok(rules)
        })?;
    }

    Ok(DeploymentDecl { kind, rules })
}

/// Parse the key of a service property line.
fn property_key<'src>(input: &mut Input<'src>) -> IResult<Text> {
    any.verify_map(|token: &PositionedToken<'_>| {
        let key = match &token.token {
            Token::Domains => "domains",
            Token::DataStores => "data-stores",
            Token::Identifier(key) => *key,
            _ => return None,
        };
        Some(Spanned::new(key.to_string(), token.span))
    })
    .context(Context::Label("service property"))
    .parse_next(input)
}

/// Parse one `key: value` line of a service body.
fn service_property<'src>(input: &mut Input<'src>) -> IResult<ServiceProperty> {
    let start = input.eof_offset();
    let key = property_key(input)?;
    ws_comments0(input)?;
    colon(input)?;
    ws_comments0(input)?;

    match key.as_str() {
        "domains" => name_list(input).map(ServiceProperty::Domains),
        "data-stores" => name_list(input).map(ServiceProperty::DataStores),
        "language" => entity_name(input).map(ServiceProperty::Language),
        "deployment" => deployment(input).map(ServiceProperty::Deployment),
        _ => Err(cut_error_from_offset(
            start,
            "service property `domains`, `data-stores`, `language`, or `deployment`",
        )),
    }
}

/// Parse `<Name> { <property> ... }`
fn service_entry<'src>(input: &mut Input<'src>) -> IResult<(ServiceDecl, Span)> {
    let name = entity_name(input)?;
    ws_comments0(input)?;
    let (properties, body) = braced(input, service_property)?;
    let span = name.span().union(body);
    Ok((ServiceDecl { name, properties }, span))
}

/// Parse `service <Name> { ... }`
fn service_declaration<'src>(input: &mut Input<'src>) -> IResult<Spanned<Declaration>> {
    let start = token_where(input, "`service`", |t| matches!(t, Token::Service))?;

    cut_err(input, |input| {
        ws_comments1(input)?;
        let (service, span) = service_entry(input)?;
        Ok(Spanned::new(
            Declaration::Service(service),
            start.union(span),
        ))
    })
}

/// Parse `services { <Name> { ... } ... }`
fn services_block<'src>(input: &mut Input<'src>) -> IResult<Spanned<Declaration>> {
    let start = token_where(input, "`services`", |t| matches!(t, Token::Services))?;

    cut_err(input, |input| {
        ws_comments0(input)?;
        let (entries, body) = braced(input, service_entry)?;
        let services = entries.into_iter().map(|(service, _)| service).collect();
        Ok(Spanned::new(
            Declaration::Services(services),
            start.union(body),
        ))
    })
}

// ============================================================================
// Exposures
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExposureField {
    To,
    Of,
    Through,
}

/// Parse one `to:`, `of:`, or `through:` line.
fn exposure_field<'src>(input: &mut Input<'src>) -> IResult<(ExposureField, Vec<Text>)> {
    let start = input.eof_offset();
    let key = identifier(input)?;
    let field = match key.as_str() {
        "to" => ExposureField::To,
        "of" => ExposureField::Of,
        "through" => ExposureField::Through,
        _ => {
            return Err(cut_error_from_offset(
                start,
                "exposure field `to`, `of`, or `through`",
            ));
        }
    };
    ws_comments0(input)?;
    colon(input)?;
    ws_comments0(input)?;
    let names = name_list(input)?;
    Ok((field, names))
}

/// Parse `exposure <Name> { to: ... of: ... through: ... }`
fn exposure_declaration<'src>(input: &mut Input<'src>) -> IResult<Spanned<Declaration>> {
    let start = token_where(input, "`exposure`", |t| matches!(t, Token::Exposure))?;

    cut_err(input, |input| {
        ws_comments1(input)?;
        let name = entity_name(input)?;
        ws_comments0(input)?;
        let (fields, body) = braced(input, exposure_field)?;

        let mut exposure = ExposureDecl {
            name,
            to: Vec::new(),
            of: Vec::new(),
            through: Vec::new(),
        };
        for (field, names) in fields {
            match field {
                ExposureField::To => exposure.to.extend(names),
                ExposureField::Of => exposure.of.extend(names),
                ExposureField::Through => exposure.through.extend(names),
            }
        }

        Ok(Spanned::new(
            Declaration::Exposure(exposure),
            start.union(body),
        ))
    })
}

// ============================================================================
// Architecture
// ============================================================================

/// Parse a modifier value: identifier, string, number, or percentage.
fn modifier_value<'src>(input: &mut Input<'src>) -> IResult<Text> {
    any.verify_map(|token: &PositionedToken<'_>| {
        let value = match &token.token {
            Token::Identifier(value) | Token::Number(value) => (*value).to_string(),
            Token::Percentage(digits) => format!("{digits}%"),
            Token::StringLiteral(s) => s.clone(),
            _ => return None,
        };
        Some(Spanned::new(value, token.span))
    })
    .context(Context::Label("modifier value"))
    .parse_next(input)
}

/// Parse `key` or `key: value`
fn modifier<'src>(input: &mut Input<'src>) -> IResult<ModifierDecl> {
    let key = entity_name(input)?;
    let value = opt(preceded(
        (ws_comments0, colon, ws_comments0),
        modifier_value,
    ))
    .parse_next(input)?;
    Ok(ModifierDecl { key, value })
}

/// Parse `[mod, mod, ...]` directly after a node name.
fn modifier_list<'src>(input: &mut Input<'src>) -> IResult<Vec<ModifierDecl>> {
    (inline_ws0, left_bracket).parse_next(input)?;

    cut_err(input, |input| {
        ws_comments0(input)?;
        let modifiers: Vec<ModifierDecl> =
            separated(1.., modifier, (ws_comments0, comma, ws_comments0)).parse_next(input)?;
        ws_comments0(input)?;
        right_bracket(input)?;
        Ok(modifiers)
    })
}

/// Parse `Name[modifiers]`
fn node<'src>(input: &mut Input<'src>) -> IResult<NodeDecl> {
    let name = entity_name(input)?;
    let modifiers = opt(modifier_list).parse_next(input)?.unwrap_or_default();
    Ok(NodeDecl { name, modifiers })
}

/// Parse a node or a `>` chain of nodes.
fn component<'src>(input: &mut Input<'src>) -> IResult<ComponentDecl> {
    let chain = separated(1.., node, (ws_comments0, greater, ws_comments0))
        .context(Context::Label("component"))
        .parse_next(input)?;
    Ok(ComponentDecl { chain })
}

/// Parse `<identifier> :`, the start of an arch section.
fn section_header<'src>(input: &mut Input<'src>) -> IResult<Text> {
    let key = identifier(input)?;
    ws_comments0(input)?;
    colon(input)?;
    Ok(key)
}

/// Parse components until the next section header or the closing brace.
fn arch_components<'src>(input: &mut Input<'src>) -> IResult<Vec<ComponentDecl>> {
    let mut components = Vec::new();

    loop {
        ws_comments0(input)?;
        let at_end = opt(peek(right_brace)).parse_next(input)?.is_some()
            || opt(peek(section_header)).parse_next(input)?.is_some();
        if at_end {
            return Ok(components);
        }
        components.push(component(input)?);
    }
}

/// Parse `arch [<Name>] { presentation: ... gateway: ... }`
fn arch_declaration<'src>(input: &mut Input<'src>) -> IResult<Spanned<Declaration>> {
    let start = token_where(input, "`arch`", |t| matches!(t, Token::Arch))?;

    cut_err(input, |input| {
        ws_comments0(input)?;
        let name = opt(entity_name).parse_next(input)?;
        ws_comments0(input)?;
        left_brace(input)?;

        let mut arch = ArchDecl {
            name,
            presentation: Vec::new(),
            gateway: Vec::new(),
        };

        loop {
            ws_comments0(input)?;
            if let Some(close) = opt(right_brace).parse_next(input)? {
                return Ok(Spanned::new(Declaration::Arch(arch), start.union(close)));
            }

            let section_start = input.eof_offset();
            let key = section_header(input)?;
            let components = arch_components(input)?;
            match key.as_str() {
                "presentation" => arch.presentation.extend(components),
                "gateway" => arch.gateway.extend(components),
                _ => {
                    return Err(cut_error_from_offset(
                        section_start,
                        "arch section `presentation` or `gateway`",
                    ));
                }
            }
        }
    })
}

// ============================================================================
// Use cases
// ============================================================================

/// A word of a trigger or action line.
#[derive(Debug, Clone, PartialEq)]
struct Word {
    text: String,
    quoted: bool,
}

impl Word {
    fn is(&self, keyword: &str) -> bool {
        !self.quoted && self.text == keyword
    }

    fn is_connector(&self) -> bool {
        !self.quoted
            && CONNECTORS
                .iter()
                .any(|connector| self.text.eq_ignore_ascii_case(connector))
    }

    /// Text as it appears in a phrase; quoted words keep their quotes.
    fn phrase_text(&self) -> String {
        if self.quoted {
            format!("\"{}\"", self.text)
        } else {
            self.text.clone()
        }
    }
}

/// Parse a single word. Keywords are plain words inside a line.
fn word<'src>(input: &mut Input<'src>) -> IResult<Spanned<Word>> {
    any.verify_map(|token: &PositionedToken<'_>| {
        let (text, quoted) = match &token.token {
            Token::Identifier(word) | Token::Number(word) => ((*word).to_string(), false),
            Token::Percentage(digits) => (format!("{digits}%"), false),
            Token::StringLiteral(s) => (s.clone(), true),
            other => (other.keyword_text()?.to_string(), false),
        };
        Some(Spanned::new(Word { text, quoted }, token.span))
    })
    .context(Context::Label("word"))
    .parse_next(input)
}

/// End of a use-case line: a newline, or the body's closing brace.
fn line_end<'src>(input: &mut Input<'src>) -> IResult<()> {
    alt((newline.void(), peek(right_brace).void(), eof.void()))
        .context(Context::Label("end of line"))
        .parse_next(input)
}

/// Parse the words of one line and its line end.
fn line_words<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<Word>>> {
    let words = repeat(1.., preceded(inline_ws0, word)).parse_next(input)?;
    inline_ws0(input)?;
    line_end(input)?;
    Ok(words)
}

fn words_span(words: &[Spanned<Word>]) -> Span {
    words
        .iter()
        .map(Spanned::span)
        .reduce(|acc, span| acc.union(span))
        .unwrap_or_default()
}

fn phrase(words: &[Spanned<Word>]) -> Vec<String> {
    words.iter().map(|word| word.phrase_text()).collect()
}

/// Split an optional leading connector off a phrase.
fn connector_and_phrase(words: &[Spanned<Word>]) -> (Option<String>, Vec<String>) {
    match words {
        [first, rest @ ..] if first.is_connector() => (Some(first.text.clone()), phrase(rest)),
        _ => (None, phrase(words)),
    }
}

fn classify_trigger(words: &[Spanned<Word>]) -> Option<TriggerDecl> {
    match words {
        [event] if event.quoted => Some(TriggerDecl::Event {
            event: event.text.clone(),
        }),
        [domain, listens, event] if !domain.quoted && listens.is("listens") && event.quoted => {
            Some(TriggerDecl::DomainListen {
                domain: domain.text.clone(),
                event: event.text.clone(),
            })
        }
        [actor, verb, rest @ ..] if !actor.quoted && !verb.quoted => Some(TriggerDecl::External {
            actor: actor.text.clone(),
            verb: verb.text.clone(),
            phrase: phrase(rest),
        }),
        _ => None,
    }
}

fn classify_action(words: &[Spanned<Word>]) -> Option<ActionDecl> {
    let (domain, verb, rest) = match words {
        [domain, verb, rest @ ..] if !domain.quoted => (domain.text.clone(), verb, rest),
        _ => return None,
    };

    if verb.is("asks") {
        return match rest {
            [target, rest @ ..] if !target.quoted => {
                let (connector, phrase) = connector_and_phrase(rest);
                Some(ActionDecl::Sync {
                    domain,
                    target: target.text.clone(),
                    connector,
                    phrase,
                })
            }
            _ => None,
        };
    }

    if verb.is("notifies") {
        return match rest {
            [event] if event.quoted => Some(ActionDecl::Async {
                domain,
                event: event.text.clone(),
            }),
            _ => None,
        };
    }

    if verb.is("returns") {
        return match rest {
            [to, target, rest @ ..] if to.is("to") && !target.quoted => Some(ActionDecl::Return {
                domain,
                target: Some(target.text.clone()),
                phrase: phrase(rest),
            }),
            _ => Some(ActionDecl::Return {
                domain,
                target: None,
                phrase: phrase(rest),
            }),
        };
    }

    if verb.quoted {
        return None;
    }
    let (connector, phrase) = connector_and_phrase(rest);
    Some(ActionDecl::Internal {
        domain,
        verb: verb.text.clone(),
        connector,
        phrase,
    })
}

/// Parse `when <trigger>` up to the end of its line.
fn trigger_line<'src>(input: &mut Input<'src>) -> IResult<Spanned<TriggerDecl>> {
    let when = when_keyword(input)?;

    cut_err(input, |input| {
        let start = input.eof_offset();
        let words = line_words(input)?;
        let trigger = classify_trigger(&words).ok_or_else(|| {
            cut_error_from_offset(
                start,
                "trigger `<actor> <verb> ...`, `\"<event>\"`, or `<domain> listens \"<event>\"`",
            )
        })?;
        Ok(Spanned::new(trigger, when.union(words_span(&words))))
    })
}

/// Parse one action line.
fn action_line<'src>(input: &mut Input<'src>) -> IResult<Spanned<ActionDecl>> {
    let start = input.eof_offset();
    let words = line_words(input)?;
    let action = classify_action(&words).ok_or_else(|| {
        cut_error_from_offset(start, "action `<domain> asks|notifies|returns|<verb> ...`")
    })?;
    Ok(Spanned::new(action, words_span(&words)))
}

/// Parse a `when` line and the action lines below it.
fn scenario<'src>(input: &mut Input<'src>) -> IResult<ScenarioDecl> {
    let trigger = trigger_line(input)?;
    let mut actions = Vec::new();

    loop {
        ws_comments0(input)?;
        let at_end = opt(peek(alt((right_brace, when_keyword))))
            .parse_next(input)?
            .is_some();
        if at_end {
            return Ok(ScenarioDecl { trigger, actions });
        }
        actions.push(action_line(input)?);
    }
}

/// Parse `use_case "<Name>" { <scenario> ... }`
fn use_case_declaration<'src>(input: &mut Input<'src>) -> IResult<Spanned<Declaration>> {
    let start = token_where(input, "`use_case`", |t| matches!(t, Token::UseCase))?;

    cut_err(input, |input| {
        ws_comments1(input)?;
        let name = entity_name(input)?;
        ws_comments0(input)?;
        let (scenarios, body) = braced(input, scenario)?;
        Ok(Spanned::new(
            Declaration::UseCase(UseCaseDecl { name, scenarios }),
            start.union(body),
        ))
    })
}

// ============================================================================
// Source file
// ============================================================================

fn declaration<'src>(input: &mut Input<'src>) -> IResult<Spanned<Declaration>> {
    alt((
        actors_block,
        actor_declaration,
        domains_block,
        domain_declaration,
        services_block,
        service_declaration,
        exposure_declaration,
        arch_declaration,
        use_case_declaration,
    ))
    .context(Context::Label("declaration"))
    .parse_next(input)
}

fn source_file<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<Declaration>>> {
    let mut declarations = Vec::new();

    loop {
        ws_comments0(input)?;
        if input.eof_offset() == 0 {
            return Ok(declarations);
        }
        declarations.push(declaration(input)?);
    }
}

/// Span covering the significant tokens of `tokens`, or `None` if there are none.
fn significant_span(tokens: &[PositionedToken<'_>]) -> Option<Span> {
    let first = tokens.iter().find(|t| !t.token.is_trivia())?;
    let last = tokens.iter().rev().find(|t| !t.token.is_trivia())?;
    Some(first.span.union(last.span))
}

fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
) -> Diagnostic {
    let context_error = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    let start_remaining = context_error.context().find_map(|ctx| match ctx {
        Context::StartOffset(n) => Some(*n),
        _ => None,
    });

    let end_offset = tokens.len() - current_remaining;
    let start_offset = start_remaining.map(|r| tokens.len() - r).unwrap_or(0);

    let expected: Vec<String> = context_error
        .context()
        .filter_map(|ctx| match ctx {
            Context::Label(label) => Some(format!("expected {label}")),
            _ => None,
        })
        .collect();
    let message = if expected.is_empty() {
        "unexpected token or end of input".to_string()
    } else {
        expected.join(" → ")
    };

    // Nothing but trivia left: the source stopped mid-declaration.
    if significant_span(&tokens[end_offset..]).is_none() {
        let error_span = significant_span(&tokens[start_offset..])
            .or_else(|| significant_span(tokens))
            .unwrap_or_default();

        return Diagnostic::error(format!("incomplete input: {message}"))
            .with_code(ErrorCode::E101)
            .with_label(error_span, "incomplete")
            .with_help("the input ended before this declaration was closed");
    }

    let examine_range = if start_offset < end_offset {
        start_offset..end_offset + 1
    } else {
        end_offset..end_offset + 1
    };
    let error_span = significant_span(&tokens[examine_range]).unwrap_or(tokens[end_offset].span);

    let mut diagnostic = Diagnostic::error(format!("unexpected token: {message}"))
        .with_code(ErrorCode::E100)
        .with_label(error_span, "unexpected token")
        .with_help("check syntax and token positioning");

    let found = tokens[end_offset..].iter().find(|t| !t.token.is_trivia());
    if let Some(found) = found.filter(|found| found.span != error_span) {
        diagnostic =
            diagnostic.with_secondary_label(found.span, format!("found `{}`", found.token));
    }

    diagnostic
}

/// Build declaration records from tokens.
pub fn build_declarations<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<Vec<Spanned<Declaration>>, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    match source_file.parse_next(&mut token_slice) {
        Ok(declarations) => Ok(declarations),
        Err(e) => {
            let current_remaining = token_slice.eof_offset();
            Err(convert_error(e, tokens, current_remaining))
        }
    }
}
