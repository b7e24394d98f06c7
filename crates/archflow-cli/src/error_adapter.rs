//! Rendering [`ArchflowError`] with miette.
//!
//! The library crates do not depend on miette. Each failure is flattened into
//! a [`Report`] up front: front-end diagnostics keep their labels and the
//! source text, everything else becomes a single unlabeled report.

use std::{error::Error, fmt};

use miette::{LabeledSpan, Severity, SourceCode, SourceSpan};

use archflow::ArchflowError;
use archflow_parser::{Span, error::Diagnostic};

/// One renderable failure.
#[derive(Debug)]
pub struct Report<'a> {
    message: String,
    code: Option<&'static str>,
    severity: Severity,
    help: Option<&'a str>,
    labels: Vec<LabeledSpan>,
    src: Option<&'a str>,
    cause: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Report<'a> {
    fn from_diagnostic(diag: &'a Diagnostic, src: &'a str) -> Self {
        let labels = diag
            .labels()
            .iter()
            .map(|label| {
                let span = clamped_span(label.span(), src.len());
                let message = Some(label.message().to_string());
                if label.is_primary() {
                    LabeledSpan::new_primary_with_span(message, span)
                } else {
                    LabeledSpan::new_with_span(message, span)
                }
            })
            .collect();

        Self {
            message: diag.message().to_string(),
            code: diag.code().map(|code| code.as_str()),
            severity: if diag.severity().is_error() {
                Severity::Error
            } else {
                Severity::Warning
            },
            help: diag.help(),
            labels,
            src: Some(src),
            cause: None,
        }
    }

    fn from_error(err: &'a ArchflowError) -> Self {
        let code = match err {
            ArchflowError::Io(_) => Some("archflow::io"),
            ArchflowError::Export(_) => Some("archflow::export"),
            ArchflowError::Parse { .. } => None,
        };

        Self {
            message: err.to_string(),
            code,
            severity: Severity::Error,
            help: None,
            labels: Vec::new(),
            src: None,
            cause: err.source(),
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for Report<'_> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
    }
}

impl miette::Diagnostic for Report<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.code
            .map(|code| Box::new(code) as Box<dyn fmt::Display + 'b>)
    }

    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.help
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'b>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.src.as_ref().map(|src| src as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            return None;
        }
        Some(Box::new(self.labels.iter().cloned()))
    }
}

/// Byte span as a miette span, clamped to the source.
///
/// Incomplete-input errors point just past the end of the source.
fn clamped_span(span: Span, src_len: usize) -> SourceSpan {
    let start = span.start().min(src_len);
    let end = span.end().clamp(start, src_len);
    SourceSpan::new(start.into(), end - start)
}

/// Flatten an [`ArchflowError`] into reports.
///
/// A parse error yields one report per diagnostic, so every lexer error gets
/// its own snippet. Other errors yield exactly one.
pub fn to_reports(err: &ArchflowError) -> Vec<Report<'_>> {
    match err {
        ArchflowError::Parse {
            err: parse_err,
            src,
        } => parse_err
            .diagnostics()
            .iter()
            .map(|diag| Report::from_diagnostic(diag, src))
            .collect(),
        _ => vec![Report::from_error(err)],
    }
}
