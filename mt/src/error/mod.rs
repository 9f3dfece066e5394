//! Front-end error types and reporting

use crate::ast::Span;
use crate::interp::EvalError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CompileError>;

/// Error raised anywhere between reading input and printing a result
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Lexer error at {span}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span}: {message}")]
    Parser { message: String, span: Span },

    #[error("IO error: {message}")]
    Io { message: String },

    /// Malformed `mt.cfg` or environment override
    #[error("Config error: {message}")]
    Config { message: String },

    /// Extension package failed to register its built-ins
    #[error("Extension error in package {package}: {source}")]
    Extension {
        package: String,
        #[source]
        source: EvalError,
    },

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn extension_error(package: impl Into<String>, source: EvalError) -> Self {
        Self::Extension {
            package: package.into(),
            source,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } => Some(*span),
            Self::Parser { span, .. } => Some(*span),
            Self::Io { .. } | Self::Config { .. } | Self::Extension { .. } | Self::Eval(_) => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Lexer { message, .. } => message.clone(),
            Self::Parser { message, .. } => message.clone(),
            Self::Io { message } => message.clone(),
            Self::Config { message } => message.clone(),
            Self::Extension { package, source } => format!("{package}: {source}"),
            Self::Eval(err) => err.to_string(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Lexer { .. } => "Lexer",
            Self::Parser { .. } => "Parser",
            Self::Io { .. } => "IO",
            Self::Config { .. } => "Config",
            Self::Extension { .. } => "Extension",
            Self::Eval(_) => "Evaluation",
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &CompileError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = error.kind();

    // A failed print to stderr leaves nothing else to report to
    if let Some(span) = error.span() {
        let _ = Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((filename, Source::from(source)));
    } else {
        let _ = Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {}", error.message()))
            .finish()
            .eprint((filename, Source::from(source)));
    }
}
