//! Error types and reporting

use crate::interp::RuntimeError;
use crate::lexer::LexError;
use crate::span::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, GolfError>;

/// Top-level error for a golf run
#[derive(Debug, Error)]
pub enum GolfError {
    #[error("Lexer error at {span}: {error}")]
    Lexer { error: LexError, span: Span },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {message}")]
    Io { message: String },
}

impl GolfError {
    pub fn lexer(error: LexError, span: Span) -> Self {
        Self::Lexer { error, span }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } => Some(*span),
            Self::Runtime(_) | Self::Io { .. } => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Lexer { error, .. } => error.to_string(),
            Self::Runtime(e) => e.message.clone(),
            Self::Io { message } => message.clone(),
        }
    }
}

impl From<std::io::Error> for GolfError {
    fn from(e: std::io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

/// Report error with ariadne; spans are byte offsets into `source`
pub fn report_error(filename: &str, source: &[u8], error: &GolfError) {
    use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

    let text = String::from_utf8_lossy(source);
    let config = Config::default().with_index_type(IndexType::Byte);

    let kind = match error {
        GolfError::Lexer { .. } => "Lexer",
        GolfError::Runtime(_) => "Runtime",
        GolfError::Io { .. } => "IO",
    };

    let report = if let Some(span) = error.span() {
        Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_config(config)
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
    } else {
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_config(config)
            .with_message(format!("{kind} error: {}", error.message()))
            .finish()
    };

    if report.eprint((filename, Source::from(text.as_ref()))).is_err() {
        eprintln!("Error: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_error_display() {
        let err = GolfError::lexer(LexError::UnterminatedBlock, Span::new(0, 4));
        assert_eq!(err.to_string(), "Lexer error at 0..4: unmatched '{' in block");
        assert_eq!(err.span(), Some(Span::new(0, 4)));
    }

    #[test]
    fn test_runtime_error_is_transparent() {
        let err = GolfError::from(RuntimeError::stack_underflow());
        assert_eq!(err.to_string(), RuntimeError::stack_underflow().to_string());
        assert_eq!(err.span(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.gs");
        let err = GolfError::from(io);
        assert!(matches!(err, GolfError::Io { .. }));
        assert!(err.message().contains("missing.gs"));
    }
}
