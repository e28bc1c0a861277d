use miette::Diagnostic;
use thiserror::Error;

/// What the parser was matching when it gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Literal,
    Identifier,
    Count,
    Expression,
    Search,
    Custom,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        use MatchType::*;
        return match self {
            Literal => "literal",
            Identifier => "identifier",
            Count => "count",
            Expression => "expression",
            Search => "search",
            Custom => "custom",
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedToken,
    SourceException,
}

#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ParseError {
    #[error("{} [line no: {line}]", unexpected_message(.expected, .found, .match_type))]
    #[diagnostic(code(css::unexpected_token))]
    UnexpectedToken {
        expected: String,
        found: String,
        match_type: MatchType,
        line: usize,
    },
    #[error("{message} [line no: {line}]")]
    #[diagnostic(code(css::source))]
    SourceException { message: String, line: usize },
}

fn unexpected_message(expected: &str, found: &str, match_type: &MatchType) -> String {
    return match match_type {
        MatchType::Search => format!("Search for \"{expected}\" returned no results. Context: \"{found}\"."),
        MatchType::Count => format!("Next token was expected to have {expected} chars. Context: \"{found}\"."),
        MatchType::Identifier => format!("Identifier expected. Got \"{found}\""),
        MatchType::Custom => expected.trim().to_owned(),
        MatchType::Literal | MatchType::Expression => {
            format!("Token \"{expected}\" ({}) not found. Got \"{found}\".", match_type.as_str())
        }
    };
}

impl ParseError {
    pub fn unexpected(
        expected: impl Into<String>,
        found: impl Into<String>,
        match_type: MatchType,
        line: usize,
    ) -> Self {
        return ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            match_type,
            line,
        };
    }

    pub fn custom(message: impl Into<String>, line: usize) -> Self {
        return Self::unexpected(message, "", MatchType::Custom, line);
    }

    pub fn source(message: impl Into<String>, line: usize) -> Self {
        return ParseError::SourceException {
            message: message.into(),
            line,
        };
    }

    pub fn kind(&self) -> ErrorKind {
        return match self {
            ParseError::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            ParseError::SourceException { .. } => ErrorKind::SourceException,
        };
    }

    pub fn line(&self) -> usize {
        return match self {
            ParseError::UnexpectedToken { line, .. } | ParseError::SourceException { line, .. } => {
                *line
            }
        };
    }

    pub fn is_unexpected_token(&self) -> bool {
        return self.kind() == ErrorKind::UnexpectedToken;
    }
}

/// Raised while rendering a tree that cannot be serialized
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
#[error("{message} [line no: {line}]")]
#[diagnostic(code(css::output))]
pub struct OutputError {
    pub message: String,
    pub line: usize,
}

impl OutputError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        return Self {
            message: message.into(),
            line,
        };
    }
}
