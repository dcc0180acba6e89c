//! Error types.
//!
//! Only [`ParseError`] and [`ConfigError`] ever reach a caller, and
//! `ParseError` only as the reason text of a failed path.  The other two
//! are boundary errors whose call sites pick an explicit fallback.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single source unit produced no [`crate::ClassRecord`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error: {message}")]
    Syntax { message: String },

    #[error("no declaration: expected exactly one class, interface or trait")]
    NoDeclaration,

    #[error("ambiguous declaration: found {count} class-like declarations, expected exactly one")]
    AmbiguousDeclaration { count: usize },

    #[error("duplicate class `{name}` (already declared in {first})")]
    DuplicateClass { name: String, first: PathBuf },

    #[error("parser panicked while reading this file")]
    ParserPanicked,

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A problem with the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid ignore pattern `{pattern}`: {source}")]
    InvalidIgnorePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// A doc-tag type expression that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed type `{expression}`: {reason}")]
pub struct MalformedType {
    pub expression: String,
    pub reason: &'static str,
}

/// A constant expression the literal evaluator does not support.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstExprError {
    #[error("unsupported expression `{0}`")]
    Unsupported(String),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
}
