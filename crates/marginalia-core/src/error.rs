//! Error types for scanning, parsing and trivia splicing

use crate::span::{Location, Scope};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for marginalia operations
#[derive(Debug, Error)]
pub enum MarginaliaError {
    /// Scanner or parser rejected the source text
    #[error("Syntax error: {message} at {location}")]
    Syntax { message: String, location: Location },

    /// Primary and secondary span sources disagree
    #[error("Scope resolution error: {message}")]
    ScopeResolution { message: String },

    /// A directive was recognised but its payload does not parse
    #[error("Directive syntax error in '#{raw}': {reason}")]
    DirectiveSyntax { raw: String, reason: String },

    /// Anchor resolution produced an inconsistent preceding/following/enclosing combination
    #[error(
        "Ambiguous anchor for trivia at {target}: preceding {preceding}, following {following}, enclosing {enclosing}"
    )]
    AmbiguousAnchor {
        target: Scope,
        preceding: String,
        following: String,
        enclosing: String,
    },

    /// The innermost enclosing node is not the parent of the following node
    #[error("Inconsistent enclosure for trivia at {target}: {message}")]
    InconsistentEnclosure { target: Scope, message: String },

    /// No sequence-valued field was found on the anchor path
    #[error("Insertion error: {message}")]
    Insertion { message: String },

    /// A trivia node sits where no trivia may go, or carries a malformed payload
    #[error("Invalid tree: {message}")]
    InvalidTree { message: String },

    /// Only trivia nodes may be spliced into a tree
    #[error("Unsupported insertion of {kind} node")]
    UnsupportedInsertion { kind: String },

    /// Requested behaviour is not implemented
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    ScopeResolution,
    DirectiveSyntax,
    AmbiguousAnchor,
    InconsistentEnclosure,
    Insertion,
    InvalidTree,
    UnsupportedInsertion,
    Unsupported,
    Config,
    Io,
}

impl MarginaliaError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarginaliaError::Syntax { .. } => ErrorKind::Syntax,
            MarginaliaError::ScopeResolution { .. } => ErrorKind::ScopeResolution,
            MarginaliaError::DirectiveSyntax { .. } => ErrorKind::DirectiveSyntax,
            MarginaliaError::AmbiguousAnchor { .. } => ErrorKind::AmbiguousAnchor,
            MarginaliaError::InconsistentEnclosure { .. } => ErrorKind::InconsistentEnclosure,
            MarginaliaError::Insertion { .. } => ErrorKind::Insertion,
            MarginaliaError::InvalidTree { .. } => ErrorKind::InvalidTree,
            MarginaliaError::UnsupportedInsertion { .. } => ErrorKind::UnsupportedInsertion,
            MarginaliaError::Unsupported { .. } => ErrorKind::Unsupported,
            MarginaliaError::Config { .. } => ErrorKind::Config,
            MarginaliaError::Io { .. } => ErrorKind::Io,
        }
    }

    pub fn syntax(message: impl Into<String>, location: Location) -> Self {
        Self::Syntax {
            message: message.into(),
            location,
        }
    }

    pub fn scope_resolution(message: impl Into<String>) -> Self {
        Self::ScopeResolution {
            message: message.into(),
        }
    }

    pub fn directive_syntax(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DirectiveSyntax {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    pub fn insertion(message: impl Into<String>) -> Self {
        Self::Insertion {
            message: message.into(),
        }
    }

    pub fn invalid_tree(message: impl Into<String>) -> Self {
        Self::InvalidTree {
            message: message.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for MarginaliaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}
