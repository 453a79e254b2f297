//! Marginalia Core
//!
//! Splices comments and comment-borne directives back into a parsed syntax
//! tree, and renders such trees as source again.
//!
//! ```rust
//! use marginalia_core::{parse, unparse};
//!
//! let tree = parse("x = [1,  # one\n     2]\n").unwrap();
//! assert_eq!(unparse(&tree), "x = [1,  # one\n    2]\n");
//! ```

pub mod anchor;
pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod docstrings;
pub mod error;
pub mod pipeline;
pub mod result;
pub mod round_trip;
pub mod scope;
pub mod span;
pub mod splice;
pub mod syntax;
pub mod tree;
pub mod unparse;

// Re-export commonly used types
pub use anchor::{Anchor, AnchorResolver};
pub use classify::{DIRECTIVE_TABLE, DirectivePrefix, TriviaClassifier};
pub use config::{
    ClassifierConfiguration, ConfigLoader, MarginaliaConfig, PrinterConfiguration,
};
pub use diagnostics::{CollectingSink, DiagnosticSink, NullSink, SpliceEvent, TracingSink};
pub use docstrings::convert_docstrings;
pub use error::{ErrorKind, MarginaliaError};
pub use pipeline::{Pipeline, parse};
pub use result::Result;
pub use round_trip::{Difference, DifferenceKind, RoundTripValidator, ValidationResult};
pub use scope::ScopeResolver;
pub use span::{LineIndex, Location, Scope};
pub use splice::{InsertionPoint, TreeSplicer};
pub use syntax::{SpanRetention, TriviaToken, parse_expression, parse_module, trivia_tokens};
pub use tree::{
    AstPath, AstPathEntry, Comment, Directive, DirectiveFamily, DirectivePayload, DumpOptions,
    FlatTree, Node, NodeKind, Trivia, VisitOrder, check_trivia_placement, dump, flatten,
    strip_trivia, transform, visit,
};
pub use unparse::{AugmentedUnparser, PlainUnparser, PrinterOptions, Unparse, unparse, unparse_plain};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
