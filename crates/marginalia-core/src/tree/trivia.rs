//! Trivia node payloads: comments and directives
//!
//! These are the only node kinds that can be spliced into a parsed tree.
//! A directive keeps its parsed payload, but the payload is not a child of
//! the tree: traversal, flattening and anchoring never descend into it.

use crate::tree::Node;
use serde::{Deserialize, Serialize};

/// A plain comment.
///
/// `payload` is the text after the leading `#`, leading whitespace included,
/// so `# note` has payload `" note"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub payload: String,
    pub end_of_line: bool,
}

impl Comment {
    pub fn new(payload: impl Into<String>, end_of_line: bool) -> Self {
        Self {
            payload: payload.into(),
            end_of_line,
        }
    }
}

/// Directive families recognised in comment text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub enum DirectiveFamily {
    #[serde(rename = "pragma")]
    Pragma,
    #[serde(rename = "openmp")]
    OpenMpPragma,
    #[serde(rename = "openacc")]
    OpenAccPragma,
    #[serde(rename = "include")]
    Include,
    #[serde(rename = "if")]
    If,
    #[serde(rename = "ifdef")]
    Ifdef,
    #[serde(rename = "ifndef")]
    Ifndef,
    #[serde(rename = "elif")]
    Elif,
    #[serde(rename = "else")]
    Else,
    #[serde(rename = "endif")]
    Endif,
    #[serde(rename = "define")]
    Define,
    #[serde(rename = "undef")]
    Undef,
}

impl DirectiveFamily {
    pub const ALL: [DirectiveFamily; 12] = [
        DirectiveFamily::Pragma,
        DirectiveFamily::OpenMpPragma,
        DirectiveFamily::OpenAccPragma,
        DirectiveFamily::Include,
        DirectiveFamily::If,
        DirectiveFamily::Ifdef,
        DirectiveFamily::Ifndef,
        DirectiveFamily::Elif,
        DirectiveFamily::Else,
        DirectiveFamily::Endif,
        DirectiveFamily::Define,
        DirectiveFamily::Undef,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DirectiveFamily::Pragma => "Pragma",
            DirectiveFamily::OpenMpPragma => "OpenMpPragma",
            DirectiveFamily::OpenAccPragma => "OpenAccPragma",
            DirectiveFamily::Include => "Include",
            DirectiveFamily::If => "If",
            DirectiveFamily::Ifdef => "Ifdef",
            DirectiveFamily::Ifndef => "Ifndef",
            DirectiveFamily::Elif => "Elif",
            DirectiveFamily::Else => "Else",
            DirectiveFamily::Endif => "Endif",
            DirectiveFamily::Define => "Define",
            DirectiveFamily::Undef => "Undef",
        }
    }

    /// Pragma families, including the OpenMP and OpenACC sub-families.
    pub fn is_pragma(&self) -> bool {
        matches!(
            self,
            DirectiveFamily::Pragma | DirectiveFamily::OpenMpPragma | DirectiveFamily::OpenAccPragma
        )
    }

    /// Conditional-compilation families.
    pub fn is_conditional(&self) -> bool {
        matches!(
            self,
            DirectiveFamily::If
                | DirectiveFamily::Ifdef
                | DirectiveFamily::Ifndef
                | DirectiveFamily::Elif
                | DirectiveFamily::Else
                | DirectiveFamily::Endif
        )
    }
}

/// How the directive marker was written.
///
/// `#pragma omp for` is attached (`padded == false`); `# pragma: omp for` is
/// padded and labelled (`colon == true`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MarkerStyle {
    pub padded: bool,
    pub colon: bool,
}

/// Delimiters around an include target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeaderForm {
    /// `<path>`
    Angle,
    /// `"path"`
    Quoted,
    /// `path`
    Bare,
}

/// One clause of an OpenMP or OpenACC pragma, e.g. `private(i, j)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clause {
    pub name: String,
    pub arguments: Option<String>,
}

/// Parsed directive payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DirectivePayload {
    Empty,
    Expression(Box<Node>),
    Symbol(String),
    Definition {
        name: String,
        value: Option<Box<Node>>,
    },
    Header {
        path: String,
        form: HeaderForm,
    },
    Clauses(Vec<Clause>),
    Raw(String),
}

/// A structured directive recognised in comment text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    pub family: DirectiveFamily,
    /// Longest keyword sequence from the prefix table that matched.
    pub prefix: Vec<String>,
    pub payload: DirectivePayload,
    pub marker: MarkerStyle,
}

/// Classifier output for one trivia token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Trivia {
    Comment(Comment),
    Directive(Directive),
}

impl Trivia {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Trivia::Comment(_) => "Comment",
            Trivia::Directive(directive) => directive.family.name(),
        }
    }
}
