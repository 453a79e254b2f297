//! Syntax tree model
//!
//! - [`node`]: the closed set of node kinds
//! - [`trivia`]: comment and directive payloads
//! - [`fields`]: static per-kind field descriptors and field access
//! - [`flatten`]: pre-order flattening and root-to-node paths
//! - [`dump`]: structural dumps used for tree comparison
//! - [`visit`]: visitor, transformer and trivia placement check

pub mod dump;
pub mod fields;
pub mod flatten;
pub mod node;
pub mod trivia;
pub mod visit;

pub use dump::{DumpOptions, dump};
pub use fields::{FieldDescriptor, FieldMut, FieldRef, FieldShape};
pub use flatten::{AstPath, AstPathEntry, FlatNode, FlatTree, NodeId, flatten};
pub use node::{
    BinaryOperator, BoolOperator, CompareOperator, Constant, Node, NodeKind, Precedence,
    UnaryOperator,
};
pub use trivia::{
    Clause, Comment, Directive, DirectiveFamily, DirectivePayload, HeaderForm, MarkerStyle,
    Trivia,
};
pub use visit::{VisitOrder, check_trivia_placement, strip_trivia, transform, visit};
