//! Source rendering
//!
//! - [`printer`]: the indentation-aware output buffer
//! - [`base`]: the [`Unparse`] trait and the trivia-free [`PlainUnparser`]
//! - [`augmented`]: [`AugmentedUnparser`], which writes trivia back out

pub mod augmented;
pub mod base;
pub mod printer;

pub use augmented::AugmentedUnparser;
pub use base::{PlainUnparser, SequenceItem, Unparse, constant_text, quote_string};
pub use printer::{Printer, PrinterOptions};

use crate::tree::Node;

/// Render `node` with its comments and directives.
pub fn unparse(node: &Node) -> String {
    AugmentedUnparser::default().unparse(node)
}

/// Render `node` without trivia.
pub fn unparse_plain(node: &Node) -> String {
    PlainUnparser::default().unparse(node)
}
