//! Docstring conversion
//!
//! Turning string-literal statements into comment nodes is not supported;
//! the entry point exists so callers get a typed error instead of a
//! silently unchanged tree.

use crate::error::MarginaliaError;
use crate::result::Result;
use crate::tree::Node;

/// Convert docstrings of `tree` into comments. Always fails.
pub fn convert_docstrings(_tree: &mut Node) -> Result<()> {
    Err(MarginaliaError::unsupported("docstring conversion"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::syntax::{SpanRetention, parse_module};

    #[test]
    fn test_conversion_is_unsupported() {
        let mut tree = parse_module("def f():\n    'doc'\n", SpanRetention::Native).unwrap();
        let before = tree.clone();
        let err = convert_docstrings(&mut tree).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(err.to_string(), "Unsupported operation: docstring conversion");
        assert_eq!(tree, before);
    }
}
