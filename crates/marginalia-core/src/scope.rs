//! Span resolution for flattened trees
//!
//! The primary parse leaves a few synthetic kinds without spans. Those are
//! recovered from a second, full-retention parse of the same text, paired
//! node for node in pre-order.

use crate::error::MarginaliaError;
use crate::result::Result;
use crate::span::Scope;
use crate::syntax::{SpanRetention, parse_module};
use crate::tree::{FlatNode, FlatTree};
use tracing::debug;

pub struct ScopeResolver<'s> {
    source: &'s str,
}

impl<'s> ScopeResolver<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    /// One scope per node of `flat`, indexed by [`crate::tree::NodeId`].
    ///
    /// Nodes that already carry a span keep it. When any structural node
    /// lacks one, the source is parsed again with full span retention and
    /// the gaps are filled from the matching nodes of that parse.
    pub fn resolve(&self, flat: &FlatTree<'_>) -> Result<Vec<Option<Scope>>> {
        let mut scopes: Vec<Option<Scope>> =
            flat.nodes().iter().map(|entry| entry.node.scope).collect();

        let missing = structural(flat.nodes())
            .filter(|entry| entry.node.scope.is_none())
            .count();
        if missing == 0 {
            return Ok(scopes);
        }

        let secondary = parse_module(self.source, SpanRetention::Full).map_err(|err| {
            MarginaliaError::scope_resolution(format!("secondary parse failed: {err}"))
        })?;
        let secondary = FlatTree::new(&secondary);

        let primary: Vec<_> = structural(flat.nodes()).collect();
        let matching: Vec<_> = structural(secondary.nodes()).collect();
        if primary.len() != matching.len() {
            return Err(MarginaliaError::scope_resolution(format!(
                "tree has {} structural nodes but the source parses to {}",
                primary.len(),
                matching.len()
            )));
        }

        for (node, twin) in primary.iter().zip(&matching) {
            if node.node.kind_name() != twin.node.kind_name() {
                return Err(MarginaliaError::scope_resolution(format!(
                    "node {} is {} in the tree but {} in the source",
                    node.id,
                    node.node.kind_name(),
                    twin.node.kind_name()
                )));
            }
            if scopes[node.id].is_none() {
                scopes[node.id] = twin.node.scope;
            }
        }

        debug!(missing, nodes = flat.len(), "Resolved missing scopes");
        Ok(scopes)
    }
}

/// Non-trivia entries; trivia always carry their own span.
fn structural<'t, 'a>(
    nodes: &'t [FlatNode<'a>],
) -> impl Iterator<Item = &'t FlatNode<'a>> + 't {
    nodes.iter().filter(|entry| !entry.node.is_trivia())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Location;

    #[test]
    fn test_fills_spanless_kinds_from_full_parse() {
        let source = "f(k=1)\n";
        let tree = parse_module(source, SpanRetention::Native).unwrap();
        let flat = FlatTree::new(&tree);
        let scopes = ScopeResolver::new(source).resolve(&flat).unwrap();

        assert_eq!(scopes.len(), flat.len());
        assert!(scopes.iter().all(Option::is_some));
        // Module, Expr, Call, Name, Keyword, Constant
        let keyword = scopes[4].unwrap();
        assert_eq!(keyword.start, Location::new(1, 2));
        assert_eq!(keyword.end, Location::new(1, 5));
    }

    #[test]
    fn test_keeps_native_scopes() {
        let source = "x = 1\n";
        let tree = parse_module(source, SpanRetention::Full).unwrap();
        let flat = FlatTree::new(&tree);
        let scopes = ScopeResolver::new("unrelated text that is never parsed (")
            .resolve(&flat)
            .unwrap();
        assert_eq!(scopes[1], tree_scope(&flat, 1));
    }

    #[test]
    fn test_count_mismatch_fails() {
        let tree = parse_module("a = 1\n", SpanRetention::Native).unwrap();
        let flat = FlatTree::new(&tree);
        let err = ScopeResolver::new("a = 1\nb = 2\n")
            .resolve(&flat)
            .unwrap_err();
        assert!(matches!(err, MarginaliaError::ScopeResolution { .. }));
    }

    #[test]
    fn test_kind_mismatch_fails() {
        let tree = parse_module("a = 1\n", SpanRetention::Native).unwrap();
        let flat = FlatTree::new(&tree);
        let err = ScopeResolver::new("a += 1\n").resolve(&flat).unwrap_err();
        assert!(err.to_string().contains("Assign"));
    }

    fn tree_scope(flat: &FlatTree<'_>, id: usize) -> Option<Scope> {
        flat.get(id).and_then(|entry| entry.node.scope)
    }
}
