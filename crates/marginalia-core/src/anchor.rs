//! Anchor resolution for trivia tokens
//!
//! Given every spanned node of a flattened tree and the span of one trivia
//! token, find the structural position the token belongs to: a path from
//! the root plus whether the token goes before or after the slot it names.
//!
//! Three nodes drive the decision:
//! - the preceding node `P`, the outermost node that ends last at or before
//!   the token starts;
//! - the following node `F`, the outermost node that starts first at or
//!   after the token ends;
//! - the enclosing node `E`, the innermost node whose span contains the
//!   token.

use crate::error::MarginaliaError;
use crate::result::Result;
use crate::span::Scope;
use crate::tree::{AstPath, FlatTree, NodeId};
use std::cmp::Reverse;
use tracing::debug;

/// Where a trivia node goes: next to the slot named by the deepest entry of
/// `path` that has a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub path: AstPath,
    pub before: bool,
}

pub struct AnchorResolver<'f, 'a> {
    flat: &'f FlatTree<'a>,
    /// Spanned nodes by (start asc, end desc), outermost first on ties.
    by_start: Vec<(NodeId, Scope)>,
    /// Spanned nodes by (end asc, start desc), outermost last on ties.
    by_end: Vec<(NodeId, Scope)>,
}

impl<'f, 'a> AnchorResolver<'f, 'a> {
    /// `scopes[id]` is the resolved scope of node `id` of `flat`.
    pub fn new(flat: &'f FlatTree<'a>, scopes: &[Option<Scope>]) -> Self {
        let located: Vec<(NodeId, Scope)> = scopes
            .iter()
            .enumerate()
            .filter_map(|(id, scope)| scope.map(|scope| (id, scope)))
            .collect();
        let depth = |id: NodeId| flat.get(id).map_or(0, |entry| entry.depth);

        let mut by_start = located.clone();
        by_start.sort_by_key(|(id, scope)| (scope.start, Reverse(scope.end), depth(*id)));
        let mut by_end = located;
        by_end.sort_by_key(|(id, scope)| (scope.end, Reverse(scope.start), Reverse(depth(*id))));

        Self {
            flat,
            by_start,
            by_end,
        }
    }

    pub fn resolve(&self, target: Scope) -> Result<Anchor> {
        let preceding = self.preceding(target);
        let following = self.following(target);
        let enclosing = self.enclosing(target);
        debug!(
            %target,
            preceding = %self.describe(preceding),
            following = %self.describe(following),
            enclosing = %self.describe(enclosing),
            "Resolving anchor"
        );

        if let Some(enclosing) = enclosing {
            if let Some(following) = following.filter(|&f| self.is_descendant(f, enclosing)) {
                return self.before_following(target, following, enclosing);
            }
            if let Some(anchor) = preceding.and_then(|p| self.after_preceding(p, enclosing)) {
                return Ok(anchor);
            }
            return Ok(self.inside_empty(enclosing));
        }

        let root = self.flat.root().id;
        match (preceding, following) {
            (None, _) => Ok(self.root_slot(0, true)),
            (Some(preceding), None) if preceding == root => {
                let last = self.root_body_len().saturating_sub(1);
                Ok(self.root_slot(last, false))
            }
            (Some(preceding), None) => {
                let mut path = self.flat.path_to(preceding);
                path.truncate(1);
                Ok(Anchor {
                    path,
                    before: false,
                })
            }
            (Some(preceding), Some(following)) => Err(MarginaliaError::AmbiguousAnchor {
                target,
                preceding: self.describe(Some(preceding)),
                following: self.describe(Some(following)),
                enclosing: self.describe(None),
            }),
        }
    }

    fn preceding(&self, target: Scope) -> Option<NodeId> {
        self.by_end
            .iter()
            .take_while(|(_, scope)| scope.end <= target.start)
            .last()
            .map(|(id, _)| *id)
    }

    fn following(&self, target: Scope) -> Option<NodeId> {
        self.by_start
            .iter()
            .find(|(_, scope)| scope.start >= target.end)
            .map(|(id, _)| *id)
    }

    fn enclosing(&self, target: Scope) -> Option<NodeId> {
        self.by_start
            .iter()
            .take_while(|(_, scope)| scope.start <= target.start)
            .filter(|(_, scope)| scope.contains(&target))
            .last()
            .map(|(id, _)| *id)
    }

    fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        node != ancestor && self.flat.is_ancestor(ancestor, node)
    }

    /// The token sits right before `following`, a node inside `enclosing`.
    fn before_following(
        &self,
        target: Scope,
        following: NodeId,
        enclosing: NodeId,
    ) -> Result<Anchor> {
        let mut path = self.flat.path_to(following);
        path.pop();
        let parent = path.last().map(|entry| entry.node);
        if parent != Some(enclosing) {
            return Err(MarginaliaError::InconsistentEnclosure {
                target,
                message: format!(
                    "{} is enclosed by {}, but the following node {} belongs to {}",
                    target,
                    self.describe(Some(enclosing)),
                    self.describe(Some(following)),
                    self.describe(parent)
                ),
            });
        }
        Ok(Anchor { path, before: true })
    }

    /// The token trails the last child of `enclosing`, e.g. the tail of a
    /// multi-line list.
    fn after_preceding(&self, preceding: NodeId, enclosing: NodeId) -> Option<Anchor> {
        if !self.is_descendant(preceding, enclosing) {
            return None;
        }
        let mut path = self.flat.path_to(preceding);
        let position = path.iter().position(|entry| entry.node == enclosing)?;
        if !path[position].field.is_some_and(|field| field.accepts_trivia()) {
            return None;
        }
        path.truncate(position + 1);
        Some(Anchor {
            path,
            before: false,
        })
    }

    /// The token is inside `enclosing` with nothing to attach to there,
    /// e.g. in an empty list.
    fn inside_empty(&self, enclosing: NodeId) -> Anchor {
        let mut path = self.flat.path_to(enclosing);
        let field = self
            .flat
            .get(enclosing)
            .and_then(|entry| entry.node.kind.first_trivia_field());
        match (field, path.last_mut()) {
            (Some(field), Some(terminal)) => {
                terminal.field = Some(field);
                terminal.index = Some(0);
            }
            _ => {
                path.pop();
            }
        }
        Anchor { path, before: true }
    }

    fn root_slot(&self, index: usize, before: bool) -> Anchor {
        let root = self.flat.root();
        let mut path = self.flat.path_to(root.id);
        if let Some(terminal) = path.last_mut() {
            terminal.field = root.node.kind.first_trivia_field();
            terminal.index = Some(index);
        }
        Anchor { path, before }
    }

    fn root_body_len(&self) -> usize {
        self.flat
            .nodes()
            .iter()
            .filter(|entry| entry.parent == Some(self.flat.root().id))
            .count()
    }

    fn describe(&self, id: Option<NodeId>) -> String {
        let Some(entry) = id.and_then(|id| self.flat.get(id)) else {
            return "none".into();
        };
        match entry.node.scope {
            Some(scope) => format!("{}#{}@{}", entry.node.kind_name(), entry.id, scope),
            None => format!("{}#{}", entry.node.kind_name(), entry.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeResolver;
    use crate::span::Location;
    use crate::syntax::{SpanRetention, parse_module, trivia_tokens};
    use crate::tree::Node;

    type Step = (&'static str, Option<&'static str>, Option<usize>);

    fn steps(tree: &Node, anchor: &Anchor) -> Vec<Step> {
        let flat = FlatTree::new(tree);
        anchor
            .path
            .iter()
            .map(|entry| {
                let kind = flat.get(entry.node).map_or("?", |e| e.node.kind_name());
                (kind, entry.field.map(|f| f.name), entry.index)
            })
            .collect()
    }

    /// Anchor of the first comment of `source`.
    fn resolve(source: &str) -> (Vec<Step>, bool) {
        let tree = parse_module(source, SpanRetention::Native).unwrap();
        let flat = FlatTree::new(&tree);
        let scopes = ScopeResolver::new(source).resolve(&flat).unwrap();
        let target = trivia_tokens(source).unwrap()[0].scope;
        let anchor = AnchorResolver::new(&flat, &scopes).resolve(target).unwrap();
        (steps(&tree, &anchor), anchor.before)
    }

    #[test]
    fn test_before_everything() {
        assert_eq!(
            resolve("# header\nx = 1\n"),
            (vec![("Module", Some("body"), Some(0))], true)
        );
    }

    #[test]
    fn test_after_everything() {
        assert_eq!(
            resolve("x = 1\ny = 2\n# trailer\n"),
            (vec![("Module", Some("body"), Some(1))], false)
        );
        assert_eq!(
            resolve("def f():\n    return 1\n# trailer\n"),
            (vec![("Module", Some("body"), Some(0))], false)
        );
    }

    #[test]
    fn test_between_statements() {
        assert_eq!(
            resolve("x = 1\n# between\ny = 2\n"),
            (vec![("Module", Some("body"), Some(1))], true)
        );
        assert_eq!(
            resolve("x = 1  # trailing\ny = 2\n"),
            (vec![("Module", Some("body"), Some(1))], true)
        );
    }

    #[test]
    fn test_inside_block() {
        assert_eq!(
            resolve("if x:\n    a = 1\n    # inner\n    b = 2\n"),
            (
                vec![
                    ("Module", Some("body"), Some(0)),
                    ("If", Some("body"), Some(1)),
                ],
                true
            )
        );
    }

    #[test]
    fn test_tail_of_sequence() {
        assert_eq!(
            resolve("x = [\n    1,\n    2,  # two\n]\n"),
            (
                vec![
                    ("Module", Some("body"), Some(0)),
                    ("Assign", Some("value"), None),
                    ("List", Some("elts"), Some(1)),
                ],
                false
            )
        );
    }

    #[test]
    fn test_empty_construct() {
        assert_eq!(
            resolve("x = [\n    # nothing yet\n]\n"),
            (
                vec![
                    ("Module", Some("body"), Some(0)),
                    ("Assign", Some("value"), None),
                    ("List", Some("elts"), Some(0)),
                ],
                true
            )
        );
    }

    #[test]
    fn test_inside_call_arguments() {
        assert_eq!(
            resolve("f(a,\n  # why\n  k=1)\n"),
            (
                vec![
                    ("Module", Some("body"), Some(0)),
                    ("Expr", Some("value"), None),
                    ("Call", Some("keywords"), Some(0)),
                ],
                true
            )
        );
    }

    #[test]
    fn test_unlocated_root_is_ambiguous() {
        let source = "x = 1\n# lost\ny = 2\n";
        let tree = parse_module(source, SpanRetention::Native).unwrap();
        let flat = FlatTree::new(&tree);
        let scopes: Vec<_> = flat.nodes().iter().map(|entry| entry.node.scope).collect();
        let target = trivia_tokens(source).unwrap()[0].scope;
        let err = AnchorResolver::new(&flat, &scopes)
            .resolve(target)
            .unwrap_err();
        let MarginaliaError::AmbiguousAnchor {
            preceding,
            following,
            enclosing,
            ..
        } = err
        else {
            panic!("expected an ambiguous anchor");
        };
        assert!(preceding.starts_with("Assign#1"));
        assert!(following.starts_with("Assign#4"));
        assert_eq!(enclosing, "none");
    }

    #[test]
    fn test_following_node_outside_the_enclosing_children() {
        let source = "x = [1]\n";
        let tree = parse_module(source, SpanRetention::Native).unwrap();
        let flat = FlatTree::new(&tree);
        // Module, Assign, Name(x), List, Constant(1)
        let mut scopes = ScopeResolver::new(source).resolve(&flat).unwrap();
        assert_eq!(flat.get(3).map(|entry| entry.node.kind_name()), Some("List"));
        scopes[3] = None;

        let target = Scope::new(Location::new(1, 4), Location::new(1, 5));
        let err = AnchorResolver::new(&flat, &scopes)
            .resolve(target)
            .unwrap_err();
        let MarginaliaError::InconsistentEnclosure { message, .. } = err else {
            panic!("expected an inconsistent enclosure, got {err:?}");
        };
        assert!(message.contains("belongs to List"), "{message}");
    }

    #[test]
    fn test_empty_module() {
        let source = "# only\n";
        let tree = parse_module(source, SpanRetention::Native).unwrap();
        let flat = FlatTree::new(&tree);
        let scopes = ScopeResolver::new(source).resolve(&flat).unwrap();
        let target = trivia_tokens(source).unwrap()[0].scope;
        let anchor = AnchorResolver::new(&flat, &scopes).resolve(target).unwrap();
        assert_eq!(steps(&tree, &anchor), vec![("Module", Some("body"), Some(0))]);
        assert!(anchor.before);
    }
}
