//! Tree splicing
//!
//! Turns an anchor into a concrete insertion slot and inserts trivia nodes
//! there. Locating is pure, so every token of a source unit can be located
//! against the unmodified tree before any insertion happens.

use crate::error::MarginaliaError;
use crate::result::Result;
use crate::tree::{AstPath, FieldDescriptor, Node, NodeId};

/// A resolved insertion slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionPoint {
    /// Field steps from the root down to the node owning the sequence.
    pub steps: Vec<(&'static str, Option<usize>)>,
    /// Id of that node in the tree the path was built from.
    pub owner: NodeId,
    pub field: &'static FieldDescriptor,
    pub index: usize,
}

pub struct TreeSplicer;

impl TreeSplicer {
    /// Find the insertion slot for `path`.
    ///
    /// Starts at the deepest entry that names a field and walks up to the
    /// nearest sequence that accepts trivia, skipping assignment targets
    /// and operand chains.
    pub fn locate(path: &AstPath, before: bool) -> Result<InsertionPoint> {
        let position = path
            .iter()
            .rposition(|entry| {
                entry.index.is_some() && entry.field.is_some_and(|field| field.accepts_trivia())
            })
            .ok_or_else(|| {
                MarginaliaError::insertion(format!(
                    "no sequence field accepts trivia along a path of {} entries",
                    path.len()
                ))
            })?;

        let entry = &path[position];
        let (Some(field), Some(index)) = (entry.field, entry.index) else {
            return Err(MarginaliaError::insertion("anchor entry lost its field"));
        };
        let steps = path[..position]
            .iter()
            .map(|step| {
                step.field
                    .map(|field| (field.name, step.index))
                    .ok_or_else(|| MarginaliaError::insertion("inner path entry without a field"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(InsertionPoint {
            steps,
            owner: entry.node,
            field,
            index: if before { index } else { index + 1 },
        })
    }

    /// Tree position of `point` in `tree`, the tree it was located in.
    ///
    /// One `(field ordinal, index)` pair per step from the root, then the
    /// slot itself. An insertion shifts only slots whose key is greater or
    /// equal, so applying insertions from the greatest key down leaves
    /// every pending slot valid.
    pub fn slot_key(tree: &Node, point: &InsertionPoint) -> Result<Vec<(usize, usize)>> {
        let mut key = Vec::with_capacity(point.steps.len() + 1);
        let mut owner = tree;
        for (field, index) in &point.steps {
            key.push((field_ordinal(owner, field)?, index.unwrap_or(0)));
            owner = owner.child(field, *index).ok_or_else(|| {
                MarginaliaError::insertion(format!("path step {field}[{index:?}] does not exist"))
            })?;
        }
        key.push((field_ordinal(owner, point.field.name)?, point.index));
        Ok(key)
    }

    /// Insert `node` at `point`; only trivia may be inserted.
    pub fn insert_at<'t>(
        tree: &'t mut Node,
        point: &InsertionPoint,
        node: Node,
    ) -> Result<&'t mut Node> {
        if !node.is_trivia() {
            return Err(MarginaliaError::UnsupportedInsertion {
                kind: node.kind_name().to_string(),
            });
        }

        let mut owner = &mut *tree;
        for (field, index) in &point.steps {
            owner = owner.child_mut(field, *index).ok_or_else(|| {
                MarginaliaError::insertion(format!("path step {field}[{index:?}] does not exist"))
            })?;
        }
        let kind = owner.kind_name();
        let sequence = owner.sequence_mut(point.field.name).ok_or_else(|| {
            MarginaliaError::insertion(format!("{kind} has no sequence field '{}'", point.field.name))
        })?;
        if point.index > sequence.len() {
            return Err(MarginaliaError::insertion(format!(
                "slot {} is past the end of {}.{} ({} children)",
                point.index,
                kind,
                point.field.name,
                sequence.len()
            )));
        }
        sequence.insert(point.index, node);
        Ok(tree)
    }

    /// Locate and insert in one step.
    pub fn splice<'t>(
        tree: &'t mut Node,
        node: Node,
        path: &AstPath,
        before: bool,
    ) -> Result<&'t mut Node> {
        let point = Self::locate(path, before)?;
        Self::insert_at(tree, &point, node)
    }
}

fn field_ordinal(node: &Node, name: &str) -> Result<usize> {
    node.kind
        .field_descriptors()
        .iter()
        .position(|descriptor| descriptor.name == name)
        .ok_or_else(|| {
            MarginaliaError::insertion(format!("{} has no field '{name}'", node.kind_name()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Anchor;
    use crate::span::{Location, Scope};
    use crate::syntax::{SpanRetention, parse_module};
    use crate::tree::{AstPathEntry, Comment, DumpOptions, FlatTree, NodeKind, dump};

    fn comment(text: &str) -> Node {
        let at = Scope::new(Location::new(1, 0), Location::new(1, 1));
        Node::comment(Comment::new(text, false), at)
    }

    fn anchor_at(tree: &Node, id: NodeId, before: bool) -> Anchor {
        Anchor {
            path: FlatTree::new(tree).path_to(id),
            before,
        }
    }

    #[test]
    fn test_inserts_into_sequence() {
        let mut tree = parse_module("x = [1, 2]\n", SpanRetention::Native).unwrap();
        // Module, Assign, Name, List, Constant(1), Constant(2)
        let mut anchor = anchor_at(&tree, 5, true);
        anchor.path.pop();
        TreeSplicer::splice(&mut tree, comment(" c"), &anchor.path, anchor.before).unwrap();
        insta::assert_snapshot!(
            dump(&tree, DumpOptions::default()),
            @r#"Module(body=[Assign(targets=[Name(id="x")], value=List(elts=[Constant(value=1), Comment(payload=" c", eol=false), Constant(value=2)]))])"#
        );
    }

    #[test]
    fn test_walks_past_assignment_targets() {
        let tree = parse_module("a = b = 1\n", SpanRetention::Native).unwrap();
        // Module, Assign, Name(a), Name(b), Constant
        let anchor = anchor_at(&tree, 3, false);
        let point = TreeSplicer::locate(&anchor.path, anchor.before).unwrap();
        assert!(point.steps.is_empty());
        assert_eq!(point.owner, 0);
        assert_eq!(point.field.name, "body");
        assert_eq!(point.index, 1);
    }

    #[test]
    fn test_walks_up_from_single_child_fields() {
        let mut tree = parse_module("if x:\n    y = f(z)\n", SpanRetention::Native).unwrap();
        // Module, If, Name(x), Assign, Name(y), Call, Name(f), Name(z)
        let mut anchor = anchor_at(&tree, 5, true);
        anchor.path.pop();
        let point = TreeSplicer::locate(&anchor.path, true).unwrap();
        assert_eq!(point.steps, vec![("body", Some(0))]);
        assert_eq!((point.field.name, point.index), ("body", 0));

        TreeSplicer::insert_at(&mut tree, &point, comment(" first")).unwrap();
        let NodeKind::Module { body } = &tree.kind else {
            panic!("expected module");
        };
        let NodeKind::If { body, .. } = &body[0].kind else {
            panic!("expected if");
        };
        assert!(body[0].is_trivia());
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_slot_keys_order_nested_slots_first() {
        let tree = parse_module("def f(a, b):\n    pass\n", SpanRetention::Native).unwrap();
        // Module, FunctionDef, Arguments, Arg(a), Arg(b), Pass
        let inner = TreeSplicer::locate(&anchor_at(&tree, 4, true).path, true).unwrap();
        let mut outer = anchor_at(&tree, 1, true);
        outer.path.pop();
        let outer = TreeSplicer::locate(&outer.path, true).unwrap();

        let inner_key = TreeSplicer::slot_key(&tree, &inner).unwrap();
        let outer_key = TreeSplicer::slot_key(&tree, &outer).unwrap();
        assert_eq!(outer_key, vec![(0, 0)]);
        assert_eq!(inner_key, vec![(0, 0), (0, 0), (0, 1)]);
        assert!(inner_key > outer_key);
    }

    #[test]
    fn test_no_candidate_field() {
        let path = vec![AstPathEntry {
            node: 0,
            field: None,
            index: None,
        }];
        let err = TreeSplicer::locate(&path, true).unwrap_err();
        assert!(matches!(err, MarginaliaError::Insertion { .. }));
    }

    #[test]
    fn test_rejects_structural_nodes() {
        let mut tree = parse_module("x\n", SpanRetention::Native).unwrap();
        let anchor = anchor_at(&tree, 1, true);
        let err = TreeSplicer::splice(&mut tree, Node::bare(NodeKind::Pass), &anchor.path, true)
            .unwrap_err();
        assert!(matches!(err, MarginaliaError::UnsupportedInsertion { ref kind } if kind == "Pass"));
    }
}
