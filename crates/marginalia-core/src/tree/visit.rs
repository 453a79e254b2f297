//! Whole-tree traversal
//!
//! [`visit`] and [`transform`] walk every node, trivia included, in the field
//! order of [`NodeKind::field_descriptors`]. Either the node or its fields
//! come first, as chosen by [`VisitOrder`].

use crate::error::MarginaliaError;
use crate::result::Result;
use crate::tree::{FieldMut, Node, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitOrder {
    /// A node, then its fields.
    #[default]
    NodeFirst,
    /// A node's fields, then the node.
    FieldsFirst,
}

/// Calls `visitor` on every node of `tree`.
pub fn visit<'a, F>(tree: &'a Node, order: VisitOrder, visitor: &mut F)
where
    F: FnMut(&'a Node),
{
    if order == VisitOrder::NodeFirst {
        visitor(tree);
    }
    for (_, _, child) in tree.children() {
        visit(child, order, visitor);
    }
    if order == VisitOrder::FieldsFirst {
        visitor(tree);
    }
}

/// Calls `transformer` on every node of `tree`; it may rewrite or replace the node.
///
/// With [`VisitOrder::NodeFirst`] the walk descends into whatever the
/// transformer left in place, so children it removed are never visited.
pub fn transform<F>(tree: &mut Node, order: VisitOrder, transformer: &mut F)
where
    F: FnMut(&mut Node),
{
    if order == VisitOrder::NodeFirst {
        transformer(tree);
    }
    for field in tree.fields_mut() {
        match field {
            FieldMut::Node(child) | FieldMut::OptionalNode(Some(child)) => {
                transform(child, order, transformer);
            }
            FieldMut::OptionalNode(None) => {}
            FieldMut::Sequence(children) => {
                for child in children.iter_mut() {
                    transform(child, order, transformer);
                }
            }
        }
    }
    if order == VisitOrder::FieldsFirst {
        transformer(tree);
    }
}

/// Removes every comment and directive from `tree`. Returns how many were removed.
pub fn strip_trivia(tree: &mut Node) -> usize {
    let mut removed = 0;
    transform(tree, VisitOrder::NodeFirst, &mut |node: &mut Node| {
        for field in node.fields_mut() {
            if let FieldMut::Sequence(children) = field {
                let before = children.len();
                children.retain(|child| !child.is_trivia());
                removed += before - children.len();
            }
        }
    });
    removed
}

/// Checks that every trivia node sits in a field that accepts trivia and
/// carries a well-formed payload.
pub fn check_trivia_placement(tree: &Node) -> Result<()> {
    let mut problems = Vec::new();
    if tree.is_trivia() {
        problems.push(format!("{} node at the root", tree.kind_name()));
    }

    visit(tree, VisitOrder::NodeFirst, &mut |node: &Node| {
        for (descriptor, index, child) in node.children() {
            if child.is_trivia() && !descriptor.accepts_trivia() {
                let slot = index.map_or_else(String::new, |index| format!("[{index}]"));
                problems.push(format!(
                    "{} node in {}.{}{}",
                    child.kind_name(),
                    node.kind_name(),
                    descriptor.name,
                    slot
                ));
            }
        }
        match &node.kind {
            NodeKind::Comment(comment) if comment.payload.contains('\n') => {
                problems.push(format!("comment '{}' spans lines", comment.payload.escape_debug()));
            }
            NodeKind::Directive(directive) if directive.prefix.is_empty() => {
                problems.push(format!("{} directive without a prefix", node.kind_name()));
            }
            _ => {}
        }
    });

    if problems.is_empty() {
        Ok(())
    } else {
        Err(MarginaliaError::invalid_tree(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parse;
    use crate::syntax::{SpanRetention, parse_module};
    use crate::tree::{Comment, DumpOptions, dump, flatten};

    fn kinds(tree: &Node, order: VisitOrder) -> Vec<&'static str> {
        let mut kinds = Vec::new();
        visit(tree, order, &mut |node: &Node| kinds.push(node.kind_name()));
        kinds
    }

    #[test]
    fn test_visit_orders() {
        let tree = parse_module("x = f(1)\n", SpanRetention::Native).unwrap();
        assert_eq!(
            kinds(&tree, VisitOrder::NodeFirst),
            vec!["Module", "Assign", "Name", "Call", "Name", "Constant"]
        );
        assert_eq!(
            kinds(&tree, VisitOrder::FieldsFirst),
            vec!["Name", "Name", "Constant", "Call", "Assign", "Module"]
        );
    }

    #[test]
    fn test_visit_reaches_trivia() {
        let tree = parse("x = [1,  # one\n     2]\n").unwrap();
        let visited = kinds(&tree, VisitOrder::NodeFirst);
        assert_eq!(visited.len(), flatten(&tree, false).len());
        assert!(visited.contains(&"Comment"));
    }

    #[test]
    fn test_transform_replaces_nodes_and_keeps_count() {
        let mut tree = parse("def f(a):  # sig\n    return a + 1\n").unwrap();
        let count = flatten(&tree, false).len();

        transform(&mut tree, VisitOrder::FieldsFirst, &mut |node: &mut Node| {
            if let NodeKind::Constant { .. } = node.kind {
                *node = Node::new(NodeKind::Name { id: "one".into() }, node.scope);
            }
            if let NodeKind::Name { id } = &mut node.kind {
                *id = id.to_uppercase();
            }
        });

        assert_eq!(flatten(&tree, false).len(), count);
        let names: Vec<_> = flatten(&tree, false)
            .into_iter()
            .filter_map(|node| match &node.kind {
                NodeKind::Name { id } => Some(id.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["A", "ONE"]);
        assert!(kinds(&tree, VisitOrder::NodeFirst).contains(&"Comment"));
    }

    #[test]
    fn test_node_first_walks_replacement_children() {
        let mut tree = parse_module("x = y\n", SpanRetention::Native).unwrap();
        let mut seen = Vec::new();
        transform(&mut tree, VisitOrder::NodeFirst, &mut |node: &mut Node| {
            if let NodeKind::Name { id } = &node.kind
                && id == "y"
            {
                *node = Node::bare(NodeKind::List {
                    elts: vec![Node::bare(NodeKind::Name { id: "z".into() })],
                });
            }
            seen.push(node.kind_name());
        });
        assert_eq!(seen, vec!["Module", "Assign", "Name", "List", "Name"]);
    }

    #[test]
    fn test_strip_trivia_gives_back_plain_tree() {
        let source = "#pragma omp parallel for\nfor i in y:  # loop\n    x = [1,  # one\n         2]\n";
        let mut tree = parse(source).unwrap();
        assert_eq!(strip_trivia(&mut tree), 3);

        let plain = parse_module(source, SpanRetention::Native).unwrap();
        assert_eq!(
            dump(&tree, DumpOptions::default()),
            dump(&plain, DumpOptions::default())
        );
    }

    #[test]
    fn test_parsed_trees_place_trivia_correctly() {
        let tree = parse("if x:  # why\n    y = [1,  # one\n         2]\n#endif\n").unwrap();
        check_trivia_placement(&tree).unwrap();
    }

    #[test]
    fn test_trivia_in_target_field_is_rejected() {
        let mut tree = parse_module("a = 1\n", SpanRetention::Native).unwrap();
        tree.child_mut("body", Some(0))
            .and_then(|assign| assign.sequence_mut("targets"))
            .unwrap()
            .push(Node::bare(NodeKind::Comment(Comment::new(" a", true))));

        let err = check_trivia_placement(&tree).unwrap_err();
        assert!(matches!(err, MarginaliaError::InvalidTree { .. }));
        assert!(err.to_string().contains("Comment node in Assign.targets[1]"));
    }

    #[test]
    fn test_multiline_comment_is_rejected() {
        let tree = Node::module(vec![Node::bare(NodeKind::Comment(Comment::new(
            " one\n two",
            false,
        )))]);
        let err = check_trivia_placement(&tree).unwrap_err();
        assert!(err.to_string().contains("spans lines"));
    }
}
