//! Static field descriptors and field access
//!
//! Each node kind declares its child-bearing fields once, in source order.
//! The flattener, the path builder and the splicer all work from these
//! tables instead of inspecting nodes at runtime.

use crate::tree::{Node, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// Exactly one child.
    Node,
    /// Zero or one child.
    OptionalNode,
    /// Ordered child list.
    Sequence,
}

/// Declaration of one child-bearing field.
///
/// Target fields never receive trivia: splicing into an assignment target
/// list or an operator chain would change what the code means.
#[derive(Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub shape: FieldShape,
    pub target: bool,
}

impl FieldDescriptor {
    const fn node(name: &'static str) -> Self {
        Self {
            name,
            shape: FieldShape::Node,
            target: false,
        }
    }

    const fn optional(name: &'static str) -> Self {
        Self {
            name,
            shape: FieldShape::OptionalNode,
            target: false,
        }
    }

    const fn sequence(name: &'static str) -> Self {
        Self {
            name,
            shape: FieldShape::Sequence,
            target: false,
        }
    }

    const fn target_sequence(name: &'static str) -> Self {
        Self {
            name,
            shape: FieldShape::Sequence,
            target: true,
        }
    }

    pub fn is_sequence(&self) -> bool {
        self.shape == FieldShape::Sequence
    }

    /// Whether trivia may be inserted into this field.
    pub fn accepts_trivia(&self) -> bool {
        self.is_sequence() && !self.target
    }
}

static NO_FIELDS: [FieldDescriptor; 0] = [];
static MODULE: [FieldDescriptor; 1] = [FieldDescriptor::sequence("body")];
static FUNCTION_DEF: [FieldDescriptor; 2] = [
    FieldDescriptor::node("args"),
    FieldDescriptor::sequence("body"),
];
static RETURN: [FieldDescriptor; 1] = [FieldDescriptor::optional("value")];
static ASSIGN: [FieldDescriptor; 2] = [
    FieldDescriptor::target_sequence("targets"),
    FieldDescriptor::node("value"),
];
static AUG_ASSIGN: [FieldDescriptor; 2] = [
    FieldDescriptor::node("target"),
    FieldDescriptor::node("value"),
];
static FOR: [FieldDescriptor; 4] = [
    FieldDescriptor::node("target"),
    FieldDescriptor::node("iter"),
    FieldDescriptor::sequence("body"),
    FieldDescriptor::sequence("orelse"),
];
static CONDITIONAL_BLOCK: [FieldDescriptor; 3] = [
    FieldDescriptor::node("test"),
    FieldDescriptor::sequence("body"),
    FieldDescriptor::sequence("orelse"),
];
static VALUE: [FieldDescriptor; 1] = [FieldDescriptor::node("value")];
static BOOL_OP: [FieldDescriptor; 1] = [FieldDescriptor::target_sequence("values")];
static BIN_OP: [FieldDescriptor; 2] = [
    FieldDescriptor::node("left"),
    FieldDescriptor::node("right"),
];
static UNARY_OP: [FieldDescriptor; 1] = [FieldDescriptor::node("operand")];
static COMPARE: [FieldDescriptor; 2] = [
    FieldDescriptor::node("left"),
    FieldDescriptor::target_sequence("comparators"),
];
static IF_EXP: [FieldDescriptor; 3] = [
    FieldDescriptor::node("test"),
    FieldDescriptor::node("body"),
    FieldDescriptor::node("orelse"),
];
static CALL: [FieldDescriptor; 3] = [
    FieldDescriptor::node("func"),
    FieldDescriptor::sequence("args"),
    FieldDescriptor::sequence("keywords"),
];
static SUBSCRIPT: [FieldDescriptor; 2] = [
    FieldDescriptor::node("value"),
    FieldDescriptor::node("slice"),
];
static SLICE: [FieldDescriptor; 3] = [
    FieldDescriptor::optional("lower"),
    FieldDescriptor::optional("upper"),
    FieldDescriptor::optional("step"),
];
static ELEMENTS: [FieldDescriptor; 1] = [FieldDescriptor::sequence("elts")];
static DICT: [FieldDescriptor; 2] = [
    FieldDescriptor::sequence("keys"),
    FieldDescriptor::sequence("values"),
];
static ARGUMENTS: [FieldDescriptor; 4] = [
    FieldDescriptor::sequence("args"),
    FieldDescriptor::optional("vararg"),
    FieldDescriptor::sequence("kwonlyargs"),
    FieldDescriptor::optional("kwarg"),
];
static ARG: [FieldDescriptor; 1] = [FieldDescriptor::optional("default")];

impl NodeKind {
    /// Child-bearing fields of this kind, in traversal order.
    pub fn field_descriptors(&self) -> &'static [FieldDescriptor] {
        match self {
            NodeKind::Module { .. } => &MODULE,
            NodeKind::FunctionDef { .. } => &FUNCTION_DEF,
            NodeKind::Return { .. } => &RETURN,
            NodeKind::Assign { .. } => &ASSIGN,
            NodeKind::AugAssign { .. } => &AUG_ASSIGN,
            NodeKind::For { .. } => &FOR,
            NodeKind::While { .. } | NodeKind::If { .. } => &CONDITIONAL_BLOCK,
            NodeKind::Expr { .. }
            | NodeKind::Attribute { .. }
            | NodeKind::Starred { .. }
            | NodeKind::Keyword { .. } => &VALUE,
            NodeKind::BoolOp { .. } => &BOOL_OP,
            NodeKind::BinOp { .. } => &BIN_OP,
            NodeKind::UnaryOp { .. } => &UNARY_OP,
            NodeKind::Compare { .. } => &COMPARE,
            NodeKind::IfExp { .. } => &IF_EXP,
            NodeKind::Call { .. } => &CALL,
            NodeKind::Subscript { .. } => &SUBSCRIPT,
            NodeKind::Slice { .. } => &SLICE,
            NodeKind::List { .. } | NodeKind::Tuple { .. } | NodeKind::Set { .. } => &ELEMENTS,
            NodeKind::Dict { .. } => &DICT,
            NodeKind::Arguments { .. } => &ARGUMENTS,
            NodeKind::Arg { .. } => &ARG,
            NodeKind::Pass
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Name { .. }
            | NodeKind::Constant { .. }
            | NodeKind::Comment(_)
            | NodeKind::Directive(_) => &NO_FIELDS,
        }
    }

    /// First field that can take trivia, if the kind has one.
    pub fn first_trivia_field(&self) -> Option<&'static FieldDescriptor> {
        self.field_descriptors()
            .iter()
            .find(|descriptor| descriptor.accepts_trivia())
    }
}

/// Shared view of one field's value.
#[derive(Debug, Clone, Copy)]
pub enum FieldRef<'a> {
    Node(&'a Node),
    OptionalNode(Option<&'a Node>),
    Sequence(&'a [Node]),
}

/// Mutable view of one field's value.
#[derive(Debug)]
pub enum FieldMut<'a> {
    Node(&'a mut Node),
    OptionalNode(Option<&'a mut Node>),
    Sequence(&'a mut Vec<Node>),
}

impl<'a> FieldRef<'a> {
    /// The child at `index` (sequences) or the single child (other shapes).
    pub fn get(self, index: Option<usize>) -> Option<&'a Node> {
        match (self, index) {
            (FieldRef::Node(node), None) => Some(node),
            (FieldRef::OptionalNode(node), None) => node,
            (FieldRef::Sequence(nodes), Some(index)) => nodes.get(index),
            _ => None,
        }
    }
}

impl Node {
    /// All child-bearing fields paired with their descriptors.
    pub fn fields(&self) -> Vec<(&'static FieldDescriptor, FieldRef<'_>)> {
        let values = match &self.kind {
            NodeKind::Module { body } => vec![FieldRef::Sequence(body)],
            NodeKind::FunctionDef { args, body, .. } => {
                vec![FieldRef::Node(args), FieldRef::Sequence(body)]
            }
            NodeKind::Return { value } => vec![FieldRef::OptionalNode(value.as_deref())],
            NodeKind::Assign { targets, value } => {
                vec![FieldRef::Sequence(targets), FieldRef::Node(value)]
            }
            NodeKind::AugAssign { target, value, .. } => {
                vec![FieldRef::Node(target), FieldRef::Node(value)]
            }
            NodeKind::For {
                target,
                iter,
                body,
                orelse,
            } => vec![
                FieldRef::Node(target),
                FieldRef::Node(iter),
                FieldRef::Sequence(body),
                FieldRef::Sequence(orelse),
            ],
            NodeKind::While { test, body, orelse } | NodeKind::If { test, body, orelse } => vec![
                FieldRef::Node(test),
                FieldRef::Sequence(body),
                FieldRef::Sequence(orelse),
            ],
            NodeKind::Expr { value }
            | NodeKind::Attribute { value, .. }
            | NodeKind::Starred { value }
            | NodeKind::Keyword { value, .. } => vec![FieldRef::Node(value)],
            NodeKind::BoolOp { values, .. } => vec![FieldRef::Sequence(values)],
            NodeKind::BinOp { left, right, .. } => {
                vec![FieldRef::Node(left), FieldRef::Node(right)]
            }
            NodeKind::UnaryOp { operand, .. } => vec![FieldRef::Node(operand)],
            NodeKind::Compare {
                left, comparators, ..
            } => vec![FieldRef::Node(left), FieldRef::Sequence(comparators)],
            NodeKind::IfExp { test, body, orelse } => vec![
                FieldRef::Node(test),
                FieldRef::Node(body),
                FieldRef::Node(orelse),
            ],
            NodeKind::Call {
                func,
                args,
                keywords,
            } => vec![
                FieldRef::Node(func),
                FieldRef::Sequence(args),
                FieldRef::Sequence(keywords),
            ],
            NodeKind::Subscript { value, slice } => {
                vec![FieldRef::Node(value), FieldRef::Node(slice)]
            }
            NodeKind::Slice { lower, upper, step } => vec![
                FieldRef::OptionalNode(lower.as_deref()),
                FieldRef::OptionalNode(upper.as_deref()),
                FieldRef::OptionalNode(step.as_deref()),
            ],
            NodeKind::List { elts } | NodeKind::Tuple { elts } | NodeKind::Set { elts } => {
                vec![FieldRef::Sequence(elts)]
            }
            NodeKind::Dict { keys, values } => {
                vec![FieldRef::Sequence(keys), FieldRef::Sequence(values)]
            }
            NodeKind::Arguments {
                args,
                vararg,
                kwonlyargs,
                kwarg,
            } => vec![
                FieldRef::Sequence(args),
                FieldRef::OptionalNode(vararg.as_deref()),
                FieldRef::Sequence(kwonlyargs),
                FieldRef::OptionalNode(kwarg.as_deref()),
            ],
            NodeKind::Arg { default, .. } => vec![FieldRef::OptionalNode(default.as_deref())],
            NodeKind::Pass
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Name { .. }
            | NodeKind::Constant { .. }
            | NodeKind::Comment(_)
            | NodeKind::Directive(_) => Vec::new(),
        };
        self.kind.field_descriptors().iter().zip(values).collect()
    }

    /// Mutable counterpart of [`Node::fields`], without the descriptors.
    pub fn fields_mut(&mut self) -> Vec<FieldMut<'_>> {
        match &mut self.kind {
            NodeKind::Module { body } => vec![FieldMut::Sequence(body)],
            NodeKind::FunctionDef { args, body, .. } => {
                vec![FieldMut::Node(args), FieldMut::Sequence(body)]
            }
            NodeKind::Return { value } => vec![FieldMut::OptionalNode(value.as_deref_mut())],
            NodeKind::Assign { targets, value } => {
                vec![FieldMut::Sequence(targets), FieldMut::Node(value)]
            }
            NodeKind::AugAssign { target, value, .. } => {
                vec![FieldMut::Node(target), FieldMut::Node(value)]
            }
            NodeKind::For {
                target,
                iter,
                body,
                orelse,
            } => vec![
                FieldMut::Node(target),
                FieldMut::Node(iter),
                FieldMut::Sequence(body),
                FieldMut::Sequence(orelse),
            ],
            NodeKind::While { test, body, orelse } | NodeKind::If { test, body, orelse } => vec![
                FieldMut::Node(test),
                FieldMut::Sequence(body),
                FieldMut::Sequence(orelse),
            ],
            NodeKind::Expr { value }
            | NodeKind::Attribute { value, .. }
            | NodeKind::Starred { value }
            | NodeKind::Keyword { value, .. } => vec![FieldMut::Node(value)],
            NodeKind::BoolOp { values, .. } => vec![FieldMut::Sequence(values)],
            NodeKind::BinOp { left, right, .. } => {
                vec![FieldMut::Node(left), FieldMut::Node(right)]
            }
            NodeKind::UnaryOp { operand, .. } => vec![FieldMut::Node(operand)],
            NodeKind::Compare {
                left, comparators, ..
            } => vec![FieldMut::Node(left), FieldMut::Sequence(comparators)],
            NodeKind::IfExp { test, body, orelse } => vec![
                FieldMut::Node(test),
                FieldMut::Node(body),
                FieldMut::Node(orelse),
            ],
            NodeKind::Call {
                func,
                args,
                keywords,
            } => vec![
                FieldMut::Node(func),
                FieldMut::Sequence(args),
                FieldMut::Sequence(keywords),
            ],
            NodeKind::Subscript { value, slice } => {
                vec![FieldMut::Node(value), FieldMut::Node(slice)]
            }
            NodeKind::Slice { lower, upper, step } => vec![
                FieldMut::OptionalNode(lower.as_deref_mut()),
                FieldMut::OptionalNode(upper.as_deref_mut()),
                FieldMut::OptionalNode(step.as_deref_mut()),
            ],
            NodeKind::List { elts } | NodeKind::Tuple { elts } | NodeKind::Set { elts } => {
                vec![FieldMut::Sequence(elts)]
            }
            NodeKind::Dict { keys, values } => {
                vec![FieldMut::Sequence(keys), FieldMut::Sequence(values)]
            }
            NodeKind::Arguments {
                args,
                vararg,
                kwonlyargs,
                kwarg,
            } => vec![
                FieldMut::Sequence(args),
                FieldMut::OptionalNode(vararg.as_deref_mut()),
                FieldMut::Sequence(kwonlyargs),
                FieldMut::OptionalNode(kwarg.as_deref_mut()),
            ],
            NodeKind::Arg { default, .. } => vec![FieldMut::OptionalNode(default.as_deref_mut())],
            NodeKind::Pass
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Name { .. }
            | NodeKind::Constant { .. }
            | NodeKind::Comment(_)
            | NodeKind::Directive(_) => Vec::new(),
        }
    }

    /// Mutable access to the field called `name`.
    pub fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        let position = self
            .kind
            .field_descriptors()
            .iter()
            .position(|descriptor| descriptor.name == name)?;
        self.fields_mut().into_iter().nth(position)
    }

    /// The child reached through `name` (and `index`, for sequences).
    pub fn child(&self, name: &str, index: Option<usize>) -> Option<&Node> {
        self.fields()
            .into_iter()
            .find(|(descriptor, _)| descriptor.name == name)
            .and_then(|(_, value)| value.get(index))
    }

    pub fn child_mut(&mut self, name: &str, index: Option<usize>) -> Option<&mut Node> {
        match (self.field_mut(name)?, index) {
            (FieldMut::Node(node), None) => Some(node),
            (FieldMut::OptionalNode(node), None) => node,
            (FieldMut::Sequence(nodes), Some(index)) => nodes.get_mut(index),
            _ => None,
        }
    }

    pub fn sequence_mut(&mut self, name: &str) -> Option<&mut Vec<Node>> {
        match self.field_mut(name)? {
            FieldMut::Sequence(nodes) => Some(nodes),
            _ => None,
        }
    }

    /// Direct children in traversal order, with the field and index that reach them.
    pub fn children(&self) -> Vec<(&'static FieldDescriptor, Option<usize>, &Node)> {
        let mut children = Vec::new();
        for (descriptor, value) in self.fields() {
            match value {
                FieldRef::Node(node) => children.push((descriptor, None, node)),
                FieldRef::OptionalNode(Some(node)) => children.push((descriptor, None, node)),
                FieldRef::OptionalNode(None) => {}
                FieldRef::Sequence(nodes) => {
                    children.extend(
                        nodes
                            .iter()
                            .enumerate()
                            .map(|(index, node)| (descriptor, Some(index), node)),
                    );
                }
            }
        }
        children
    }
}
