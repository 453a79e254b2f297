//! Structural text dump of a tree
//!
//! Two trees are structurally equal when their dumps are equal. Spans are
//! left out unless asked for, so a re-parsed rendering compares equal to
//! the tree it came from.

use crate::tree::{
    Constant, DirectivePayload, FieldRef, HeaderForm, Node, NodeKind,
};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    pub include_trivia: bool,
    pub include_scopes: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            include_trivia: true,
            include_scopes: false,
        }
    }
}

impl DumpOptions {
    pub fn without_trivia() -> Self {
        Self {
            include_trivia: false,
            ..Self::default()
        }
    }
}

pub fn dump(node: &Node, options: DumpOptions) -> String {
    let mut out = String::new();
    dump_node(node, options, &mut out);
    out
}

fn dump_node(node: &Node, options: DumpOptions, out: &mut String) {
    out.push_str(node.kind_name());
    if options.include_scopes
        && let Some(scope) = node.scope
    {
        let _ = write!(out, "@{scope}");
    }
    out.push('(');
    let mut parts = attributes(&node.kind);
    for (descriptor, value) in node.fields() {
        let mut part = format!("{}=", descriptor.name);
        match value {
            FieldRef::Node(child) => dump_node(child, options, &mut part),
            FieldRef::OptionalNode(Some(child)) => dump_node(child, options, &mut part),
            FieldRef::OptionalNode(None) => part.push_str("None"),
            FieldRef::Sequence(children) => {
                part.push('[');
                let mut first = true;
                for child in children {
                    if child.is_trivia() && !options.include_trivia {
                        continue;
                    }
                    if !first {
                        part.push_str(", ");
                    }
                    first = false;
                    dump_node(child, options, &mut part);
                }
                part.push(']');
            }
        }
        parts.push(part);
    }
    out.push_str(&parts.join(", "));
    out.push(')');
}

fn attributes(kind: &NodeKind) -> Vec<String> {
    match kind {
        NodeKind::FunctionDef { name, .. } => vec![format!("name={name:?}")],
        NodeKind::AugAssign { op, .. } | NodeKind::BinOp { op, .. } => {
            vec![format!("op={op:?}")]
        }
        NodeKind::BoolOp { op, .. } => vec![format!("op={op:?}")],
        NodeKind::UnaryOp { op, .. } => vec![format!("op={op:?}")],
        NodeKind::Compare { ops, .. } => vec![format!("ops={ops:?}")],
        NodeKind::Attribute { attr, .. } => vec![format!("attr={attr:?}")],
        NodeKind::Name { id } => vec![format!("id={id:?}")],
        NodeKind::Constant { value } => vec![format!("value={}", constant(value))],
        NodeKind::Arg { name, .. } => vec![format!("name={name:?}")],
        NodeKind::Keyword { arg, .. } => vec![format!("arg={arg:?}")],
        NodeKind::Comment(comment) => vec![
            format!("payload={:?}", comment.payload),
            format!("eol={}", comment.end_of_line),
        ],
        NodeKind::Directive(directive) => vec![
            format!("prefix={:?}", directive.prefix),
            format!("payload={}", payload(&directive.payload)),
        ],
        _ => Vec::new(),
    }
}

fn constant(value: &Constant) -> String {
    match value {
        Constant::Int(raw) | Constant::Float(raw) => raw.clone(),
        Constant::Str(text) => format!("{text:?}"),
        Constant::True => "True".into(),
        Constant::False => "False".into(),
        Constant::None => "None".into(),
    }
}

fn payload(payload: &DirectivePayload) -> String {
    let plain = DumpOptions::without_trivia();
    match payload {
        DirectivePayload::Empty => "Empty".into(),
        DirectivePayload::Expression(expr) => format!("Expression({})", dump(expr, plain)),
        DirectivePayload::Symbol(name) => format!("Symbol({name:?})"),
        DirectivePayload::Definition { name, value } => match value {
            Some(value) => format!("Definition({name:?}, {})", dump(value, plain)),
            None => format!("Definition({name:?})"),
        },
        DirectivePayload::Header { path, form } => {
            let form = match form {
                HeaderForm::Angle => "angle",
                HeaderForm::Quoted => "quoted",
                HeaderForm::Bare => "bare",
            };
            format!("Header({path:?}, {form})")
        }
        DirectivePayload::Clauses(clauses) => {
            let clauses: Vec<String> = clauses
                .iter()
                .map(|clause| match &clause.arguments {
                    Some(arguments) => format!("{}({arguments})", clause.name),
                    None => clause.name.clone(),
                })
                .collect();
            format!("Clauses({clauses:?})")
        }
        DirectivePayload::Raw(text) => format!("Raw({text:?})"),
    }
}
