//! Unparser that writes trivia back out
//!
//! Statement-level comments go on their own line or at the end of the
//! previous one, as their `end_of_line` flag says. Inside brackets every
//! trivia node is followed by a line break, so the rendered text parses
//! again. Directives always take a line of their own.

use crate::tree::{Comment, Directive, Node, NodeKind, Precedence};
use crate::unparse::base::{SequenceItem, Unparse, node_items};
use crate::unparse::printer::{Printer, PrinterOptions};

pub struct AugmentedUnparser {
    printer: Printer,
}

impl AugmentedUnparser {
    pub fn new(options: PrinterOptions) -> Self {
        Self {
            printer: Printer::new(options),
        }
    }

    pub fn unparse(mut self, node: &Node) -> String {
        self.statement(node);
        self.printer.finish()
    }
}

impl Default for AugmentedUnparser {
    fn default() -> Self {
        Self::new(PrinterOptions::default())
    }
}

enum DictItem<'n> {
    Trivia(&'n Node),
    Pair {
        key: &'n Node,
        value_trivia: Vec<&'n Node>,
        value: &'n Node,
    },
}

/// Each structural node with the trivia right before it, plus the trivia
/// after the last one.
type Grouped<'n> = (Vec<(Vec<&'n Node>, &'n Node)>, Vec<&'n Node>);

fn group_trivia(nodes: &[Node]) -> Grouped<'_> {
    let mut groups = Vec::new();
    let mut pending = Vec::new();
    for node in nodes {
        if node.is_trivia() {
            pending.push(node);
        } else {
            groups.push((std::mem::take(&mut pending), node));
        }
    }
    (groups, pending)
}

fn is_end_of_line_comment(node: &Node) -> bool {
    matches!(&node.kind, NodeKind::Comment(comment) if comment.end_of_line)
}

impl Unparse for AugmentedUnparser {
    fn printer(&mut self) -> &mut Printer {
        &mut self.printer
    }

    fn comment(&mut self, comment: &Comment) {
        let text = format!("#{}", comment.payload);
        if comment.end_of_line {
            self.printer.write_padded(&text);
        } else {
            self.printer.fill(&text);
        }
    }

    fn directive(&mut self, directive: &Directive) {
        self.printer.fill("");
        self.directive_line(directive);
    }

    fn bracketed_trivia(&mut self, node: &Node) {
        // A previous trivia node already broke the line.
        let fresh = self.printer.at_line_start();
        if !fresh {
            self.printer.trim_trailing_spaces();
        }
        match &node.kind {
            NodeKind::Comment(comment) if comment.end_of_line && !fresh => {
                self.printer.write_padded(&format!("#{}", comment.payload));
            }
            NodeKind::Comment(comment) => {
                if !fresh {
                    self.printer.continuation();
                }
                self.printer.write(&format!("#{}", comment.payload));
            }
            NodeKind::Directive(directive) => {
                if !fresh {
                    self.printer.continuation();
                }
                self.directive_line(directive);
            }
            _ => return,
        }
        self.printer.continuation();
    }

    /// End-of-line comments opening an `orelse` stay on the last line of
    /// the block before it. One starting on a later line than the block
    /// ends belongs on the `else:` line instead.
    fn hoisted_trivia(&self, body: &[Node], orelse: &[Node]) -> usize {
        let last_line = body.iter().rev().find_map(|node| node.scope).map(|scope| scope.end.line);
        orelse
            .iter()
            .take_while(|node| {
                let after_block = node
                    .scope
                    .zip(last_line)
                    .is_some_and(|(scope, line)| scope.start.line > line);
                is_end_of_line_comment(node) && !after_block
            })
            .count()
    }

    fn as_elif<'n>(&self, orelse: &'n [Node]) -> Option<&'n Node> {
        match orelse {
            [node] if matches!(node.kind, NodeKind::If { .. }) => Some(node),
            _ => None,
        }
    }

    fn sequence(&mut self, items: &[SequenceItem<'_>]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 && !items[i - 1].is_trivia() {
                self.write(", ");
            }
            self.sequence_item(item);
        }
    }

    fn tuple(&mut self, elts: &[Node], parenthesize: bool) {
        self.open(parenthesize);
        self.sequence(&node_items(elts));
        let solid = elts.iter().filter(|elt| !elt.is_trivia()).count();
        // Trailing trivia already follows a separator.
        if solid == 1 && elts.last().is_some_and(|elt| !elt.is_trivia()) {
            self.write(",");
        }
        self.close(parenthesize);
    }

    fn dict(&mut self, keys: &[Node], values: &[Node]) {
        let (key_groups, key_tail) = group_trivia(keys);
        let (value_groups, value_tail) = group_trivia(values);

        let mut items = Vec::new();
        for ((key_trivia, key), (value_trivia, value)) in key_groups.into_iter().zip(value_groups) {
            items.extend(key_trivia.into_iter().map(DictItem::Trivia));
            items.push(DictItem::Pair {
                key,
                value_trivia,
                value,
            });
        }
        items.extend(key_tail.into_iter().map(DictItem::Trivia));
        items.extend(value_tail.into_iter().map(DictItem::Trivia));

        self.write("{");
        for (i, item) in items.iter().enumerate() {
            if i > 0 && matches!(items[i - 1], DictItem::Pair { .. }) {
                self.write(", ");
            }
            match item {
                DictItem::Trivia(node) => self.bracketed_trivia(node),
                DictItem::Pair {
                    key,
                    value_trivia,
                    value,
                } => {
                    self.expression(key, Precedence::Test);
                    self.write(": ");
                    for node in value_trivia {
                        self.bracketed_trivia(node);
                    }
                    self.expression(value, Precedence::Test);
                }
            }
        }
        self.write("}");
    }
}
