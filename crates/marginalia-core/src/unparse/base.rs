//! Source rendering of trees
//!
//! [`Unparse`] renders every node kind through overridable default
//! methods. The defaults leave trivia out; [`PlainUnparser`] is nothing
//! more than those defaults, and the augmented unparser overrides the
//! sequence and trivia hooks.

use crate::tree::{
    BinaryOperator, Comment, Constant, Directive, DirectivePayload, HeaderForm, Node, NodeKind,
    Precedence,
};
use crate::unparse::printer::{Printer, PrinterOptions};
use std::fmt::Write;

/// One entry of a comma-separated list.
#[derive(Debug, Clone, Copy)]
pub enum SequenceItem<'n> {
    Node(&'n Node),
    /// A node written after a fixed prefix, as in `*args`.
    Prefixed(&'static str, &'n Node),
    /// Fixed text with no node behind it, as the bare `*` of keyword-only
    /// parameters.
    Marker(&'static str),
}

impl SequenceItem<'_> {
    pub fn is_trivia(&self) -> bool {
        matches!(self, SequenceItem::Node(node) if node.is_trivia())
    }
}

pub(crate) fn node_items(nodes: &[Node]) -> Vec<SequenceItem<'_>> {
    nodes.iter().map(SequenceItem::Node).collect()
}

pub trait Unparse {
    fn printer(&mut self) -> &mut Printer;

    fn write(&mut self, text: &str) {
        self.printer().write(text);
    }

    fn fill(&mut self, text: &str) {
        self.printer().fill(text);
    }

    /// Statement-level comment.
    fn comment(&mut self, _comment: &Comment) {}

    /// Statement-level directive.
    fn directive(&mut self, _directive: &Directive) {}

    /// Trivia between the items of a bracketed list.
    fn bracketed_trivia(&mut self, _node: &Node) {}

    /// Number of leading `orelse` nodes written before the `else` header,
    /// at the end of `body`.
    fn hoisted_trivia(&self, _body: &[Node], _orelse: &[Node]) -> usize {
        0
    }

    /// The `If` that `orelse` can be written as an `elif` for.
    fn as_elif<'n>(&self, orelse: &'n [Node]) -> Option<&'n Node> {
        let mut solid = orelse.iter().filter(|node| !node.is_trivia());
        match (solid.next(), solid.next()) {
            (Some(node), None) if matches!(node.kind, NodeKind::If { .. }) => Some(node),
            _ => None,
        }
    }

    fn statement(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Module { body } => {
                for statement in body {
                    self.statement(statement);
                }
            }
            NodeKind::FunctionDef { name, args, body } => {
                self.fill("def ");
                self.write(name);
                self.write("(");
                self.expression(args, Precedence::Tuple);
                self.write("):");
                self.block(body);
            }
            NodeKind::Return { value } => {
                self.fill("return");
                if let Some(value) = value {
                    self.write(" ");
                    self.expression(value, Precedence::Tuple);
                }
            }
            NodeKind::Assign { targets, value } => {
                self.fill("");
                for target in targets.iter().filter(|target| !target.is_trivia()) {
                    self.expression(target, Precedence::Tuple);
                    self.write(" = ");
                }
                self.expression(value, Precedence::Tuple);
            }
            NodeKind::AugAssign { target, op, value } => {
                self.fill("");
                self.expression(target, Precedence::Tuple);
                self.write(" ");
                self.write(op.symbol());
                self.write("= ");
                self.expression(value, Precedence::Tuple);
            }
            NodeKind::For {
                target,
                iter,
                body,
                orelse,
            } => {
                self.fill("for ");
                self.expression(target, Precedence::Tuple);
                self.write(" in ");
                self.expression(iter, Precedence::Tuple);
                self.write(":");
                self.block(body);
                self.else_clause(body, orelse);
            }
            NodeKind::While { test, body, orelse } => {
                self.fill("while ");
                self.expression(test, Precedence::Test);
                self.write(":");
                self.block(body);
                self.else_clause(body, orelse);
            }
            NodeKind::If { test, body, orelse } => self.if_statement(test, body, orelse),
            NodeKind::Expr { value } => {
                self.fill("");
                self.expression(value, Precedence::Tuple);
            }
            NodeKind::Pass => self.fill("pass"),
            NodeKind::Break => self.fill("break"),
            NodeKind::Continue => self.fill("continue"),
            NodeKind::Comment(comment) => self.comment(comment),
            NodeKind::Directive(directive) => self.directive(directive),
            _ => self.expression(node, Precedence::Tuple),
        }
    }

    fn block(&mut self, body: &[Node]) {
        self.printer().indent();
        for statement in body {
            self.statement(statement);
        }
        self.printer().dedent();
    }

    fn if_statement(&mut self, test: &Node, body: &[Node], orelse: &[Node]) {
        self.fill("if ");
        self.expression(test, Precedence::Test);
        self.write(":");
        self.block(body);

        let mut body = body;
        let mut orelse = orelse;
        loop {
            let hoisted = self.hoisted_trivia(body, orelse);
            for node in &orelse[..hoisted] {
                self.statement(node);
            }
            let rest = &orelse[hoisted..];
            match self.as_elif(rest).map(|node| &node.kind) {
                Some(NodeKind::If {
                    test,
                    body: next_body,
                    orelse: next,
                }) => {
                    self.fill("elif ");
                    self.expression(test, Precedence::Test);
                    self.write(":");
                    self.block(next_body);
                    body = next_body;
                    orelse = next;
                }
                _ => {
                    self.else_block(rest);
                    return;
                }
            }
        }
    }

    fn else_clause(&mut self, body: &[Node], orelse: &[Node]) {
        let hoisted = self.hoisted_trivia(body, orelse);
        for node in &orelse[..hoisted] {
            self.statement(node);
        }
        self.else_block(&orelse[hoisted..]);
    }

    fn else_block(&mut self, orelse: &[Node]) {
        if orelse.iter().any(|node| !node.is_trivia()) {
            self.fill("else:");
            self.block(orelse);
        } else {
            // A block of trivia alone would not parse.
            for node in orelse {
                self.statement(node);
            }
        }
    }

    fn expression(&mut self, node: &Node, precedence: Precedence) {
        match &node.kind {
            NodeKind::BoolOp { op, values } => {
                let own = op.precedence();
                let parens = precedence > own;
                self.open(parens);
                let separator = format!(" {} ", op.symbol());
                for (i, value) in values.iter().filter(|value| !value.is_trivia()).enumerate() {
                    if i > 0 {
                        self.write(&separator);
                    }
                    self.expression(value, own.next());
                }
                self.close(parens);
            }
            NodeKind::BinOp { left, op, right } => {
                let own = op.precedence();
                let (left_precedence, right_precedence) = if *op == BinaryOperator::Pow {
                    (Precedence::Await, Precedence::Factor)
                } else {
                    (own, own.next())
                };
                let parens = precedence > own;
                self.open(parens);
                self.expression(left, left_precedence);
                self.write(" ");
                self.write(op.symbol());
                self.write(" ");
                self.expression(right, right_precedence);
                self.close(parens);
            }
            NodeKind::UnaryOp { op, operand } => {
                let own = op.precedence();
                let parens = precedence > own;
                self.open(parens);
                self.write(op.symbol());
                self.expression(operand, own);
                self.close(parens);
            }
            NodeKind::Compare {
                left,
                ops,
                comparators,
            } => {
                let parens = precedence > Precedence::Compare;
                self.open(parens);
                self.expression(left, Precedence::Compare.next());
                let comparators = comparators.iter().filter(|node| !node.is_trivia());
                for (op, comparator) in ops.iter().zip(comparators) {
                    self.write(" ");
                    self.write(op.symbol());
                    self.write(" ");
                    self.expression(comparator, Precedence::Compare.next());
                }
                self.close(parens);
            }
            NodeKind::IfExp { test, body, orelse } => {
                let parens = precedence > Precedence::Test;
                self.open(parens);
                self.expression(body, Precedence::Test.next());
                self.write(" if ");
                self.expression(test, Precedence::Test.next());
                self.write(" else ");
                self.expression(orelse, Precedence::Test);
                self.close(parens);
            }
            NodeKind::Call {
                func,
                args,
                keywords,
            } => {
                self.expression(func, Precedence::Atom);
                self.write("(");
                let items: Vec<_> = args.iter().chain(keywords).map(SequenceItem::Node).collect();
                self.sequence(&items);
                self.write(")");
            }
            NodeKind::Attribute { value, attr } => {
                let int_literal = matches!(
                    value.kind,
                    NodeKind::Constant {
                        value: Constant::Int(_)
                    }
                );
                self.open(int_literal);
                self.expression(value, Precedence::Atom);
                self.close(int_literal);
                self.write(".");
                self.write(attr);
            }
            NodeKind::Subscript { value, slice } => {
                self.expression(value, Precedence::Atom);
                self.write("[");
                match &slice.kind {
                    NodeKind::Tuple { elts } if elts.iter().any(|elt| !elt.is_trivia()) => {
                        self.tuple(elts, false);
                    }
                    _ => self.expression(slice, Precedence::Tuple),
                }
                self.write("]");
            }
            NodeKind::Slice { lower, upper, step } => {
                if let Some(lower) = lower {
                    self.expression(lower, Precedence::Test);
                }
                self.write(":");
                if let Some(upper) = upper {
                    self.expression(upper, Precedence::Test);
                }
                if let Some(step) = step {
                    self.write(":");
                    self.expression(step, Precedence::Test);
                }
            }
            NodeKind::Starred { value } => {
                self.write("*");
                self.expression(value, Precedence::BitOr);
            }
            NodeKind::Name { id } => self.write(id),
            NodeKind::Constant { value } => self.write(&constant_text(value)),
            NodeKind::List { elts } => {
                self.write("[");
                self.sequence(&node_items(elts));
                self.write("]");
            }
            NodeKind::Tuple { elts } => self.tuple(elts, true),
            NodeKind::Set { elts } => {
                self.write("{");
                self.sequence(&node_items(elts));
                self.write("}");
            }
            NodeKind::Dict { keys, values } => self.dict(keys, values),
            NodeKind::Arguments {
                args,
                vararg,
                kwonlyargs,
                kwarg,
            } => {
                let mut items = node_items(args);
                match vararg {
                    Some(vararg) => items.push(SequenceItem::Prefixed("*", vararg)),
                    None if kwonlyargs.iter().any(|arg| !arg.is_trivia()) => {
                        items.push(SequenceItem::Marker("*"));
                    }
                    None => {}
                }
                items.extend(kwonlyargs.iter().map(SequenceItem::Node));
                if let Some(kwarg) = kwarg {
                    items.push(SequenceItem::Prefixed("**", kwarg));
                }
                self.sequence(&items);
            }
            NodeKind::Arg { name, default } => {
                self.write(name);
                if let Some(default) = default {
                    self.write("=");
                    self.expression(default, Precedence::Test);
                }
            }
            NodeKind::Keyword { arg, value } => match arg {
                Some(arg) => {
                    self.write(arg);
                    self.write("=");
                    self.expression(value, Precedence::Test);
                }
                None => {
                    self.write("**");
                    self.expression(value, Precedence::BitOr);
                }
            },
            NodeKind::Comment(_) | NodeKind::Directive(_) => self.bracketed_trivia(node),
            _ => self.statement(node),
        }
    }

    /// Comma-separated items; trivia items are skipped.
    fn sequence(&mut self, items: &[SequenceItem<'_>]) {
        for (i, item) in items.iter().filter(|item| !item.is_trivia()).enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.sequence_item(item);
        }
    }

    fn sequence_item(&mut self, item: &SequenceItem<'_>) {
        match item {
            SequenceItem::Node(node) => self.expression(node, Precedence::Test),
            SequenceItem::Prefixed(prefix, node) => {
                self.write(prefix);
                self.expression(node, Precedence::Test);
            }
            SequenceItem::Marker(marker) => self.write(marker),
        }
    }

    fn tuple(&mut self, elts: &[Node], parenthesize: bool) {
        self.open(parenthesize);
        self.sequence(&node_items(elts));
        if elts.iter().filter(|elt| !elt.is_trivia()).count() == 1 {
            self.write(",");
        }
        self.close(parenthesize);
    }

    fn dict(&mut self, keys: &[Node], values: &[Node]) {
        self.write("{");
        let keys = keys.iter().filter(|key| !key.is_trivia());
        let values = values.iter().filter(|value| !value.is_trivia());
        for (i, (key, value)) in keys.zip(values).enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.expression(key, Precedence::Test);
            self.write(": ");
            self.expression(value, Precedence::Test);
        }
        self.write("}");
    }

    /// The directive line, from `#` to the end of its payload.
    fn directive_line(&mut self, directive: &Directive) {
        self.write("#");
        if directive.marker.padded {
            self.write(" ");
        }
        let mut keywords = directive.prefix.iter();
        if let Some(first) = keywords.next() {
            self.write(first);
        }
        if directive.marker.colon {
            self.write(":");
        }
        for keyword in keywords {
            self.write(" ");
            self.write(keyword);
        }

        match &directive.payload {
            DirectivePayload::Empty => {}
            DirectivePayload::Expression(expression) => {
                self.write(" ");
                self.expression(expression, Precedence::Tuple);
            }
            DirectivePayload::Symbol(symbol) => {
                self.write(" ");
                self.write(symbol);
            }
            DirectivePayload::Definition { name, value } => {
                self.write(" ");
                self.write(name);
                if let Some(value) = value {
                    self.write(" ");
                    self.expression(value, Precedence::Tuple);
                }
            }
            DirectivePayload::Header { path, form } => {
                let header = match form {
                    HeaderForm::Angle => format!(" <{path}>"),
                    HeaderForm::Quoted => format!(" \"{path}\""),
                    HeaderForm::Bare => format!(" {path}"),
                };
                self.write(&header);
            }
            DirectivePayload::Clauses(clauses) => {
                for clause in clauses {
                    self.write(" ");
                    self.write(&clause.name);
                    if let Some(arguments) = &clause.arguments {
                        self.write("(");
                        self.write(arguments);
                        self.write(")");
                    }
                }
            }
            DirectivePayload::Raw(text) => {
                self.write(" ");
                self.write(text);
            }
        }
    }

    fn open(&mut self, parens: bool) {
        if parens {
            self.write("(");
        }
    }

    fn close(&mut self, parens: bool) {
        if parens {
            self.write(")");
        }
    }
}

/// Source text of a literal.
pub fn constant_text(value: &Constant) -> String {
    match value {
        Constant::Int(text) | Constant::Float(text) => text.clone(),
        Constant::Str(text) => quote_string(text),
        Constant::True => "True".into(),
        Constant::False => "False".into(),
        Constant::None => "None".into(),
    }
}

/// Quote `value` as a string literal: single quotes unless the value holds
/// a single quote and no double quote.
pub fn quote_string(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Renders a tree without any of its trivia.
pub struct PlainUnparser {
    printer: Printer,
}

impl PlainUnparser {
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

impl Default for PlainUnparser {
    fn default() -> Self {
        Self::new(PrinterOptions::default())
    }
}

impl Unparse for PlainUnparser {
    fn printer(&mut self) -> &mut Printer {
        &mut self.printer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{SpanRetention, parse_expression, parse_module};

    fn plain(source: &str) -> String {
        let tree = parse_module(source, SpanRetention::Native).unwrap();
        PlainUnparser::default().unparse(&tree)
    }

    fn expr(source: &str) -> String {
        let tree = parse_expression(source).unwrap();
        PlainUnparser::default().unparse(&tree)
    }

    #[test]
    fn test_precedence_parentheses() {
        assert_eq!(expr("(a + b) * c"), "(a + b) * c\n");
        assert_eq!(expr("a + b * c"), "a + b * c\n");
        assert_eq!(expr("a - (b - c)"), "a - (b - c)\n");
        assert_eq!(expr("(-1) ** 2"), "(-1) ** 2\n");
        assert_eq!(expr("2 ** -1"), "2 ** -1\n");
        assert_eq!(expr("not (a and b)"), "not (a and b)\n");
        assert_eq!(expr("(a or b) and c"), "(a or b) and c\n");
        assert_eq!(expr("(a < b) == c"), "(a < b) == c\n");
        assert_eq!(expr("(1).real"), "(1).real\n");
        assert_eq!(expr("x if y else z"), "x if y else z\n");
    }

    #[test]
    fn test_tuples_are_parenthesized() {
        assert_eq!(plain("x = 1, 2\n"), "x = (1, 2)\n");
        assert_eq!(plain("x = 1,\n"), "x = (1,)\n");
        assert_eq!(plain("x = ()\n"), "x = ()\n");
        assert_eq!(plain("a[1:2, ::3]\n"), "a[1:2, ::3]\n");
        assert_eq!(plain("a[i,]\n"), "a[i,]\n");
    }

    #[test]
    fn test_strings() {
        assert_eq!(quote_string("plain"), "'plain'");
        assert_eq!(quote_string("it's"), "\"it's\"");
        assert_eq!(quote_string("both ' and \""), "'both \\' and \"'");
        assert_eq!(quote_string("tab\there\n"), "'tab\\there\\n'");
        assert_eq!(quote_string("\u{1}"), "'\\x01'");
    }

    #[test]
    fn test_statements() {
        insta::assert_snapshot!(
            plain("def f(a, b=1, *rest, key, **extra):\n    return a\nfor i, j in x:\n    pass\nelse:\n    y += 1\n"),
            @r"
        def f(a, b=1, *rest, key, **extra):
            return a
        for (i, j) in x:
            pass
        else:
            y += 1
        "
        );
        assert_eq!(plain("def g(a, *, b):\n    pass\n"), "def g(a, *, b):\n    pass\n");
    }

    #[test]
    fn test_elif_chain() {
        insta::assert_snapshot!(
            plain("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    while c:\n        break\n"),
            @r"
        if a:
            x = 1
        elif b:
            x = 2
        else:
            while c:
                break
        "
        );
    }

    #[test]
    fn test_calls_and_displays() {
        assert_eq!(
            plain("f(a, *b, k=1, **kw)\n"),
            "f(a, *b, k=1, **kw)\n"
        );
        assert_eq!(plain("x = {1: 'a', 2: \"b\"}\n"), "x = {1: 'a', 2: 'b'}\n");
        assert_eq!(plain("x = {1, 2}\n"), "x = {1, 2}\n");
        assert_eq!(plain("x = [*a, b]\n"), "x = [*a, b]\n");
    }

    #[test]
    fn test_empty_module() {
        assert_eq!(plain(""), "");
    }
}
