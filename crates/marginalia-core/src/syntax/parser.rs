//! Recursive-descent parser for the host language
//!
//! Builds a [`Node`] tree from the scanner's tokens, ignoring comments.
//! Each node spans from the first to the last token it consumed, so a
//! parenthesised operand keeps its own span while the enclosing expression
//! covers the parentheses.

use crate::error::MarginaliaError;
use crate::result::Result;
use crate::span::{LineIndex, Scope};
use crate::syntax::lexer::{decode_string, tokenize};
use crate::syntax::token::{Token, TokenKind};
use crate::tree::{
    BinaryOperator, BoolOperator, CompareOperator, Constant, Node, NodeKind, UnaryOperator,
};

/// Which nodes receive a span from the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanRetention {
    /// `Module`, `Arguments` and `Keyword` nodes are left without a span.
    #[default]
    Native,
    /// Every node that covers at least one token gets a span.
    Full,
}

const KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

const BINARY_LEVELS: [&[&str]; 6] = [
    &["|"],
    &["^"],
    &["&"],
    &["<<", ">>"],
    &["+", "-"],
    &["*", "/", "//", "%", "@"],
];

const AUGMENTED_OPS: [&str; 13] = [
    "+=", "-=", "*=", "@=", "/=", "//=", "%=", "**=", "<<=", ">>=", "|=", "^=", "&=",
];

/// Parse a whole module.
pub fn parse_module(source: &str, retention: SpanRetention) -> Result<Node> {
    Parser::new(source, retention)?.module()
}

/// Parse a single expression, e.g. a directive payload.
pub fn parse_expression(source: &str) -> Result<Node> {
    let mut parser = Parser::new(source, SpanRetention::Full)?;
    if parser.peek().kind == TokenKind::EndMarker {
        return Err(parser.error("expected an expression"));
    }
    let expression = parser.test()?;
    while parser.peek().kind == TokenKind::Newline {
        parser.bump();
    }
    if parser.peek().kind != TokenKind::EndMarker {
        return Err(parser.error(format!("unexpected '{}'", parser.peek().text)));
    }
    Ok(expression)
}

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    last_end: usize,
    index: LineIndex,
    retention: SpanRetention,
}

impl Parser {
    fn new(source: &str, retention: SpanRetention) -> Result<Self> {
        let tokens = tokenize(source)?
            .into_iter()
            .filter(|token| token.kind != TokenKind::Comment)
            .collect();
        Ok(Self {
            tokens,
            pos: 0,
            last_end: 0,
            index: LineIndex::new(source),
            retention,
        })
    }

    // ----- token helpers -----

    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.kind.is_layout() {
            self.last_end = token.span.end;
        }
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at_op(&self, op: &str) -> bool {
        self.peek().is_op(op)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek().is_keyword(keyword)
    }

    fn expect_op(&mut self, op: &str) -> Result<Token> {
        if self.at_op(op) {
            Ok(self.bump())
        } else {
            Err(self.error(format!("expected '{op}', found {}", self.describe())))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<Token> {
        if self.at_keyword(keyword) {
            Ok(self.bump())
        } else {
            Err(self.error(format!("expected '{keyword}', found {}", self.describe())))
        }
    }

    fn expect_kind(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.peek().kind == kind {
            Ok(self.bump())
        } else {
            Err(self.error(format!("expected {what}, found {}", self.describe())))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        let token = self.peek();
        if token.kind == TokenKind::Name && !is_keyword(&token.text) {
            Ok(self.bump().text)
        } else {
            Err(self.error(format!("expected a name, found {}", self.describe())))
        }
    }

    fn describe(&self) -> String {
        let token = self.peek();
        match token.kind {
            TokenKind::Newline => "end of line".into(),
            TokenKind::Indent => "indent".into(),
            TokenKind::Dedent => "dedent".into(),
            TokenKind::EndMarker => "end of input".into(),
            _ => format!("'{}'", token.text),
        }
    }

    fn error(&self, message: impl Into<String>) -> MarginaliaError {
        MarginaliaError::syntax(message, self.index.location(self.peek().span.start))
    }

    fn start(&self) -> usize {
        self.peek().span.start
    }

    fn scope_from(&self, start: usize) -> Option<Scope> {
        Some(self.index.scope(start, self.last_end.max(start)))
    }

    fn node(&self, kind: NodeKind, start: usize) -> Node {
        Node::new(kind, self.scope_from(start))
    }

    /// Span for kinds that only carry one in full retention.
    fn full_scope(&self, start: usize) -> Option<Scope> {
        match self.retention {
            SpanRetention::Native => None,
            SpanRetention::Full => self.scope_from(start),
        }
    }

    // ----- statements -----

    fn module(&mut self) -> Result<Node> {
        let mut body = Vec::new();
        while self.peek().kind != TokenKind::EndMarker {
            if self.peek().kind == TokenKind::Newline {
                self.bump();
                continue;
            }
            body.extend(self.statement()?);
        }
        let scope = match (self.retention, body.first(), body.last()) {
            (SpanRetention::Full, Some(first), Some(last)) => first
                .scope
                .zip(last.scope)
                .map(|(first, last)| first.cover(&last)),
            _ => None,
        };
        Ok(Node::new(NodeKind::Module { body }, scope))
    }

    fn statement(&mut self) -> Result<Vec<Node>> {
        if self.at_keyword("if") {
            Ok(vec![self.if_statement()?])
        } else if self.at_keyword("while") {
            Ok(vec![self.while_statement()?])
        } else if self.at_keyword("for") {
            Ok(vec![self.for_statement()?])
        } else if self.at_keyword("def") {
            Ok(vec![self.function_def()?])
        } else {
            self.simple_statements()
        }
    }

    fn suite(&mut self) -> Result<Vec<Node>> {
        if self.peek().kind != TokenKind::Newline {
            return self.simple_statements();
        }
        self.bump();
        self.expect_kind(TokenKind::Indent, "an indented block")?;
        let mut body = Vec::new();
        while !matches!(self.peek().kind, TokenKind::Dedent | TokenKind::EndMarker) {
            if self.peek().kind == TokenKind::Newline {
                self.bump();
                continue;
            }
            body.extend(self.statement()?);
        }
        if self.peek().kind == TokenKind::Dedent {
            self.bump();
        }
        Ok(body)
    }

    fn else_suite(&mut self) -> Result<Vec<Node>> {
        if !self.at_keyword("else") {
            return Ok(Vec::new());
        }
        self.bump();
        self.expect_op(":")?;
        self.suite()
    }

    fn if_statement(&mut self) -> Result<Node> {
        let start = self.start();
        // `if` or `elif`
        self.bump();
        let test = self.test()?;
        self.expect_op(":")?;
        let body = self.suite()?;
        let orelse = if self.at_keyword("elif") {
            vec![self.if_statement()?]
        } else {
            self.else_suite()?
        };
        Ok(self.node(
            NodeKind::If {
                test: Box::new(test),
                body,
                orelse,
            },
            start,
        ))
    }

    fn while_statement(&mut self) -> Result<Node> {
        let start = self.start();
        self.expect_keyword("while")?;
        let test = self.test()?;
        self.expect_op(":")?;
        let body = self.suite()?;
        let orelse = self.else_suite()?;
        Ok(self.node(
            NodeKind::While {
                test: Box::new(test),
                body,
                orelse,
            },
            start,
        ))
    }

    fn for_statement(&mut self) -> Result<Node> {
        let start = self.start();
        self.expect_keyword("for")?;
        let target = self.expression_list()?;
        self.expect_keyword("in")?;
        let iter = self.testlist_star()?;
        self.expect_op(":")?;
        let body = self.suite()?;
        let orelse = self.else_suite()?;
        Ok(self.node(
            NodeKind::For {
                target: Box::new(target),
                iter: Box::new(iter),
                body,
                orelse,
            },
            start,
        ))
    }

    fn function_def(&mut self) -> Result<Node> {
        let start = self.start();
        self.expect_keyword("def")?;
        let name = self.expect_identifier()?;
        self.expect_op("(")?;
        let args = self.parameters()?;
        self.expect_op(")")?;
        self.expect_op(":")?;
        let body = self.suite()?;
        Ok(self.node(
            NodeKind::FunctionDef {
                name,
                args: Box::new(args),
                body,
            },
            start,
        ))
    }

    fn parameters(&mut self) -> Result<Node> {
        let start = self.start();
        let mut args = Vec::new();
        let mut vararg = None;
        let mut kwonlyargs = Vec::new();
        let mut kwarg = None;
        let mut seen_star = false;
        let mut consumed = false;

        while !self.at_op(")") {
            consumed = true;
            if self.at_op("**") {
                self.bump();
                kwarg = Some(Box::new(self.parameter(false)?));
            } else if self.at_op("*") {
                if seen_star {
                    return Err(self.error("duplicate '*' in parameter list"));
                }
                self.bump();
                seen_star = true;
                if !self.at_op(",") && !self.at_op(")") {
                    vararg = Some(Box::new(self.parameter(false)?));
                }
            } else {
                if kwarg.is_some() {
                    return Err(self.error("parameter after '**' parameter"));
                }
                let arg = self.parameter(true)?;
                if seen_star {
                    kwonlyargs.push(arg);
                } else {
                    args.push(arg);
                }
            }
            if !self.at_op(",") {
                break;
            }
            self.bump();
        }

        if seen_star && vararg.is_none() && kwonlyargs.is_empty() {
            return Err(self.error("named parameters must follow bare '*'"));
        }
        let scope = if consumed { self.full_scope(start) } else { None };
        Ok(Node::new(
            NodeKind::Arguments {
                args,
                vararg,
                kwonlyargs,
                kwarg,
            },
            scope,
        ))
    }

    fn parameter(&mut self, allow_default: bool) -> Result<Node> {
        let start = self.start();
        let name = self.expect_identifier()?;
        let default = if allow_default && self.at_op("=") {
            self.bump();
            Some(Box::new(self.test()?))
        } else {
            None
        };
        Ok(self.node(NodeKind::Arg { name, default }, start))
    }

    fn simple_statements(&mut self) -> Result<Vec<Node>> {
        let mut statements = vec![self.small_statement()?];
        while self.at_op(";") {
            self.bump();
            if matches!(self.peek().kind, TokenKind::Newline | TokenKind::EndMarker) {
                break;
            }
            statements.push(self.small_statement()?);
        }
        if self.peek().kind != TokenKind::EndMarker {
            self.expect_kind(TokenKind::Newline, "end of line")?;
        }
        Ok(statements)
    }

    fn small_statement(&mut self) -> Result<Node> {
        let start = self.start();
        for (keyword, kind) in [
            ("pass", NodeKind::Pass),
            ("break", NodeKind::Break),
            ("continue", NodeKind::Continue),
        ] {
            if self.at_keyword(keyword) {
                self.bump();
                return Ok(self.node(kind, start));
            }
        }

        if self.at_keyword("return") {
            self.bump();
            let value = if self.can_start_expression() {
                Some(Box::new(self.testlist_star()?))
            } else {
                None
            };
            return Ok(self.node(NodeKind::Return { value }, start));
        }

        let first = self.testlist_star()?;
        if let Some(op) = AUGMENTED_OPS.iter().find(|op| self.at_op(op)) {
            let symbol = op.trim_end_matches('=');
            let op = BinaryOperator::from_symbol(symbol)
                .ok_or_else(|| self.error(format!("unknown operator '{symbol}'")))?;
            self.bump();
            let value = self.testlist_star()?;
            return Ok(self.node(
                NodeKind::AugAssign {
                    target: Box::new(first),
                    op,
                    value: Box::new(value),
                },
                start,
            ));
        }

        if self.at_op("=") {
            let mut targets = vec![first];
            while self.at_op("=") {
                self.bump();
                targets.push(self.testlist_star()?);
            }
            let value = targets
                .pop()
                .ok_or_else(|| self.error("expected an assignment value"))?;
            return Ok(self.node(
                NodeKind::Assign {
                    targets,
                    value: Box::new(value),
                },
                start,
            ));
        }

        Ok(self.node(
            NodeKind::Expr {
                value: Box::new(first),
            },
            start,
        ))
    }

    // ----- expressions -----

    fn can_start_expression(&self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::Name => {
                !is_keyword(&token.text)
                    || matches!(token.text.as_str(), "True" | "False" | "None" | "not")
            }
            TokenKind::Int | TokenKind::Float | TokenKind::Str => true,
            TokenKind::Op => matches!(token.text.as_str(), "(" | "[" | "{" | "-" | "+" | "~" | "*"),
            _ => false,
        }
    }

    /// Comma-separated expressions, a tuple when a comma is present.
    fn testlist_star(&mut self) -> Result<Node> {
        self.comma_list(Self::star_or_test)
    }

    /// Like [`Self::testlist_star`] but stops before comparisons, for `for` targets.
    fn expression_list(&mut self) -> Result<Node> {
        self.comma_list(Self::star_or_bitwise)
    }

    fn comma_list(&mut self, item: fn(&mut Self) -> Result<Node>) -> Result<Node> {
        let start = self.start();
        let first = item(self)?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.at_op(",") {
            self.bump();
            if !self.can_start_expression() {
                break;
            }
            elts.push(item(self)?);
        }
        Ok(self.node(NodeKind::Tuple { elts }, start))
    }

    fn star_or_test(&mut self) -> Result<Node> {
        if self.at_op("*") {
            self.starred()
        } else {
            self.test()
        }
    }

    fn star_or_bitwise(&mut self) -> Result<Node> {
        if self.at_op("*") {
            self.starred()
        } else {
            self.binary(0)
        }
    }

    fn starred(&mut self) -> Result<Node> {
        let start = self.start();
        self.expect_op("*")?;
        let value = self.binary(0)?;
        Ok(self.node(
            NodeKind::Starred {
                value: Box::new(value),
            },
            start,
        ))
    }

    fn test(&mut self) -> Result<Node> {
        let start = self.start();
        let body = self.or_test()?;
        if !self.at_keyword("if") {
            return Ok(body);
        }
        self.bump();
        let test = self.or_test()?;
        self.expect_keyword("else")?;
        let orelse = self.test()?;
        Ok(self.node(
            NodeKind::IfExp {
                test: Box::new(test),
                body: Box::new(body),
                orelse: Box::new(orelse),
            },
            start,
        ))
    }

    fn or_test(&mut self) -> Result<Node> {
        self.bool_chain("or", BoolOperator::Or, Self::and_test)
    }

    fn and_test(&mut self) -> Result<Node> {
        self.bool_chain("and", BoolOperator::And, Self::not_test)
    }

    fn bool_chain(
        &mut self,
        keyword: &str,
        op: BoolOperator,
        operand: fn(&mut Self) -> Result<Node>,
    ) -> Result<Node> {
        let start = self.start();
        let first = operand(self)?;
        if !self.at_keyword(keyword) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.at_keyword(keyword) {
            self.bump();
            values.push(operand(self)?);
        }
        Ok(self.node(NodeKind::BoolOp { op, values }, start))
    }

    fn not_test(&mut self) -> Result<Node> {
        if !self.at_keyword("not") {
            return self.comparison();
        }
        let start = self.start();
        self.bump();
        let operand = self.not_test()?;
        Ok(self.node(
            NodeKind::UnaryOp {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
            },
            start,
        ))
    }

    fn comparison(&mut self) -> Result<Node> {
        let start = self.start();
        let left = self.binary(0)?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        while let Some(op) = self.compare_operator() {
            ops.push(op);
            comparators.push(self.binary(0)?);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(self.node(
            NodeKind::Compare {
                left: Box::new(left),
                ops,
                comparators,
            },
            start,
        ))
    }

    /// Consume a comparison operator if one is next.
    fn compare_operator(&mut self) -> Option<CompareOperator> {
        let token = self.peek();
        let op = match (token.kind, token.text.as_str()) {
            (TokenKind::Op, "==") => CompareOperator::Eq,
            (TokenKind::Op, "!=") => CompareOperator::NotEq,
            (TokenKind::Op, "<") => CompareOperator::Lt,
            (TokenKind::Op, "<=") => CompareOperator::LtE,
            (TokenKind::Op, ">") => CompareOperator::Gt,
            (TokenKind::Op, ">=") => CompareOperator::GtE,
            (TokenKind::Name, "in") => CompareOperator::In,
            (TokenKind::Name, "not") if self.peek_nth(1).is_keyword("in") => {
                self.bump();
                CompareOperator::NotIn
            }
            (TokenKind::Name, "is") if self.peek_nth(1).is_keyword("not") => {
                self.bump();
                CompareOperator::IsNot
            }
            (TokenKind::Name, "is") => CompareOperator::Is,
            _ => return None,
        };
        self.bump();
        Some(op)
    }

    fn binary(&mut self, level: usize) -> Result<Node> {
        let Some(ops) = BINARY_LEVELS.get(level) else {
            return self.factor();
        };
        let start = self.start();
        let mut left = self.binary(level + 1)?;
        loop {
            let token = self.peek();
            if token.kind != TokenKind::Op || !ops.contains(&token.text.as_str()) {
                break;
            }
            let op = BinaryOperator::from_symbol(&token.text)
                .ok_or_else(|| self.error("unknown binary operator"))?;
            self.bump();
            let right = self.binary(level + 1)?;
            left = self.node(
                NodeKind::BinOp {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                start,
            );
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<Node> {
        let op = match self.peek().text.as_str() {
            "+" => UnaryOperator::UAdd,
            "-" => UnaryOperator::USub,
            "~" => UnaryOperator::Invert,
            _ => return self.power(),
        };
        if self.peek().kind != TokenKind::Op {
            return self.power();
        }
        let start = self.start();
        self.bump();
        let operand = self.factor()?;
        Ok(self.node(
            NodeKind::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            start,
        ))
    }

    fn power(&mut self) -> Result<Node> {
        let start = self.start();
        let base = self.primary()?;
        if !self.at_op("**") {
            return Ok(base);
        }
        self.bump();
        let exponent = self.factor()?;
        Ok(self.node(
            NodeKind::BinOp {
                left: Box::new(base),
                op: BinaryOperator::Pow,
                right: Box::new(exponent),
            },
            start,
        ))
    }

    fn primary(&mut self) -> Result<Node> {
        let start = self.start();
        let mut node = self.atom()?;
        loop {
            if self.at_op("(") {
                let (args, keywords) = self.call_arguments()?;
                node = self.node(
                    NodeKind::Call {
                        func: Box::new(node),
                        args,
                        keywords,
                    },
                    start,
                );
            } else if self.at_op("[") {
                self.bump();
                let slice = self.subscript()?;
                self.expect_op("]")?;
                node = self.node(
                    NodeKind::Subscript {
                        value: Box::new(node),
                        slice: Box::new(slice),
                    },
                    start,
                );
            } else if self.at_op(".") {
                self.bump();
                let attr = self.expect_identifier()?;
                node = self.node(
                    NodeKind::Attribute {
                        value: Box::new(node),
                        attr,
                    },
                    start,
                );
            } else {
                return Ok(node);
            }
        }
    }

    fn call_arguments(&mut self) -> Result<(Vec<Node>, Vec<Node>)> {
        self.expect_op("(")?;
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        while !self.at_op(")") {
            let start = self.start();
            if self.at_op("*") {
                args.push(self.starred()?);
            } else if self.at_op("**") {
                self.bump();
                let value = self.test()?;
                keywords.push(Node::new(
                    NodeKind::Keyword {
                        arg: None,
                        value: Box::new(value),
                    },
                    self.full_scope(start),
                ));
            } else if self.peek().kind == TokenKind::Name && self.peek_nth(1).is_op("=") {
                let arg = self.expect_identifier()?;
                self.bump();
                let value = self.test()?;
                keywords.push(Node::new(
                    NodeKind::Keyword {
                        arg: Some(arg),
                        value: Box::new(value),
                    },
                    self.full_scope(start),
                ));
            } else {
                if !keywords.is_empty() {
                    return Err(self.error("positional argument follows keyword argument"));
                }
                args.push(self.test()?);
            }
            if !self.at_op(",") {
                break;
            }
            self.bump();
        }
        self.expect_op(")")?;
        Ok((args, keywords))
    }

    fn subscript(&mut self) -> Result<Node> {
        let start = self.start();
        let first = self.slice_item()?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.at_op(",") {
            self.bump();
            if self.at_op("]") {
                break;
            }
            elts.push(self.slice_item()?);
        }
        Ok(self.node(NodeKind::Tuple { elts }, start))
    }

    fn slice_item(&mut self) -> Result<Node> {
        let start = self.start();
        let lower = if self.at_op(":") {
            None
        } else {
            Some(Box::new(self.test()?))
        };
        if !self.at_op(":") {
            return lower
                .map(|node| *node)
                .ok_or_else(|| self.error("expected a subscript"));
        }
        self.bump();
        let ends_part = |parser: &Self| parser.at_op(":") || parser.at_op("]") || parser.at_op(",");
        let upper = if ends_part(self) {
            None
        } else {
            Some(Box::new(self.test()?))
        };
        let step = if self.at_op(":") {
            self.bump();
            if ends_part(self) {
                None
            } else {
                Some(Box::new(self.test()?))
            }
        } else {
            None
        };
        Ok(self.node(NodeKind::Slice { lower, upper, step }, start))
    }

    fn atom(&mut self) -> Result<Node> {
        let start = self.start();
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Name => {
                let value = match token.text.as_str() {
                    "True" => Some(Constant::True),
                    "False" => Some(Constant::False),
                    "None" => Some(Constant::None),
                    text if is_keyword(text) => {
                        return Err(self.error(format!("unexpected keyword '{text}'")));
                    }
                    _ => None,
                };
                self.bump();
                let kind = match value {
                    Some(value) => NodeKind::Constant { value },
                    None => NodeKind::Name { id: token.text },
                };
                Ok(self.node(kind, start))
            }
            TokenKind::Int | TokenKind::Float => {
                self.bump();
                let value = if token.kind == TokenKind::Int {
                    Constant::Int(token.text)
                } else {
                    Constant::Float(token.text)
                };
                Ok(self.node(NodeKind::Constant { value }, start))
            }
            TokenKind::Str => {
                let mut value = String::new();
                while self.peek().kind == TokenKind::Str {
                    value.push_str(&decode_string(&self.bump().text));
                }
                Ok(self.node(
                    NodeKind::Constant {
                        value: Constant::Str(value),
                    },
                    start,
                ))
            }
            TokenKind::Op if token.text == "(" => self.parenthesized(),
            TokenKind::Op if token.text == "[" => {
                self.bump();
                let elts = self.display_items("]")?;
                Ok(self.node(NodeKind::List { elts }, start))
            }
            TokenKind::Op if token.text == "{" => self.braced(),
            _ => Err(self.error(format!("expected an expression, found {}", self.describe()))),
        }
    }

    fn parenthesized(&mut self) -> Result<Node> {
        let start = self.start();
        self.expect_op("(")?;
        if self.at_op(")") {
            self.bump();
            return Ok(self.node(NodeKind::Tuple { elts: Vec::new() }, start));
        }
        let first = self.star_or_test()?;
        if self.at_op(")") {
            self.bump();
            return Ok(first);
        }
        self.expect_op(",")?;
        let mut elts = vec![first];
        elts.extend(self.display_items(")")?);
        Ok(self.node(NodeKind::Tuple { elts }, start))
    }

    /// Comma-separated items up to and including `close`.
    fn display_items(&mut self, close: &str) -> Result<Vec<Node>> {
        let mut items = Vec::new();
        while !self.at_op(close) {
            items.push(self.star_or_test()?);
            if !self.at_op(",") {
                break;
            }
            self.bump();
        }
        self.expect_op(close)?;
        Ok(items)
    }

    fn braced(&mut self) -> Result<Node> {
        let start = self.start();
        self.expect_op("{")?;
        if self.at_op("}") {
            self.bump();
            return Ok(self.node(
                NodeKind::Dict {
                    keys: Vec::new(),
                    values: Vec::new(),
                },
                start,
            ));
        }

        let first = self.star_or_test()?;
        if !self.at_op(":") {
            let mut elts = vec![first];
            if self.at_op(",") {
                self.bump();
                elts.extend(self.display_items("}")?);
            } else {
                self.expect_op("}")?;
            }
            return Ok(self.node(NodeKind::Set { elts }, start));
        }

        let mut keys = vec![first];
        let mut values = Vec::new();
        self.bump();
        values.push(self.test()?);
        while self.at_op(",") {
            self.bump();
            if self.at_op("}") {
                break;
            }
            keys.push(self.test()?);
            self.expect_op(":")?;
            values.push(self.test()?);
        }
        self.expect_op("}")?;
        Ok(self.node(NodeKind::Dict { keys, values }, start))
    }
}
