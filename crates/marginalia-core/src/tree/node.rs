//! Node kinds of the syntax tree
//!
//! Every node exclusively owns its children, so a tree is a plain value:
//! no sharing, no cycles, and splicing is an ordinary `Vec::insert`.

use crate::span::Scope;
use crate::tree::trivia::{Comment, Directive};
use serde::Serialize;

/// A tree node: its kind (with owned children) and its source span, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

impl Node {
    pub fn new(kind: NodeKind, scope: Option<Scope>) -> Self {
        Self { kind, scope }
    }

    /// A node without a span, as built by hand or by a payload parser.
    pub fn bare(kind: NodeKind) -> Self {
        Self { kind, scope: None }
    }

    pub fn module(body: Vec<Node>) -> Self {
        Self::bare(NodeKind::Module { body })
    }

    pub fn comment(comment: Comment, scope: Scope) -> Self {
        Self::new(NodeKind::Comment(comment), Some(scope))
    }

    pub fn directive(directive: Directive, scope: Scope) -> Self {
        Self::new(NodeKind::Directive(directive), Some(scope))
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    // Statements
    Module {
        body: Vec<Node>,
    },
    FunctionDef {
        name: String,
        args: Box<Node>,
        body: Vec<Node>,
    },
    Return {
        value: Option<Box<Node>>,
    },
    Assign {
        targets: Vec<Node>,
        value: Box<Node>,
    },
    AugAssign {
        target: Box<Node>,
        op: BinaryOperator,
        value: Box<Node>,
    },
    For {
        target: Box<Node>,
        iter: Box<Node>,
        body: Vec<Node>,
        orelse: Vec<Node>,
    },
    While {
        test: Box<Node>,
        body: Vec<Node>,
        orelse: Vec<Node>,
    },
    If {
        test: Box<Node>,
        body: Vec<Node>,
        orelse: Vec<Node>,
    },
    Expr {
        value: Box<Node>,
    },
    Pass,
    Break,
    Continue,

    // Expressions
    BoolOp {
        op: BoolOperator,
        values: Vec<Node>,
    },
    BinOp {
        left: Box<Node>,
        op: BinaryOperator,
        right: Box<Node>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Node>,
    },
    Compare {
        left: Box<Node>,
        ops: Vec<CompareOperator>,
        comparators: Vec<Node>,
    },
    IfExp {
        test: Box<Node>,
        body: Box<Node>,
        orelse: Box<Node>,
    },
    Call {
        func: Box<Node>,
        args: Vec<Node>,
        keywords: Vec<Node>,
    },
    Attribute {
        value: Box<Node>,
        attr: String,
    },
    Subscript {
        value: Box<Node>,
        slice: Box<Node>,
    },
    Slice {
        lower: Option<Box<Node>>,
        upper: Option<Box<Node>>,
        step: Option<Box<Node>>,
    },
    Starred {
        value: Box<Node>,
    },
    Name {
        id: String,
    },
    Constant {
        value: Constant,
    },
    List {
        elts: Vec<Node>,
    },
    Tuple {
        elts: Vec<Node>,
    },
    Set {
        elts: Vec<Node>,
    },
    Dict {
        keys: Vec<Node>,
        values: Vec<Node>,
    },

    // Helpers
    Arguments {
        args: Vec<Node>,
        vararg: Option<Box<Node>>,
        kwonlyargs: Vec<Node>,
        kwarg: Option<Box<Node>>,
    },
    Arg {
        name: String,
        default: Option<Box<Node>>,
    },
    /// Call keyword argument; `arg == None` is `**value`.
    Keyword {
        arg: Option<String>,
        value: Box<Node>,
    },

    // Trivia
    Comment(Comment),
    Directive(Directive),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Module { .. } => "Module",
            NodeKind::FunctionDef { .. } => "FunctionDef",
            NodeKind::Return { .. } => "Return",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::AugAssign { .. } => "AugAssign",
            NodeKind::For { .. } => "For",
            NodeKind::While { .. } => "While",
            NodeKind::If { .. } => "If",
            NodeKind::Expr { .. } => "Expr",
            NodeKind::Pass => "Pass",
            NodeKind::Break => "Break",
            NodeKind::Continue => "Continue",
            NodeKind::BoolOp { .. } => "BoolOp",
            NodeKind::BinOp { .. } => "BinOp",
            NodeKind::UnaryOp { .. } => "UnaryOp",
            NodeKind::Compare { .. } => "Compare",
            NodeKind::IfExp { .. } => "IfExp",
            NodeKind::Call { .. } => "Call",
            NodeKind::Attribute { .. } => "Attribute",
            NodeKind::Subscript { .. } => "Subscript",
            NodeKind::Slice { .. } => "Slice",
            NodeKind::Starred { .. } => "Starred",
            NodeKind::Name { .. } => "Name",
            NodeKind::Constant { .. } => "Constant",
            NodeKind::List { .. } => "List",
            NodeKind::Tuple { .. } => "Tuple",
            NodeKind::Set { .. } => "Set",
            NodeKind::Dict { .. } => "Dict",
            NodeKind::Arguments { .. } => "Arguments",
            NodeKind::Arg { .. } => "Arg",
            NodeKind::Keyword { .. } => "Keyword",
            NodeKind::Comment(_) => "Comment",
            NodeKind::Directive(directive) => directive.family.name(),
        }
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self, NodeKind::Comment(_) | NodeKind::Directive(_))
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDef { .. }
                | NodeKind::Return { .. }
                | NodeKind::Assign { .. }
                | NodeKind::AugAssign { .. }
                | NodeKind::For { .. }
                | NodeKind::While { .. }
                | NodeKind::If { .. }
                | NodeKind::Expr { .. }
                | NodeKind::Pass
                | NodeKind::Break
                | NodeKind::Continue
        )
    }
}

/// Literal values. Numbers keep their source spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Constant {
    Int(String),
    Float(String),
    Str(String),
    True,
    False,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoolOperator {
    And,
    Or,
}

impl BoolOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BoolOperator::And => "and",
            BoolOperator::Or => "or",
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            BoolOperator::And => Precedence::And,
            BoolOperator::Or => Precedence::Or,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mult => "*",
            BinaryOperator::MatMult => "@",
            BinaryOperator::Div => "/",
            BinaryOperator::FloorDiv => "//",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "**",
            BinaryOperator::LShift => "<<",
            BinaryOperator::RShift => ">>",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::BitAnd => "&",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mult,
            "@" => BinaryOperator::MatMult,
            "/" => BinaryOperator::Div,
            "//" => BinaryOperator::FloorDiv,
            "%" => BinaryOperator::Mod,
            "**" => BinaryOperator::Pow,
            "<<" => BinaryOperator::LShift,
            ">>" => BinaryOperator::RShift,
            "|" => BinaryOperator::BitOr,
            "^" => BinaryOperator::BitXor,
            "&" => BinaryOperator::BitAnd,
            _ => return None,
        })
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            BinaryOperator::BitOr => Precedence::BitOr,
            BinaryOperator::BitXor => Precedence::BitXor,
            BinaryOperator::BitAnd => Precedence::BitAnd,
            BinaryOperator::LShift | BinaryOperator::RShift => Precedence::Shift,
            BinaryOperator::Add | BinaryOperator::Sub => Precedence::Arith,
            BinaryOperator::Mult
            | BinaryOperator::MatMult
            | BinaryOperator::Div
            | BinaryOperator::FloorDiv
            | BinaryOperator::Mod => Precedence::Term,
            BinaryOperator::Pow => Precedence::Power,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    Not,
    Invert,
    UAdd,
    USub,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "not ",
            UnaryOperator::Invert => "~",
            UnaryOperator::UAdd => "+",
            UnaryOperator::USub => "-",
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            UnaryOperator::Not => Precedence::Not,
            _ => Precedence::Factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CompareOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOperator::Eq => "==",
            CompareOperator::NotEq => "!=",
            CompareOperator::Lt => "<",
            CompareOperator::LtE => "<=",
            CompareOperator::Gt => ">",
            CompareOperator::GtE => ">=",
            CompareOperator::Is => "is",
            CompareOperator::IsNot => "is not",
            CompareOperator::In => "in",
            CompareOperator::NotIn => "not in",
        }
    }
}

/// Binding strength of expressions, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Tuple,
    Test,
    Or,
    And,
    Not,
    Compare,
    BitOr,
    BitXor,
    BitAnd,
    Shift,
    Arith,
    Term,
    Factor,
    Power,
    Await,
    Atom,
}

impl Precedence {
    /// The next stronger level.
    pub fn next(self) -> Self {
        match self {
            Precedence::Tuple => Precedence::Test,
            Precedence::Test => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Not,
            Precedence::Not => Precedence::Compare,
            Precedence::Compare => Precedence::BitOr,
            Precedence::BitOr => Precedence::BitXor,
            Precedence::BitXor => Precedence::BitAnd,
            Precedence::BitAnd => Precedence::Shift,
            Precedence::Shift => Precedence::Arith,
            Precedence::Arith => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Power,
            Precedence::Power => Precedence::Await,
            Precedence::Await | Precedence::Atom => Precedence::Atom,
        }
    }
}
