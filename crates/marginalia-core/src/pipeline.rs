//! Parse-with-trivia pipeline
//!
//! Every token is classified, anchored and located against the plain tree
//! first. Insertions then run from the last tree position to the first, so
//! no insertion shifts a slot still pending, and tokens sharing a slot run
//! in reverse source order to end up in source order.

use crate::anchor::AnchorResolver;
use crate::classify::TriviaClassifier;
use crate::config::MarginaliaConfig;
use crate::diagnostics::{DiagnosticSink, SpliceEvent, TracingSink};
use crate::result::Result;
use crate::scope::ScopeResolver;
use crate::span::Scope;
use crate::splice::{InsertionPoint, TreeSplicer};
use crate::syntax::{SpanRetention, TriviaToken, parse_module, trivia_tokens};
use crate::tree::{FlatTree, Node, NodeKind, Trivia};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    classifier: TriviaClassifier,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(classifier: TriviaClassifier) -> Self {
        Self { classifier }
    }

    pub fn from_config(config: &MarginaliaConfig) -> Self {
        let classifier = config
            .classifier
            .as_ref()
            .map(TriviaClassifier::from_config)
            .unwrap_or_default();
        Self { classifier }
    }

    /// Parse `source` and splice its comments back into the tree.
    pub fn parse(&self, source: &str) -> Result<Node> {
        let tree = parse_module(source, SpanRetention::Native)?;
        let tokens = trivia_tokens(source)?;
        self.insert_trivia(source, tree, &tokens, &mut TracingSink)
    }

    /// Splice `tokens` into `tree`, a plain parse of `source`.
    ///
    /// Either every token is inserted or an error is returned and the tree
    /// is dropped.
    pub fn insert_trivia(
        &self,
        source: &str,
        mut tree: Node,
        tokens: &[TriviaToken],
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Node> {
        if tokens.is_empty() {
            return Ok(tree);
        }

        let mut planned = self.plan(source, &tree, tokens, sink)?;
        planned.sort_by(|a, b| {
            a.key
                .cmp(&b.key)
                .then_with(|| a.scope.start.cmp(&b.scope.start))
        });
        settle_header_comments(&mut planned);

        for insertion in planned.into_iter().rev() {
            let kind = insertion.node.kind_name();
            let end_of_line = matches!(
                &insertion.node.kind,
                NodeKind::Comment(comment) if comment.end_of_line
            );
            TreeSplicer::insert_at(&mut tree, &insertion.point, insertion.node)?;
            sink.record(SpliceEvent::Inserted {
                scope: insertion.scope,
                kind,
                end_of_line,
            });
        }

        debug!(tokens = tokens.len(), "Spliced trivia");
        Ok(tree)
    }

    fn plan(
        &self,
        source: &str,
        tree: &Node,
        tokens: &[TriviaToken],
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Vec<PlannedInsertion>> {
        let flat = FlatTree::new(tree);
        let scopes = ScopeResolver::new(source).resolve(&flat)?;
        let resolver = AnchorResolver::new(&flat, &scopes);

        tokens
            .iter()
            .map(|token| {
                let trivia = self.classifier.classify(&token.text)?;
                sink.record(SpliceEvent::Classified {
                    scope: token.scope,
                    kind: trivia.kind_name(),
                });

                let anchor = resolver.resolve(token.scope)?;
                let point = TreeSplicer::locate(&anchor.path, anchor.before)?;
                let key = TreeSplicer::slot_key(tree, &point)?;
                sink.record(SpliceEvent::Anchored {
                    scope: token.scope,
                    owner: flat.get(point.owner).map_or("?", |entry| entry.node.kind_name()),
                    field: point.field.name,
                    index: point.index,
                });

                let mut after_header = false;
                let node = match trivia {
                    Trivia::Comment(mut comment) => {
                        let position =
                            line_position(source, &flat, &scopes, &point, token.scope);
                        comment.end_of_line = position != LinePosition::OwnLine;
                        after_header = position == LinePosition::AfterHeader;
                        Node::comment(comment, token.scope)
                    }
                    Trivia::Directive(directive) => Node::directive(directive, token.scope),
                };
                Ok(PlannedInsertion {
                    key,
                    point,
                    node,
                    scope: token.scope,
                    after_header,
                })
            })
            .collect()
    }
}

struct PlannedInsertion {
    key: Vec<(usize, usize)>,
    point: InsertionPoint,
    node: Node,
    scope: Scope,
    after_header: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinePosition {
    OwnLine,
    /// After the sibling that precedes the slot.
    AfterSibling,
    /// After a block header such as `else:`, with no sibling on the line.
    AfterHeader,
}

/// Header comments can only be rendered on the header line when nothing
/// that needs a line of its own comes before them in the slot. Leading
/// end-of-line comments of an `orelse` are written before the `else:`
/// header, so they do not count.
fn settle_header_comments(planned: &mut [PlannedInsertion]) {
    for i in 0..planned.len() {
        if !planned[i].after_header {
            continue;
        }
        let hoisted = planned[i].point.field.name == "orelse";
        let blocked = planned[..i]
            .iter()
            .rev()
            .take_while(|other| other.key == planned[i].key)
            .any(|other| !hoisted || !is_end_of_line_comment(&other.node));
        if blocked && let NodeKind::Comment(comment) = &mut planned[i].node.kind {
            comment.end_of_line = false;
        }
    }
}

fn is_end_of_line_comment(node: &Node) -> bool {
    matches!(&node.kind, NodeKind::Comment(comment) if comment.end_of_line)
}

/// Where a comment sits relative to the code on its line.
///
/// A comment follows its sibling when the nearest child of the slot's
/// owner ending before the token ends on the token's line. It follows a
/// header when it opens a block and the code before it on its line ends
/// with `:`. Either way no child starting after the token may start on
/// that line too.
fn line_position(
    source: &str,
    flat: &FlatTree<'_>,
    scopes: &[Option<Scope>],
    point: &InsertionPoint,
    target: Scope,
) -> LinePosition {
    let line = target.start.line;
    let siblings: Vec<Scope> = flat
        .nodes()
        .iter()
        .filter(|entry| entry.parent == Some(point.owner))
        .filter_map(|entry| scopes.get(entry.id).copied().flatten())
        .collect();

    let preceding = siblings
        .iter()
        .filter(|scope| scope.ends_before(&target))
        .max_by_key(|scope| scope.end);
    let following = siblings
        .iter()
        .filter(|scope| scope.starts_after(&target))
        .min_by_key(|scope| scope.start);

    if following.is_some_and(|scope| scope.start.line == line) {
        LinePosition::OwnLine
    } else if preceding.is_some_and(|scope| scope.end.line == line) {
        LinePosition::AfterSibling
    } else if opens_block(flat, point) && follows_header(source, target) {
        LinePosition::AfterHeader
    } else {
        LinePosition::OwnLine
    }
}

/// Whether the slot is the first one of a statement block.
fn opens_block(flat: &FlatTree<'_>, point: &InsertionPoint) -> bool {
    let compound = flat.get(point.owner).is_some_and(|entry| {
        matches!(
            entry.node.kind,
            NodeKind::If { .. }
                | NodeKind::While { .. }
                | NodeKind::For { .. }
                | NodeKind::FunctionDef { .. }
        )
    });
    compound && point.index == 0 && matches!(point.field.name, "body" | "orelse")
}

fn follows_header(source: &str, target: Scope) -> bool {
    source
        .lines()
        .nth(target.start.line.saturating_sub(1))
        .and_then(|text| text.get(..target.start.column))
        .is_some_and(|prefix| prefix.trim_end().ends_with(':'))
}

/// Parse `source` with its comments and directives spliced in.
pub fn parse(source: &str) -> Result<Node> {
    Pipeline::new().parse(source)
}
