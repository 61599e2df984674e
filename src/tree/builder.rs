//! Tree construction: a per-invocation session and a breadth-first
//! worklist over the tag → rule table.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::StructureError;
use crate::lexer::Token;

use super::node::{AstNode, NodeTag, SyntaxTree, TokenSpan};
use super::rules;
use super::scan;

/// Build a tree from a token sequence.
///
/// Never fails: structural errors are collected on the returned
/// [`SyntaxTree`] and the tree is always the best partial structure the
/// input allows. Rebuilding from the same tokens yields an identical tree,
/// ids included — the id counter belongs to the build session.
pub fn build(tokens: Vec<Token>) -> SyntaxTree {
    let root_span = TokenSpan {
        start: 0,
        end: tokens.len(),
    };

    let mut session = Session::new(&tokens);
    let mut root = session.node(NodeTag::Batch, root_span);

    // Worklist of child-index paths from the root. Paths survive node
    // mutation (children are only ever appended by the node's own rule),
    // and re-walking from the root keeps the expansion free of unbounded
    // recursion per call frame.
    let mut queue: VecDeque<Vec<usize>> = VecDeque::new();
    queue.push_back(Vec::new());

    while let Some(path) = queue.pop_front() {
        let (tag, span) = {
            let node = node_at(&root, &path);
            (node.tag, node.span)
        };

        let Some(outcome) = rules::decompose(&mut session, tag, span) else {
            continue;
        };

        let node = node_at_mut(&mut root, &path);
        if let Some(retag) = outcome.retag {
            node.tag = retag;
        }
        node.children = Some(outcome.children);

        for (index, child) in node.children().iter().enumerate() {
            if rules::has_rule(child.tag) {
                let mut child_path = path.clone();
                child_path.push(index);
                queue.push_back(child_path);
            }
        }
    }

    debug!(
        nodes = session.next_id,
        errors = session.errors.len(),
        "built tree"
    );

    let errors = session.errors;
    SyntaxTree::new(tokens, root, errors)
}

fn node_at<'a>(root: &'a AstNode, path: &[usize]) -> &'a AstNode {
    path.iter().fold(root, |node, &index| {
        &node.children.as_ref().expect("path into undecomposed node")[index]
    })
}

fn node_at_mut<'a>(root: &'a mut AstNode, path: &[usize]) -> &'a mut AstNode {
    path.iter().fold(root, |node, &index| {
        &mut node.children.as_mut().expect("path into undecomposed node")[index]
    })
}

/// Mutable state of one build call: the token slice under construction,
/// the error sink, and the node id counter. Never shared across builds —
/// concurrent builds need independent sessions.
pub(crate) struct Session<'t> {
    tokens: &'t [Token],
    pub(crate) errors: Vec<StructureError>,
    next_id: u32,
}

impl<'t> Session<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            errors: Vec::new(),
            next_id: 0,
        }
    }

    /// Allocate a node with the next id. Ids increase monotonically in
    /// creation order, which the worklist keeps deterministic.
    pub(crate) fn node(&mut self, tag: NodeTag, span: TokenSpan) -> AstNode {
        self.next_id += 1;
        AstNode {
            id: self.next_id,
            tag,
            span,
            children: None,
        }
    }

    #[inline]
    pub(crate) fn token(&self, index: usize) -> &'t Token {
        &self.tokens[index]
    }

    pub(crate) fn error(&mut self, error: StructureError) {
        self.errors.push(error);
    }

    pub(crate) fn consume_until(
        &mut self,
        pos: &mut usize,
        end: usize,
        stops: &[&str],
    ) -> TokenSpan {
        scan::consume_until(self.tokens, pos, end, stops, &mut self.errors)
    }

    pub(crate) fn consume_until_backwards(
        &mut self,
        span: &mut TokenSpan,
        stops: &[&str],
    ) -> TokenSpan {
        scan::consume_until_backwards(self.tokens, span, stops, &mut self.errors)
    }
}
