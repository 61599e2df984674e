//! Read-only semantic queries over a built tree.
//!
//! Every query is a pure function of the tree and its arguments: nothing
//! here mutates the tree, results are recomputed per call and never cached
//! in it, and absence is an explicit `None` or an empty collection. The
//! analyzer holds only a shared reference, so any number of them may query
//! the same tree concurrently.

mod batch;
mod columns;
mod ident;
mod relations;

pub use batch::{BatchKind, BatchSummary};
pub use columns::Column;
pub use ident::ident_equal;
pub use relations::{Relation, RelationTarget};

use crate::lexer::TokenKind;
use crate::tree::{AstNode, NodeTag, SyntaxTree};

/// A dotted identifier under a caret offset.
#[derive(Debug, Clone)]
pub struct IdentifierParts<'t> {
    /// The identifier's segments, dots excluded.
    pub parts: Vec<String>,
    /// Index of the segment whose token span contains the offset; `None`
    /// when the offset sits on a dot or in a gap.
    pub part_index: Option<usize>,
    /// The identifier or name node itself.
    pub node: &'t AstNode,
}

/// Position-aware queries over one [`SyntaxTree`].
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'t> {
    tree: &'t SyntaxTree,
}

impl<'t> Analyzer<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self { tree }
    }

    /// The tree under analysis.
    #[inline]
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub(crate) fn node_contains(&self, node: &AstNode, offset: usize) -> bool {
        self.tree
            .char_span(node)
            .is_some_and(|(start, end)| offset >= start && offset < end)
    }

    /// Every node whose span contains `offset`, innermost first, the root
    /// last. Empty when the offset falls outside all token spans.
    pub fn ancestor_chain_at(&self, offset: usize) -> Vec<&'t AstNode> {
        let mut chain: Vec<&'t AstNode> = Vec::new();
        let mut current = self.tree.root();
        if !self.node_contains(current, offset) {
            return chain;
        }
        loop {
            chain.push(current);
            // Sibling spans are disjoint, so at most one child matches.
            match current
                .children()
                .iter()
                .find(|child| self.node_contains(child, offset))
            {
                Some(child) => current = child,
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Root-to-node path to the node with the given id. Nodes carry no
    /// parent pointer, so enclosing-scope lookups re-walk the tree; this
    /// trades an O(size) search per call for tree immutability.
    pub fn ancestor_path_to(&self, node_id: u32) -> Option<Vec<&'t AstNode>> {
        fn walk<'t>(node: &'t AstNode, id: u32, path: &mut Vec<&'t AstNode>) -> bool {
            path.push(node);
            if node.id == id {
                return true;
            }
            for child in node.children() {
                if walk(child, id, path) {
                    return true;
                }
            }
            path.pop();
            false
        }

        let mut path = Vec::new();
        walk(self.tree.root(), node_id, &mut path).then_some(path)
    }

    /// The dotted identifier at `offset`, when the innermost node there is
    /// an identifier or name.
    pub fn identifier_at(&self, offset: usize) -> Option<IdentifierParts<'t>> {
        let chain = self.ancestor_chain_at(offset);
        let node = *chain.first()?;
        if !matches!(node.tag, NodeTag::Identifier | NodeTag::Name) {
            return None;
        }

        let mut parts = Vec::new();
        let mut part_index = None;
        for token in self.tree.node_tokens(node) {
            if token.kind != TokenKind::Word {
                continue;
            }
            if token.position.contains(offset) {
                part_index = Some(parts.len());
            }
            parts.push(token.text.clone());
        }

        Some(IdentifierParts {
            parts,
            part_index,
            node,
        })
    }
}
