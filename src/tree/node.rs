//! Node and tree types produced by the builder.

use crate::error::StructureError;
use crate::lexer::Token;

/// A half-open range of token indices into a build's token sequence.
///
/// Every construct the builder recognizes covers a contiguous run of the
/// original tokens, so an index range carries the same information as an
/// owned token list without cloning anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Structural classification of a node.
///
/// `Word` tokens are classified into clauses here, not in the lexer.
/// `Values` doubles as the argument-list tag: a parenthesized list after
/// an identifier chain (function call) carries the same shape as a VALUES
/// list, and the analyzer tells them apart by context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Batch,
    Statement,
    With,
    Cte,
    CteRecursive,
    Select,
    SelectDistinct,
    Insert,
    Values,
    Delete,
    Update,
    Set,
    From,
    Where,
    GroupBy,
    OrderBy,
    Having,
    Limit,
    Offset,
    Union,
    UnionAll,
    Except,
    Intersect,
    Column,
    Source,
    JoinType,
    Fields,
    Field,
    Name,
    Type,
    Expression,
    Identifier,
    Operator,
    Literal,
    Case,
    When,
    Array,
    Unknown,
}

impl NodeTag {
    /// Whether nodes of this tag open a statement scope: a plain statement
    /// or a set-operation arm, both of which may carry their own FROM and
    /// WITH clauses.
    pub fn is_statement_scope(self) -> bool {
        matches!(
            self,
            NodeTag::Statement
                | NodeTag::Union
                | NodeTag::UnionAll
                | NodeTag::Except
                | NodeTag::Intersect
        )
    }

    /// Whether this tag is a SELECT clause variant.
    pub fn is_select(self) -> bool {
        matches!(self, NodeTag::Select | NodeTag::SelectDistinct)
    }

    /// Whether this tag is a CTE definition variant.
    pub fn is_cte(self) -> bool {
        matches!(self, NodeTag::Cte | NodeTag::CteRecursive)
    }
}

/// One node of a built tree.
///
/// `id` increases monotonically within a build and is used for identity
/// comparison when locating a node inside its tree; it says nothing about
/// structure. `children: None` means the node was never decomposed (a
/// leaf), while `Some(vec![])` means its rule decomposed it into nothing.
/// Nodes never reference their parent; ancestor lookups re-walk the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub id: u32,
    pub tag: NodeTag,
    pub span: TokenSpan,
    pub children: Option<Vec<AstNode>>,
}

impl AstNode {
    /// Child nodes, empty for leaves.
    #[inline]
    pub fn children(&self) -> &[AstNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// First child with the given tag.
    pub fn find_child(&self, tag: NodeTag) -> Option<&AstNode> {
        self.children().iter().find(|c| c.tag == tag)
    }

    /// All children with the given tag, in order.
    pub fn children_tagged(&self, tag: NodeTag) -> impl Iterator<Item = &AstNode> {
        self.children().iter().filter(move |c| c.tag == tag)
    }
}

/// The immutable product of one build: the token sequence, the node tree
/// over it, and the structural errors collected along the way.
///
/// Once constructed a tree never changes, so it can be shared freely
/// across threads for concurrent read-only analysis. Any edit to the
/// source requires a full rebuild from the new text.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    tokens: Vec<Token>,
    root: AstNode,
    errors: Vec<StructureError>,
}

impl SyntaxTree {
    pub(crate) fn new(tokens: Vec<Token>, root: AstNode, errors: Vec<StructureError>) -> Self {
        Self {
            tokens,
            root,
            errors,
        }
    }

    /// The root node, tagged [`NodeTag::Batch`].
    #[inline]
    pub fn root(&self) -> &AstNode {
        &self.root
    }

    /// The full token sequence the tree was built from.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Structural errors recorded during the build. A non-empty list does
    /// not invalidate the tree; it marks degraded regions.
    #[inline]
    pub fn errors(&self) -> &[StructureError] {
        &self.errors
    }

    /// The tokens covered by a node's span.
    #[inline]
    pub fn node_tokens(&self, node: &AstNode) -> &[Token] {
        &self.tokens[node.span.start..node.span.end]
    }

    /// The character-offset range a node occupies in the source, `None`
    /// for nodes with an empty span.
    pub fn char_span(&self, node: &AstNode) -> Option<(usize, usize)> {
        let tokens = self.node_tokens(node);
        let first = tokens.first()?;
        let last = tokens.last()?;
        Some((first.position.start_offset, last.position.end_offset))
    }

    /// Source text of a node, reconstructed by joining its token texts
    /// with single spaces (original whitespace is not retained).
    pub fn node_text(&self, node: &AstNode) -> String {
        self.node_tokens(node)
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
