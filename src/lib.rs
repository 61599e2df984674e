//! sqlscope: position-aware structural analysis of SQL text
//!
//! This library turns raw SQL into a queryable structural model so that
//! editor tooling (completion, hover, go-to-definition) can answer "what
//! does the token at character offset N refer to?" without a database
//! connection or a grammar-complete parser. It tolerates syntactically
//! incomplete, actively-edited text: every stage produces its best effort
//! and records problems instead of failing.
//!
//! Three stages, consumed independently or together:
//! - [`lexer`] — text to tokens with exact offset and line/column ranges,
//!   useful on its own for syntax highlighting;
//! - [`tree`] — tokens to an immutable clause tree plus a structural
//!   error list;
//! - [`analyzer`] — read-only queries over a built tree: ancestor chains
//!   at an offset, relation and column resolution, identifier segments,
//!   batch classification.
//!
//! ```
//! use sqlscope::{Analyzer, RelationTarget};
//!
//! let tree = sqlscope::parse("WITH a AS (SELECT 1 AS x) SELECT * FROM a");
//! let analyzer = Analyzer::new(&tree);
//!
//! let relations = analyzer.find_used_relations();
//! assert_eq!(relations.len(), 1);
//! assert!(matches!(relations[0].target, RelationTarget::Cte(_)));
//!
//! let columns = analyzer.resolve_columns(&relations);
//! assert_eq!(columns.len(), 1);
//! assert_eq!(columns[0].alias.as_deref(), Some("x"));
//! ```

pub mod analyzer;
pub mod error;
pub mod lexer;
pub mod tree;

pub use analyzer::{
    ident_equal, Analyzer, BatchKind, BatchSummary, Column, IdentifierParts, Relation,
    RelationTarget,
};
pub use error::StructureError;
pub use lexer::{tokenize, Position, Token, TokenKind, Tokenizer, TokenizerOptions};
pub use tree::{build, AstNode, NodeTag, SyntaxTree, TokenSpan};

/// Tokenize and build in one step with default tokenizer options.
pub fn parse(sql: &str) -> SyntaxTree {
    parse_with(sql, &TokenizerOptions::default())
}

/// Tokenize and build in one step.
pub fn parse_with(sql: &str, options: &TokenizerOptions) -> SyntaxTree {
    let tokens = Tokenizer::new(options.clone()).tokenize(sql);
    tree::build(tokens)
}
