//! Batch classification over top-level statements.

use crate::lexer::TokenKind;
use crate::tree::{AstNode, NodeTag};

use super::Analyzer;

/// Overall kind of a statement batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Select,
    Dml,
    Ddl,
    Transaction,
    Mixed,
    Unknown,
}

/// Result of classifying a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// More than one top-level statement.
    pub is_batch: bool,
    pub kind: BatchKind,
}

const DDL_KEYWORDS: &[&str] = &["CREATE", "ALTER", "DROP", "TRUNCATE"];
const TRANSACTION_KEYWORDS: &[&str] = &[
    "BEGIN",
    "START",
    "COMMIT",
    "ROLLBACK",
    "SAVEPOINT",
    "RELEASE",
    "END",
];

impl<'t> Analyzer<'t> {
    /// Fold the top-level statements into a batch summary.
    ///
    /// MIXED is set once two different classified, non-transaction kinds
    /// appear. Transaction markers are transparent: `BEGIN; INSERT …;
    /// COMMIT;` is a DML batch, and only an all-transaction batch is
    /// TRANSACTION. Statements the grammar cannot classify are likewise
    /// transparent, so a half-typed statement does not flip the kind.
    pub fn classify_batch(&self) -> BatchSummary {
        let statements: Vec<&AstNode> = self
            .tree()
            .root()
            .children_tagged(NodeTag::Statement)
            .collect();

        let mut kind: Option<BatchKind> = None;
        let mut saw_transaction = false;

        for statement in &statements {
            match self.classify_statement(statement) {
                BatchKind::Transaction => saw_transaction = true,
                BatchKind::Unknown => {}
                classified => {
                    kind = Some(match kind {
                        None => classified,
                        Some(existing) if existing == classified => existing,
                        Some(_) => BatchKind::Mixed,
                    });
                }
            }
        }

        let kind = kind.unwrap_or(if saw_transaction {
            BatchKind::Transaction
        } else {
            BatchKind::Unknown
        });

        BatchSummary {
            is_batch: statements.len() > 1,
            kind,
        }
    }

    /// Kind of one statement: DML or SELECT from its clause children,
    /// else DDL/transaction from its leading keyword.
    fn classify_statement(&self, statement: &AstNode) -> BatchKind {
        let children = statement.children();
        if children
            .iter()
            .any(|c| matches!(c.tag, NodeTag::Insert | NodeTag::Update | NodeTag::Delete))
        {
            return BatchKind::Dml;
        }
        if children.iter().any(|c| c.tag.is_select()) {
            return BatchKind::Select;
        }

        let first = self
            .tree()
            .node_tokens(statement)
            .iter()
            .find(|token| token.kind != TokenKind::Comment);
        let Some(token) = first else {
            return BatchKind::Unknown;
        };
        if DDL_KEYWORDS.iter().any(|k| token.matches(k)) {
            return BatchKind::Ddl;
        }
        if TRANSACTION_KEYWORDS.iter().any(|k| token.matches(k)) {
            return BatchKind::Transaction;
        }
        BatchKind::Unknown
    }
}
