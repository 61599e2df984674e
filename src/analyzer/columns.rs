//! Column projection: what a relation exposes.

use crate::lexer::TokenKind;
use crate::tree::{AstNode, NodeTag};

use super::relations::{Relation, RelationTarget};
use super::Analyzer;

/// One projected column, back-linked to the relation it came from when it
/// was produced by [`Analyzer::resolve_columns`].
#[derive(Debug, Clone)]
pub struct Column<'a> {
    /// Output name: the explicit alias, an explicit field-list name, or
    /// the implicit one (the right-most identifier of the expression).
    pub alias: Option<String>,
    pub relation: Option<&'a Relation<'a>>,
    /// The column, field, or expression node the alias came from.
    pub node: &'a AstNode,
}

impl<'t> Analyzer<'t> {
    /// Columns projected by each given relation, in relation order.
    ///
    /// An explicit field list on the source wins; otherwise a derived
    /// table projects its nested SELECT's column aliases, and a CTE
    /// projects its own field list or, one level deep, the aliases of its
    /// defining SELECT. Plain tables project nothing — the tree has no
    /// catalog to ask.
    pub fn resolve_columns<'a>(&self, relations: &'a [Relation<'a>]) -> Vec<Column<'a>>
    where
        't: 'a,
    {
        let mut out = Vec::new();
        for relation in relations {
            self.relation_columns(relation, &mut out);
        }
        out
    }

    fn relation_columns<'a>(&self, relation: &'a Relation<'a>, out: &mut Vec<Column<'a>>)
    where
        't: 'a,
    {
        if let Some(fields) = relation.source.find_child(NodeTag::Fields) {
            self.field_columns(fields, relation, out);
            return;
        }

        match relation.target {
            RelationTarget::Derived(statement) => {
                self.select_columns(statement, Some(relation), out);
            }
            RelationTarget::Cte(cte) => {
                if let Some(fields) = cte.find_child(NodeTag::Fields) {
                    self.field_columns(fields, relation, out);
                } else if let Some(statement) = cte.find_child(NodeTag::Statement) {
                    self.select_columns(statement, Some(relation), out);
                }
            }
            RelationTarget::Table | RelationTarget::Function(_) => {}
        }
    }

    fn field_columns<'a>(
        &self,
        fields: &'a AstNode,
        relation: &'a Relation<'a>,
        out: &mut Vec<Column<'a>>,
    ) where
        't: 'a,
    {
        for field in fields.children_tagged(NodeTag::Field) {
            let alias = field
                .find_child(NodeTag::Name)
                .and_then(|name| self.tree().node_tokens(name).first())
                .map(|token| token.text.clone());
            out.push(Column {
                alias,
                relation: Some(relation),
                node: field,
            });
        }
    }

    fn select_columns<'a>(
        &self,
        statement: &'a AstNode,
        relation: Option<&'a Relation<'a>>,
        out: &mut Vec<Column<'a>>,
    ) where
        't: 'a,
    {
        let Some(select) = statement.children().iter().find(|c| c.tag.is_select()) else {
            return;
        };
        for column in select.children_tagged(NodeTag::Column) {
            out.push(Column {
                alias: self.column_alias(column),
                relation,
                node: column,
            });
        }
    }

    /// A column's output name: its explicit alias when the builder peeled
    /// one, else the right-most identifier token anywhere in the
    /// expression — the implicit-output-name rule common engines use.
    pub fn column_alias(&self, column: &AstNode) -> Option<String> {
        if let Some(name) = column.find_child(NodeTag::Name) {
            if let Some(token) = self.tree().node_tokens(name).first() {
                return Some(token.text.clone());
            }
        }
        self.tree()
            .node_tokens(column)
            .iter()
            .rev()
            .find(|token| token.kind == TokenKind::Word)
            .map(|token| token.text.clone())
    }

    /// Columns of the SELECT of the nearest statement enclosing `offset`.
    pub fn owner_statement_columns(&self, offset: usize) -> Vec<Column<'t>> {
        let mut out = Vec::new();
        for node in self.ancestor_chain_at(offset) {
            if node.tag.is_statement_scope() {
                self.select_columns(node, None, &mut out);
                break;
            }
        }
        out
    }
}
