//! Relation resolution: what a FROM source refers to.

use crate::lexer::TokenKind;
use crate::tree::{AstNode, NodeTag};

use super::ident::ident_equal;
use super::Analyzer;

/// What a source resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelationTarget<'t> {
    /// A plain table (or anything the tree cannot see a definition for).
    Table,
    /// A common table expression; carries its definition node.
    Cte(&'t AstNode),
    /// A derived table; carries the nested statement node.
    Derived(&'t AstNode),
    /// A table function; carries its argument-list node.
    Function(&'t AstNode),
}

/// One resolved FROM-clause source. Recomputed per query, never stored in
/// the tree.
#[derive(Debug, Clone)]
pub struct Relation<'t> {
    /// Qualified name segments, empty for an anonymous derived table.
    pub parts: Vec<String>,
    /// Explicit alias, or the last name segment when none was written.
    pub alias: Option<String>,
    /// The owning SOURCE node.
    pub source: &'t AstNode,
    pub target: RelationTarget<'t>,
}

impl<'t> Analyzer<'t> {
    /// Resolve one SOURCE node.
    ///
    /// Classification priority: a nested statement makes a derived table;
    /// a single unqualified name matching a CTE visible in an enclosing
    /// statement's WITH clause makes a CTE reference; an identifier chain
    /// followed by an argument list makes a table function; anything else
    /// with a name is a plain relation.
    pub fn resolve_relation(&self, source: &'t AstNode) -> Option<Relation<'t>> {
        if source.tag != NodeTag::Source {
            return None;
        }

        let statement = source.find_child(NodeTag::Statement);
        let identifier = source.find_child(NodeTag::Identifier);
        let arguments = source.find_child(NodeTag::Values);

        let explicit_alias = source
            .find_child(NodeTag::Name)
            .and_then(|name| self.tree().node_tokens(name).first())
            .map(|token| token.text.clone());

        let parts: Vec<String> = identifier
            .map(|node| {
                self.tree()
                    .node_tokens(node)
                    .iter()
                    .filter(|token| token.kind == TokenKind::Word)
                    .map(|token| token.text.clone())
                    .collect()
            })
            .unwrap_or_default();

        let alias = explicit_alias.or_else(|| parts.last().cloned());

        if let Some(statement) = statement {
            return Some(Relation {
                parts,
                alias,
                source,
                target: RelationTarget::Derived(statement),
            });
        }

        if parts.len() == 1 {
            if let Some(cte) = self.visible_cte(source, &parts[0]) {
                return Some(Relation {
                    parts,
                    alias,
                    source,
                    target: RelationTarget::Cte(cte),
                });
            }
        }

        if identifier.is_some() {
            let target = match arguments {
                Some(arguments) => RelationTarget::Function(arguments),
                None => RelationTarget::Table,
            };
            return Some(Relation {
                parts,
                alias,
                source,
                target,
            });
        }

        None
    }

    /// Find the CTE definition a name refers to from a given source,
    /// scanning enclosing statement scopes innermost first so the nearest
    /// WITH binding shadows outer ones.
    fn visible_cte(&self, source: &AstNode, name: &str) -> Option<&'t AstNode> {
        let path = self.ancestor_path_to(source.id)?;
        for scope in path.iter().rev() {
            if !scope.tag.is_statement_scope() {
                continue;
            }
            let Some(with) = scope.find_child(NodeTag::With) else {
                continue;
            };
            for cte in with.children().iter().filter(|c| c.tag.is_cte()) {
                let Some(cte_name) = cte.find_child(NodeTag::Name) else {
                    continue;
                };
                let Some(token) = self.tree().node_tokens(cte_name).first() else {
                    continue;
                };
                if ident_equal(&token.text, name) {
                    return Some(cte);
                }
            }
        }
        None
    }

    /// Every relation used anywhere in the tree, in document order.
    pub fn find_used_relations(&self) -> Vec<Relation<'t>> {
        let mut out = Vec::new();
        self.collect_relations(self.tree().root(), &mut out);
        out
    }

    fn collect_relations(&self, node: &'t AstNode, out: &mut Vec<Relation<'t>>) {
        if node.tag.is_statement_scope() {
            if let Some(from) = node.find_child(NodeTag::From) {
                for source in from.children_tagged(NodeTag::Source) {
                    if let Some(relation) = self.resolve_relation(source) {
                        out.push(relation);
                    }
                }
            }
        }
        for child in node.children() {
            self.collect_relations(child, out);
        }
    }

    /// Relations lexically visible at `offset`: those of the FROM clauses
    /// of statements on the ancestor chain, innermost scope first.
    pub fn find_relations_at(&self, offset: usize) -> Vec<Relation<'t>> {
        let mut out = Vec::new();
        for node in self.ancestor_chain_at(offset) {
            if !node.tag.is_statement_scope() {
                continue;
            }
            let Some(from) = node.find_child(NodeTag::From) else {
                continue;
            };
            for source in from.children_tagged(NodeTag::Source) {
                if let Some(relation) = self.resolve_relation(source) {
                    out.push(relation);
                }
            }
        }
        out
    }
}
