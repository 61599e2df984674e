//! Per-tag decomposition rules.
//!
//! Each rule turns one node's token span into its immediate children; the
//! builder's worklist applies rules level by level until no child has a
//! rule left. Rules never fail — malformed input records a
//! [`StructureError`] and produces whatever partial structure the tokens
//! support.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::trace;

use crate::error::StructureError;
use crate::lexer::{Token, TokenKind};

use super::builder::Session;
use super::node::{AstNode, NodeTag, TokenSpan};

/// Keywords that separate FROM-clause sources. Each source keeps its own
/// leading join keywords inside its span.
const JOIN_SEPARATORS: &[&str] = &[
    "JOIN", "LEFT", "RIGHT", "FULL", "INNER", "OUTER", "CROSS", "NATURAL", "LATERAL", ",",
];

struct ClauseSpec {
    keyword: &'static str,
    tag: NodeTag,
    /// Secondary keyword that must follow (`GROUP BY`, `ORDER BY`).
    required: Option<&'static str>,
    /// Secondary keyword that may follow, switching the tag
    /// (`SELECT DISTINCT`, `UNION ALL`).
    optional: Option<(&'static str, NodeTag)>,
    /// Keywords that may legally follow the clause; the clause consumes
    /// until the first of these at depth zero.
    stops: &'static [&'static str],
}

const SET_OP_STOPS: &[&str] = &[
    "UNION",
    "EXCEPT",
    "INTERSECT",
    "ORDER",
    "LIMIT",
    "OFFSET",
    ";",
];

static CLAUSES: Lazy<HashMap<&'static str, ClauseSpec>> = Lazy::new(|| {
    let specs = [
        ClauseSpec {
            keyword: "WITH",
            tag: NodeTag::With,
            required: None,
            optional: None,
            stops: &["SELECT", "INSERT", "DELETE", "UPDATE", ";"],
        },
        ClauseSpec {
            keyword: "SELECT",
            tag: NodeTag::Select,
            required: None,
            optional: Some(("DISTINCT", NodeTag::SelectDistinct)),
            stops: &["FROM", "UNION", "EXCEPT", "INTERSECT", "ORDER", ";"],
        },
        ClauseSpec {
            keyword: "INSERT",
            tag: NodeTag::Insert,
            required: None,
            optional: None,
            stops: &["VALUES", "SELECT", ";"],
        },
        ClauseSpec {
            keyword: "VALUES",
            tag: NodeTag::Values,
            required: None,
            optional: None,
            stops: &[";"],
        },
        ClauseSpec {
            keyword: "DELETE",
            tag: NodeTag::Delete,
            required: None,
            optional: None,
            stops: &["FROM", ";"],
        },
        ClauseSpec {
            keyword: "UPDATE",
            tag: NodeTag::Update,
            required: None,
            optional: None,
            stops: &["SET", ";"],
        },
        ClauseSpec {
            keyword: "SET",
            tag: NodeTag::Set,
            required: None,
            optional: None,
            stops: &["WHERE", "FROM", ";"],
        },
        ClauseSpec {
            keyword: "FROM",
            tag: NodeTag::From,
            required: None,
            optional: None,
            stops: &[
                "WHERE",
                "GROUP",
                "ORDER",
                "HAVING",
                "LIMIT",
                "OFFSET",
                "UNION",
                "EXCEPT",
                "INTERSECT",
                ";",
            ],
        },
        ClauseSpec {
            keyword: "WHERE",
            tag: NodeTag::Where,
            required: None,
            optional: None,
            stops: &[
                "GROUP",
                "ORDER",
                "HAVING",
                "LIMIT",
                "OFFSET",
                "UNION",
                "EXCEPT",
                "INTERSECT",
                ";",
            ],
        },
        ClauseSpec {
            keyword: "HAVING",
            tag: NodeTag::Having,
            required: None,
            optional: None,
            stops: &[
                "GROUP",
                "ORDER",
                "LIMIT",
                "OFFSET",
                "UNION",
                "EXCEPT",
                "INTERSECT",
                ";",
            ],
        },
        ClauseSpec {
            keyword: "GROUP",
            tag: NodeTag::GroupBy,
            required: Some("BY"),
            optional: None,
            stops: &[
                "ORDER",
                "HAVING",
                "LIMIT",
                "OFFSET",
                "UNION",
                "EXCEPT",
                "INTERSECT",
                ";",
            ],
        },
        ClauseSpec {
            keyword: "ORDER",
            tag: NodeTag::OrderBy,
            required: Some("BY"),
            optional: None,
            stops: &["LIMIT", "OFFSET", ";"],
        },
        ClauseSpec {
            keyword: "LIMIT",
            tag: NodeTag::Limit,
            required: None,
            optional: None,
            stops: &["OFFSET", ";"],
        },
        ClauseSpec {
            keyword: "OFFSET",
            tag: NodeTag::Offset,
            required: None,
            optional: None,
            stops: &[";"],
        },
        ClauseSpec {
            keyword: "UNION",
            tag: NodeTag::Union,
            required: None,
            optional: Some(("ALL", NodeTag::UnionAll)),
            stops: SET_OP_STOPS,
        },
        ClauseSpec {
            keyword: "EXCEPT",
            tag: NodeTag::Except,
            required: None,
            optional: None,
            stops: SET_OP_STOPS,
        },
        ClauseSpec {
            keyword: "INTERSECT",
            tag: NodeTag::Intersect,
            required: None,
            optional: None,
            stops: SET_OP_STOPS,
        },
    ];
    specs.into_iter().map(|spec| (spec.keyword, spec)).collect()
});

/// Result of applying one rule. `retag` is set when the rule reclassifies
/// its own node (an expression that turns out to be a value list).
pub(crate) struct Decomposition {
    pub(crate) retag: Option<NodeTag>,
    pub(crate) children: Vec<AstNode>,
}

impl Decomposition {
    fn of(children: Vec<AstNode>) -> Self {
        Self {
            retag: None,
            children,
        }
    }
}

/// Whether nodes with this tag have a registered decomposition rule.
pub(crate) fn has_rule(tag: NodeTag) -> bool {
    matches!(
        tag,
        NodeTag::Batch
            | NodeTag::Statement
            | NodeTag::Union
            | NodeTag::UnionAll
            | NodeTag::Except
            | NodeTag::Intersect
            | NodeTag::With
            | NodeTag::Cte
            | NodeTag::CteRecursive
            | NodeTag::Select
            | NodeTag::SelectDistinct
            | NodeTag::Column
            | NodeTag::Expression
            | NodeTag::Where
            | NodeTag::Limit
            | NodeTag::Offset
            | NodeTag::Case
            | NodeTag::When
            | NodeTag::Values
            | NodeTag::Array
            | NodeTag::GroupBy
            | NodeTag::OrderBy
            | NodeTag::Having
            | NodeTag::From
            | NodeTag::Source
            | NodeTag::Fields
            | NodeTag::Field
    )
}

/// Dispatch a node's tag to its decomposition rule.
pub(crate) fn decompose(
    session: &mut Session<'_>,
    tag: NodeTag,
    span: TokenSpan,
) -> Option<Decomposition> {
    let outcome = match tag {
        NodeTag::Batch => Decomposition::of(split_batch(session, span)),
        // Set-operation arms carry a full SELECT statement of their own.
        NodeTag::Statement
        | NodeTag::Union
        | NodeTag::UnionAll
        | NodeTag::Except
        | NodeTag::Intersect => Decomposition::of(split_statement(session, span)),
        NodeTag::With => Decomposition::of(split_with(session, span)),
        NodeTag::Cte | NodeTag::CteRecursive => Decomposition::of(split_cte(session, span)),
        NodeTag::Select | NodeTag::SelectDistinct => {
            Decomposition::of(split_separated(session, span, NodeTag::Column))
        }
        NodeTag::Column => Decomposition::of(split_column(session, span)),
        NodeTag::Expression | NodeTag::Where | NodeTag::Limit | NodeTag::Offset => {
            split_expression(session, span)
        }
        NodeTag::Case => Decomposition::of(split_case(session, span)),
        NodeTag::When => Decomposition::of(split_when(session, span)),
        NodeTag::Values | NodeTag::Array | NodeTag::GroupBy | NodeTag::OrderBy
        | NodeTag::Having => Decomposition::of(split_separated(session, span, NodeTag::Expression)),
        NodeTag::From => Decomposition::of(split_from(session, span)),
        NodeTag::Source => Decomposition::of(split_source(session, span)),
        NodeTag::Fields => Decomposition::of(split_separated(session, span, NodeTag::Field)),
        NodeTag::Field => Decomposition::of(split_field(session, span)),
        _ => return None,
    };
    Some(outcome)
}

#[inline]
fn single(index: usize) -> TokenSpan {
    TokenSpan {
        start: index,
        end: index + 1,
    }
}

fn is_join_separator(token: &Token) -> bool {
    JOIN_SEPARATORS.iter().any(|k| token.matches(k))
}

/// Split the whole token sequence into statements on depth-zero `;`.
/// Segments with no non-comment token produce no statement.
fn split_batch(session: &mut Session<'_>, span: TokenSpan) -> Vec<AstNode> {
    let mut out = Vec::new();
    let mut start = span.start;
    let mut depth = 0usize;

    for pos in span.start..span.end {
        match session.token(pos).text.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            ";" if depth == 0 => {
                push_batch_segment(session, &mut out, start, pos);
                start = pos + 1;
            }
            _ => {}
        }
    }
    push_batch_segment(session, &mut out, start, span.end);
    out
}

fn push_batch_segment(
    session: &mut Session<'_>,
    out: &mut Vec<AstNode>,
    start: usize,
    end: usize,
) {
    let has_content = (start..end).any(|i| session.token(i).kind != TokenKind::Comment);
    if has_content {
        let node = session.node(NodeTag::Statement, TokenSpan { start, end });
        out.push(node);
    }
}

/// Split a statement into clause nodes using the clause table. Clause
/// keywords stay outside their clause's span; an unrecognized keyword at
/// depth zero records an error and the cursor advances one token.
fn split_statement(session: &mut Session<'_>, span: TokenSpan) -> Vec<AstNode> {
    let mut out = Vec::new();
    let mut pos = span.start;

    while pos < span.end {
        let token = session.token(pos);

        // Statement separation happened at the batch level; stray
        // separators and comments are not clause keywords.
        if token.kind == TokenKind::Comment || token.text == ";" {
            pos += 1;
            continue;
        }

        let Some(spec) = CLAUSES.get(token.text.to_ascii_uppercase().as_str()) else {
            session.error(StructureError::UnsupportedClause {
                keyword: token.text.clone(),
                position: Some(token.position),
            });
            pos += 1;
            continue;
        };

        trace!(clause = spec.keyword, "clause dispatch");
        pos += 1;

        let mut tag = spec.tag;
        if let Some((word, variant_tag)) = spec.optional {
            if pos < span.end && session.token(pos).is_keyword(word) {
                tag = variant_tag;
                pos += 1;
            }
        }
        if let Some(word) = spec.required {
            if pos < span.end && session.token(pos).is_keyword(word) {
                pos += 1;
            } else {
                let position = (pos < span.end).then(|| session.token(pos).position);
                session.error(StructureError::ExpectedKeyword {
                    expected: word,
                    after: spec.keyword,
                    position,
                });
                continue;
            }
        }

        let content = session.consume_until(&mut pos, span.end, spec.stops);
        let node = session.node(tag, content);
        out.push(node);
    }

    out
}

/// Split a span on depth-zero commas into nodes of one tag. Shared by
/// SELECT lists, value lists, array bodies, GROUP BY/ORDER BY/HAVING, and
/// explicit field lists.
fn split_separated(session: &mut Session<'_>, span: TokenSpan, tag: NodeTag) -> Vec<AstNode> {
    let mut out = Vec::new();
    let mut pos = span.start;

    while pos < span.end {
        let fragment = session.consume_until(&mut pos, span.end, &[","]);
        if !fragment.is_empty() {
            let node = session.node(tag, fragment);
            out.push(node);
        }
        if pos < span.end {
            // Separator, or the offending token of a bracket error.
            pos += 1;
        }
    }

    out
}

/// Split a WITH clause on depth-zero commas into CTE definitions. A
/// fragment led by RECURSIVE becomes the recursive variant, keyword
/// excluded from the span.
fn split_with(session: &mut Session<'_>, span: TokenSpan) -> Vec<AstNode> {
    let mut out = Vec::new();
    let mut pos = span.start;

    while pos < span.end {
        let fragment = session.consume_until(&mut pos, span.end, &[","]);
        if !fragment.is_empty() {
            let node = if session.token(fragment.start).is_keyword("RECURSIVE") {
                session.node(
                    NodeTag::CteRecursive,
                    TokenSpan {
                        start: fragment.start + 1,
                        end: fragment.end,
                    },
                )
            } else {
                session.node(NodeTag::Cte, fragment)
            };
            out.push(node);
        }
        if pos < span.end {
            pos += 1;
        }
    }

    out
}

/// Decompose one CTE definition: name, optional parenthesized field-alias
/// list, optional AS, and a parenthesis-wrapped defining statement. A
/// malformed definition keeps whatever was recognized.
fn split_cte(session: &mut Session<'_>, span: TokenSpan) -> Vec<AstNode> {
    let mut out = Vec::new();
    let mut pos = span.start;

    if span.is_empty() {
        session.error(StructureError::MissingCteName { position: None });
        return out;
    }

    let name = session.node(NodeTag::Name, single(pos));
    out.push(name);
    pos += 1;

    if pos < span.end && session.token(pos).text == "(" {
        pos += 1;
        let list = session.consume_until(&mut pos, span.end, &[")"]);
        let fields = session.node(NodeTag::Fields, list);
        out.push(fields);
        if pos < span.end && session.token(pos).text == ")" {
            pos += 1;
        } else {
            let position = (pos < span.end).then(|| session.token(pos).position);
            session.error(StructureError::MissingClosingParen { position });
            return out;
        }
    }

    if pos < span.end && session.token(pos).is_keyword("AS") {
        pos += 1;
    }

    let wrapped = pos < span.end
        && span.end - 1 > pos
        && session.token(pos).text == "("
        && session.token(span.end - 1).text == ")";
    if wrapped {
        let body = session.node(
            NodeTag::Statement,
            TokenSpan {
                start: pos + 1,
                end: span.end - 1,
            },
        );
        out.push(body);
    } else {
        let position = (pos < span.end).then(|| session.token(pos).position);
        session.error(StructureError::MissingCteParens { position });
    }

    out
}

/// Split a column into its expression and an explicit trailing alias, if
/// one is present. A trailing Word not preceded by an operator is the
/// alias (an optional AS before it is dropped); single-token columns keep
/// no explicit alias — the analyzer derives the implicit one.
fn split_column(session: &mut Session<'_>, span: TokenSpan) -> Vec<AstNode> {
    let mut out = Vec::new();
    if span.is_empty() {
        return out;
    }

    let mut end = span.end;
    let mut alias: Option<TokenSpan> = None;

    if span.len() > 1 {
        let last = session.token(span.end - 1);
        let prev = session.token(span.end - 2);
        if last.kind == TokenKind::Word && prev.kind != TokenKind::Operator {
            alias = Some(single(span.end - 1));
            end = span.end - 1;
            if end > span.start && session.token(end - 1).is_keyword("AS") {
                end -= 1;
            }
        }
    }

    let expression = TokenSpan {
        start: span.start,
        end,
    };
    if !expression.is_empty() {
        let node = session.node(NodeTag::Expression, expression);
        out.push(node);
    }
    if let Some(alias_span) = alias {
        let node = session.node(NodeTag::Name, alias_span);
        out.push(node);
    }

    out
}

/// Split an explicit field declaration: first token is the name, the rest
/// is its type annotation.
fn split_field(session: &mut Session<'_>, span: TokenSpan) -> Vec<AstNode> {
    let mut out = Vec::new();
    if span.is_empty() {
        return out;
    }

    let name = session.node(NodeTag::Name, single(span.start));
    out.push(name);

    let rest = TokenSpan {
        start: span.start + 1,
        end: span.end,
    };
    if !rest.is_empty() {
        let node = session.node(NodeTag::Type, rest);
        out.push(node);
    }

    out
}

/// Split a FROM clause on join separators into sources; each joined
/// source's span starts at its own join keywords.
fn split_from(session: &mut Session<'_>, span: TokenSpan) -> Vec<AstNode> {
    let mut out = Vec::new();
    let mut pos = span.start;

    let first = session.consume_until(&mut pos, span.end, JOIN_SEPARATORS);
    if !first.is_empty() {
        let node = session.node(NodeTag::Source, first);
        out.push(node);
    }

    while pos < span.end {
        let entry = pos;
        let join_start = pos;
        while pos < span.end && is_join_separator(session.token(pos)) {
            pos += 1;
        }
        let body = session.consume_until(&mut pos, span.end, JOIN_SEPARATORS);
        if !body.is_empty() {
            let node = session.node(
                NodeTag::Source,
                TokenSpan {
                    start: join_start,
                    end: body.end,
                },
            );
            out.push(node);
        }
        if pos == entry {
            pos += 1;
        }
    }

    out
}

/// Decompose one FROM source.
///
/// Scans to ON/USING, strips leading join keywords into a join-type node,
/// backward-peels a trailing parenthesized field list and then a trailing
/// bare alias, and classifies the head: a parenthesized SELECT is a
/// derived statement, an identifier chain followed by an argument list is
/// a table function, a bare chain is a plain relation. No Name node is
/// emitted for the default alias; the analyzer falls back to the last
/// identifier segment.
fn split_source(session: &mut Session<'_>, span: TokenSpan) -> Vec<AstNode> {
    let mut children = Vec::new();
    let mut pos = span.start;
    let mut body = session.consume_until(&mut pos, span.end, &["ON", "USING"]);

    let join_start = body.start;
    while !body.is_empty() && is_join_separator(session.token(body.start)) {
        body.start += 1;
    }
    if body.start > join_start {
        let node = session.node(
            NodeTag::JoinType,
            TokenSpan {
                start: join_start,
                end: body.start,
            },
        );
        children.push(node);
    }

    // Trailing `(…)` is an explicit field list (column aliases for table
    // functions), peeled before the alias that precedes it.
    let mut fields: Option<TokenSpan> = None;
    if !body.is_empty() && session.token(body.end - 1).text == ")" {
        body.end -= 1;
        let peeled = session.consume_until_backwards(&mut body, &["("]);
        if !body.is_empty() && session.token(body.end - 1).text == "(" {
            body.end -= 1;
        }
        fields = Some(peeled);
    }

    let mut alias: Option<TokenSpan> = None;
    if body.len() > 1 {
        let last = session.token(body.end - 1);
        let prev = session.token(body.end - 2);
        if last.kind == TokenKind::Word && prev.kind != TokenKind::Operator {
            alias = Some(single(body.end - 1));
            body.end -= 1;
            if body.len() > 1 && session.token(body.end - 1).is_keyword("AS") {
                body.end -= 1;
            }
        }
    }

    let mut on_expression: Option<TokenSpan> = None;
    if pos < span.end {
        let token = session.token(pos);
        if token.is_keyword("ON") || token.is_keyword("USING") {
            pos += 1;
            let expression = session.consume_until(&mut pos, span.end, &[]);
            on_expression = Some(expression);
        }
    }

    if !body.is_empty() {
        let first = session.token(body.start);
        if first.text == "(" {
            let mut inner_pos = body.start + 1;
            let inner = session.consume_until(&mut inner_pos, body.end, &[")"]);
            let node = session.node(NodeTag::Statement, inner);
            children.push(node);
        } else if first.kind == TokenKind::Word {
            let mut ident_end = body.start + 1;
            while ident_end < body.end && session.token(ident_end).text == "." {
                ident_end += 1;
                if ident_end < body.end && session.token(ident_end).kind == TokenKind::Word {
                    ident_end += 1;
                }
            }
            let node = session.node(
                NodeTag::Identifier,
                TokenSpan {
                    start: body.start,
                    end: ident_end,
                },
            );
            children.push(node);

            if ident_end < body.end && session.token(ident_end).text == "(" {
                let mut args_pos = ident_end + 1;
                let args = session.consume_until(&mut args_pos, body.end, &[")"]);
                let node = session.node(NodeTag::Values, args);
                children.push(node);
            }
        }
    }

    if let Some(alias_span) = alias {
        let node = session.node(NodeTag::Name, alias_span);
        children.push(node);
    }
    if let Some(fields_span) = fields {
        let node = session.node(NodeTag::Fields, fields_span);
        children.push(node);
    }
    if let Some(expression) = on_expression {
        let node = session.node(NodeTag::Expression, expression);
        children.push(node);
    }

    children
}

/// Scan an expression left to right: dot-joined identifier runs merge into
/// one dotted identifier, `CASE…END` spans become case nodes, `(` opens an
/// argument list (after a pending identifier), a nested statement (when
/// the first inner token is SELECT) or a nested expression, `[` opens an
/// array, operators and literals become standalone nodes. A depth-zero
/// comma reclassifies the whole node as a value list.
fn split_expression(session: &mut Session<'_>, span: TokenSpan) -> Decomposition {
    let mut children: Vec<AstNode> = Vec::new();
    let mut run: Option<TokenSpan> = None;
    let mut pos = span.start;

    fn flush_run(
        session: &mut Session<'_>,
        children: &mut Vec<AstNode>,
        run: &mut Option<TokenSpan>,
    ) {
        if let Some(span) = run.take() {
            let node = session.node(NodeTag::Identifier, span);
            children.push(node);
        }
    }

    while pos < span.end {
        let token = session.token(pos);
        match token.kind {
            TokenKind::Word if token.matches("CASE") => {
                flush_run(session, &mut children, &mut run);
                pos += 1;
                let body = session.consume_until(&mut pos, span.end, &["END"]);
                let node = session.node(NodeTag::Case, body);
                children.push(node);
            }
            TokenKind::Word => {
                // An identifier run alternates word, dot, word; a second
                // adjacent word starts a new run.
                if run.is_some_and(|r| r.len() % 2 == 1) {
                    flush_run(session, &mut children, &mut run);
                }
                if let Some(r) = run.as_mut() {
                    r.end = pos + 1;
                } else {
                    run = Some(single(pos));
                }
            }
            TokenKind::Operator if token.text == "." => {
                if let Some(r) = run.as_mut() {
                    r.end = pos + 1;
                } else {
                    // Leading dot with no identifier: composite field access.
                    let node = session.node(NodeTag::Operator, single(pos));
                    children.push(node);
                }
            }
            TokenKind::Punctuation if token.text == "(" => {
                if run.is_some() {
                    flush_run(session, &mut children, &mut run);
                    pos += 1;
                    let args = session.consume_until(&mut pos, span.end, &[")"]);
                    let node = session.node(NodeTag::Values, args);
                    children.push(node);
                } else {
                    pos += 1;
                    let is_statement =
                        pos < span.end && session.token(pos).is_keyword("SELECT");
                    let inner = session.consume_until(&mut pos, span.end, &[")"]);
                    let tag = if is_statement {
                        NodeTag::Statement
                    } else {
                        NodeTag::Expression
                    };
                    let node = session.node(tag, inner);
                    children.push(node);
                }
            }
            TokenKind::Punctuation if token.text == "[" => {
                flush_run(session, &mut children, &mut run);
                pos += 1;
                let inner = session.consume_until(&mut pos, span.end, &["]"]);
                let node = session.node(NodeTag::Array, inner);
                children.push(node);
            }
            TokenKind::Punctuation if token.text == "," => {
                // Not one expression after all: rebuild as a value list.
                let children = split_separated(session, span, NodeTag::Expression);
                return Decomposition {
                    retag: Some(NodeTag::Values),
                    children,
                };
            }
            TokenKind::Operator => {
                flush_run(session, &mut children, &mut run);
                let node = session.node(NodeTag::Operator, single(pos));
                children.push(node);
            }
            TokenKind::Number | TokenKind::String => {
                flush_run(session, &mut children, &mut run);
                let node = session.node(NodeTag::Literal, single(pos));
                children.push(node);
            }
            _ => {
                flush_run(session, &mut children, &mut run);
                let node = session.node(NodeTag::Unknown, single(pos));
                children.push(node);
            }
        }
        pos += 1;
    }

    flush_run(session, &mut children, &mut run);
    Decomposition::of(children)
}

/// Split a CASE body: optional subject expression before the first WHEN,
/// WHEN fragments, and a trailing ELSE expression.
fn split_case(session: &mut Session<'_>, span: TokenSpan) -> Vec<AstNode> {
    let mut out = Vec::new();
    let mut pos = span.start;

    if pos < span.end && !session.token(pos).is_keyword("WHEN") {
        let subject = session.consume_until(&mut pos, span.end, &["WHEN"]);
        if !subject.is_empty() {
            let node = session.node(NodeTag::Expression, subject);
            out.push(node);
        }
    } else if pos < span.end {
        pos += 1;
    }

    while pos < span.end {
        let fragment = session.consume_until(&mut pos, span.end, &["WHEN", "ELSE"]);
        if !fragment.is_empty() {
            let node = session.node(NodeTag::When, fragment);
            out.push(node);
        }
        if pos >= span.end {
            break;
        }
        let token = session.token(pos);
        if token.is_keyword("WHEN") {
            pos += 1;
        } else if token.is_keyword("ELSE") {
            pos += 1;
            let alternative = session.consume_until(&mut pos, span.end, &[]);
            if !alternative.is_empty() {
                let node = session.node(NodeTag::Expression, alternative);
                out.push(node);
            }
            break;
        } else {
            // Offending token left by a bracket error.
            pos += 1;
        }
    }

    out
}

/// Split one WHEN fragment into its condition and result expressions.
fn split_when(session: &mut Session<'_>, span: TokenSpan) -> Vec<AstNode> {
    let mut out = Vec::new();
    let mut pos = span.start;

    let condition = session.consume_until(&mut pos, span.end, &["THEN"]);
    if !condition.is_empty() {
        let node = session.node(NodeTag::Expression, condition);
        out.push(node);
    }

    if pos < span.end {
        pos += 1; // THEN
    }

    let result = session.consume_until(&mut pos, span.end, &[]);
    if !result.is_empty() {
        let node = session.node(NodeTag::Expression, result);
        out.push(node);
    }

    out
}
