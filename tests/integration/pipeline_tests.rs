//! End-to-end tests over realistic catalog queries
//!
//! These drive the full tokenize → build → analyze pipeline with the kind
//! of SQL an editor actually sees: nested CTEs, mixed join styles, and
//! half-typed text.

use sqlscope::{parse, Analyzer, AstNode, BatchKind, NodeTag, RelationTarget};

const ACTIVITY_QUERY: &str = "\
with activity as (
    select a.datid, a.pid, a.usename, a.query_start from pg_stat_activity a where a.state = 'active'
),
databases (oid, datname) as (
    select d.oid, d.datname from pg_catalog.pg_database d
)
select act.pid, db.datname as database_name,
       coalesce(act.usename, 'unknown') user_name,
       case when act.pid = 0 then 'self' else 'other' end kind
  from activity act
  join databases db on act.datid = db.oid
 order by act.pid";

fn assert_span_invariants(node: &AstNode) {
    let mut previous_end: Option<usize> = None;
    for child in node.children() {
        assert!(child.span.start >= node.span.start && child.span.end <= node.span.end);
        if !child.span.is_empty() {
            if let Some(end) = previous_end {
                assert!(child.span.start >= end);
            }
            previous_end = Some(child.span.end);
        }
        assert_span_invariants(child);
    }
}

#[test]
fn test_activity_query_builds_cleanly() {
    let tree = parse(ACTIVITY_QUERY);
    assert!(tree.errors().is_empty(), "{:?}", tree.errors());
    assert_span_invariants(tree.root());

    let summary = Analyzer::new(&tree).classify_batch();
    assert!(!summary.is_batch);
    assert_eq!(summary.kind, BatchKind::Select);
}

#[test]
fn test_activity_query_relations() {
    let tree = parse(ACTIVITY_QUERY);
    let analyzer = Analyzer::new(&tree);

    let relations = analyzer.find_used_relations();
    let names: Vec<String> = relations.iter().map(|r| r.parts.join(".")).collect();
    assert_eq!(
        names,
        vec![
            "activity",
            "databases",
            "pg_stat_activity",
            "pg_catalog.pg_database"
        ]
    );

    assert!(matches!(relations[0].target, RelationTarget::Cte(_)));
    assert_eq!(relations[0].alias.as_deref(), Some("act"));
    assert!(matches!(relations[1].target, RelationTarget::Cte(_)));
    assert_eq!(relations[3].alias.as_deref(), Some("d"));
}

#[test]
fn test_activity_query_cte_columns() {
    let tree = parse(ACTIVITY_QUERY);
    let analyzer = Analyzer::new(&tree);
    let relations = analyzer.find_used_relations();

    // `activity` projects its defining SELECT's aliases.
    let activity = &relations[0..1];
    let aliases: Vec<_> = analyzer
        .resolve_columns(activity)
        .into_iter()
        .map(|c| c.alias)
        .collect();
    assert_eq!(
        aliases,
        vec![
            Some("datid".to_string()),
            Some("pid".to_string()),
            Some("usename".to_string()),
            Some("query_start".to_string()),
        ]
    );

    // `databases` declares an explicit field list.
    let databases = &relations[1..2];
    let aliases: Vec<_> = analyzer
        .resolve_columns(databases)
        .into_iter()
        .map(|c| c.alias)
        .collect();
    assert_eq!(
        aliases,
        vec![Some("oid".to_string()), Some("datname".to_string())]
    );
}

#[test]
fn test_activity_query_caret_queries() {
    let tree = parse(ACTIVITY_QUERY);
    let analyzer = Analyzer::new(&tree);

    let caret = ACTIVITY_QUERY.find("db.oid").unwrap() + 3;
    let chain = analyzer.ancestor_chain_at(caret);
    assert_eq!(chain.first().unwrap().tag, NodeTag::Identifier);
    assert_eq!(chain.last().unwrap().tag, NodeTag::Batch);

    let ident = analyzer.identifier_at(caret).unwrap();
    assert_eq!(ident.parts, vec!["db", "oid"]);
    assert_eq!(ident.part_index, Some(1));

    // Both FROM sources of the outer statement are in scope at the caret.
    let visible = analyzer.find_relations_at(caret);
    assert_eq!(visible.len(), 2);
    assert_eq!(visible[0].parts, vec!["activity"]);
    assert_eq!(visible[1].parts, vec!["databases"]);

    let columns = analyzer.owner_statement_columns(caret);
    let aliases: Vec<_> = columns.iter().map(|c| c.alias.as_deref()).collect();
    assert_eq!(
        aliases,
        vec![
            Some("pid"),
            Some("database_name"),
            Some("user_name"),
            Some("kind")
        ]
    );
}

#[test]
fn test_nested_with_inside_derived_table() {
    let sql = "\
with szkielet as (
    with all_date as (select * from generate_series('2019-08-31', '2022-05-31') as dt)
    select d.dt from all_date d
)
select s.dt from szkielet s";
    let tree = parse(sql);
    assert!(tree.errors().is_empty(), "{:?}", tree.errors());
    let analyzer = Analyzer::new(&tree);

    let relations = analyzer.find_used_relations();
    let names: Vec<String> = relations.iter().map(|r| r.parts.join(".")).collect();
    assert_eq!(names, vec!["szkielet", "all_date", "generate_series"]);
    assert!(matches!(relations[2].target, RelationTarget::Function(_)));

    let columns = analyzer.resolve_columns(&relations[0..1]);
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].alias.as_deref(), Some("dt"));
}

#[test]
fn test_half_typed_query_still_answers_queries() {
    // An editor snapshot mid-keystroke: unclosed subquery, dangling WHERE.
    let sql = "select u.name, from (select name from users where";
    let tree = parse(sql);
    assert!(!tree.errors().is_empty());
    assert_span_invariants(tree.root());

    let analyzer = Analyzer::new(&tree);
    let relations = analyzer.find_used_relations();
    assert!(relations
        .iter()
        .any(|r| matches!(r.target, RelationTarget::Derived(_))));

    let caret = sql.find("name from users").unwrap();
    let ident = analyzer.identifier_at(caret);
    assert!(ident.is_some());
}

#[test]
fn test_multi_statement_script() {
    let sql = "\
begin;
insert into audit_log (event, at) values ('start', now());
update jobs set state = 'running' where id = 7;
commit;";
    let tree = parse(sql);
    let analyzer = Analyzer::new(&tree);

    let summary = analyzer.classify_batch();
    assert!(summary.is_batch);
    assert_eq!(summary.kind, BatchKind::Dml);
}
