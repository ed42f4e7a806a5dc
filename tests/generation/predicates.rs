use relq::prelude::*;
use relq::{AssociationError, CompileError, SchemaError};

use crate::common::blog_registry;

fn where_sql(relation: &Relation) -> String {
    let sql = relation.to_sql().unwrap().sql;
    match sql.split_once(" WHERE ") {
        Some((_, condition)) => condition.to_string(),
        None => String::new(),
    }
}

#[test]
fn boolean_composition() {
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();
    let a = p.equals("title", "a").unwrap();
    let b = p.equals("title", "b").unwrap();
    let c = p.is_not_null("editor_id").unwrap();

    assert_eq!(
        where_sql(&posts.r#where((a.clone() | b.clone()) & c.clone())),
        r#"("posts"."title" = ? OR "posts"."title" = ?) AND "posts"."editor_id" IS NOT NULL"#
    );
    assert_eq!(
        where_sql(&posts.r#where(or([a.clone(), b.clone() & c.clone()]))),
        r#"("posts"."title" = ? OR ("posts"."title" = ? AND "posts"."editor_id" IS NOT NULL))"#
    );
    assert_eq!(
        where_sql(&posts.where_not(a.clone() | b.clone())),
        r#"NOT ("posts"."title" = ? OR "posts"."title" = ?)"#
    );
    assert_eq!(
        where_sql(&posts.r#where(!a.clone())),
        r#"NOT ("posts"."title" = ?)"#
    );
}

#[test]
fn chained_where_equals_conjunction() {
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();
    let a = p.equals("title", "a").unwrap();
    let b = p.lt("created_at", 10).unwrap();

    assert_eq!(
        posts.r#where(a.clone()).r#where(b.clone()).to_sql().unwrap(),
        posts.r#where(and([a, b])).to_sql().unwrap()
    );
}

#[test]
fn empty_sets() {
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();
    assert_eq!(
        where_sql(&posts.r#where(p.in_array("id", Vec::<i64>::new()).unwrap())),
        "1=0"
    );
    assert_eq!(
        where_sql(&posts.r#where(p.not_in_array("id", Vec::<i64>::new()).unwrap())),
        "1=1"
    );
    assert_eq!(
        where_sql(&posts.r#where(p.in_array("id", [1, 2]).unwrap())),
        r#""posts"."id" IN (?, ?)"#
    );
}

#[test]
fn null_values_become_is_null() {
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();
    let compiled = posts
        .r#where(p.equals("editor_id", Value::Null).unwrap())
        .r#where(p.not_equals("editor_id", None::<i64>).unwrap())
        .to_sql()
        .unwrap();
    assert_eq!(
        compiled.sql,
        r#"SELECT * FROM "posts" WHERE "posts"."editor_id" IS NULL AND "posts"."editor_id" IS NOT NULL"#
    );
    assert!(compiled.params.is_empty());
}

#[test]
fn raw_fragments_check_placeholders_at_construction() {
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();

    let err = p.raw("created_at > ? AND created_at < ?", [1]).unwrap_err();
    assert!(matches!(
        err,
        RelqError::Compile(CompileError::PlaceholderMismatch {
            placeholders: 2,
            params: 1,
            ..
        })
    ));

    // Quoted question marks are literal text
    let quoted = p.raw("title <> '?' AND created_at > ?", [5]).unwrap();
    let compiled = posts.r#where(quoted).to_sql().unwrap();
    assert_eq!(
        compiled.sql,
        r#"SELECT * FROM "posts" WHERE (title <> '?' AND created_at > ?)"#
    );
    assert_eq!(compiled.params, [Value::Integer(5)]);
}

#[test]
fn unknown_columns_fail_fast() {
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();

    assert!(matches!(
        p.equals("colour", "red"),
        Err(RelqError::Schema(SchemaError::UnknownColumn { ref entity, ref column }))
            if entity == "Post" && column == "colour"
    ));
    assert!(matches!(
        p.equals("comments.guest.colour", "red"),
        Err(RelqError::Schema(SchemaError::UnknownColumn { ref entity, .. })) if entity == "Guest"
    ));
    assert!(matches!(
        p.equals("reviews.body", "x"),
        Err(RelqError::Association(AssociationError::BrokenAssociationPath { .. }))
    ));
    assert!(posts.order("colour", Direction::Asc).is_err());
    assert!(posts.select(["title", "colour"]).is_err());
}

#[test]
fn structural_errors_surface_at_compile_time() {
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();

    let having_only = posts.having(p.raw("COUNT(*) > ?", [1]).unwrap());
    assert!(matches!(
        having_only.to_sql(),
        Err(RelqError::Compile(CompileError::EmptyRelation { .. }))
    ));

    let nothing = posts.select(Vec::<&str>::new()).unwrap();
    assert!(matches!(
        nothing.to_sql(),
        Err(RelqError::Compile(CompileError::EmptyRelation { .. }))
    ));
}
