use relq::prelude::*;

use crate::common::blog_registry_with;

fn posts(dialect: Dialect) -> Relation {
    blog_registry_with(EngineConfig::new(dialect))
        .relation("Post")
        .unwrap()
}

fn filtered(posts: &Relation) -> Relation {
    let p = posts.predicates();
    posts
        .r#where(p.equals("title", "a").unwrap())
        .r#where(p.gt("created_at", 1).unwrap())
        .order("id", Direction::Asc)
        .unwrap()
        .limit(1)
        .offset(2)
}

#[test]
fn sqlite_placeholders() {
    let compiled = filtered(&posts(Dialect::SQLite)).to_sql().unwrap();
    assert_eq!(
        compiled.sql,
        r#"SELECT * FROM "posts" WHERE "posts"."title" = ? AND "posts"."created_at" > ? ORDER BY "posts"."id" ASC LIMIT ? OFFSET ?"#
    );
    assert_eq!(
        compiled.params,
        [
            Value::from("a"),
            Value::Integer(1),
            Value::Integer(1),
            Value::Integer(2)
        ]
    );
}

#[test]
fn postgres_numbers_placeholders() {
    let compiled = filtered(&posts(Dialect::PostgreSQL)).to_sql().unwrap();
    assert_eq!(
        compiled.sql,
        r#"SELECT * FROM "posts" WHERE "posts"."title" = $1 AND "posts"."created_at" > $2 ORDER BY "posts"."id" ASC LIMIT $3 OFFSET $4"#
    );
    assert_eq!(compiled.dialect, Dialect::PostgreSQL);
}

#[test]
fn mysql_quotes_with_backticks() {
    let posts = posts(Dialect::MySQL);
    let compiled = posts.where_eq("title", "a").unwrap().to_sql().unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT * FROM `posts` WHERE `posts`.`title` = ?"
    );
}

#[test]
fn bare_offsets_per_dialect() {
    let tail = |dialect| {
        let sql = posts(dialect).offset(5).to_sql().unwrap().sql;
        sql.trim_start_matches(r#"SELECT * FROM "posts" "#)
            .trim_start_matches("SELECT * FROM `posts` ")
            .to_string()
    };
    assert_eq!(tail(Dialect::SQLite), "LIMIT -1 OFFSET ?");
    assert_eq!(tail(Dialect::PostgreSQL), "OFFSET $1");
    assert_eq!(tail(Dialect::MySQL), "LIMIT 18446744073709551615 OFFSET ?");
}

#[test]
fn compiling_is_deterministic() {
    let posts = posts(Dialect::PostgreSQL);
    let p = posts.predicates();
    let query = posts
        .joins(["comments.guest", "tags"])
        .unwrap()
        .r#where(p.in_array("tags.name", ["rust", "db"]).unwrap())
        .distinct();
    assert_eq!(query.to_sql().unwrap(), query.to_sql().unwrap());
    assert_eq!(query.clone().to_sql().unwrap(), query.to_sql().unwrap());
}

#[test]
fn explain_lists_parameters() {
    let posts = posts(Dialect::SQLite);
    let explained = posts
        .where_eq("title", "intro")
        .unwrap()
        .limit(3)
        .explain()
        .unwrap();
    assert_eq!(
        explained,
        "SELECT * FROM \"posts\" WHERE \"posts\".\"title\" = ? LIMIT ?\n-- params: ['intro', 3]"
    );
}
