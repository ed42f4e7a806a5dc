use relq::CompileError;
use relq::prelude::*;

use crate::common::{blog_db, blog_registry, clients_db, clients_registry, ids};

#[test]
fn default_scope_applies_until_unscoped() {
    let db = clients_db();
    let clients = clients_registry().relation("Client").unwrap();

    assert_eq!(
        clients.to_sql().unwrap().sql,
        r#"SELECT * FROM "clients" WHERE (clients.removed_at IS NULL)"#
    );
    assert_eq!(ids(&clients.order("id", Direction::Asc).unwrap().load(&db).unwrap()), [1, 2, 4]);

    let everyone = clients.unscoped();
    assert_eq!(everyone.to_sql().unwrap().sql, r#"SELECT * FROM "clients""#);
    assert_eq!(everyone.count(&db).unwrap().total(), 4);
}

#[test]
fn unscoped_keeps_explicit_clauses() {
    let db = clients_db();
    let clients = clients_registry().relation("Client").unwrap();
    let p = clients.predicates();
    let busy = clients.r#where(p.gt("orders_count", 4).unwrap());

    assert_eq!(busy.count(&db).unwrap().total(), 2);
    let busy_everyone = busy.unscoped().order("id", Direction::Asc).unwrap();
    assert_eq!(ids(&busy_everyone.load(&db).unwrap()), [2, 3, 4]);
}

#[test]
fn named_scopes_take_arguments() {
    let db = clients_db();
    let clients = clients_registry().relation("Client").unwrap();

    let early = clients.scope("created_before", &[Value::Integer(35)]).unwrap();
    assert_eq!(early.to_sql().unwrap().params, [Value::Integer(35)]);
    assert_eq!(ids(&early.order("id", Direction::Asc).unwrap().load(&db).unwrap()), [1, 2]);

    let err = clients.scope("created_before", &[]).unwrap_err();
    assert!(matches!(
        err,
        RelqError::Compile(CompileError::PlaceholderMismatch {
            placeholders: 1,
            params: 0,
            ..
        })
    ));
    assert!(clients.scope("vip", &[]).is_err());
}

#[test]
fn scopes_chain_like_any_other_clause() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();

    let recent_published = posts
        .scope("published", &[])
        .unwrap()
        .scope("created_before", &[Value::Integer(350)])
        .unwrap()
        .order("id", Direction::Asc)
        .unwrap();
    assert_eq!(ids(&recent_published.load(&db).unwrap()), [1, 3]);

    let composed = Scope::new(|r: &Relation, _| r.where_eq("published", true))
        .then(Scope::raw("posts.created_at < ?"));
    let applied = posts
        .apply(&composed, &[Value::Integer(350)])
        .unwrap()
        .order("id", Direction::Asc)
        .unwrap();
    assert_eq!(applied.to_sql().unwrap(), recent_published.to_sql().unwrap());
}

#[test]
fn default_scope_order_yields_to_reorder() {
    let mut registry = SchemaRegistry::new();
    registry
        .register(
            Entity::builder("Post")
                .column("title", ColumnType::Text)
                .default_scope(Scope::new(|r: &Relation, _| {
                    r.order("title", Direction::Asc)
                }))
                .build(),
        )
        .unwrap();
    let posts = registry.finish().unwrap().relation("Post").unwrap();

    assert_eq!(
        posts.order("id", Direction::Desc).unwrap().to_sql().unwrap().sql,
        r#"SELECT * FROM "posts" ORDER BY "posts"."title" ASC, "posts"."id" DESC"#
    );
    assert_eq!(
        posts.reorder("id", Direction::Desc).unwrap().to_sql().unwrap().sql,
        r#"SELECT * FROM "posts" ORDER BY "posts"."id" DESC"#
    );

    let db = blog_db();
    let titles = posts.pluck(&db, ["title"]).unwrap();
    assert_eq!(titles.first(), Some(&vec![Value::from("draft")]));
}

#[test]
fn validated_default_scope_survives_joins_on_shared_columns() {
    let mut registry = SchemaRegistry::new();
    registry
        .register(
            Entity::builder("Client")
                .nullable_column("removed_at", ColumnType::Integer)
                .association(Association::has_many("orders", "Order"))
                .default_scope(Scope::new(|r: &Relation, _| {
                    Ok(r.r#where(r.predicates().is_null("removed_at")?))
                }))
                .build(),
        )
        .unwrap();
    registry
        .register(
            Entity::builder("Order")
                .column("client_id", ColumnType::Integer)
                .nullable_column("removed_at", ColumnType::Integer)
                .build(),
        )
        .unwrap();
    let clients = registry.finish().unwrap().relation("Client").unwrap();

    let db = SqliteExecutor::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE clients (id INTEGER PRIMARY KEY, removed_at INTEGER);
         CREATE TABLE orders (id INTEGER PRIMARY KEY, client_id INTEGER NOT NULL, removed_at INTEGER);
         INSERT INTO clients (id, removed_at) VALUES (1, NULL), (2, 5);
         INSERT INTO orders (id, client_id, removed_at) VALUES (1, 1, NULL), (2, 1, 9), (3, 2, NULL);",
    )
    .unwrap();

    let with_orders = clients.joins(["orders"]).unwrap();
    assert_eq!(
        with_orders.to_sql().unwrap().sql,
        concat!(
            r#"SELECT "clients".* FROM "clients" "#,
            r#"INNER JOIN "orders" ON "orders"."client_id" = "clients"."id" "#,
            r#"WHERE "clients"."removed_at" IS NULL"#
        )
    );
    assert_eq!(ids(&with_orders.load(&db).unwrap()), [1, 1]);
}
