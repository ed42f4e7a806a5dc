use relq::prelude::*;

use crate::common::{blog_db, blog_registry, clients_db, clients_registry, ids};

#[test]
fn find_by_primary_key() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();

    let rust = posts.find(&db, 3).unwrap();
    assert_eq!(rust.get_as::<String>("title").unwrap(), "rust");

    let err = posts.find(&db, 99).unwrap_err();
    assert!(matches!(
        err,
        RelqError::RecordNotFound { ref entity, ref key } if entity == "Post" && key == "id=99"
    ));
    assert_eq!(err.to_string(), "Record not found: Post with id=99");

    // Filters still apply
    let drafts = posts.where_eq("published", false).unwrap();
    assert!(drafts.find(&db, 3).is_err());
}

#[test]
fn find_by_predicate() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();

    let sql = posts.find_by(&db, p.equals("title", "sql").unwrap()).unwrap();
    assert_eq!(sql.map(|row| row.get_as::<i64>("id").unwrap()), Some(4));
    assert!(posts
        .find_by(&db, p.equals("title", "nope").unwrap())
        .unwrap()
        .is_none());
}

#[test]
fn first_and_last() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();

    let first = posts.first(&db).unwrap().unwrap();
    let last = posts.last(&db).unwrap().unwrap();
    assert_eq!(first.get_as::<i64>("id").unwrap(), 1);
    assert_eq!(last.get_as::<i64>("id").unwrap(), 5);

    let newest_first = posts.order("created_at", Direction::Desc).unwrap();
    assert_eq!(ids(&newest_first.first_n(&db, 2).unwrap()), [5, 4]);
    assert_eq!(ids(&newest_first.last_n(&db, 2).unwrap()), [2, 1]);
    assert_eq!(ids(&posts.last_n(&db, 2).unwrap()), [4, 5]);

    assert!(posts.where_eq("title", "nope").unwrap().first(&db).unwrap().is_none());
    assert!(posts.take(&db).unwrap().is_some());
    assert_eq!(posts.take_n(&db, 3).unwrap().len(), 3);
}

#[test]
fn find_or_initialize_by_finds_existing_rows() {
    let db = clients_db();
    let clients = clients_registry().relation("Client").unwrap();

    let found = clients
        .find_or_initialize_by(&db, [("first_name", "Jane")])
        .unwrap();
    assert!(!found.is_new());
    let FindOrInitialize::Found(row) = found else {
        panic!("expected an existing client");
    };
    assert_eq!(row.get_as::<i64>("id").unwrap(), 2);

    // Removed clients are invisible through the default scope
    let gone = clients
        .find_or_initialize_by(&db, [("first_name", "Gone")])
        .unwrap();
    assert!(gone.is_new());
}

#[test]
fn find_or_initialize_by_builds_without_writing() {
    let db = clients_db();
    let clients = clients_registry().relation("Client").unwrap();

    let result = clients
        .where_eq("orders_count", 0)
        .unwrap()
        .find_or_initialize_by(&db, [("first_name", "Nina")])
        .unwrap();
    let FindOrInitialize::Initialized(record) = result else {
        panic!("expected a new record");
    };
    assert_eq!(record.entity(), "Client");
    assert_eq!(record.get("first_name"), Some(&Value::from("Nina")));
    assert_eq!(record.get("orders_count"), Some(&Value::Integer(0)));
    assert_eq!(record.attributes().len(), 2);

    assert_eq!(clients.unscoped().count(&db).unwrap().total(), 4);
}
