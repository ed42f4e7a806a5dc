use std::cell::Cell;

use relq::prelude::*;
use relq::ExecutionError;

use crate::common::{blog_db, blog_registry, ids};

/// Counts statements before handing them to SQLite.
struct Counting<'a> {
    inner: &'a SqliteExecutor,
    calls: Cell<usize>,
}

impl Executor for Counting<'_> {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, ExecutionError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.execute(sql, params)
    }
}

fn sorted(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids
}

#[test]
fn chaining_runs_nothing_until_a_terminal_operation() {
    let db = blog_db();
    let counting = Counting {
        inner: &db,
        calls: Cell::new(0),
    };
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();

    let query = posts
        .r#where(p.gt("created_at", 150).unwrap())
        .order("created_at", Direction::Desc)
        .unwrap()
        .joins(["comments"])
        .unwrap()
        .distinct()
        .limit(2);
    query.to_sql().unwrap();
    assert_eq!(counting.calls.get(), 0);

    let rows = query.load(&counting).unwrap();
    assert_eq!(counting.calls.get(), 1);
    assert_eq!(ids(&rows), [4, 3]);
}

#[test]
fn where_is_commutative() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();
    let a = p.equals("published", true).unwrap();
    let b = p.gt("created_at", 150).unwrap();

    let ab = posts.r#where(a.clone()).r#where(b.clone()).load(&db).unwrap();
    let ba = posts.r#where(b).r#where(a).load(&db).unwrap();
    assert_eq!(sorted(ids(&ab)), [3, 4]);
    assert_eq!(sorted(ids(&ab)), sorted(ids(&ba)));
}

#[test]
fn distinct_is_idempotent() {
    let db = blog_db();
    let commented = blog_registry()
        .relation("Post")
        .unwrap()
        .joins(["comments"])
        .unwrap();

    let once = commented.distinct();
    let twice = commented.distinct().distinct();
    assert_eq!(once.to_sql().unwrap(), twice.to_sql().unwrap());
    assert_eq!(sorted(ids(&once.load(&db).unwrap())), [1, 3, 4]);
    assert_eq!(commented.load(&db).unwrap().len(), 4);
}

#[test]
fn deriving_leaves_the_base_relation_untouched() {
    let posts = blog_registry().relation("Post").unwrap();
    let base = posts.where_eq("published", true).unwrap();
    let before = base.to_sql().unwrap();

    let _ = base.limit(1);
    let _ = base.order("title", Direction::Asc).unwrap();
    let _ = base.joins(["comments.guest"]).unwrap().distinct();
    let _ = base.unscoped().offset(3);

    assert_eq!(base.to_sql().unwrap(), before);
    assert_eq!(
        before.sql,
        r#"SELECT * FROM "posts" WHERE "posts"."published" = ?"#
    );
    assert_eq!(before.params, [Value::Integer(1)]);
}

#[test]
fn loaded_rows_satisfy_the_predicates() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();
    let rows = posts
        .r#where(p.gt("created_at", 200).unwrap() | p.equals("title", "intro").unwrap())
        .load(&db)
        .unwrap();

    assert_eq!(sorted(ids(&rows)), [1, 3, 4, 5]);
    for row in &rows {
        let created_at = row.get_as::<i64>("created_at").unwrap();
        let title = row.get_as::<String>("title").unwrap();
        assert!(created_at > 200 || title == "intro");
    }
}

#[test]
fn ranges_and_sets() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();

    let between = posts.r#where(p.range("created_at", 200, 400).unwrap());
    assert_eq!(sorted(ids(&between.load(&db).unwrap())), [2, 3, 4]);

    let listed = posts.r#where(p.in_array("title", ["rust", "sql", "missing"]).unwrap());
    assert_eq!(sorted(ids(&listed.load(&db).unwrap())), [3, 4]);

    let none = posts.r#where(p.in_array("id", Vec::<i64>::new()).unwrap());
    assert!(none.load(&db).unwrap().is_empty());

    let all = posts.r#where(p.not_in_array("id", Vec::<i64>::new()).unwrap());
    assert_eq!(all.load(&db).unwrap().len(), 5);

    let unedited = posts.r#where(p.equals("editor_id", Value::Null).unwrap());
    assert_eq!(sorted(ids(&unedited.load(&db).unwrap())), [1, 4, 5]);

    let unliked = posts.where_not(p.like("title", "%r%").unwrap());
    assert_eq!(sorted(ids(&unliked.load(&db).unwrap())), [4, 5]);
}

#[test]
fn limit_and_offset() {
    let db = blog_db();
    let posts = blog_registry()
        .relation("Post")
        .unwrap()
        .order("id", Direction::Asc)
        .unwrap();

    assert_eq!(ids(&posts.limit(2).offset(1).load(&db).unwrap()), [2, 3]);
    // Bare OFFSET needs SQLite's LIMIT -1
    let skipped = posts.offset(3);
    assert!(skipped.to_sql().unwrap().sql.ends_with("LIMIT -1 OFFSET ?"));
    assert_eq!(ids(&skipped.load(&db).unwrap()), [4, 5]);
}

#[test]
fn projections_and_plucking() {
    let db = blog_db();
    let posts = blog_registry()
        .relation("Post")
        .unwrap()
        .order("id", Direction::Asc)
        .unwrap();

    let rows = posts.select(["id", "title"]).unwrap().limit(1).load(&db).unwrap();
    assert_eq!(rows[0].columns(), ["id", "title"]);

    let titles = posts.pluck(&db, ["title"]).unwrap();
    assert_eq!(
        titles,
        ["intro", "draft", "rust", "sql", "wip"]
            .map(|t| vec![Value::from(t)])
            .to_vec()
    );

    let ids = posts.where_eq("published", false).unwrap().ids(&db).unwrap();
    assert_eq!(ids, [Value::Integer(2), Value::Integer(5)]);
}

#[test]
fn counting() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();

    assert_eq!(posts.count(&db).unwrap(), Count::Total(5));
    assert_eq!(posts.limit(2).count(&db).unwrap(), Count::Total(2));

    let commented = posts.joins(["comments"]).unwrap();
    assert_eq!(commented.count(&db).unwrap().total(), 4);
    assert_eq!(commented.distinct().count(&db).unwrap().total(), 3);

    let mut groups = posts
        .group(["author_id"])
        .unwrap()
        .count(&db)
        .unwrap()
        .groups()
        .unwrap()
        .to_vec();
    groups.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    assert_eq!(
        groups,
        [
            (vec![Value::Integer(1)], 3),
            (vec![Value::Integer(2)], 2)
        ]
    );
}

#[test]
fn having_filters_groups() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();
    let p = posts.predicates();
    let prolific = posts
        .group(["author_id"])
        .unwrap()
        .having(p.raw("COUNT(*) > ?", [2]).unwrap());

    assert_eq!(
        prolific.count(&db).unwrap(),
        Count::Grouped(vec![(vec![Value::Integer(1)], 3)])
    );
    assert_eq!(
        prolific.select(["author_id"]).unwrap().pluck(&db, ["author_id"]).unwrap(),
        [vec![Value::Integer(1)]]
    );
}

#[test]
fn exists() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();
    assert!(posts.exists(&db).unwrap());
    assert!(!posts.where_eq("title", "nope").unwrap().exists(&db).unwrap());
}

#[test]
fn values_are_bound_not_interpolated() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();
    let hostile = "x'; DROP TABLE posts; --";
    let query = posts.where_eq("title", hostile).unwrap();

    let compiled = query.to_sql().unwrap();
    assert!(!compiled.sql.contains("DROP"));
    assert_eq!(compiled.params, [Value::from(hostile)]);
    assert!(query.load(&db).unwrap().is_empty());
    assert_eq!(posts.count(&db).unwrap().total(), 5);
}
