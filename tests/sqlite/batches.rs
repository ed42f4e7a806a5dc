use relq::prelude::*;

use crate::common::{blog_db, blog_registry, clients_db, clients_registry, ids};

fn batch_ids<E: Executor>(relation: &Relation, db: &E, size: usize, start: Option<Value>) -> Vec<Vec<i64>> {
    relation
        .each_batch(db, size, start)
        .map(|batch| ids(&batch.unwrap()))
        .collect()
}

#[test]
fn batches_partition_the_relation_by_primary_key() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();

    let batches = batch_ids(&posts, &db, 2, None);
    assert_eq!(batches, [vec![1, 2], vec![3, 4], vec![5]]);

    let flattened: Vec<i64> = batches.into_iter().flatten().collect();
    assert_eq!(flattened, ids(&posts.first_n(&db, 5).unwrap()));
}

#[test]
fn exact_multiple_ends_with_an_empty_probe() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();
    let batches = batch_ids(&posts.where_eq("published", true).unwrap(), &db, 3, None);
    assert_eq!(batches, [vec![1, 3, 4]]);
}

#[test]
fn start_is_inclusive() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();
    assert_eq!(
        batch_ids(&posts, &db, 2, Some(Value::Integer(3))),
        [vec![3, 4], vec![5]]
    );
}

#[test]
fn filters_and_limits_are_honored() {
    let db = blog_db();
    let posts = blog_registry().relation("Post").unwrap();

    let published = posts.where_eq("published", true).unwrap();
    assert_eq!(batch_ids(&published, &db, 2, None), [vec![1, 3], vec![4]]);

    assert_eq!(batch_ids(&posts.limit(3), &db, 2, None), [vec![1, 2], vec![3]]);
    assert_eq!(
        batch_ids(&posts.offset(1).limit(3), &db, 2, None),
        [vec![2, 3], vec![4]]
    );
}

#[test]
fn custom_order_is_replaced_by_primary_key() {
    let db = blog_db();
    let posts = blog_registry()
        .relation("Post")
        .unwrap()
        .order("title", Direction::Desc)
        .unwrap();
    assert_eq!(
        batch_ids(&posts, &db, 4, None),
        [vec![1, 2, 3, 4], vec![5]]
    );
}

#[test]
fn zero_uses_the_configured_batch_size() {
    let db = clients_db();
    let clients = clients_registry().relation("Client").unwrap();
    // batch_size = 2 in the fixture; client 3 is removed by the default scope
    assert_eq!(batch_ids(&clients, &db, 0, None), [vec![1, 2], vec![4]]);
    assert_eq!(
        batch_ids(&clients.unscoped(), &db, 0, None),
        [vec![1, 2], vec![3, 4]]
    );
}

#[test]
fn projections_keep_the_primary_key() {
    let db = blog_db();
    let titles = blog_registry()
        .relation("Post")
        .unwrap()
        .select(["title"])
        .unwrap();
    let batches: Vec<Vec<Row>> = titles
        .each_batch(&db, 3, None)
        .collect::<relq::Result<_>>()
        .unwrap();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0][0].columns(), ["title", "id"]);
}

#[test]
fn joined_id_columns_do_not_move_the_cursor() {
    let db = blog_db();
    // Comment ids well above the post ids they belong to
    db.execute_batch(
        "INSERT INTO comments (id, post_id, guest_id, body) VALUES
             (10, 2, NULL, 'late'),
             (11, 5, NULL, 'later');",
    )
    .unwrap();
    let posts = blog_registry().relation("Post").unwrap();
    let comment_ids = posts
        .joins(["comments"])
        .unwrap()
        .select(["comments.id"])
        .unwrap();

    let batches: Vec<Vec<(i64, i64)>> = comment_ids
        .each_batch(&db, 2, None)
        .map(|batch| {
            let mut pairs: Vec<(i64, i64)> = batch
                .unwrap()
                .iter()
                .map(|row| {
                    let comment = row.get_index(0).unwrap().convert::<i64>().unwrap();
                    let post = row.get_index(1).unwrap().convert::<i64>().unwrap();
                    (comment, post)
                })
                .collect();
            pairs.sort_unstable();
            pairs
        })
        .collect();
    assert_eq!(
        batches,
        [
            vec![(1, 1), (2, 1)],
            vec![(10, 2), (3, 3)],
            vec![(4, 4), (11, 5)],
        ]
    );
}

#[test]
fn errors_end_the_iteration() {
    let db = blog_db();
    db.execute_batch("DROP TABLE posts").unwrap();
    let posts = blog_registry().relation("Post").unwrap();
    let mut batches = posts.each_batch(&db, 2, None);
    assert!(matches!(batches.next(), Some(Err(RelqError::Execution(_)))));
    assert!(batches.next().is_none());
}
