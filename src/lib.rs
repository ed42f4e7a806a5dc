//! # relq
//!
//! An association-aware, lazily evaluated relational query builder.
//!
//! Entities and their associations are registered once in a
//! [`SchemaRegistry`]. Queries are immutable [`Relation`] values built by
//! chaining; each step returns a new relation and the receiver stays usable.
//! Nothing runs until a terminal operation (`load`, `first`, `count`,
//! `each_batch`, ...) hands the compiled SQL to an [`Executor`].
//!
//! ## Quick Start
//!
//! ```rust
//! use relq::prelude::*;
//! use relq::sqlite::SqliteExecutor;
//!
//! # fn main() -> relq::Result<()> {
//! let mut registry = SchemaRegistry::new();
//! registry.register(
//!     Entity::builder("Post")
//!         .column("title", ColumnType::Text)
//!         .column("published", ColumnType::Boolean)
//!         .association(Association::has_many("comments", "Comment").inverse_of("post"))
//!         .scope("published", Scope::raw("published = 1"))
//!         .build(),
//! )?;
//! registry.register(
//!     Entity::builder("Comment")
//!         .column("post_id", ColumnType::Integer)
//!         .column("body", ColumnType::Text)
//!         .association(Association::belongs_to("post", "Post").inverse_of("comments"))
//!         .build(),
//! )?;
//! let registry = registry.finish()?;
//!
//! let db = SqliteExecutor::open_in_memory()?;
//! db.execute_batch(
//!     "CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT, published INTEGER);
//!      CREATE TABLE comments (id INTEGER PRIMARY KEY, post_id INTEGER, body TEXT);
//!      INSERT INTO posts (title, published) VALUES ('draft', 0), ('hello', 1);
//!      INSERT INTO comments (post_id, body) VALUES (2, 'first!');",
//! )?;
//!
//! let posts = registry.relation("Post")?;
//! let commented = posts
//!     .scope("published", &[])?
//!     .joins(["comments"])?
//!     .distinct();
//!
//! let rows = commented.load(&db)?;
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].get_as::<String>("title")?, "hello");
//! assert_eq!(posts.count(&db)?.total(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Database Support
//!
//! | Database   | Driver   | Feature Flag | Status |
//! |------------|----------|--------------|--------|
//! | SQLite     | rusqlite | `rusqlite`   | ✅     |
//! | PostgreSQL | any      | (compile only, bring an [`Executor`]) | ✅ |
//! | MySQL      | any      | (compile only, bring an [`Executor`]) | ✅ |

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use relq_core::*;

/// SQLite execution through rusqlite.
#[cfg(feature = "rusqlite")]
pub mod sqlite {
    pub use relq_sqlite::{SqliteExecutor, rusqlite, values};
}

/// Everything needed to declare a schema and build relations.
pub mod prelude {
    pub use relq_core::schema::{
        Association, AssociationKind, Column, ColumnType, Entity, JoinTable, SchemaDefinition,
        SchemaRegistry,
    };
    pub use relq_core::{
        Count, Dialect, Direction, EngineConfig, Executor, FindOrInitialize, JoinType, Predicate,
        Relation, RelqError, Row, Scope, Value, and, not, or,
    };

    #[cfg(feature = "rusqlite")]
    pub use relq_sqlite::SqliteExecutor;
}
