//! Core of relq: schema metadata, predicates, relations and the SQL they
//! compile to.
//!
//! Relations are immutable values. Chaining builds a new relation, and no
//! statement runs until a terminal operation hands the compiled SQL to an
//! [`Executor`].

pub mod compile;
pub mod config;
pub mod dialect;
pub mod error;
pub mod exec;
pub mod expr;
pub mod join;
pub mod relation;
pub mod schema;
pub mod sql;
mod tracing;
pub mod value;

// Re-export key types and traits
pub use compile::CompiledQuery;
pub use config::EngineConfig;
pub use dialect::Dialect;
pub use error::{
    AssociationError, CompileError, ConfigError, ExecutionError, RelqError, Result, SchemaError,
};
pub use exec::{Batches, Count, Executor, FindOrInitialize, NewRecord, Row};
pub use expr::{
    ColumnRef, ColumnResolver, CompareOp, Predicate, PredicateBuilder, RawFragment, and, not, or,
};
pub use join::{JoinPath, JoinPlan, JoinPlanner, JoinType};
pub use relation::{Direction, OrderTerm, Relation, Scope};
pub use schema::{Association, AssociationKind, Column, ColumnType, Entity, SchemaRegistry};
pub use sql::{SQL, SQLChunk, Token};
pub use value::{FromValue, Value};
