//! Immutable, chainable query descriptions.
//!
//! A [`Relation`] is a value: every chain method borrows the receiver and
//! returns a new relation, so a relation can be shared, reused as the base
//! of several queries, or handed across threads without locking. Nothing
//! touches the database until a terminal operation runs (see
//! [`crate::exec`]).

mod clauses;
mod scope;

use std::fmt;
use std::sync::Arc;

pub(crate) use clauses::Clauses;
pub use clauses::{Direction, OrderTerm};
pub use scope::Scope;

use crate::error::{Result, SchemaError};
use crate::expr::{ColumnRef, Predicate, PredicateBuilder};
use crate::join::{JoinPath, JoinPlanner, JoinRequest, JoinType};
use crate::schema::{Entity, SchemaRegistry};
use crate::value::Value;

/// A lazily evaluated query over one root entity.
///
/// Clauses contributed by the entity's default scope are kept apart from
/// the explicitly chained ones so that [`Relation::unscoped`] can strip them.
///
/// ```
/// use relq_core::schema::{ColumnType, Entity, SchemaRegistry};
/// use relq_core::Direction;
///
/// let mut registry = SchemaRegistry::new();
/// registry.register(
///     Entity::builder("Client")
///         .column("first_name", ColumnType::Text)
///         .column("orders_count", ColumnType::Integer)
///         .build(),
/// )?;
/// let registry = registry.finish()?;
///
/// let clients = registry.relation("Client")?;
/// let p = clients.predicates();
/// let query = clients
///     .r#where(p.gt("orders_count", 10)?)
///     .order("first_name", Direction::Asc)?
///     .limit(5);
///
/// assert_eq!(
///     query.to_sql()?.sql,
///     r#"SELECT * FROM "clients" WHERE "clients"."orders_count" > ? ORDER BY "clients"."first_name" ASC LIMIT ?"#
/// );
/// # Ok::<(), relq_core::RelqError>(())
/// ```
#[derive(Clone)]
pub struct Relation {
    registry: Arc<SchemaRegistry>,
    entity: Arc<Entity>,
    defaults: Arc<Clauses>,
    clauses: Clauses,
}

impl Relation {
    /// A fresh relation with the entity's default scope applied.
    pub fn new(registry: Arc<SchemaRegistry>, entity: Arc<Entity>) -> Result<Self> {
        let base = Self {
            registry,
            entity,
            defaults: Arc::default(),
            clauses: Clauses::default(),
        };
        let Some(default_scope) = base.entity.default_scope().cloned() else {
            return Ok(base);
        };
        let scoped = default_scope.apply(&base, &[])?;
        Ok(Self {
            defaults: Arc::new(scoped.clauses),
            ..base
        })
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// A predicate builder validating columns against the root entity.
    pub fn predicates(&self) -> PredicateBuilder<'_> {
        PredicateBuilder::new(&self.registry, &self.entity)
    }

    /// Default-scope clauses layered under the explicit ones.
    pub(crate) fn merged(&self) -> Clauses {
        Clauses::merged(&self.defaults, &self.clauses)
    }

    pub(crate) fn derive(&self, f: impl FnOnce(&mut Clauses)) -> Self {
        let mut next = self.clone();
        f(&mut next.clauses);
        next
    }

    fn columns<'c>(&self, columns: impl IntoIterator<Item = &'c str>) -> Result<Vec<ColumnRef>> {
        let p = self.predicates();
        columns.into_iter().map(|name| p.column(name)).collect()
    }

    // ==================== filtering ====================

    /// AND-appends a predicate. A top-level AND is appended child by child,
    /// so `where(and([a, b]))` and `where(a).where(b)` are the same relation.
    #[must_use]
    pub fn r#where(&self, predicate: Predicate) -> Self {
        self.derive(|c| match predicate {
            Predicate::And(children) => c.predicates.extend(children),
            other => c.predicates.push(other),
        })
    }

    /// AND-appends `NOT (predicate)`.
    #[must_use]
    pub fn where_not(&self, predicate: Predicate) -> Self {
        self.derive(|c| c.predicates.push(predicate.negate()))
    }

    /// Shorthand for `where(predicates().equals(column, value)?)`.
    pub fn where_eq(&self, column: &str, value: impl Into<Value>) -> Result<Self> {
        Ok(self.r#where(self.predicates().equals(column, value)?))
    }

    // ==================== ordering ====================

    /// Appends a sort key; earlier keys stay primary.
    pub fn order(&self, column: &str, direction: Direction) -> Result<Self> {
        let column = self.predicates().column(column)?;
        Ok(self.derive(|c| c.orders.push(OrderTerm { column, direction })))
    }

    /// Replaces every sort key, including those of the default scope.
    pub fn reorder(&self, column: &str, direction: Direction) -> Result<Self> {
        let column = self.predicates().column(column)?;
        Ok(self.derive(|c| {
            c.orders = vec![OrderTerm { column, direction }];
            c.reordered = true;
        }))
    }

    // ==================== shape ====================

    /// Replaces the projection.
    pub fn select<'c>(&self, columns: impl IntoIterator<Item = &'c str>) -> Result<Self> {
        let columns = self.columns(columns)?;
        Ok(self.derive(|c| c.projection = Some(columns)))
    }

    /// INNER JOINs association paths (`"comments"`, `"comments.guest"`).
    pub fn joins<P>(&self, paths: impl IntoIterator<Item = P>) -> Result<Self>
    where
        P: Into<JoinPath>,
    {
        self.add_joins(paths, JoinType::Inner)
    }

    /// LEFT OUTER JOINs association paths.
    pub fn left_joins<P>(&self, paths: impl IntoIterator<Item = P>) -> Result<Self>
    where
        P: Into<JoinPath>,
    {
        self.add_joins(paths, JoinType::Left)
    }

    fn add_joins<P>(&self, paths: impl IntoIterator<Item = P>, kind: JoinType) -> Result<Self>
    where
        P: Into<JoinPath>,
    {
        let planner = JoinPlanner::new(&self.registry, &self.entity);
        let mut requests = Vec::new();
        for path in paths {
            let path = path.into();
            planner.resolve_path(&path)?;
            requests.push(JoinRequest { path, kind });
        }
        Ok(self.derive(|c| {
            for request in requests {
                if !c.joins.contains(&request) {
                    c.joins.push(request);
                }
            }
        }))
    }

    pub fn group<'c>(&self, columns: impl IntoIterator<Item = &'c str>) -> Result<Self> {
        let columns = self.columns(columns)?;
        Ok(self.derive(|c| c.group.extend(columns)))
    }

    #[must_use]
    pub fn having(&self, predicate: Predicate) -> Self {
        self.derive(|c| c.having.push(predicate))
    }

    #[must_use]
    pub fn limit(&self, n: u64) -> Self {
        self.derive(|c| c.limit = Some(n))
    }

    #[must_use]
    pub fn offset(&self, n: u64) -> Self {
        self.derive(|c| c.offset = Some(n))
    }

    #[must_use]
    pub fn distinct(&self) -> Self {
        self.derive(|c| c.distinct = true)
    }

    // ==================== scopes ====================

    /// Drops every clause contributed by the default scope. Explicitly
    /// chained clauses, before or after this call, are kept.
    #[must_use]
    pub fn unscoped(&self) -> Self {
        Self {
            defaults: Arc::default(),
            ..self.clone()
        }
    }

    /// Applies a named scope of the root entity.
    pub fn scope(&self, name: &str, args: &[Value]) -> Result<Self> {
        let scope = self
            .entity
            .scope(name)
            .ok_or_else(|| SchemaError::UnknownScope {
                entity: self.entity.name().to_string(),
                scope: name.to_string(),
            })?;
        scope.apply(self, args)
    }

    pub fn apply(&self, scope: &Scope, args: &[Value]) -> Result<Self> {
        scope.apply(self, args)
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("entity", &self.entity.name())
            .field("defaults", &self.defaults)
            .field("clauses", &self.clauses)
            .finish()
    }
}
