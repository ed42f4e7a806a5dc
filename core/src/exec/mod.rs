//! Terminal operations: the only place a relation touches the database.
//!
//! Every method here compiles the relation, hands the SQL and parameters to
//! an [`Executor`] and maps the returned rows. None of them changes the
//! relation it is called on.

mod batch;
mod row;

use std::sync::Arc;

pub use batch::Batches;
pub use row::Row;

use crate::compile::Projection;
use crate::error::{ExecutionError, RelqError, Result};
use crate::expr::{ColumnRef, CompareOp, Predicate};
use crate::relation::{Direction, OrderTerm, Relation};
use crate::value::Value;

/// The database collaborator: runs one statement and returns its rows.
///
/// Connections, transactions and retries are the implementor's concern.
pub trait Executor {
    fn execute(&self, sql: &str, params: &[Value]) -> std::result::Result<Vec<Row>, ExecutionError>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, sql: &str, params: &[Value]) -> std::result::Result<Vec<Row>, ExecutionError> {
        (**self).execute(sql, params)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&self, sql: &str, params: &[Value]) -> std::result::Result<Vec<Row>, ExecutionError> {
        (**self).execute(sql, params)
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, sql: &str, params: &[Value]) -> std::result::Result<Vec<Row>, ExecutionError> {
        (**self).execute(sql, params)
    }
}

/// Result of [`Relation::count`].
#[derive(Debug, Clone, PartialEq)]
pub enum Count {
    Total(u64),
    /// One entry per group: the group column values and the group's count.
    Grouped(Vec<(Vec<Value>, u64)>),
}

impl Count {
    /// The total, summing groups when grouped.
    pub fn total(&self) -> u64 {
        match self {
            Count::Total(n) => *n,
            Count::Grouped(groups) => groups.iter().map(|(_, n)| n).sum(),
        }
    }

    pub fn groups(&self) -> Option<&[(Vec<Value>, u64)]> {
        match self {
            Count::Total(_) => None,
            Count::Grouped(groups) => Some(groups),
        }
    }
}

/// An unsaved record built by [`Relation::find_or_initialize_by`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    entity: String,
    attributes: Vec<(String, Value)>,
}

impl NewRecord {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn attributes(&self) -> &[(String, Value)] {
        &self.attributes
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find_map(|(name, value)| (name == column).then_some(value))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FindOrInitialize {
    Found(Row),
    Initialized(NewRecord),
}

impl FindOrInitialize {
    pub fn is_new(&self) -> bool {
        matches!(self, FindOrInitialize::Initialized(_))
    }
}

fn count_from(value: Option<&Value>) -> Result<u64> {
    match value {
        Some(Value::Integer(n)) => u64::try_from(*n)
            .map_err(|_| RelqError::Mapping(format!("negative count {n}"))),
        Some(other) => Err(RelqError::Mapping(format!(
            "expected INTEGER count, got {}",
            other.kind()
        ))),
        None => Ok(0),
    }
}

impl Relation {
    pub(crate) fn run<E: Executor + ?Sized>(
        &self,
        executor: &E,
        projection: Projection,
    ) -> Result<Vec<Row>> {
        let compiled = self.compile(projection)?;
        crate::relq_trace_query!(compiled.sql, compiled.params.len());
        Ok(executor.execute(&compiled.sql, &compiled.params)?)
    }

    fn primary_key(&self) -> ColumnRef {
        ColumnRef::root(self.entity().primary_key())
    }

    /// Every row of the relation.
    pub fn load<E: Executor + ?Sized>(&self, executor: &E) -> Result<Vec<Row>> {
        self.run(executor, Projection::Relation)
    }

    /// The first row by the relation's order, or by primary key if unordered.
    pub fn first<E: Executor + ?Sized>(&self, executor: &E) -> Result<Option<Row>> {
        Ok(self.first_n(executor, 1)?.into_iter().next())
    }

    pub fn first_n<E: Executor + ?Sized>(&self, executor: &E, n: u64) -> Result<Vec<Row>> {
        let relation = if self.merged().orders.is_empty() {
            let primary_key = self.primary_key();
            self.derive(|c| {
                c.orders.push(OrderTerm {
                    column: primary_key,
                    direction: Direction::Asc,
                })
            })
        } else {
            self.clone()
        };
        relation.limit(n).load(executor)
    }

    /// The last row: every sort key reversed (primary key descending if
    /// unordered).
    pub fn last<E: Executor + ?Sized>(&self, executor: &E) -> Result<Option<Row>> {
        Ok(self.last_n(executor, 1)?.pop())
    }

    /// The last `n` rows, returned in the relation's natural order.
    pub fn last_n<E: Executor + ?Sized>(&self, executor: &E, n: u64) -> Result<Vec<Row>> {
        let orders = self.merged().orders;
        let reversed = if orders.is_empty() {
            vec![OrderTerm {
                column: self.primary_key(),
                direction: Direction::Desc,
            }]
        } else {
            orders
                .into_iter()
                .map(|term| OrderTerm {
                    direction: term.direction.reverse(),
                    ..term
                })
                .collect()
        };
        let relation = self.derive(|c| {
            c.orders = reversed;
            c.reordered = true;
        });
        let mut rows = relation.limit(n).load(executor)?;
        rows.reverse();
        Ok(rows)
    }

    /// Any row, without adding an order.
    pub fn take<E: Executor + ?Sized>(&self, executor: &E) -> Result<Option<Row>> {
        Ok(self.take_n(executor, 1)?.into_iter().next())
    }

    pub fn take_n<E: Executor + ?Sized>(&self, executor: &E, n: u64) -> Result<Vec<Row>> {
        self.limit(n).load(executor)
    }

    /// Row count; per group when the relation is grouped.
    pub fn count<E: Executor + ?Sized>(&self, executor: &E) -> Result<Count> {
        let rows = self.run(executor, Projection::Count)?;
        let group_width = self.merged().group.len();
        if group_width == 0 {
            return Ok(Count::Total(count_from(
                rows.first().and_then(|row| row.get_index(0)),
            )?));
        }
        rows.into_iter()
            .map(|row| {
                let count = count_from(row.get_index(group_width))?;
                let mut values = row.into_values();
                values.truncate(group_width);
                Ok((values, count))
            })
            .collect::<Result<Vec<_>>>()
            .map(Count::Grouped)
    }

    /// Values of the given (possibly dotted) columns, one vector per row.
    pub fn pluck<'c, E: Executor + ?Sized>(
        &self,
        executor: &E,
        columns: impl IntoIterator<Item = &'c str>,
    ) -> Result<Vec<Vec<Value>>> {
        let p = self.predicates();
        let columns = columns
            .into_iter()
            .map(|name| p.column(name))
            .collect::<Result<Vec<_>>>()?;
        let rows = self.run(executor, Projection::Columns(columns))?;
        Ok(rows.into_iter().map(Row::into_values).collect())
    }

    /// Primary keys of every row.
    pub fn ids<E: Executor + ?Sized>(&self, executor: &E) -> Result<Vec<Value>> {
        let rows = self.run(executor, Projection::Columns(vec![self.primary_key()]))?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_values().into_iter().next())
            .collect())
    }

    pub fn exists<E: Executor + ?Sized>(&self, executor: &E) -> Result<bool> {
        let rows = self.limit(1).run(executor, Projection::One)?;
        Ok(!rows.is_empty())
    }

    /// The row with this primary key, or `RecordNotFound`.
    pub fn find<E: Executor + ?Sized>(&self, executor: &E, id: impl Into<Value>) -> Result<Row> {
        let id = id.into();
        let predicate = Predicate::Compare {
            column: self.primary_key(),
            op: CompareOp::Eq,
            value: id.clone(),
        };
        self.r#where(predicate)
            .take(executor)?
            .ok_or_else(|| RelqError::RecordNotFound {
                entity: self.entity().name().to_string(),
                key: format!("{}={id}", self.entity().primary_key()),
            })
    }

    pub fn find_by<E: Executor + ?Sized>(
        &self,
        executor: &E,
        predicate: Predicate,
    ) -> Result<Option<Row>> {
        self.r#where(predicate).take(executor)
    }

    /// The first row matching `attributes`, or an unsaved record carrying
    /// the relation's equality conditions plus `attributes`. Never writes.
    pub fn find_or_initialize_by<'c, E, V>(
        &self,
        executor: &E,
        attributes: impl IntoIterator<Item = (&'c str, V)>,
    ) -> Result<FindOrInitialize>
    where
        E: Executor + ?Sized,
        V: Into<Value>,
    {
        let mut relation = self.clone();
        for (column, value) in attributes {
            relation = relation.where_eq(column, value)?;
        }
        if let Some(row) = relation.first(executor)? {
            return Ok(FindOrInitialize::Found(row));
        }

        let mut attributes = Vec::new();
        for predicate in &relation.merged().predicates {
            predicate.collect_equalities(&mut attributes);
        }
        Ok(FindOrInitialize::Initialized(NewRecord {
            entity: self.entity().name().to_string(),
            attributes,
        }))
    }

    /// Primary-key ordered batches of at most `batch_size` rows (the
    /// configured default when 0), starting at `start` inclusive if given.
    pub fn each_batch<'e, E: Executor + ?Sized>(
        &self,
        executor: &'e E,
        batch_size: usize,
        start: Option<Value>,
    ) -> Batches<'e, E> {
        Batches::new(self, executor, batch_size, start)
    }
}
