use crate::compile::Projection;
use crate::error::{RelqError, Result};
use crate::expr::{ColumnRef, CompareOp, Predicate};
use crate::relation::{Direction, OrderTerm, Relation};
use crate::value::Value;

use super::{Executor, Row};

enum Cursor {
    /// Before the first batch, with an optional inclusive start key.
    Start(Option<Value>),
    /// After a batch whose last primary key was this value.
    After(Value),
    Done,
}

/// Primary-key ordered batches of a relation.
///
/// Each batch is one query of the form `pk > last_seen ORDER BY pk LIMIT n`,
/// so memory stays bounded by the batch size however large the result.
/// The iterator holds no shared state; dropping it stops the iteration.
pub struct Batches<'e, E: Executor + ?Sized> {
    relation: Relation,
    executor: &'e E,
    primary_key: ColumnRef,
    /// Position of the root key in an explicit projection. Without one the
    /// rows carry only root columns and the key is read by name.
    key_index: Option<usize>,
    batch_size: u64,
    cursor: Cursor,
    remaining: Option<u64>,
    offset: Option<u64>,
    index: usize,
}

impl<'e, E: Executor + ?Sized> Batches<'e, E> {
    pub(crate) fn new(
        relation: &Relation,
        executor: &'e E,
        batch_size: usize,
        start: Option<Value>,
    ) -> Self {
        let entity = relation.entity();
        let merged = relation.merged();
        if !merged.orders.is_empty() {
            crate::relq_warn!(entity.name(), "each_batch ignores custom order, batches are ordered by primary key");
        }

        let batch_size = match batch_size {
            0 => relation.registry().config().batch_size,
            n => n,
        };
        let primary_key = ColumnRef::root(entity.primary_key());
        let mut key_index = None;
        let projection = merged.projection.map(|mut columns| {
            let index = match columns.iter().position(|column| *column == primary_key) {
                Some(index) => index,
                None => {
                    columns.push(primary_key.clone());
                    columns.len() - 1
                }
            };
            key_index = Some(index);
            columns
        });

        let base = relation.derive(|c| {
            c.orders = vec![OrderTerm {
                column: primary_key.clone(),
                direction: Direction::Asc,
            }];
            c.reordered = true;
            if projection.is_some() {
                c.projection = projection;
            }
        });

        Self {
            relation: base,
            executor,
            primary_key,
            key_index,
            batch_size: u64::try_from(batch_size).unwrap_or(u64::MAX),
            cursor: Cursor::Start(start),
            remaining: merged.limit,
            offset: merged.offset,
            index: 0,
        }
    }

    fn fetch(&self, limit: u64) -> Result<Vec<Row>> {
        let bound = match &self.cursor {
            Cursor::Start(Some(start)) => Some((CompareOp::Gte, start.clone())),
            Cursor::After(last) => Some((CompareOp::Gt, last.clone())),
            Cursor::Start(None) | Cursor::Done => None,
        };
        let first = matches!(self.cursor, Cursor::Start(_));
        let offset = match self.offset {
            Some(offset) if first => Some(offset),
            // A default-scope offset would otherwise apply to every batch
            Some(_) => Some(0),
            None => None,
        };

        let primary_key = &self.primary_key;
        let relation = self.relation.derive(|c| {
            if let Some((op, value)) = bound {
                c.predicates.push(Predicate::Compare {
                    column: primary_key.clone(),
                    op,
                    value,
                });
            }
            c.limit = Some(limit);
            c.offset = offset;
        });
        relation.run(self.executor, Projection::Relation)
    }
}

impl<E: Executor + ?Sized> Iterator for Batches<'_, E> {
    type Item = Result<Vec<Row>>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.cursor, Cursor::Done) {
            return None;
        }
        let limit = match self.remaining {
            Some(0) => {
                self.cursor = Cursor::Done;
                return None;
            }
            Some(remaining) => remaining.min(self.batch_size),
            None => self.batch_size,
        };

        let rows = match self.fetch(limit) {
            Ok(rows) => rows,
            Err(err) => {
                self.cursor = Cursor::Done;
                return Some(Err(err));
            }
        };
        crate::relq_trace_batch!(self.relation.entity().name(), self.index, rows.len());
        self.index += 1;

        let Some(last) = rows.last() else {
            self.cursor = Cursor::Done;
            return None;
        };
        let fetched = rows.len() as u64;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(fetched);
        }
        if fetched < limit {
            self.cursor = Cursor::Done;
        } else {
            let key = match self.key_index {
                Some(index) => last.get_index(index),
                None => last.get(self.primary_key.column()),
            };
            let Some(key) = key else {
                self.cursor = Cursor::Done;
                return Some(Err(RelqError::Mapping(format!(
                    "batch rows lack primary key column `{}`",
                    self.primary_key.column()
                ))));
            };
            self.cursor = Cursor::After(key.clone());
        }
        Some(Ok(rows))
    }
}
