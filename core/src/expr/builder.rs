use crate::error::{AssociationError, Result, SchemaError};
use crate::schema::{Entity, SchemaRegistry};
use crate::value::Value;

use super::{ColumnRef, CompareOp, Predicate};

/// Builds predicates whose columns are validated against an entity.
///
/// A column is either a plain name on the entity (`"title"`) or a dotted path
/// through declared associations (`"comments.guest.name"`). Unknown names fail
/// with [`SchemaError::UnknownColumn`], unresolvable path segments with
/// [`AssociationError::BrokenAssociationPath`].
///
/// ```
/// use relq_core::schema::{ColumnType, Entity, SchemaRegistry};
///
/// let mut registry = SchemaRegistry::new();
/// registry.register(Entity::builder("Client").column("first_name", ColumnType::Text).build())?;
///
/// let p = registry.predicates("Client")?;
/// let by_name = p.equals("first_name", "John")?;
/// assert!(p.equals("last_name", "Doe").is_err());
/// # let _ = by_name;
/// # Ok::<(), relq_core::RelqError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PredicateBuilder<'r> {
    registry: &'r SchemaRegistry,
    entity: &'r Entity,
}

impl<'r> PredicateBuilder<'r> {
    pub fn new(registry: &'r SchemaRegistry, entity: &'r Entity) -> Self {
        Self { registry, entity }
    }

    pub fn entity(&self) -> &'r Entity {
        self.entity
    }

    /// Parses and validates a (possibly dotted) column name.
    pub fn column(&self, name: &str) -> Result<ColumnRef> {
        let column = ColumnRef::parse(name);
        let owner = walk(self.registry, self.entity, column.path())?;
        if !owner.has_column(column.column()) {
            return Err(SchemaError::UnknownColumn {
                entity: owner.name().to_string(),
                column: column.column().to_string(),
            }
            .into());
        }
        Ok(column)
    }

    /// `column = value`; a NULL value compiles to `IS NULL`.
    pub fn equals(&self, column: &str, value: impl Into<Value>) -> Result<Predicate> {
        self.compare(column, CompareOp::Eq, value.into())
    }

    /// `column <> value`; a NULL value compiles to `IS NOT NULL`.
    pub fn not_equals(&self, column: &str, value: impl Into<Value>) -> Result<Predicate> {
        self.compare(column, CompareOp::NotEq, value.into())
    }

    pub fn gt(&self, column: &str, value: impl Into<Value>) -> Result<Predicate> {
        self.compare(column, CompareOp::Gt, value.into())
    }

    pub fn gte(&self, column: &str, value: impl Into<Value>) -> Result<Predicate> {
        self.compare(column, CompareOp::Gte, value.into())
    }

    pub fn lt(&self, column: &str, value: impl Into<Value>) -> Result<Predicate> {
        self.compare(column, CompareOp::Lt, value.into())
    }

    pub fn lte(&self, column: &str, value: impl Into<Value>) -> Result<Predicate> {
        self.compare(column, CompareOp::Lte, value.into())
    }

    pub fn like(&self, column: &str, pattern: impl Into<String>) -> Result<Predicate> {
        self.compare(column, CompareOp::Like, Value::Text(pattern.into()))
    }

    pub fn is_null(&self, column: &str) -> Result<Predicate> {
        Ok(Predicate::Null {
            column: self.column(column)?,
            negated: false,
        })
    }

    pub fn is_not_null(&self, column: &str) -> Result<Predicate> {
        Ok(Predicate::Null {
            column: self.column(column)?,
            negated: true,
        })
    }

    /// `column IN (...)`. An empty list matches nothing.
    pub fn in_array<I>(&self, column: &str, values: I) -> Result<Predicate>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Ok(Predicate::In {
            column: self.column(column)?,
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        })
    }

    /// `column NOT IN (...)`. An empty list matches everything.
    pub fn not_in_array<I>(&self, column: &str, values: I) -> Result<Predicate>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Ok(Predicate::In {
            column: self.column(column)?,
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        })
    }

    /// `column BETWEEN low AND high`, both ends inclusive.
    pub fn range(
        &self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Result<Predicate> {
        Ok(Predicate::Range {
            column: self.column(column)?,
            low: low.into(),
            high: high.into(),
        })
    }

    /// Same as [`Predicate::raw`]; the template is not checked against the entity.
    pub fn raw<I>(&self, template: &str, params: I) -> Result<Predicate>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Ok(Predicate::raw(template, params)?)
    }

    fn compare(&self, column: &str, op: CompareOp, value: Value) -> Result<Predicate> {
        let column = self.column(column)?;
        Ok(match (op, value) {
            (CompareOp::Eq, Value::Null) => Predicate::Null {
                column,
                negated: false,
            },
            (CompareOp::NotEq, Value::Null) => Predicate::Null {
                column,
                negated: true,
            },
            (op, value) => Predicate::Compare { column, op, value },
        })
    }
}

/// Follows `path` through associations starting at `root`.
pub(crate) fn walk<'r>(
    registry: &'r SchemaRegistry,
    root: &'r Entity,
    path: &[String],
) -> Result<&'r Entity> {
    let mut current = root;
    for segment in path {
        let Some(association) = current.association(segment) else {
            return Err(AssociationError::BrokenAssociationPath {
                entity: current.name().to_string(),
                path: path.join("."),
                segment: segment.clone(),
            }
            .into());
        };
        current = registry.resolve(association.target())?;
    }
    Ok(current)
}
