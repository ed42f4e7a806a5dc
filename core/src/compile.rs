//! Relation → SQL compilation.
//!
//! Compilation is a pure function of the relation: it never touches the
//! database and compiling the same relation twice yields identical output.

use std::fmt;

use crate::dialect::Dialect;
use crate::error::{CompileError, Result};
use crate::expr::{ColumnRef, ColumnResolver, Predicate};
use crate::join::{JoinPlan, JoinPlanner};
use crate::relation::{Clauses, Relation};
use crate::sql::{SQL, SQLChunk, Token};
use crate::value::Value;

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: Dialect,
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// What a compiled statement selects.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Projection {
    /// The relation's own projection (`*` by default).
    Relation,
    /// Exactly these columns, for `pluck` and `ids`.
    Columns(Vec<ColumnRef>),
    /// `COUNT(*)`, or group columns plus `COUNT(*)` when grouped.
    Count,
    /// A constant, for `exists`.
    One,
}

/// Resolves columns against the root table and the planned join aliases.
struct Aliases<'a> {
    root_table: &'a str,
    joins: &'a JoinPlan,
}

impl ColumnResolver for Aliases<'_> {
    fn column_sql(&self, column: &ColumnRef) -> std::result::Result<SQL, CompileError> {
        if column.is_root() {
            return Ok(SQL::qualified(
                self.root_table.to_string(),
                column.column().to_string(),
            ));
        }
        let alias = self
            .joins
            .alias_for(column.path())
            .ok_or_else(|| CompileError::MissingJoin {
                path: column.path().join("."),
            })?;
        Ok(SQL::qualified(alias.to_string(), column.column().to_string()))
    }
}

impl Relation {
    /// Compiles the relation without executing it.
    pub fn to_sql(&self) -> Result<CompiledQuery> {
        self.compile(Projection::Relation)
    }

    /// The compiled SQL followed by its parameters, for inspection.
    pub fn explain(&self) -> Result<String> {
        let compiled = self.to_sql()?;
        let params = compiled
            .params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("{}\n-- params: [{params}]", compiled.sql))
    }

    pub(crate) fn compile(&self, projection: Projection) -> Result<CompiledQuery> {
        let dialect = self.registry().dialect();
        let (sql, params) = self.compile_sql(projection)?.build(dialect);
        Ok(CompiledQuery {
            sql,
            params,
            dialect,
        })
    }

    fn compile_sql(&self, projection: Projection) -> Result<SQL> {
        let clauses = self.merged();
        let entity = self.entity();

        if !clauses.having.is_empty() && clauses.group.is_empty() {
            return Err(CompileError::EmptyRelation {
                entity: entity.name().to_string(),
                reason: "HAVING without GROUP BY".into(),
            }
            .into());
        }
        if clauses.projection.as_ref().is_some_and(Vec::is_empty) {
            return Err(CompileError::EmptyRelation {
                entity: entity.name().to_string(),
                reason: "empty projection".into(),
            }
            .into());
        }

        let joins = JoinPlanner::new(self.registry(), entity).plan(&clauses.joins)?;
        let aliases = Aliases {
            root_table: entity.table(),
            joins: &joins,
        };
        let statement = Statement {
            clauses: &clauses,
            aliases: &aliases,
            dialect: self.registry().dialect(),
        };

        let sql = match projection {
            Projection::Relation => {
                let list = statement.relation_list()?;
                statement.select(list, clauses.distinct, Tail::Full)?
            }
            Projection::Columns(columns) => {
                let list = statement.column_list(&columns)?;
                statement.select(list, clauses.distinct, Tail::Full)?
            }
            Projection::One => statement.select(SQL::raw("1"), false, Tail::Full)?,
            Projection::Count if !clauses.group.is_empty() => {
                let list = statement
                    .column_list(&clauses.group)?
                    .push(Token::COMMA)
                    .append(SQL::raw("COUNT(*)"));
                statement.select(list, false, Tail::Full)?
            }
            Projection::Count
                if clauses.distinct || clauses.limit.is_some() || clauses.offset.is_some() =>
            {
                let inner = statement.select(statement.relation_list()?, clauses.distinct, Tail::Full)?;
                SQL::token(Token::SELECT)
                    .append(SQL::raw("COUNT(*)"))
                    .push(Token::FROM)
                    .append(inner.parens())
                    .append(SQL::ident("counted"))
            }
            Projection::Count => statement.select(SQL::raw("COUNT(*)"), false, Tail::Unordered)?,
        };
        Ok(sql)
    }
}

/// Which trailing clauses a SELECT carries.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Tail {
    /// ORDER BY, LIMIT and OFFSET.
    Full,
    /// None of them.
    Unordered,
}

struct Statement<'a> {
    clauses: &'a Clauses,
    aliases: &'a Aliases<'a>,
    dialect: Dialect,
}

impl Statement<'_> {
    /// `*` without joins, `"root".*` with joins, or the explicit projection.
    fn relation_list(&self) -> Result<SQL> {
        match &self.clauses.projection {
            Some(columns) => self.column_list(columns),
            None if self.aliases.joins.is_empty() => Ok(SQL::token(Token::STAR)),
            None => Ok(SQL::ident(self.aliases.root_table.to_string())
                .push(Token::DOT)
                .push(Token::STAR)),
        }
    }

    fn column_list(&self, columns: &[ColumnRef]) -> Result<SQL> {
        let columns = columns
            .iter()
            .map(|column| self.aliases.column_sql(column))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(SQL::join(columns, Token::COMMA))
    }

    fn predicates(&self, predicates: &[Predicate]) -> Result<SQL> {
        let parts = predicates
            .iter()
            .map(|predicate| predicate.to_sql(self.aliases))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(SQL::join(parts, Token::AND))
    }

    fn select(&self, list: SQL, distinct: bool, tail: Tail) -> Result<SQL> {
        let clauses = self.clauses;
        let mut sql = SQL::token(Token::SELECT);
        if distinct {
            sql.push_mut(Token::DISTINCT);
        }
        sql.append_mut(list);
        sql.push_mut(Token::FROM);
        sql.append_mut(SQL::ident(self.aliases.root_table.to_string()));
        sql.append_mut(self.aliases.joins.to_sql());

        if !clauses.predicates.is_empty() {
            sql.push_mut(Token::WHERE);
            sql.append_mut(self.predicates(&clauses.predicates)?);
        }
        if !clauses.group.is_empty() {
            sql.append_mut(SQL::from_iter([Token::GROUP, Token::BY]));
            sql.append_mut(self.column_list(&clauses.group)?);
        }
        if !clauses.having.is_empty() {
            sql.push_mut(Token::HAVING);
            sql.append_mut(self.predicates(&clauses.having)?);
        }
        if tail == Tail::Unordered {
            return Ok(sql);
        }

        if !clauses.orders.is_empty() {
            let terms = clauses
                .orders
                .iter()
                .map(|term| {
                    self.aliases
                        .column_sql(&term.column)
                        .map(|column| column.push(term.direction.token()))
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            sql.append_mut(SQL::from_iter([Token::ORDER, Token::BY]));
            sql.append_mut(SQL::join(terms, Token::COMMA));
        }
        match (clauses.limit, clauses.offset) {
            (Some(limit), offset) => {
                sql.push_mut(Token::LIMIT);
                sql.push_mut(SQLChunk::Param(count_value(limit)));
                if let Some(offset) = offset {
                    sql.push_mut(Token::OFFSET);
                    sql.push_mut(SQLChunk::Param(count_value(offset)));
                }
            }
            (None, Some(offset)) => {
                if let Some(unbounded) = self.dialect.unbounded_limit() {
                    sql.push_mut(Token::LIMIT);
                    sql.push_mut(SQLChunk::raw_static(unbounded));
                }
                sql.push_mut(Token::OFFSET);
                sql.push_mut(SQLChunk::Param(count_value(offset)));
            }
            (None, None) => {}
        }
        Ok(sql)
    }
}

fn count_value(n: u64) -> Value {
    Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}
