//! Association-aware join planning.
//!
//! A relation records which association paths it joins; the planner walks
//! those paths through the schema registry and produces ordered JOIN clauses
//! with unique table aliases.

use std::sync::Arc;

use crate::error::{AssociationError, Result};
use crate::schema::{AssociationKind, Entity, SchemaRegistry};
use crate::sql::{SQL, Token};

// =============================================================================
// Join Type Enum
// =============================================================================

/// The type of JOIN operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum JoinType {
    #[default]
    Inner,
    /// LEFT OUTER JOIN
    Left,
}

impl JoinType {
    fn to_sql(self) -> SQL {
        match self {
            JoinType::Inner => SQL::from_iter([Token::INNER, Token::JOIN]),
            JoinType::Left => SQL::from_iter([Token::LEFT, Token::OUTER, Token::JOIN]),
        }
    }
}

// =============================================================================
// Join paths
// =============================================================================

/// A sequence of association names walked from the root entity.
///
/// Converts from dotted strings (`"comments.guest"`) and from arrays or
/// vectors of segments (`["comments", "guest"]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinPath(Vec<String>);

impl JoinPath {
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for JoinPath {
    fn from(value: &str) -> Self {
        Self(value.split('.').map(str::to_string).collect())
    }
}

impl From<String> for JoinPath {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl<const N: usize> From<[&str; N]> for JoinPath {
    fn from(value: [&str; N]) -> Self {
        Self(value.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[&str]> for JoinPath {
    fn from(value: &[&str]) -> Self {
        Self(value.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for JoinPath {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

/// A path the relation asked to join, with its join type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinRequest {
    pub path: JoinPath,
    pub kind: JoinType,
}

// =============================================================================
// Join clauses
// =============================================================================

/// `left_alias.left_column = right_alias.right_column`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCondition {
    pub left_alias: String,
    pub left_column: String,
    pub right_alias: String,
    pub right_column: String,
}

impl JoinCondition {
    fn new(
        left_alias: &str,
        left_column: impl Into<String>,
        right_alias: &str,
        right_column: impl Into<String>,
    ) -> Self {
        Self {
            left_alias: left_alias.to_string(),
            left_column: left_column.into(),
            right_alias: right_alias.to_string(),
            right_column: right_column.into(),
        }
    }

    fn to_sql(&self) -> SQL {
        SQL::qualified(self.left_alias.clone(), self.left_column.clone())
            .push(Token::EQ)
            .append(SQL::qualified(
                self.right_alias.clone(),
                self.right_column.clone(),
            ))
    }
}

/// One JOIN of the planned statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    /// Association path this clause reaches. Join-table hops of a
    /// many-to-many share the path of the target they lead to.
    pub path: Vec<String>,
    pub kind: JoinType,
    pub table: String,
    pub alias: String,
    pub on: JoinCondition,
    /// Whether this is the join-table hop of a many-to-many.
    pub through: bool,
}

impl JoinClause {
    /// `INNER JOIN "table" ["alias"] ON ...`
    pub fn to_sql(&self) -> SQL {
        let mut sql = self.kind.to_sql().append(SQL::ident(self.table.clone()));
        if self.alias != self.table {
            sql.append_mut(SQL::ident(self.alias.clone()));
        }
        sql.push(Token::ON).append(self.on.to_sql())
    }
}

/// Ordered JOIN clauses plus the alias chosen for every association path.
#[derive(Debug, Clone, Default)]
pub struct JoinPlan {
    clauses: Vec<JoinClause>,
}

impl JoinPlan {
    pub fn clauses(&self) -> &[JoinClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The alias under which the entity at `path` is joined.
    pub fn alias_for(&self, path: &[String]) -> Option<&str> {
        self.clauses
            .iter()
            .find(|clause| !clause.through && clause.path == path)
            .map(|clause| clause.alias.as_str())
    }

    pub fn to_sql(&self) -> SQL {
        self.clauses
            .iter()
            .fold(SQL::empty(), |sql, clause| sql.append(clause.to_sql()))
    }

    fn position(&self, path: &[String]) -> Option<usize> {
        self.clauses
            .iter()
            .position(|clause| !clause.through && clause.path == path)
    }

    fn is_alias_taken(&self, root_table: &str, alias: &str) -> bool {
        alias == root_table || self.clauses.iter().any(|clause| clause.alias == alias)
    }
}

// =============================================================================
// Planner
// =============================================================================

/// Resolves association paths into a [`JoinPlan`].
#[derive(Debug, Clone, Copy)]
pub struct JoinPlanner<'r> {
    registry: &'r SchemaRegistry,
    root: &'r Entity,
}

impl<'r> JoinPlanner<'r> {
    pub fn new(registry: &'r SchemaRegistry, root: &'r Entity) -> Self {
        Self { registry, root }
    }

    /// Walks `path` from the root, returning the entity it ends at.
    pub fn resolve_path(&self, path: &JoinPath) -> Result<&'r Entity> {
        crate::expr::walk(self.registry, self.root, path.segments())
    }

    /// Plans the requests in declaration order.
    ///
    /// Every prefix of a nested path is joined once; a path requested both as
    /// inner and left join ends up inner.
    pub fn plan<'a, I>(&self, requests: I) -> Result<JoinPlan>
    where
        I: IntoIterator<Item = &'a JoinRequest>,
    {
        let mut plan = JoinPlan::default();
        for request in requests {
            let segments = request.path.segments();
            let mut parent: &Entity = self.root;
            let mut parent_alias = self.root.table().to_string();

            for depth in 1..=segments.len() {
                let prefix = &segments[..depth];
                let segment = &segments[depth - 1];
                let association = parent.association(segment).ok_or_else(|| {
                    AssociationError::BrokenAssociationPath {
                        entity: parent.name().to_string(),
                        path: segments.join("."),
                        segment: segment.clone(),
                    }
                })?;
                let target: &Arc<Entity> = self.registry.resolve(association.target())?;

                if let Some(index) = plan.position(prefix) {
                    if request.kind == JoinType::Inner {
                        upgrade_to_inner(&mut plan, prefix);
                    }
                    parent_alias = plan.clauses[index].alias.clone();
                    parent = target.as_ref();
                    continue;
                }

                let path = prefix.to_vec();
                if association.kind() == AssociationKind::ManyToMany {
                    let join_table = association.join_table_for(parent, target);
                    let through_alias =
                        self.alias(&plan, segment, &join_table.table, &path)?;
                    plan.clauses.push(JoinClause {
                        path: path.clone(),
                        kind: request.kind,
                        table: join_table.table.clone(),
                        alias: through_alias.clone(),
                        on: JoinCondition::new(
                            &through_alias,
                            join_table.source_key.as_str(),
                            &parent_alias,
                            association.referenced_key_for(parent, target),
                        ),
                        through: true,
                    });
                    let alias = self.alias(&plan, segment, target.table(), &path)?;
                    plan.clauses.push(JoinClause {
                        path,
                        kind: request.kind,
                        table: target.table().to_string(),
                        alias: alias.clone(),
                        on: JoinCondition::new(
                            &alias,
                            target.primary_key(),
                            &through_alias,
                            join_table.target_key.as_str(),
                        ),
                        through: false,
                    });
                    parent_alias = alias;
                } else {
                    let alias = self.alias(&plan, segment, target.table(), &path)?;
                    let foreign_key = association.foreign_key_for(parent);
                    let referenced = association.referenced_key_for(parent, target);
                    let on = match association.kind() {
                        AssociationKind::BelongsTo => {
                            JoinCondition::new(&alias, referenced, &parent_alias, foreign_key)
                        }
                        _ => JoinCondition::new(&alias, foreign_key, &parent_alias, referenced),
                    };
                    plan.clauses.push(JoinClause {
                        path,
                        kind: request.kind,
                        table: target.table().to_string(),
                        alias: alias.clone(),
                        on,
                        through: false,
                    });
                    parent_alias = alias;
                }
                parent = target.as_ref();
            }
        }
        Ok(plan)
    }

    /// The bare table name if free, else `<association>_<table>`, else that
    /// alias with the first free numeric suffix (`parent_categories_2`).
    fn alias(
        &self,
        plan: &JoinPlan,
        association: &str,
        table: &str,
        path: &[String],
    ) -> Result<String> {
        let root_table = self.root.table();
        if !plan.is_alias_taken(root_table, table) {
            return Ok(table.to_string());
        }
        let alias = format!("{association}_{table}");
        if !plan.is_alias_taken(root_table, &alias) {
            return Ok(alias);
        }
        // Each clause holds one alias, so this range always has a free slot
        // unless the plan is corrupt.
        (2..=plan.clauses.len() + 2)
            .map(|n| format!("{alias}_{n}"))
            .find(|candidate| !plan.is_alias_taken(root_table, candidate))
            .ok_or_else(|| {
                AssociationError::AmbiguousJoinAlias {
                    alias,
                    path: path.join("."),
                }
                .into()
            })
    }
}

fn upgrade_to_inner(plan: &mut JoinPlan, prefix: &[String]) {
    for clause in plan.clauses.iter_mut().filter(|c| c.path == prefix) {
        clause.kind = JoinType::Inner;
    }
}
