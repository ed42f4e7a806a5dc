use std::fmt;

use crate::relation::Scope;

use super::association::Association;
use super::column::{Column, ColumnType};
use super::naming;

/// A named record type: table, primary key, columns, associations and scopes.
///
/// Built once through [`EntityBuilder`] and immutable after registration.
#[derive(Clone)]
pub struct Entity {
    name: String,
    table: String,
    primary_key: String,
    columns: Vec<Column>,
    associations: Vec<Association>,
    default_scope: Option<Scope>,
    scopes: Vec<(String, Scope)>,
}

impl Entity {
    /// Starts an entity definition with conventional defaults: table
    /// `snake_case` plural of `name`, primary key `id`.
    pub fn builder(name: impl Into<String>) -> EntityBuilder {
        EntityBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.name() == name)
    }

    pub fn default_scope(&self) -> Option<&Scope> {
        self.default_scope.as_ref()
    }

    pub fn scope(&self, name: &str) -> Option<&Scope> {
        self.scopes
            .iter()
            .find_map(|(scope_name, scope)| (scope_name == name).then_some(scope))
    }

    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(|(name, _)| name.as_str())
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("primary_key", &self.primary_key)
            .field("columns", &self.columns)
            .field("associations", &self.associations)
            .field("default_scope", &self.default_scope.is_some())
            .field("scopes", &self.scopes.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Entity`].
///
/// ```
/// use relq_core::schema::{Association, ColumnType, Entity};
///
/// let post = Entity::builder("Post")
///     .column("title", ColumnType::Text)
///     .column("category_id", ColumnType::Integer)
///     .association(Association::belongs_to("category", "Category"))
///     .association(Association::has_many("comments", "Comment").inverse_of("post"))
///     .build();
///
/// assert_eq!(post.table(), "posts");
/// assert_eq!(post.primary_key(), "id");
/// assert!(post.has_column("id"));
/// ```
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    entity: Entity,
}

impl EntityBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            entity: Entity {
                table: naming::table_name(&name),
                name,
                primary_key: "id".to_string(),
                columns: Vec::new(),
                associations: Vec::new(),
                default_scope: None,
                scopes: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.entity.table = table.into();
        self
    }

    #[must_use]
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.entity.primary_key = column.into();
        self
    }

    #[must_use]
    pub fn column(self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.with_column(Column::new(name, ty))
    }

    #[must_use]
    pub fn nullable_column(self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.with_column(Column::new(name, ty).nullable())
    }

    /// Adds a column, replacing an earlier one with the same name.
    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.entity.columns.retain(|c| c.name() != column.name());
        self.entity.columns.push(column);
        self
    }

    #[must_use]
    pub fn association(mut self, association: Association) -> Self {
        self.entity
            .associations
            .retain(|a| a.name() != association.name());
        self.entity.associations.push(association);
        self
    }

    /// Sets the zero-argument scope applied to every fresh relation.
    #[must_use]
    pub fn default_scope(mut self, scope: Scope) -> Self {
        self.entity.default_scope = Some(scope);
        self
    }

    #[must_use]
    pub fn scope(mut self, name: impl Into<String>, scope: Scope) -> Self {
        let name = name.into();
        self.entity.scopes.retain(|(n, _)| *n != name);
        self.entity.scopes.push((name, scope));
        self
    }

    /// Finishes the entity. The primary key column is added as an INTEGER
    /// column when it was not declared.
    pub fn build(mut self) -> Entity {
        if !self.entity.has_column(&self.entity.primary_key) {
            let pk = Column::new(self.entity.primary_key.clone(), ColumnType::Integer);
            self.entity.columns.insert(0, pk);
        }
        self.entity
    }
}
