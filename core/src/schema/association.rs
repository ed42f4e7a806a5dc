use serde::Deserialize;

use super::entity::Entity;
use super::naming;

/// The kind of relationship between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    /// The owner holds the foreign key: `Comment` belongs to `Post`.
    BelongsTo,
    /// One-to-one, foreign key on the target: `Comment` has one `Guest`.
    HasOne,
    /// One-to-many, foreign key on the target: `Post` has many `Comment`s.
    HasMany,
    /// Many-to-many through a join table: `Client` and `Role`.
    #[serde(alias = "has_and_belongs_to_many")]
    ManyToMany,
}

impl AssociationKind {
    /// Whether an association of kind `inverse` can mirror one of this kind.
    pub const fn pairs_with(self, inverse: AssociationKind) -> bool {
        matches!(
            (self, inverse),
            (
                AssociationKind::BelongsTo,
                AssociationKind::HasOne | AssociationKind::HasMany
            ) | (
                AssociationKind::HasOne | AssociationKind::HasMany,
                AssociationKind::BelongsTo
            ) | (AssociationKind::ManyToMany, AssociationKind::ManyToMany)
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            AssociationKind::BelongsTo => "belongs_to",
            AssociationKind::HasOne => "has_one",
            AssociationKind::HasMany => "has_many",
            AssociationKind::ManyToMany => "many_to_many",
        }
    }
}

/// Link table of a many-to-many association.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinTable {
    /// The join table name (e.g., `"clients_roles"`).
    pub table: String,
    /// Column pointing at the owning entity (e.g., `"client_id"`).
    pub source_key: String,
    /// Column pointing at the target entity (e.g., `"role_id"`).
    pub target_key: String,
}

impl JoinTable {
    pub fn new(
        table: impl Into<String>,
        source_key: impl Into<String>,
        target_key: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            source_key: source_key.into(),
            target_key: target_key.into(),
        }
    }
}

/// A declared relationship from one entity to another.
///
/// The inverse is a name looked up on the target entity, never a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    name: String,
    kind: AssociationKind,
    target: String,
    foreign_key: Option<String>,
    primary_key: Option<String>,
    join_table: Option<JoinTable>,
    inverse: Option<String>,
}

impl Association {
    pub fn new(name: impl Into<String>, kind: AssociationKind, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
            foreign_key: None,
            primary_key: None,
            join_table: None,
            inverse: None,
        }
    }

    pub fn belongs_to(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, AssociationKind::BelongsTo, target)
    }

    pub fn has_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, AssociationKind::HasOne, target)
    }

    pub fn has_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, AssociationKind::HasMany, target)
    }

    pub fn many_to_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, AssociationKind::ManyToMany, target)
    }

    /// Overrides the foreign key column.
    #[must_use]
    pub fn foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = Some(column.into());
        self
    }

    /// Overrides the key the foreign key points at (defaults to the primary key).
    #[must_use]
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    /// Overrides the many-to-many join table.
    #[must_use]
    pub fn join_table(mut self, join_table: JoinTable) -> Self {
        self.join_table = Some(join_table);
        self
    }

    #[must_use]
    pub fn inverse_of(mut self, inverse: impl Into<String>) -> Self {
        self.inverse = Some(inverse.into());
        self
    }

    // ==================== accessors ====================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> AssociationKind {
        self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn inverse(&self) -> Option<&str> {
        self.inverse.as_deref()
    }

    /// The explicitly declared foreign key, if any.
    pub fn declared_foreign_key(&self) -> Option<&str> {
        self.foreign_key.as_deref()
    }

    /// The explicitly declared primary key override, if any.
    pub fn declared_primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Foreign key column: on the owner for `BelongsTo`, on the target for
    /// `HasOne`/`HasMany`. Not meaningful for `ManyToMany`.
    pub fn foreign_key_for(&self, owner: &Entity) -> String {
        match (&self.foreign_key, self.kind) {
            (Some(fk), _) => fk.clone(),
            (None, AssociationKind::BelongsTo) => naming::foreign_key(&self.name),
            (None, _) => naming::foreign_key(owner.name()),
        }
    }

    /// Column the foreign key references: the target's primary key for
    /// `BelongsTo`, the owner's for everything else.
    pub fn referenced_key_for<'e>(&'e self, owner: &'e Entity, target: &'e Entity) -> &'e str {
        if let Some(pk) = &self.primary_key {
            return pk;
        }
        match self.kind {
            AssociationKind::BelongsTo => target.primary_key(),
            _ => owner.primary_key(),
        }
    }

    /// Join table of a many-to-many association, falling back to the
    /// `<sorted tables>` / `<entity>_id` convention.
    pub fn join_table_for(&self, owner: &Entity, target: &Entity) -> JoinTable {
        self.join_table.clone().unwrap_or_else(|| {
            JoinTable::new(
                naming::join_table(owner.table(), target.table()),
                naming::foreign_key(owner.name()),
                naming::foreign_key(target.name()),
            )
        })
    }
}
