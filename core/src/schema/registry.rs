//! Process-wide registry of entity definitions.
//!
//! Registration happens once, during single-threaded startup, through
//! `&mut SchemaRegistry`. [`SchemaRegistry::finish`] validates the whole
//! graph and hands back an `Arc` that relations share read-only.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::config::EngineConfig;
use crate::dialect::Dialect;
use crate::error::{Result, SchemaError};
use crate::expr::PredicateBuilder;
use crate::relation::Relation;

use super::association::{Association, AssociationKind};
use super::entity::Entity;

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    config: EngineConfig,
    entities: HashMap<String, Arc<Entity>>,
    /// Registration order, for deterministic iteration.
    order: Vec<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    /// Registers an entity.
    ///
    /// Fails with `DuplicateEntity` if the name is taken, and with
    /// `InvalidInverse` if an inverse between this entity and an already
    /// registered one does not resolve symmetrically.
    pub fn register(&mut self, entity: Entity) -> std::result::Result<(), SchemaError> {
        if self.entities.contains_key(entity.name()) {
            return Err(SchemaError::DuplicateEntity(entity.name().to_string()));
        }

        // Inverses declared by the new entity, towards registered targets
        for association in entity.associations() {
            if let Some(target) = self.entities.get(association.target()) {
                check_inverse(&entity, association, target)?;
            } else if association.target() == entity.name() {
                check_inverse(&entity, association, &entity)?;
            }
        }

        // Inverses declared by registered entities, towards the new one
        for owner in self.entities.values() {
            for association in owner.associations() {
                if association.target() == entity.name() {
                    check_inverse(owner, association, &entity)?;
                }
            }
        }

        self.order.push(entity.name().to_string());
        self.entities
            .insert(entity.name().to_string(), Arc::new(entity));
        Ok(())
    }

    /// Looks up an entity by name.
    pub fn resolve(&self, name: &str) -> std::result::Result<&Arc<Entity>, SchemaError> {
        self.entities
            .get(name)
            .ok_or_else(|| SchemaError::UnknownEntity(name.to_string()))
    }

    /// Looks up an association declared on `entity`.
    pub fn resolve_association(
        &self,
        entity: &str,
        name: &str,
    ) -> std::result::Result<&Association, SchemaError> {
        self.resolve(entity)?
            .association(name)
            .ok_or_else(|| SchemaError::UnknownAssociation {
                entity: entity.to_string(),
                association: name.to_string(),
            })
    }

    /// Entities in registration order.
    pub fn entities(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.order.iter().filter_map(|name| self.entities.get(name))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Checks the whole graph: association targets exist, declared key
    /// columns exist, every inverse is symmetric.
    pub fn validate(&self) -> std::result::Result<(), SchemaError> {
        for owner in self.entities() {
            for association in owner.associations() {
                let target = self.resolve(association.target())?;
                check_keys(owner, association, target)?;
                check_inverse(owner, association, target)?;
            }
        }
        Ok(())
    }

    /// Validates and freezes the registry for sharing across relations.
    pub fn finish(self) -> std::result::Result<Arc<Self>, SchemaError> {
        self.validate()?;
        Ok(Arc::new(self))
    }

    /// A fresh relation over `entity` with its default scope applied.
    pub fn relation(self: &Arc<Self>, entity: &str) -> Result<Relation> {
        let entity = Arc::clone(self.resolve(entity)?);
        Relation::new(Arc::clone(self), entity)
    }

    /// A predicate builder validating columns against `entity`.
    pub fn predicates(&self, entity: &str) -> std::result::Result<PredicateBuilder<'_>, SchemaError> {
        Ok(PredicateBuilder::new(self, self.resolve(entity)?))
    }
}

/// Explicitly declared key columns must exist where they are stored.
fn check_keys(
    owner: &Entity,
    association: &Association,
    target: &Entity,
) -> std::result::Result<(), SchemaError> {
    let unknown = |entity: &Entity, column: &str| SchemaError::UnknownColumn {
        entity: entity.name().to_string(),
        column: column.to_string(),
    };

    let (fk_holder, pk_holder) = match association.kind() {
        AssociationKind::BelongsTo => (Some(owner), target),
        AssociationKind::HasOne | AssociationKind::HasMany => (Some(target), owner),
        AssociationKind::ManyToMany => (None, owner),
    };

    if let (Some(holder), Some(fk)) = (fk_holder, association.declared_foreign_key())
        && !holder.has_column(fk)
    {
        return Err(unknown(holder, fk));
    }
    if let Some(pk) = association.declared_primary_key()
        && !pk_holder.has_column(pk)
    {
        return Err(unknown(pk_holder, pk));
    }
    Ok(())
}

/// A declared inverse must name an association on the target that points
/// back at the owner with a mirroring kind.
fn check_inverse(
    owner: &Entity,
    association: &Association,
    target: &Entity,
) -> std::result::Result<(), SchemaError> {
    let Some(inverse_name) = association.inverse() else {
        return Ok(());
    };
    let invalid = |reason: String| SchemaError::InvalidInverse {
        entity: owner.name().to_string(),
        association: association.name().to_string(),
        inverse: inverse_name.to_string(),
        reason,
    };

    let Some(inverse) = target.association(inverse_name) else {
        return Err(invalid(format!(
            "`{}` declares no association named `{inverse_name}`",
            target.name()
        )));
    };
    if inverse.target() != owner.name() {
        return Err(invalid(format!(
            "`{}.{inverse_name}` targets `{}`, not `{}`",
            target.name(),
            inverse.target(),
            owner.name()
        )));
    }
    if !association.kind().pairs_with(inverse.kind()) {
        return Err(invalid(format!(
            "`{}` cannot mirror `{}`",
            inverse.kind().as_str(),
            association.kind().as_str()
        )));
    }
    if let Some(back) = inverse.inverse()
        && back != association.name()
    {
        return Err(invalid(format!(
            "`{}.{inverse_name}` names `{back}` as its inverse",
            target.name()
        )));
    }
    Ok(())
}
