//! Declarative schema input.
//!
//! ```toml
//! [config]
//! dialect = "sqlite"
//!
//! [[entities]]
//! name = "Client"
//! default_scope = "removed_at IS NULL"
//! columns = [
//!     { name = "first_name", type = "text" },
//!     { name = "removed_at", type = "timestamp", nullable = true },
//! ]
//! scopes = { created_before = "created_at < ?" }
//!
//! [[entities.associations]]
//! name = "orders"
//! kind = "has_many"
//! target = "Order"
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::EngineConfig;
use crate::error::{ConfigError, Result};
use crate::relation::Scope;

use super::association::{Association, AssociationKind, JoinTable};
use super::column::{Column, ColumnType};
use super::entity::Entity;
use super::registry::SchemaRegistry;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default)]
    pub entities: Vec<EntityDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDefinition {
    pub name: String,
    pub table: Option<String>,
    pub primary_key: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub associations: Vec<AssociationDefinition>,
    /// Raw condition applied to every fresh relation.
    pub default_scope: Option<String>,
    /// Named raw conditions; `?` placeholders bind the scope arguments.
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: ColumnType,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssociationDefinition {
    pub name: String,
    pub kind: AssociationKind,
    pub target: String,
    pub foreign_key: Option<String>,
    pub primary_key: Option<String>,
    pub join_table: Option<JoinTable>,
    pub inverse: Option<String>,
}

impl SchemaDefinition {
    pub fn from_toml_str(source: &str) -> std::result::Result<Self, ConfigError> {
        let definition: Self =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        definition.config.validate()?;
        Ok(definition)
    }

    /// Registers every entity and validates the result.
    pub fn into_registry(self) -> Result<Arc<SchemaRegistry>> {
        let mut registry = SchemaRegistry::with_config(self.config);
        for entity in self.entities {
            registry.register(entity.into_entity())?;
        }
        Ok(registry.finish()?)
    }
}

impl EntityDefinition {
    pub fn into_entity(self) -> Entity {
        let mut builder = Entity::builder(self.name);
        if let Some(table) = self.table {
            builder = builder.table(table);
        }
        if let Some(primary_key) = self.primary_key {
            builder = builder.primary_key(primary_key);
        }
        for column in self.columns {
            let mut definition = Column::new(column.name, column.ty);
            if column.nullable {
                definition = definition.nullable();
            }
            builder = builder.with_column(definition);
        }
        for association in self.associations {
            builder = builder.association(association.into_association());
        }
        if let Some(condition) = self.default_scope {
            builder = builder.default_scope(Scope::raw(condition));
        }
        for (name, condition) in self.scopes {
            builder = builder.scope(name, Scope::raw(condition));
        }
        builder.build()
    }
}

impl AssociationDefinition {
    pub fn into_association(self) -> Association {
        let mut association = Association::new(self.name, self.kind, self.target);
        if let Some(foreign_key) = self.foreign_key {
            association = association.foreign_key(foreign_key);
        }
        if let Some(primary_key) = self.primary_key {
            association = association.primary_key(primary_key);
        }
        if let Some(join_table) = self.join_table {
            association = association.join_table(join_table);
        }
        if let Some(inverse) = self.inverse {
            association = association.inverse_of(inverse);
        }
        association
    }
}
