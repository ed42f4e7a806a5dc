use relq::prelude::*;
use relq::{ConfigError, RelqError, SchemaError};

use crate::common::{CLIENTS_TOML, clients_registry};

#[test]
fn toml_definitions_build_a_registry() {
    let registry = clients_registry();
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.dialect(), Dialect::SQLite);
    assert_eq!(registry.config().batch_size, 2);

    let names: Vec<&str> = registry.entities().map(|entity| entity.name()).collect();
    assert_eq!(names, ["Client", "Order", "Role"]);

    let roles = registry.resolve_association("Client", "roles").unwrap();
    assert_eq!(roles.kind(), AssociationKind::ManyToMany);
    let order = registry.resolve("Order").unwrap();
    assert_eq!(order.table(), "orders");
    assert_eq!(order.primary_key(), "id");
}

#[test]
fn lookups_fail_with_names() {
    let registry = clients_registry();
    assert_eq!(
        registry.resolve("Invoice").unwrap_err(),
        SchemaError::UnknownEntity("Invoice".into())
    );
    assert!(matches!(
        registry.resolve_association("Client", "invoices"),
        Err(SchemaError::UnknownAssociation { ref association, .. }) if association == "invoices"
    ));
    assert!(matches!(
        registry.relation("Invoice"),
        Err(RelqError::Schema(SchemaError::UnknownEntity(_)))
    ));
}

#[test]
fn mismatched_inverses_are_rejected() {
    let mut registry = SchemaRegistry::new();
    registry
        .register(
            Entity::builder("Post")
                .association(Association::has_many("comments", "Comment").inverse_of("article"))
                .build(),
        )
        .unwrap();
    let err = registry
        .register(
            Entity::builder("Comment")
                .column("post_id", ColumnType::Integer)
                .association(Association::belongs_to("post", "Post"))
                .build(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::InvalidInverse { ref entity, ref inverse, .. }
            if entity == "Post" && inverse == "article"
    ));
}

#[test]
fn duplicate_entities_are_rejected() {
    let mut registry = SchemaRegistry::new();
    registry.register(Entity::builder("Tag").build()).unwrap();
    assert_eq!(
        registry.register(Entity::builder("Tag").build()),
        Err(SchemaError::DuplicateEntity("Tag".into()))
    );
}

#[test]
fn config_errors() {
    assert!(matches!(
        EngineConfig::from_toml_str("batch_size = 0"),
        Err(ConfigError::Invalid { ref key, .. }) if key == "batch_size"
    ));
    assert!(matches!(
        EngineConfig::from_toml_str("dialect = \"oracle\""),
        Err(ConfigError::Parse(_))
    ));
    assert_eq!(
        EngineConfig::from_toml_str("dialect = \"postgres\"\nbatch_size = 10").unwrap(),
        EngineConfig::new(Dialect::PostgreSQL).with_batch_size(10)
    );

    let broken = CLIENTS_TOML.replace("batch_size = 2", "batch_size = 0");
    assert!(SchemaDefinition::from_toml_str(&broken).is_err());
}
