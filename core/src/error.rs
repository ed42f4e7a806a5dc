use thiserror::Error;

/// Errors raised while registering or resolving schema metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No entity with this name has been registered
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// The column does not exist on the entity
    #[error("Unknown column `{column}` on entity `{entity}`")]
    UnknownColumn { entity: String, column: String },

    /// The association is not declared on the entity
    #[error("Unknown association `{association}` on entity `{entity}`")]
    UnknownAssociation { entity: String, association: String },

    /// The named scope is not declared on the entity
    #[error("Unknown scope `{scope}` on entity `{entity}`")]
    UnknownScope { entity: String, scope: String },

    /// An entity with this name is already registered
    #[error("Entity already registered: {0}")]
    DuplicateEntity(String),

    /// A declared inverse does not resolve to a symmetric association
    #[error("Invalid inverse `{inverse}` for `{entity}.{association}`: {reason}")]
    InvalidInverse {
        entity: String,
        association: String,
        inverse: String,
        reason: String,
    },
}

/// Errors raised while resolving association paths into joins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssociationError {
    /// A path segment does not name an association on the entity reached so far
    #[error("Broken association path `{path}`: `{segment}` is not an association of `{entity}`")]
    BrokenAssociationPath {
        entity: String,
        path: String,
        segment: String,
    },

    /// Two distinct join paths would need the same table alias
    #[error("Ambiguous join alias `{alias}` for path `{path}`")]
    AmbiguousJoinAlias { alias: String, path: String },
}

/// Errors raised while turning a relation or fragment into SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The relation is structurally invalid and cannot be compiled
    #[error("Cannot compile relation on `{entity}`: {reason}")]
    EmptyRelation { entity: String, reason: String },

    /// A raw fragment's placeholder count differs from its parameter count
    #[error("Raw fragment `{template}` has {placeholders} placeholder(s) but {params} parameter(s)")]
    PlaceholderMismatch {
        template: String,
        placeholders: usize,
        params: usize,
    },

    /// A column refers to an association path that is not joined
    #[error("Association path `{path}` is referenced but not joined")]
    MissingJoin { path: String },
}

/// Opaque error reported by the database collaborator.
///
/// The engine never interprets database-specific codes; it only carries the
/// message and the underlying source through to the caller.
#[derive(Debug, Error)]
#[error("Execution error: {message}")]
pub struct ExecutionError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a driver error, keeping it reachable through `Error::source`.
    pub fn from_source<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised while loading configuration or schema definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The document could not be parsed
    #[error("Config parse error: {0}")]
    Parse(String),

    /// A value was parsed but is not acceptable
    #[error("Invalid config value for `{key}`: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum RelqError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Association(#[from] AssociationError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No rows returned when exactly one was expected
    #[error("Record not found: {entity} with {key}")]
    RecordNotFound { entity: String, key: String },

    /// Error mapping a row value into a Rust type
    #[error("Mapping error: {0}")]
    Mapping(String),
}

/// Result type for relq operations
pub type Result<T> = std::result::Result<T, RelqError>;
