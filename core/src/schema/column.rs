use serde::Deserialize;

/// Storage type of a column.
///
/// Only informational for the query engine: values are bound as
/// [`Value`](crate::Value)s regardless of the declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Integer,
    Real,
    Text,
    Blob,
    Boolean,
    Timestamp,
    Numeric,
}

impl ColumnType {
    pub const fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Numeric => "NUMERIC",
        }
    }
}

/// A typed column of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    ty: ColumnType,
    nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
        }
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn ty(&self) -> ColumnType {
        self.ty
    }

    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }
}
