//! Error types for minorm core.

use minorm_driver::DriverError;
use thiserror::Error;

/// Result type for core operations.
pub type OrmResult<T> = Result<T, OrmError>;

/// Errors that can occur in minorm core operations.
#[derive(Debug, Error)]
pub enum OrmError {
    /// The database or driver rejected an operation.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// An entity declares no primary-key field.
    #[error("entity {entity} has no primary-key field")]
    MissingIdField {
        /// The entity name.
        entity: String,
    },

    /// An entity declares more than one primary-key field.
    #[error("entity {entity} declares more than one primary-key field: {fields:?}")]
    DuplicateIdField {
        /// The entity name.
        entity: String,
        /// The fields marked as primary key.
        fields: Vec<&'static str>,
    },

    /// A field's type has no column type.
    #[error("unsupported type {type_name} for field {entity}.{field}")]
    UnsupportedFieldType {
        /// The entity name.
        entity: String,
        /// The field name.
        field: String,
        /// The declared Rust type.
        type_name: &'static str,
    },

    /// A one-to-many field names no matching many-to-one field on the child.
    #[error("{entity}.{field} is mapped by {target}.{mapped_by}, which is not a many-to-one back to {entity}")]
    MissingRelationCounterpart {
        /// The owning entity name.
        entity: String,
        /// The one-to-many field.
        field: String,
        /// The child entity name.
        target: String,
        /// The named back-reference field.
        mapped_by: String,
    },

    /// An entity was asked for a field it does not have.
    #[error("entity {entity} has no field {field}")]
    UnknownField {
        /// The entity name.
        entity: String,
        /// The field name.
        field: String,
    },

    /// A column value could not be converted into a field.
    #[error("cannot set {entity}.{field}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The entity name.
        entity: String,
        /// The field name.
        field: String,
        /// The field's Rust type.
        expected: &'static str,
        /// The value that was found.
        found: String,
    },

    /// A result row lacks a mapped column.
    #[error("result for {entity} has no column {column}")]
    MissingColumn {
        /// The entity name.
        entity: String,
        /// The column name.
        column: String,
    },

    /// No row exists for the given key.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// The entity name.
        entity: String,
        /// The key that was looked up.
        key: String,
    },

    /// The record has no primary key yet.
    #[error("{entity} has not been persisted")]
    NotPersisted {
        /// The entity name.
        entity: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl OrmError {
    /// Creates an unknown field error.
    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(entity: impl Into<String>, key: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.to_string(),
        }
    }

    /// Creates a not persisted error.
    pub fn not_persisted(entity: impl Into<String>) -> Self {
        Self::NotPersisted {
            entity: entity.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true for [`OrmError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
