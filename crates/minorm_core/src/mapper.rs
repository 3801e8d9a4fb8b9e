//! Row and entity translation.

use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};
use crate::key::Key;
use crate::metadata::EntityDescriptor;
use crate::sql::Statement;
use minorm_driver::{DriverError, Row, Value};

/// Sets every stored field of `entity` from the identically named column
/// of `row`.
///
/// # Errors
///
/// `MissingColumn` if the row lacks a mapped column; `TypeMismatch` if a
/// value cannot be converted to its field's type.
pub fn decode_into<T: Entity>(entity: &mut T, row: &Row, d: &EntityDescriptor) -> OrmResult<()> {
    for (field, column) in d.stored_fields() {
        let value = row
            .get(column)
            .cloned()
            .ok_or_else(|| OrmError::MissingColumn {
                entity: d.name.to_string(),
                column: column.to_string(),
            })?;
        entity
            .set_value(field, value)
            .map_err(|e| mismatch(d.name, field, e))?;
    }
    Ok(())
}

/// Builds a new entity from `row`.
pub fn decode<T: Entity>(row: &Row, d: &EntityDescriptor) -> OrmResult<T> {
    let mut entity = T::default();
    decode_into(&mut entity, row, d)?;
    Ok(entity)
}

/// Reads the primary key from `row`.
pub fn row_key(row: &Row, d: &EntityDescriptor) -> OrmResult<Option<Key>> {
    let pk = &d.primary_key;
    let value = row.get(pk.column).cloned().ok_or_else(|| OrmError::MissingColumn {
        entity: d.name.to_string(),
        column: pk.column.to_string(),
    })?;
    Key::for_type(&pk.field_type, value).map_err(|e| mismatch(d.name, pk.field, e))
}

/// Returns the values bound to `statement`'s placeholders, in order.
pub fn bind<T: Entity>(entity: &T, statement: &Statement) -> OrmResult<Vec<Value>> {
    statement
        .binds
        .iter()
        .map(|field| entity.get_value(field))
        .collect()
}

fn mismatch(entity: &str, field: &str, err: OrmError) -> OrmError {
    match err {
        OrmError::Driver(DriverError::Conversion { expected, found }) => OrmError::TypeMismatch {
            entity: entity.to_string(),
            field: field.to_string(),
            expected,
            found,
        },
        other => other,
    }
}
