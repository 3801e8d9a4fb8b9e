//! Column types.

use crate::error::{OrmError, OrmResult};
use crate::metadata::{FieldType, PrimaryKey};
use minorm_driver::Dialect;

/// Returns the column type of a field.
///
/// SQLite gives a `DECIMAL` column NUMERIC affinity and would store decimal
/// text as a float, so SQLite decimals are declared `TEXT`.
///
/// # Errors
///
/// Returns `UnsupportedFieldType` for types without a column mapping.
pub fn column_type(
    dialect: Dialect,
    entity: &str,
    field: &str,
    field_type: &FieldType,
) -> OrmResult<&'static str> {
    let sql = match field_type {
        FieldType::Int => "INT",
        FieldType::Long => "BIGINT",
        FieldType::Text => "VARCHAR(255)",
        FieldType::Date => "DATE",
        FieldType::DateTime => "DATETIME",
        FieldType::Boolean => "BOOLEAN",
        FieldType::Decimal => match dialect {
            Dialect::MySql => "DECIMAL(19,4)",
            Dialect::Sqlite => "TEXT",
        },
        FieldType::Uuid => "VARCHAR(36)",
        FieldType::Unsupported(type_name) => {
            return Err(OrmError::UnsupportedFieldType {
                entity: entity.to_string(),
                field: field.to_string(),
                type_name,
            })
        }
    };
    Ok(sql)
}

/// Returns the column definition of a primary key, after its name.
pub fn primary_key_type(dialect: Dialect, entity: &str, pk: &PrimaryKey) -> OrmResult<String> {
    let base = column_type(dialect, entity, pk.field, &pk.field_type)?;
    if !pk.field_type.is_integral() {
        return Ok(format!("{base} PRIMARY KEY"));
    }
    Ok(match dialect {
        Dialect::MySql => format!("{base} AUTO_INCREMENT PRIMARY KEY"),
        // Only an INTEGER PRIMARY KEY aliases the rowid.
        Dialect::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
    })
}
