//! Declared entity shape.

use crate::entity::{Entity, EntityClass};
use crate::error::OrmResult;
use crate::key::Key;
use crate::manager::Manager;
use std::any::TypeId;
use std::fmt;

/// The semantic type of a declared field.
///
/// Derived from the field's Rust type by [`FieldType::of`]. `Option<T>`
/// has the same semantic type as `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// `i8`, `i16`, `i32`, `u8`, `u16`.
    Int,
    /// `i64`, `u32`.
    Long,
    /// `String`.
    Text,
    /// `chrono::NaiveDate`.
    Date,
    /// `chrono::NaiveDateTime`.
    DateTime,
    /// `bool`.
    Boolean,
    /// `rust_decimal::Decimal`.
    Decimal,
    /// `uuid::Uuid`.
    Uuid,
    /// Any other type; carries the Rust type name.
    Unsupported(&'static str),
}

impl FieldType {
    /// Returns the semantic type of `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        if is_type::<T, i8>()
            || is_type::<T, i16>()
            || is_type::<T, i32>()
            || is_type::<T, u8>()
            || is_type::<T, u16>()
        {
            Self::Int
        } else if is_type::<T, i64>() || is_type::<T, u32>() {
            Self::Long
        } else if is_type::<T, String>() {
            Self::Text
        } else if is_type::<T, chrono::NaiveDate>() {
            Self::Date
        } else if is_type::<T, chrono::NaiveDateTime>() {
            Self::DateTime
        } else if is_type::<T, bool>() {
            Self::Boolean
        } else if is_type::<T, rust_decimal::Decimal>() {
            Self::Decimal
        } else if is_type::<T, uuid::Uuid>() {
            Self::Uuid
        } else {
            Self::Unsupported(std::any::type_name::<T>())
        }
    }

    /// Returns true for the integer family.
    #[must_use]
    pub const fn is_integral(&self) -> bool {
        matches!(self, Self::Int | Self::Long)
    }
}

/// True if `T` is `U` or `Option<U>`.
fn is_type<T: 'static, U: 'static>() -> bool {
    let id = TypeId::of::<T>();
    id == TypeId::of::<U>() || id == TypeId::of::<Option<U>>()
}

/// Removes the children of a deleted parent that are still stored.
///
/// Arguments are the manager, the child's back-reference field and the
/// parent key. Returns the number of children removed.
pub type CascadeFn = fn(&mut Manager, &'static str, &Key) -> OrmResult<usize>;

/// How a declared field is mapped.
#[derive(Clone)]
pub enum Annotation {
    /// The primary key, with an optional column name.
    Id {
        /// Column name override.
        column: Option<&'static str>,
    },
    /// A plain column, with an optional column name.
    Column {
        /// Column name override.
        name: Option<&'static str>,
    },
    /// A reference to a parent entity stored as a foreign-key column.
    ManyToOne {
        /// The foreign-key column.
        join_column: &'static str,
        /// The parent entity.
        target: EntityClass,
    },
    /// The children that reference this entity.
    OneToMany {
        /// The child's many-to-one field pointing back here.
        mapped_by: &'static str,
        /// The child entity.
        target: EntityClass,
        /// Removes stored children when this entity is deleted.
        cascade: CascadeFn,
    },
    /// Not mapped.
    Transient,
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id { column } => f.debug_struct("Id").field("column", column).finish(),
            Self::Column { name } => f.debug_struct("Column").field("name", name).finish(),
            Self::ManyToOne {
                join_column,
                target,
            } => f
                .debug_struct("ManyToOne")
                .field("join_column", join_column)
                .field("target", target)
                .finish(),
            Self::OneToMany {
                mapped_by, target, ..
            } => f
                .debug_struct("OneToMany")
                .field("mapped_by", mapped_by)
                .field("target", target)
                .finish_non_exhaustive(),
            Self::Transient => f.write_str("Transient"),
        }
    }
}

/// A declared field.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// The field name.
    pub name: &'static str,
    /// The field's semantic type.
    pub field_type: FieldType,
    /// How the field is mapped.
    pub annotation: Annotation,
}

/// The declared shape of an entity type.
///
/// Each entity builds one of these in [`Entity::class`]. The metadata
/// reader turns it into an [`EntityDescriptor`].
///
/// # Example
///
/// ```rust,ignore
/// ClassDescriptor::new("Book")
///     .id::<Option<i64>>("id")
///     .column::<String>("title")
///     .column_named::<Option<NaiveDate>>("published_at", "publishedAt")
///     .many_to_one::<Publisher>("publisher", "publisher_id")
/// ```
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    /// The entity name.
    pub name: &'static str,
    /// Table name override.
    pub table: Option<&'static str>,
    /// Declared fields in declaration order.
    pub fields: Vec<FieldDecl>,
}

impl ClassDescriptor {
    /// Starts a class named `name`.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            table: None,
            fields: Vec::new(),
        }
    }

    /// Overrides the table name.
    #[must_use]
    pub fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    /// Declares a field.
    #[must_use]
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    fn typed<T: 'static>(self, name: &'static str, annotation: Annotation) -> Self {
        self.field(FieldDecl {
            name,
            field_type: FieldType::of::<T>(),
            annotation,
        })
    }

    /// Declares the primary-key field.
    #[must_use]
    pub fn id<T: 'static>(self, name: &'static str) -> Self {
        self.typed::<T>(name, Annotation::Id { column: None })
    }

    /// Declares the primary-key field stored under another column name.
    #[must_use]
    pub fn id_named<T: 'static>(self, name: &'static str, column: &'static str) -> Self {
        self.typed::<T>(
            name,
            Annotation::Id {
                column: Some(column),
            },
        )
    }

    /// Declares a plain column named after the field.
    #[must_use]
    pub fn column<T: 'static>(self, name: &'static str) -> Self {
        self.typed::<T>(name, Annotation::Column { name: None })
    }

    /// Declares a plain column with an explicit column name.
    #[must_use]
    pub fn column_named<T: 'static>(self, name: &'static str, column: &'static str) -> Self {
        self.typed::<T>(
            name,
            Annotation::Column {
                name: Some(column),
            },
        )
    }

    /// Declares a reference to parent entity `P`.
    #[must_use]
    pub fn many_to_one<P: Entity>(self, name: &'static str, join_column: &'static str) -> Self {
        self.typed::<P>(
            name,
            Annotation::ManyToOne {
                join_column,
                target: EntityClass::of::<P>(),
            },
        )
    }

    /// Declares the children of type `C` that point back through `mapped_by`.
    #[must_use]
    pub fn one_to_many<C: Entity>(self, name: &'static str, mapped_by: &'static str) -> Self {
        self.typed::<C>(
            name,
            Annotation::OneToMany {
                mapped_by,
                target: EntityClass::of::<C>(),
                cascade: Manager::sweep_children::<C>,
            },
        )
    }

    /// Declares a field that is not mapped.
    #[must_use]
    pub fn transient<T: 'static>(self, name: &'static str) -> Self {
        self.typed::<T>(name, Annotation::Transient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    #[test]
    fn field_types_from_rust_types() {
        assert_eq!(FieldType::of::<i32>(), FieldType::Int);
        assert_eq!(FieldType::of::<Option<i16>>(), FieldType::Int);
        assert_eq!(FieldType::of::<i64>(), FieldType::Long);
        assert_eq!(FieldType::of::<Option<i64>>(), FieldType::Long);
        assert_eq!(FieldType::of::<String>(), FieldType::Text);
        assert_eq!(FieldType::of::<NaiveDate>(), FieldType::Date);
        assert_eq!(FieldType::of::<Option<NaiveDateTime>>(), FieldType::DateTime);
        assert_eq!(FieldType::of::<bool>(), FieldType::Boolean);
        assert_eq!(FieldType::of::<Decimal>(), FieldType::Decimal);
        assert_eq!(FieldType::of::<Option<Uuid>>(), FieldType::Uuid);
    }

    #[test]
    fn other_types_are_unsupported() {
        assert!(matches!(FieldType::of::<f32>(), FieldType::Unsupported("f32")));
        assert!(matches!(
            FieldType::of::<Vec<String>>(),
            FieldType::Unsupported(_)
        ));
    }

    #[test]
    fn builder_keeps_declaration_order() {
        let class = ClassDescriptor::new("Thing")
            .table("things")
            .id::<Option<i64>>("id")
            .column::<String>("name")
            .column_named::<bool>("active", "is_active")
            .transient::<u64>("scratch");

        assert_eq!(class.table, Some("things"));
        let names: Vec<_> = class.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["id", "name", "active", "scratch"]);
        assert!(matches!(
            class.fields[2].annotation,
            Annotation::Column {
                name: Some("is_active")
            }
        ));
    }
}
