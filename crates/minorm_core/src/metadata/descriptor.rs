//! The metadata reader.

use crate::entity::EntityClass;
use crate::error::{OrmError, OrmResult};
use crate::metadata::class::{Annotation, CascadeFn, ClassDescriptor, FieldType};
use std::any::TypeId;
use std::fmt;

/// How primary-key values come into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// The database assigns a sequential integer on insert.
    AutoIncrement,
    /// The client supplies the key; UUID keys are generated on first save.
    Assigned,
}

/// The primary key of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    /// The key field.
    pub field: &'static str,
    /// The key column.
    pub column: &'static str,
    /// The key's semantic type.
    pub field_type: FieldType,
    /// How keys are assigned.
    pub strategy: KeyStrategy,
}

/// A plain mapped column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// The field name.
    pub field: &'static str,
    /// The column name.
    pub column: &'static str,
    /// The field's semantic type.
    pub field_type: FieldType,
}

/// A many-to-one relation, stored as a foreign-key column.
#[derive(Debug, Clone)]
pub struct ManyToOneSpec {
    /// The relation field.
    pub field: &'static str,
    /// The foreign-key column.
    pub join_column: &'static str,
    /// The parent entity.
    pub target: EntityClass,
}

/// A one-to-many relation, stored on the child side.
#[derive(Clone)]
pub struct OneToManySpec {
    /// The collection field.
    pub field: &'static str,
    /// The child's many-to-one field pointing back to the owner.
    pub mapped_by: &'static str,
    /// The child entity.
    pub target: EntityClass,
    pub(crate) cascade: CascadeFn,
}

impl fmt::Debug for OneToManySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneToManySpec")
            .field("field", &self.field)
            .field("mapped_by", &self.mapped_by)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Mapping metadata derived from a [`ClassDescriptor`].
///
/// Descriptors are immutable. Use
/// [`descriptor_of`](crate::metadata::descriptor_of) to obtain the shared,
/// memoised descriptor of an entity type.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    /// The entity type.
    pub type_id: TypeId,
    /// The entity name.
    pub name: &'static str,
    /// The table name.
    pub table: String,
    /// The primary key.
    pub primary_key: PrimaryKey,
    /// Plain columns in declaration order.
    pub columns: Vec<ColumnSpec>,
    /// Many-to-one relations in declaration order.
    pub many_to_one: Vec<ManyToOneSpec>,
    /// One-to-many relations in declaration order.
    pub one_to_many: Vec<OneToManySpec>,
}

impl EntityDescriptor {
    /// Reads the descriptor of the entity type `type_id` declared by `class`.
    ///
    /// # Errors
    ///
    /// Fails unless exactly one field is declared as the primary key.
    pub fn read(type_id: TypeId, class: &ClassDescriptor) -> OrmResult<Self> {
        let ids: Vec<_> = class
            .fields
            .iter()
            .filter(|f| matches!(f.annotation, Annotation::Id { .. }))
            .collect();
        let id = match ids.as_slice() {
            [] => {
                return Err(OrmError::MissingIdField {
                    entity: class.name.to_string(),
                })
            }
            [id] => *id,
            many => {
                return Err(OrmError::DuplicateIdField {
                    entity: class.name.to_string(),
                    fields: many.iter().map(|f| f.name).collect(),
                })
            }
        };

        let column = match id.annotation {
            Annotation::Id { column } => column.unwrap_or(id.name),
            _ => id.name,
        };
        let strategy = if id.field_type.is_integral() {
            KeyStrategy::AutoIncrement
        } else {
            KeyStrategy::Assigned
        };
        let primary_key = PrimaryKey {
            field: id.name,
            column,
            field_type: id.field_type.clone(),
            strategy,
        };

        let mut columns = Vec::new();
        let mut many_to_one = Vec::new();
        let mut one_to_many = Vec::new();
        for field in &class.fields {
            match &field.annotation {
                Annotation::Id { .. } | Annotation::Transient => {}
                Annotation::Column { name } => columns.push(ColumnSpec {
                    field: field.name,
                    column: name.unwrap_or(field.name),
                    field_type: field.field_type.clone(),
                }),
                Annotation::ManyToOne {
                    join_column,
                    target,
                } => many_to_one.push(ManyToOneSpec {
                    field: field.name,
                    join_column: *join_column,
                    target: *target,
                }),
                Annotation::OneToMany {
                    mapped_by,
                    target,
                    cascade,
                } => one_to_many.push(OneToManySpec {
                    field: field.name,
                    mapped_by: *mapped_by,
                    target: *target,
                    cascade: *cascade,
                }),
            }
        }

        Ok(Self {
            type_id,
            name: class.name,
            table: class
                .table
                .map_or_else(|| class.name.to_lowercase(), str::to_string),
            primary_key,
            columns,
            many_to_one,
            one_to_many,
        })
    }

    /// Checks that every one-to-many relation has a many-to-one counterpart
    /// on the child that points back to this entity.
    pub fn validate_relations(&self) -> OrmResult<()> {
        for relation in &self.one_to_many {
            let child = relation.target.descriptor()?;
            let matched = child
                .many_to_one_field(relation.mapped_by)
                .is_some_and(|m| m.target.type_id() == self.type_id);
            if !matched {
                return Err(OrmError::MissingRelationCounterpart {
                    entity: self.name.to_string(),
                    field: relation.field.to_string(),
                    target: child.name.to_string(),
                    mapped_by: relation.mapped_by.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the many-to-one relation stored in `field`.
    #[must_use]
    pub fn many_to_one_field(&self, field: &str) -> Option<&ManyToOneSpec> {
        self.many_to_one.iter().find(|m| m.field == field)
    }

    /// Returns the column a field is stored in.
    #[must_use]
    pub fn column_of(&self, field: &str) -> Option<&'static str> {
        if field == self.primary_key.field {
            return Some(self.primary_key.column);
        }
        self.columns
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.column)
            .or_else(|| self.many_to_one_field(field).map(|m| m.join_column))
    }

    /// Iterates over every stored field with its column: the primary key,
    /// then plain columns, then join columns.
    pub fn stored_fields(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        std::iter::once((self.primary_key.field, self.primary_key.column))
            .chain(self.columns.iter().map(|c| (c.field, c.column)))
            .chain(self.many_to_one.iter().map(|m| (m.field, m.join_column)))
    }
}
