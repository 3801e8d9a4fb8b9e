//! The entity trait.

use crate::error::{OrmError, OrmResult};
use crate::metadata::{descriptor_of, short_type_name, ClassDescriptor, EntityDescriptor};
use crate::relation::LinkedRecord;
use minorm_driver::Value;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// A type the manager can persist.
///
/// Entities declare their shape once in [`class`](Entity::class) and expose
/// their fields by name through [`get_value`](Entity::get_value) and
/// [`set_value`](Entity::set_value). Many-to-one fields are read and written
/// as the parent's key. Entities with relations also implement the
/// navigation hooks; the defaults report the field as unknown.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug, Default)]
/// struct Tag {
///     id: Option<i64>,
///     label: String,
/// }
///
/// impl Entity for Tag {
///     fn class() -> ClassDescriptor {
///         ClassDescriptor::new("Tag")
///             .id::<Option<i64>>("id")
///             .column::<String>("label")
///     }
///
///     fn get_value(&self, field: &str) -> OrmResult<Value> {
///         match field {
///             "id" => Ok(self.id.into()),
///             "label" => Ok(self.label.clone().into()),
///             _ => Err(OrmError::unknown_field("Tag", field)),
///         }
///     }
///
///     fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()> {
///         match field {
///             "id" => self.id = value.decode()?,
///             "label" => self.label = value.decode()?,
///             _ => return Err(OrmError::unknown_field("Tag", field)),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Entity: Default + Send + Sync + 'static {
    /// Declares the entity's fields and mappings.
    fn class() -> ClassDescriptor;

    /// Returns the value of a stored field.
    fn get_value(&self, field: &str) -> OrmResult<Value>;

    /// Sets a stored field from a column value.
    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()>;

    /// Returns the live parent record linked through a many-to-one field.
    fn parent(&self, field: &str) -> OrmResult<Option<Box<dyn LinkedRecord>>> {
        Err(OrmError::unknown_field(short_type_name::<Self>(), field))
    }

    /// Returns the child records held by a one-to-many field.
    fn children(&self, field: &str) -> OrmResult<Vec<Box<dyn LinkedRecord>>> {
        Err(OrmError::unknown_field(short_type_name::<Self>(), field))
    }

    /// Empties a one-to-many field.
    fn clear_children(&mut self, field: &str) -> OrmResult<()> {
        Err(OrmError::unknown_field(short_type_name::<Self>(), field))
    }
}

/// A handle to an entity type, used where types are listed at runtime.
///
/// ```rust,ignore
/// manager.register(&[EntityClass::of::<Publisher>(), EntityClass::of::<Book>()])?;
/// ```
#[derive(Clone, Copy)]
pub struct EntityClass {
    type_id: TypeId,
    name: &'static str,
    resolve: fn() -> OrmResult<Arc<EntityDescriptor>>,
}

impl EntityClass {
    /// Returns the handle of entity type `T`.
    #[must_use]
    pub fn of<T: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: short_type_name::<T>(),
            resolve: descriptor_of::<T>,
        }
    }

    /// Returns the type's identity.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type's short name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Reads the type's entity descriptor.
    pub fn descriptor(&self) -> OrmResult<Arc<EntityDescriptor>> {
        (self.resolve)()
    }
}

impl PartialEq for EntityClass {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EntityClass {}

impl fmt::Debug for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityClass({})", self.name)
    }
}
