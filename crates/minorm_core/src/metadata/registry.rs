//! Process-wide descriptor registry.

use crate::entity::Entity;
use crate::error::OrmResult;
use crate::key::Key;
use crate::metadata::descriptor::EntityDescriptor;
use parking_lot::RwLock;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

static REGISTRY: LazyLock<RwLock<HashMap<TypeId, Arc<EntityDescriptor>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Returns the memoised descriptor of entity type `T`.
///
/// The first call for a type reads its [`Entity::class`]; later calls share
/// the same descriptor.
///
/// # Errors
///
/// Propagates metadata errors from the reader. Failed reads are not memoised.
pub fn descriptor_of<T: Entity>() -> OrmResult<Arc<EntityDescriptor>> {
    let id = TypeId::of::<T>();
    if let Some(descriptor) = REGISTRY.read().get(&id) {
        return Ok(Arc::clone(descriptor));
    }
    // Built without holding the lock: reading may resolve other entities.
    let descriptor = Arc::new(EntityDescriptor::read(id, &T::class())?);
    let mut registry = REGISTRY.write();
    Ok(Arc::clone(registry.entry(id).or_insert(descriptor)))
}

/// Returns the primary key of `entity`, or `None` if it has not been saved.
pub fn primary_key_of<T: Entity>(entity: &T) -> OrmResult<Option<Key>> {
    let descriptor = descriptor_of::<T>()?;
    let pk = &descriptor.primary_key;
    Key::for_type(&pk.field_type, entity.get_value(pk.field)?)
}

/// Returns the last path segment of `T`'s type name.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
