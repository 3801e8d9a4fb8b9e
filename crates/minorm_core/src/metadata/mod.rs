//! Entity metadata.
//!
//! Entities describe themselves with a [`ClassDescriptor`]; the reader
//! derives table, column, key and relation mappings from it as an
//! [`EntityDescriptor`]. Descriptors are memoised per type by
//! [`descriptor_of`].

mod class;
mod descriptor;
mod registry;

pub use class::{Annotation, CascadeFn, ClassDescriptor, FieldDecl, FieldType};
pub use descriptor::{
    ColumnSpec, EntityDescriptor, KeyStrategy, ManyToOneSpec, OneToManySpec, PrimaryKey,
};
pub use registry::{descriptor_of, primary_key_of};
pub(crate) use registry::short_type_name;
