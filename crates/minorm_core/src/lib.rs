//! # minorm Core
//!
//! Metadata-driven object-relational mapping for minorm.
//!
//! This crate provides:
//! - Entity metadata read from per-type class descriptors
//! - SQL generation for tables, foreign keys and CRUD statements
//! - Row to entity mapping and parameter binding
//! - An identity cache of loaded records
//! - Lazy, cache-aware result iteration
//! - The [`Manager`] that ties these together
//!
//! ## Example
//!
//! ```rust,ignore
//! use minorm_core::{ClassDescriptor, Entity, EntityClass, Manager, Record};
//! use minorm_driver::SqliteProvider;
//!
//! let mut manager = Manager::connect(&SqliteProvider::in_memory())?;
//! manager.register(&[EntityClass::of::<Tag>()])?;
//!
//! let tag = Record::new(Tag { id: None, label: "rust".into() });
//! manager.save(&tag)?;
//! assert!(manager.is_record_in_cache::<Tag>(tag.read().id.unwrap())?);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod entity;
mod error;
mod iter;
mod key;
pub mod mapper;
mod manager;
pub mod metadata;
mod record;
mod relation;
pub mod sql;
mod stats;

#[cfg(test)]
mod test_entities;

pub use cache::Cache;
pub use config::Config;
pub use entity::{Entity, EntityClass};
pub use error::{OrmError, OrmResult};
pub use iter::LazyResults;
pub use key::Key;
pub use manager::Manager;
pub use metadata::{descriptor_of, primary_key_of, ClassDescriptor, EntityDescriptor, FieldType};
pub use record::{Record, WeakRecord};
pub use relation::{LinkedRecord, ManyToOne, OneToMany};
pub use stats::{ManagerStats, StatsSnapshot};

pub use minorm_driver::Value;
