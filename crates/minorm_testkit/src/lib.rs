//! # minorm Testkit
//!
//! Test utilities for minorm.
//!
//! This crate provides:
//! - A library model (`Publisher`, `Book`, `Author`) covering every mapping
//! - Test managers over in-memory or temporary-file SQLite databases
//! - A connection wrapper that records executed SQL
//! - Property-based test generators using proptest
//! - Test logging setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use minorm_testkit::prelude::*;
//!
//! #[test]
//! fn saves_a_book() {
//!     let mut test = TestManager::library();
//!     let book = Record::new(Book::new("Dune", None));
//!     test.save(&book).unwrap();
//!     assert!(book.read().id.is_some());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod logging;
pub mod model;
pub mod recording;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
    pub use crate::model::*;
    pub use crate::recording::*;
    pub use minorm_core::{Entity, EntityClass, Key, ManyToOne, Manager, OrmError, Record};
}

pub use fixtures::*;
pub use generators::*;
pub use logging::*;
pub use model::*;
pub use recording::*;
