//! SQL generation.
//!
//! [`types`] maps field types to column types; [`StatementBuilder`] renders
//! DDL, DML and schema probes for a [`Dialect`](minorm_driver::Dialect).

mod builder;
pub mod types;

pub use builder::{ForeignKey, Probe, Statement, StatementBuilder};
