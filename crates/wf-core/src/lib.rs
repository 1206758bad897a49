//! wf-core - Core library for Weft
//!
//! This crate provides the types shared by every Weft component: the core
//! error type, project configuration, strongly-typed names, stable hashing
//! for provenance keys, SQL quoting helpers, the physical `Unit` algebra and
//! the external metadata row shapes.

pub mod config;
pub mod error;
pub mod metadata;
pub mod names;
mod newtype_string;
pub(crate) mod serde_helpers;
pub mod sql_utils;
pub mod stable_hash;
pub mod unit;

pub use config::{Config, DatabaseConfig, Dialect, RenderConfig, SchemaConfig};
pub use error::{CoreError, CoreResult};
pub use metadata::{group_by_dataset, ColumnMetadata, FileMetadata, FilterAction};
pub use names::{ColumnName, SchemaName, TableName};
pub use stable_hash::StableHasher;
pub use unit::{SubUnit, Unit};
