//! # World Bible
//!
//! The data side of the lore knowledge base: entity records, the store that
//! loads them from a directory tree, and the per-type schemas they are
//! validated against. This crate never writes a record; it only reads and
//! evaluates them.
//!
//! ## Core Components
//!
//! - **entities**: The entity record model and its typed views
//! - **store**: Loads every record under a root directory into a snapshot
//! - **schema**: One validation schema per entity type

pub mod entities;
pub mod schema;
pub mod store;

pub use entities::*;
pub use schema::*;
pub use store::*;
