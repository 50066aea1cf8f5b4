//! Knowledge Base module - the link structure between entities.
//!
//! The knowledge base consists of:
//! - **References**: identifier-shaped strings found anywhere in a record
//! - **Relationships**: explicit typed edges from the relationship document
//! - **Graph**: both of the above as one directed multigraph

mod graph;
mod reference;
mod relationship;

pub use graph::*;
pub use reference::*;
pub use relationship::*;
