//! # Lore Core
//!
//! The integrity and consistency engine for the World Bible. This crate reads
//! entities through `world_bible`, builds the link structure between them,
//! and reports every integrity problem it finds.
//!
//! ## Core Components
//!
//! - **knowledge_base**: Reference extraction, explicit relationships, and the relationship graph
//! - **consistency**: The checks and the report they produce
//! - **config**: Run configuration loaded from TOML
//! - **check**: Loads a knowledge base from disk and runs every check
//!
//! ## Design Philosophy
//!
//! - **Read-Only**: Records are evaluated, never written
//! - **Report, Don't Fail**: Bad data becomes an issue in the report; only bad usage is an error
//! - **Deterministic**: The same knowledge base always produces the same report

pub mod check;
pub mod config;
pub mod consistency;
pub mod knowledge_base;

pub use check::*;
pub use config::*;
pub use consistency::*;
pub use knowledge_base::*;
