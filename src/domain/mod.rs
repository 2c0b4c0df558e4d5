//! Domain layer for Inventory Guardian
//!
//! CDD Principle: Domain Model - Pure business logic for variable inventory auditing
//! - Contains occurrences, variable sets and the audit findings built from them
//! - Independent of infrastructure concerns like file systems or template engines
//! - Expresses the ubiquitous language of layers, overrides and namespaces

pub mod findings;
pub mod occurrences;

// Re-export main domain types for convenience
pub use findings::*;
pub use occurrences::*;
