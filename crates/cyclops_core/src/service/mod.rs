//! Analysis use-cases over simulator output.
//!
//! # Responsibility
//! - Orchestrate repository queries and series reconstruction into the
//!   analyses callers ask for.
//! - Keep the CLI decoupled from SQL and table layout.

pub mod analysis_service;
pub mod reports;
