//! Domain types read from (or derived from) a Cyclus output database.
//!
//! # Responsibility
//! - Name the rows this crate reads from the external schema.
//! - Provide nuclide identity and simulation-clock helpers.
//!
//! # Invariants
//! - Nothing here owns persistent state; every value is rebuilt per run.

pub mod agent;
pub mod material;
pub mod nuclide;
pub mod timeline;
