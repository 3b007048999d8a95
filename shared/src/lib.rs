//! Shared types and core stock logic for the Hospital Pharmacy Inventory
//!
//! This crate contains the lot ledger, the FEFO allocator and the domain
//! models shared between the backend and the PWA (via WASM). Nothing in here
//! performs I/O.

pub mod error;
pub mod fefo;
pub mod ledger;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use fefo::*;
pub use ledger::*;
pub use models::*;
pub use types::*;
pub use validation::*;
