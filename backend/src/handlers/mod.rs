//! HTTP handlers

pub mod catalog;
pub mod health;
pub mod inventory;
pub mod movement;
pub mod traceability;

pub use catalog::*;
pub use health::*;
pub use inventory::*;
pub use movement::*;
pub use traceability::*;
