//! Domain models for the Hospital Pharmacy Inventory

mod catalog;
mod inventory;
mod lot;
mod movement;

pub use catalog::*;
pub use inventory::*;
pub use lot::*;
pub use movement::*;
