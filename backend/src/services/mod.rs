//! Business logic services for the Hospital Pharmacy Inventory

pub mod catalog;
pub mod inventory;
pub mod movement;
pub mod reporting;
pub mod traceability;

pub use catalog::CatalogService;
pub use inventory::InventoryService;
pub use movement::MovementService;
pub use reporting::ReportingService;
pub use traceability::TraceabilityService;
