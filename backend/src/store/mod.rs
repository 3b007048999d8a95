//! Storage backends for the catalog and the stock ledger
//!
//! Both backends run the same FEFO planner from `shared`; they differ only in
//! how an exit is made atomic and serialized per medication.

use async_trait::async_trait;
use shared::{
    Allocation, ExitReason, Lot, Medication, Movement, MovementQuery, NewLot, PatientRecord,
    Procurement, Quantity, StaffMember,
};

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Entry ready to be written: catalog references already checked
#[derive(Debug, Clone)]
pub struct EntryCommand {
    pub lot: NewLot,
    pub responsible: String,
    pub procurement: Procurement,
}

/// Exit ready to be allocated: catalog references already checked
#[derive(Debug, Clone)]
pub struct ExitCommand {
    pub medication_code: String,
    pub quantity: Quantity,
    pub responsible: String,
    pub reason: ExitReason,
    /// Set only for patient administration exits
    pub patient: Option<PatientRecord>,
}

/// Persistence operations used by the services
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Short name reported by the health endpoint
    fn kind(&self) -> &'static str;

    async fn ping(&self) -> AppResult<()>;

    async fn create_medication(&self, medication: Medication) -> AppResult<Medication>;
    async fn list_medications(&self) -> AppResult<Vec<Medication>>;
    async fn get_medication(&self, code: &str) -> AppResult<Option<Medication>>;

    async fn create_staff(&self, staff: StaffMember) -> AppResult<StaffMember>;
    async fn list_staff(&self) -> AppResult<Vec<StaffMember>>;
    async fn get_staff(&self, id: &str) -> AppResult<Option<StaffMember>>;

    /// Open a lot and record its entry movement as one unit
    async fn record_entry(&self, entry: EntryCommand) -> AppResult<(Movement, Lot)>;

    /// Allocate an exit FEFO, consume the lots and record the movement as one
    /// unit. Concurrent exits of the same medication are serialized.
    async fn record_exit(&self, exit: ExitCommand) -> AppResult<(Movement, Vec<Allocation>)>;

    /// Lots with remaining stock, in no particular order
    async fn list_active_lots(&self, medication_code: &str) -> AppResult<Vec<Lot>>;

    /// All lots of a medication, exhausted ones included
    async fn list_lots(&self, medication_code: &str) -> AppResult<Vec<Lot>>;

    /// Movements newest first
    async fn list_movements(&self, query: &MovementQuery) -> AppResult<Vec<Movement>>;
}
