//! Common types used across the inventory

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a lot record (not the printed lot number)
pub type LotId = Uuid;

/// Identifier of a movement record
pub type MovementId = Uuid;

/// Unit count of a medication (vials, ampoules, boxes)
pub type Quantity = i64;

/// Filter applied to the movement history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementQuery {
    pub medication_code: Option<String>,
    pub kind: Option<MovementKindFilter>,
}

/// Movement type used when filtering history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementKindFilter {
    Entry,
    Exit,
}

impl MovementKindFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKindFilter::Entry => "entry",
            MovementKindFilter::Exit => "exit",
        }
    }
}
