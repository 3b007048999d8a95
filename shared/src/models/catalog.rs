//! Catalog reference data: medications and pharmacy staff

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A medication in the hospital formulary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct Medication {
    /// Unique catalog code (e.g., "010.000.5550.00")
    #[validate(length(min = 1, max = 64, message = "Medication code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    /// Display-only presentation (e.g., "SOLUCIÓN IV. 6mg/3mL.")
    #[validate(length(min = 1, message = "Presentation is required"))]
    pub presentation: String,
}

/// A staff member who can sign off on movements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct StaffMember {
    #[validate(length(min = 1, max = 64, message = "Staff id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Job title (e.g., "RESPONSABLE SANITARIO DE FARMACIA")
    #[validate(length(min = 1, message = "Position is required"))]
    pub position: String,
}
