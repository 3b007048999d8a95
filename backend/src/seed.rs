//! Demo catalog loaded at startup when `seed_demo_data` is set

use shared::{Medication, StaffMember};

use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

pub fn demo_medications() -> Vec<Medication> {
    vec![
        Medication {
            code: "010.000.5550.00".to_string(),
            description: "IDURSULFASA".to_string(),
            presentation: "SOLUCIÓN IV. 6mg/3mL.".to_string(),
        },
        Medication {
            code: "010.000.5547.00".to_string(),
            description: "LARONIDASA".to_string(),
            presentation: "SOLUCIÓN INY. IV. 2.9mg/5mL (0.58mg/mL).".to_string(),
        },
    ]
}

pub fn demo_staff() -> Vec<StaffMember> {
    vec![
        StaffMember {
            id: "1".to_string(),
            name: "Q.F.B. MARIA HUERTA GARCIA".to_string(),
            position: "RESPONSABLE SANITARIO DE FARMACIA".to_string(),
        },
        StaffMember {
            id: "2".to_string(),
            name: "DR. JUAN PEREZ LOPEZ".to_string(),
            position: "MEDICO TRATANTE".to_string(),
        },
    ]
}

/// Load the demo catalog. Records that already exist are left untouched, so
/// restarting against a persistent store is safe.
pub async fn seed_demo_catalog(store: &dyn InventoryStore) -> AppResult<usize> {
    let mut created = 0;

    for medication in demo_medications() {
        match store.create_medication(medication).await {
            Ok(_) => created += 1,
            Err(AppError::DuplicateEntry(_)) => {}
            Err(err) => return Err(err),
        }
    }

    for staff in demo_staff() {
        match store.create_staff(staff).await {
            Ok(_) => created += 1,
            Err(AppError::DuplicateEntry(_)) => {}
            Err(err) => return Err(err),
        }
    }

    tracing::info!(created, "Demo catalog loaded");
    Ok(created)
}
