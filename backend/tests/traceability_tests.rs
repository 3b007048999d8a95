//! Lot traceability tests
//!
//! A lot's trace must account for every unit that left it, and the CSV
//! history must show the same allocations.

use std::sync::Arc;

use chrono::NaiveDate;
use pharmacy_inventory::error::AppError;
use pharmacy_inventory::seed::seed_demo_catalog;
use pharmacy_inventory::services::{MovementService, ReportingService, TraceabilityService};
use pharmacy_inventory::store::MemoryStore;
use rust_decimal::Decimal;
use shared::{
    EntryRequest, ExitReason, ExitRequest, LotState, MovementQuery, PatientRecord, Procurement,
};

const CODE: &str = "010.000.5550.00";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn setup() -> (MovementService, TraceabilityService) {
    let store = Arc::new(MemoryStore::new());
    seed_demo_catalog(store.as_ref()).await.unwrap();

    let movements = MovementService::new(store.clone());
    for (lot, expiry, quantity) in [
        ("L1", date(2025, 12, 31), 100),
        ("L2", date(2025, 11, 30), 50),
    ] {
        movements
            .record_entry(EntryRequest {
                medication_code: CODE.to_string(),
                lot_number: lot.to_string(),
                expiry,
                quantity,
                unit_cost: Decimal::from(4),
                responsible: "1".to_string(),
                procurement: Procurement {
                    laboratory: "Sanofi".to_string(),
                    supplier: "Distribuidora Central".to_string(),
                    purchase_order: "OC-2025-001".to_string(),
                    invoice: "F-8891".to_string(),
                },
            })
            .await
            .unwrap();
    }

    (movements, TraceabilityService::new(store))
}

fn exit(quantity: i64, reason: ExitReason) -> ExitRequest {
    ExitRequest {
        medication_code: CODE.to_string(),
        quantity,
        responsible: "2".to_string(),
        reason,
        patient: Some(PatientRecord {
            name: "Paciente 001".to_string(),
            age: 7,
            diagnosis: "MPS II".to_string(),
            dose: "6 mg".to_string(),
            frequency: "Semanal".to_string(),
            physician: "DR. LUIS PEREZ".to_string(),
            prescription_folio: "R-1001".to_string(),
        }),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_trace_of_untouched_lot() {
        let (_, trace) = setup().await;

        let view = trace.trace_lot(CODE, "L1").await.unwrap();
        assert_eq!(view.state, LotState::Active);
        assert_eq!(view.consumed_total, 0);
        assert!(view.consumptions.is_empty());

        let entry = view.entry.expect("entry movement");
        assert!(entry.created_lot(view.lot.id));
    }

    #[tokio::test]
    async fn test_trace_follows_split_exits() {
        let (movements, trace) = setup().await;
        movements
            .record_exit(exit(70, ExitReason::PatientAdministration))
            .await
            .unwrap();
        movements.record_exit(exit(5, ExitReason::Waste)).await.unwrap();

        let l2 = trace.trace_lot(CODE, "L2").await.unwrap();
        assert_eq!(l2.state, LotState::Exhausted);
        assert_eq!(l2.consumed_total, 50);
        assert_eq!(l2.consumptions.len(), 1);
        let patient = l2.consumptions[0].patient.as_ref().expect("patient record");
        assert_eq!(patient.name, "Paciente 001");
        assert_eq!(patient.prescription_folio, "R-1001");

        let l1 = trace.trace_lot(CODE, "L1").await.unwrap();
        assert_eq!(l1.state, LotState::Active);
        assert_eq!(l1.lot.remaining, 75);
        assert_eq!(l1.consumed_total, 25);
        let quantities: Vec<i64> = l1.consumptions.iter().map(|c| c.quantity).collect();
        assert_eq!(quantities, vec![20, 5]);
        assert_eq!(l1.consumptions[1].reason, ExitReason::Waste);
        assert_eq!(l1.consumptions[1].patient, None);
    }

    #[tokio::test]
    async fn test_unknown_lot_is_not_found() {
        let (_, trace) = setup().await;
        let err = trace.trace_lot(CODE, "L9").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = trace.trace_lot("999.999.9999.99", "L1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_history_csv_lists_allocations() {
        let (movements, _) = setup().await;
        movements
            .record_exit(exit(70, ExitReason::PatientAdministration))
            .await
            .unwrap();

        let history = movements.history(&MovementQuery::default()).await.unwrap();
        let csv = ReportingService::history_csv(&history).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("recorded_at,movement_type,medication_code"));
        assert!(lines[0].ends_with(",patient,prescription_folio"));
        assert!(lines[1].contains(",exit,010.000.5550.00,2,70,L2:50;L1:20,"));
        assert!(lines[1].contains("Administración a Paciente"));
        assert!(lines[1].ends_with(",Paciente 001,R-1001"));
        assert!(lines[2].contains(",entry,010.000.5550.00,1,50,L2,,200"));
        assert!(lines[3].contains(",entry,010.000.5550.00,1,100,L1,,400"));
    }
}
