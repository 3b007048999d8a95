//! WebAssembly module for the Hospital Pharmacy Inventory PWA
//!
//! Provides client-side computation for:
//! - FEFO suggestions on the exit form
//! - Expiry traffic-light status
//! - Entry cost totals

use chrono::NaiveDate;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("pharmacy inventory module loaded"));
}

/// Suggest which lots an exit would consume, as a JSON array of allocations.
///
/// `lots_json` is the body returned by `/inventory/lots/fefo`.
#[wasm_bindgen]
pub fn fefo_preview(lots_json: &str, medication_code: &str, quantity: u32) -> Result<String, JsValue> {
    preview_allocations(lots_json, medication_code, quantity).map_err(|e| JsValue::from_str(&e))
}

/// Total units available across the active lots in `lots_json`
#[wasm_bindgen]
pub fn available_stock(lots_json: &str, medication_code: &str) -> Result<f64, JsValue> {
    let lots = parse_lots(lots_json).map_err(|e| JsValue::from_str(&e))?;
    let total = sum_active(&lots, medication_code).map_err(|e| JsValue::from_str(&e))?;
    Ok(total as f64)
}

/// Classify days-to-expiry as "ok", "warning" or "critical"
#[wasm_bindgen]
pub fn expiry_status(days_to_expiry: i32, critical_days: i32, warning_days: i32) -> String {
    let thresholds = ExpiryThresholds {
        critical_days: i64::from(critical_days),
        warning_days: i64::from(warning_days),
    };
    thresholds.classify(i64::from(days_to_expiry)).as_str().to_string()
}

/// Days from `today` until `expiry`, both as YYYY-MM-DD
#[wasm_bindgen]
pub fn days_until_expiry(expiry: &str, today: &str) -> Result<i32, JsValue> {
    days_between(expiry, today).map_err(|e| JsValue::from_str(&e))
}

/// Days from the browser's current date until `expiry`
#[wasm_bindgen]
pub fn days_left(expiry: &str) -> Result<i32, JsValue> {
    let now = String::from(js_sys::Date::new_0().to_iso_string());
    let today = now.get(..10).unwrap_or_default();
    days_between(expiry, today).map_err(|e| JsValue::from_str(&e))
}

/// Purchase total shown on the entry form, or NaN when it cannot be computed
#[wasm_bindgen]
pub fn entry_total_cost(quantity: u32, unit_cost: f64) -> f64 {
    Decimal::try_from(unit_cost)
        .ok()
        .and_then(|cost| checked_line_cost(Quantity::from(quantity), cost))
        .and_then(|total| total.to_string().parse().ok())
        .unwrap_or(f64::NAN)
}

fn parse_lots(lots_json: &str) -> Result<Vec<Lot>, String> {
    serde_json::from_str(lots_json).map_err(|e| format!("Invalid lots JSON: {}", e))
}

fn sum_active(lots: &[Lot], medication_code: &str) -> Result<Quantity, String> {
    let ordered = shared::fefo_order(medication_code, lots);
    checked_quantity_sum(ordered.iter().map(|lot| lot.remaining))
        .ok_or_else(|| "Available stock exceeds the supported range".to_string())
}

fn preview_allocations(lots_json: &str, medication_code: &str, quantity: u32) -> Result<String, String> {
    let lots = parse_lots(lots_json)?;
    let allocations = shared::plan_exit(medication_code, &lots, Quantity::from(quantity))
        .map_err(|e| e.to_string())?;
    serde_json::to_string(&allocations).map_err(|e| e.to_string())
}

fn days_between(expiry: &str, today: &str) -> Result<i32, String> {
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date {}: {}", s, e))
    };
    let days = (parse(expiry)? - parse(today)?).num_days();
    i32::try_from(days).map_err(|_| "Date range too large".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOTS: &str = r#"[
        {"id":"6f1c1a52-5d0c-4c1b-9d36-0c7a7f1b2a01","medication_code":"A","lot_number":"L1",
         "expiry":"2025-12-31","initial_quantity":100,"remaining":100,"unit_cost":"2"},
        {"id":"6f1c1a52-5d0c-4c1b-9d36-0c7a7f1b2a02","medication_code":"A","lot_number":"L2",
         "expiry":"2025-11-30","initial_quantity":50,"remaining":50,"unit_cost":"3"}
    ]"#;

    #[test]
    fn test_preview_allocations_follows_fefo() {
        let json = preview_allocations(LOTS, "A", 70).unwrap();
        let allocations: Vec<Allocation> = serde_json::from_str(&json).unwrap();
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].lot_number, "L2");
        assert_eq!(allocations[0].quantity, 50);
        assert_eq!(allocations[1].lot_number, "L1");
        assert_eq!(allocations[1].quantity, 20);
    }

    #[test]
    fn test_preview_reports_shortage() {
        let err = preview_allocations(LOTS, "A", 1000).unwrap_err();
        assert_eq!(err, "Insufficient stock: requested 1000, available 150");
    }

    #[test]
    fn test_sum_active() {
        let lots = parse_lots(LOTS).unwrap();
        assert_eq!(sum_active(&lots, "A"), Ok(150));
        assert_eq!(sum_active(&lots, "B"), Ok(0));

        let mut huge = lots.clone();
        for lot in &mut huge {
            lot.initial_quantity = Quantity::MAX / 2 + 1;
            lot.remaining = Quantity::MAX / 2 + 1;
        }
        assert!(sum_active(&huge, "A").is_err());
    }

    #[test]
    fn test_expiry_status() {
        assert_eq!(expiry_status(10, 30, 90), "critical");
        assert_eq!(expiry_status(60, 30, 90), "warning");
        assert_eq!(expiry_status(120, 30, 90), "ok");
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between("2025-12-31", "2025-12-01").unwrap(), 30);
        assert!(days_between("31/12/2025", "2025-12-01").is_err());
    }

    #[test]
    fn test_entry_total_cost() {
        assert!((entry_total_cost(100, 2.5) - 250.0).abs() < 0.001);
        assert!(entry_total_cost(u32::MAX, 7.0e28).is_nan());
    }
}
