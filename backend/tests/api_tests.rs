//! HTTP API tests
//!
//! Drives the full router (in-memory store, demo catalog) with one-shot
//! requests and checks status codes and the JSON error contract.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use pharmacy_inventory::{
    config::Config, create_app, seed::seed_demo_catalog, store::MemoryStore, AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const CODE: &str = "010.000.5550.00";

async fn app() -> Router {
    let store = Arc::new(MemoryStore::new());
    seed_demo_catalog(store.as_ref()).await.unwrap();
    create_app(AppState::new(store, Config::default()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn post_entry(app: &Router, lot: &str, expiry: &str, quantity: i64) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/v1/movements/entry",
        Some(json!({
            "medication_code": CODE,
            "lot_number": lot,
            "expiry": expiry,
            "quantity": quantity,
            "unit_cost": "12.50",
            "responsible": "1",
            "procurement": {
                "laboratorio": "Sanofi",
                "proveedor": "Distribuidora Central",
                "pedido": "OC-2025-001",
                "factura": "F-8891",
            },
        })),
    )
    .await
}

fn patient() -> Value {
    json!({
        "nombre": "Paciente 001",
        "edad": 7,
        "diagnostico": "MPS II",
        "dosis": "6 mg",
        "frecuencia": "Semanal",
        "doctor": "DR. LUIS PEREZ",
        "folioReceta": "R-1001",
    })
}

async fn post_exit_with(app: &Router, quantity: i64, patient: Value) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/v1/movements/exit",
        Some(json!({
            "medication_code": CODE,
            "quantity": quantity,
            "responsible": "2",
            "reason": "Administración a Paciente",
            "patient": patient,
        })),
    )
    .await
}

async fn post_exit(app: &Router, quantity: i64) -> (StatusCode, Value) {
    post_exit_with(app, quantity, patient()).await
}

// ============================================================================
// Catalog and health
// ============================================================================

#[cfg(test)]
mod catalog_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_store() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["storage"], "memory");
    }

    #[tokio::test]
    async fn test_medication_catalog() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/api/v1/medications", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) =
            send(&app, Method::GET, &format!("/api/v1/medications/{}", CODE), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "IDURSULFASA");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/medications",
            Some(json!({
                "code": CODE,
                "description": "IDURSULFASA",
                "presentation": "SOLUCIÓN IV. 6mg/3mL.",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "DUPLICATE_ENTRY");

        let (status, _) =
            send(&app, Method::GET, "/api/v1/medications/000.000.0000.00", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_staff_registration() {
        let app = app().await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/staff",
            Some(json!({ "id": "3", "name": "ENF. ANA RUIZ", "position": "ENFERMERA" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = send(&app, Method::GET, "/api/v1/staff", None).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }
}

// ============================================================================
// Movements
// ============================================================================

#[cfg(test)]
mod movement_tests {
    use super::*;

    #[tokio::test]
    async fn test_entry_and_fefo_exit() {
        let app = app().await;
        assert_eq!(post_entry(&app, "L1", "2025-12-31", 100).await.0, StatusCode::CREATED);
        let (status, body) = post_entry(&app, "L2", "2025-11-30", 50).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["lot"]["remaining"], 50);
        assert_eq!(body["total_cost"], "625.00");

        let (status, body) = post_exit(&app, 70).await;
        assert_eq!(status, StatusCode::CREATED);
        let allocations = body["allocations"].as_array().unwrap();
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0]["lot_number"], "L2");
        assert_eq!(allocations[0]["quantity"], 50);
        assert_eq!(allocations[1]["lot_number"], "L1");
        assert_eq!(allocations[1]["quantity"], 20);
        assert_eq!(body["movement"]["reason"], "patient_administration");

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/inventory/lots/fefo?medication_code={}", CODE),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let lots = body.as_array().unwrap();
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0]["lot_number"], "L1");
        assert_eq!(lots[0]["remaining"], 80);
    }

    #[tokio::test]
    async fn test_insufficient_stock_error_contract() {
        let app = app().await;
        post_entry(&app, "L1", "2025-12-31", 100).await;
        post_entry(&app, "L2", "2025-11-30", 50).await;

        let (status, body) = post_exit(&app, 1000).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INSUFFICIENT_STOCK");
        assert_eq!(body["error"]["field"], "quantity");
        assert_eq!(body["error"]["details"]["requested"], 1000);
        assert_eq!(body["error"]["details"]["available"], 150);
        assert_eq!(
            body["error"]["message_es"],
            "La cantidad (1000) excede la existencia total (150)"
        );
    }

    #[tokio::test]
    async fn test_exit_without_stock() {
        let app = app().await;
        let (status, body) = post_exit(&app, 1).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "NO_ACTIVE_LOT");
    }

    #[tokio::test]
    async fn test_duplicate_lot_and_invalid_quantity() {
        let app = app().await;
        post_entry(&app, "L1", "2025-12-31", 100).await;

        let (status, body) = post_entry(&app, "L1", "2026-03-31", 10).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "DUPLICATE_LOT");

        let (status, body) = post_entry(&app, "L3", "2026-03-31", 0).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["field"], "quantity");
    }

    #[tokio::test]
    async fn test_exit_without_patient_record() {
        let app = app().await;
        post_entry(&app, "L1", "2025-12-31", 100).await;

        let (status, body) = post_exit_with(&app, 10, Value::Null).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["field"], "patient");

        let mut incomplete = patient();
        incomplete["folioReceta"] = json!("");
        let (status, body) = post_exit_with(&app, 10, incomplete).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "patient");
    }

    #[tokio::test]
    async fn test_oversized_entry_is_rejected() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/movements/entry",
            Some(json!({
                "medication_code": CODE,
                "lot_number": "L1",
                "expiry": "2025-12-31",
                "quantity": i64::MAX,
                "unit_cost": "100000000000",
                "responsible": "1",
                "procurement": {
                    "laboratorio": "Sanofi",
                    "proveedor": "Distribuidora Central",
                    "pedido": "OC-2025-001",
                    "factura": "F-8891",
                },
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (_, body) = send(&app, Method::GET, "/api/v1/movements/history", None).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_json_and_csv() {
        let app = app().await;
        post_entry(&app, "L1", "2025-12-31", 100).await;
        post_exit(&app, 30).await;

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/movements/history?kind=exit",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let movements = body.as_array().unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0]["type"], "exit");

        let request = Request::builder()
            .uri("/api/v1/movements/history?format=csv")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains("L1:30"));
    }

    #[tokio::test]
    async fn test_trace_endpoint() {
        let app = app().await;
        post_entry(&app, "L1", "2025-12-31", 100).await;
        post_exit(&app, 30).await;

        let (status, body) =
            send(&app, Method::GET, &format!("/api/v1/trace/{}/L1", CODE), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["consumed_total"], 30);
        assert_eq!(body["state"], "active");
        assert_eq!(body["consumptions"][0]["patient"]["name"], "Paciente 001");
        assert_eq!(body["consumptions"][0]["patient"]["prescription_folio"], "R-1001");

        let (status, _) =
            send(&app, Method::GET, &format!("/api/v1/trace/{}/L9", CODE), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_inventory_summary() {
        let app = app().await;
        post_entry(&app, "L1", "2099-12-31", 100).await;

        let (status, body) = send(&app, Method::GET, "/api/v1/inventory", None).await;
        assert_eq!(status, StatusCode::OK);
        let summary = body.as_array().unwrap();
        let row = summary
            .iter()
            .find(|row| row["medication"]["code"] == CODE)
            .unwrap();
        assert_eq!(row["total_available"], 100);
        assert_eq!(row["expiry_status"], "ok");
        assert_eq!(row["stock_value"], "1250.00");
    }
}
