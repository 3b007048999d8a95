//! Route definitions for the Hospital Pharmacy Inventory

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Reference data
        .nest("/medications", medication_routes())
        .route("/staff", get(handlers::list_staff).post(handlers::create_staff))
        // Stock movements
        .nest("/movements", movement_routes())
        // Stock views
        .nest("/inventory", inventory_routes())
        // Lot traceability
        .route(
            "/trace/:medication_code/:lot_number",
            get(handlers::get_lot_trace),
        )
}

/// Formulary routes
fn medication_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_medications).post(handlers::create_medication),
        )
        .route("/:code", get(handlers::get_medication))
}

/// Entry, exit and history routes
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route("/entry", post(handlers::record_entry))
        .route("/exit", post(handlers::record_exit))
        .route("/history", get(handlers::movement_history))
}

/// Inventory routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_inventory_summary))
        .route("/lots/fefo", get(handlers::get_fefo_lots))
        .route("/medications/:code", get(handlers::get_medication_stock))
}
