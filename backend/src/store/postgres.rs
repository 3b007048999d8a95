//! PostgreSQL store
//!
//! An exit locks the medication row before reading its lots, so exits of the
//! same medication queue up behind each other while other medications
//! proceed. Every write happens inside one transaction; returning early drops
//! the transaction and rolls it back.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    plan_exit, Allocation, LedgerError, Lot, Medication, Movement, MovementKind, MovementQuery,
    StaffMember,
};
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgConnection, PgPool};
use uuid::Uuid;

use super::{EntryCommand, ExitCommand, InventoryStore};
use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct MedicationRow {
    code: String,
    description: String,
    presentation: String,
}

impl From<MedicationRow> for Medication {
    fn from(row: MedicationRow) -> Self {
        Medication {
            code: row.code,
            description: row.description,
            presentation: row.presentation,
        }
    }
}

#[derive(Debug, FromRow)]
struct StaffRow {
    id: String,
    name: String,
    position: String,
}

impl From<StaffRow> for StaffMember {
    fn from(row: StaffRow) -> Self {
        StaffMember {
            id: row.id,
            name: row.name,
            position: row.position,
        }
    }
}

#[derive(Debug, FromRow)]
struct LotRow {
    id: Uuid,
    medication_code: String,
    lot_number: String,
    expiry: NaiveDate,
    initial_quantity: i64,
    remaining: i64,
    unit_cost: Decimal,
}

impl From<LotRow> for Lot {
    fn from(row: LotRow) -> Self {
        Lot {
            id: row.id,
            medication_code: row.medication_code,
            lot_number: row.lot_number,
            expiry: row.expiry,
            initial_quantity: row.initial_quantity,
            remaining: row.remaining,
            unit_cost: row.unit_cost,
        }
    }
}

#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    medication_code: String,
    responsible: String,
    recorded_at: DateTime<Utc>,
    details: Json<MovementKind>,
}

impl From<MovementRow> for Movement {
    fn from(row: MovementRow) -> Self {
        Movement {
            id: row.id,
            medication_code: row.medication_code,
            responsible: row.responsible,
            recorded_at: row.recorded_at,
            kind: row.details.0,
        }
    }
}

const LOT_COLUMNS: &str =
    "id, medication_code, lot_number, expiry, initial_quantity, remaining, unit_cost";

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create the connection pool
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.url)
            .await?;
        Ok(Self::new(db))
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }
}

/// Error for an allocation line whose guarded UPDATE matched no row. The
/// transaction is dropped, so the lines already updated roll back with it.
fn stale_allocation(lots: &[Lot], allocation: &Allocation) -> LedgerError {
    match lots.iter().find(|lot| lot.id == allocation.lot_id) {
        Some(lot) => LedgerError::InsufficientStock {
            requested: allocation.quantity,
            available: lot.remaining,
        },
        None => LedgerError::LotNotFound(allocation.lot_id),
    }
}

async fn insert_movement(conn: &mut PgConnection, movement: &Movement) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO movements (id, kind, medication_code, responsible, quantity, details, recorded_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(movement.id)
    .bind(movement.kind_filter().as_str())
    .bind(&movement.medication_code)
    .bind(&movement.responsible)
    .bind(movement.quantity())
    .bind(Json(&movement.kind))
    .bind(movement.recorded_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl InventoryStore for PgStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn create_medication(&self, medication: Medication) -> AppResult<Medication> {
        let row = sqlx::query_as::<_, MedicationRow>(
            r#"
            INSERT INTO medications (code, description, presentation)
            VALUES ($1, $2, $3)
            ON CONFLICT (code) DO NOTHING
            RETURNING code, description, presentation
            "#,
        )
        .bind(&medication.code)
        .bind(&medication.description)
        .bind(&medication.presentation)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::DuplicateEntry("medication code".to_string()))?;

        Ok(row.into())
    }

    async fn list_medications(&self) -> AppResult<Vec<Medication>> {
        let rows = sqlx::query_as::<_, MedicationRow>(
            "SELECT code, description, presentation FROM medications ORDER BY code",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_medication(&self, code: &str) -> AppResult<Option<Medication>> {
        let row = sqlx::query_as::<_, MedicationRow>(
            "SELECT code, description, presentation FROM medications WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn create_staff(&self, staff: StaffMember) -> AppResult<StaffMember> {
        let row = sqlx::query_as::<_, StaffRow>(
            r#"
            INSERT INTO staff (id, name, position)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, name, position
            "#,
        )
        .bind(&staff.id)
        .bind(&staff.name)
        .bind(&staff.position)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::DuplicateEntry("staff id".to_string()))?;

        Ok(row.into())
    }

    async fn list_staff(&self) -> AppResult<Vec<StaffMember>> {
        let rows = sqlx::query_as::<_, StaffRow>("SELECT id, name, position FROM staff ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_staff(&self, id: &str) -> AppResult<Option<StaffMember>> {
        let row =
            sqlx::query_as::<_, StaffRow>("SELECT id, name, position FROM staff WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(row.map(Into::into))
    }

    async fn record_entry(&self, entry: EntryCommand) -> AppResult<(Movement, Lot)> {
        entry.lot.validate()?;

        let mut tx = self.db.begin().await?;

        let inserted = sqlx::query_as::<_, LotRow>(&format!(
            r#"
            INSERT INTO lots (id, medication_code, lot_number, expiry, initial_quantity, remaining, unit_cost)
            VALUES ($1, $2, $3, $4, $5, $5, $6)
            ON CONFLICT (medication_code, lot_number) DO NOTHING
            RETURNING {}
            "#,
            LOT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&entry.lot.medication_code)
        .bind(&entry.lot.lot_number)
        .bind(entry.lot.expiry)
        .bind(entry.lot.quantity)
        .bind(entry.lot.unit_cost)
        .fetch_optional(&mut *tx)
        .await?;

        let lot: Lot = match inserted {
            Some(row) => row.into(),
            None => {
                return Err(LedgerError::DuplicateLot {
                    medication_code: entry.lot.medication_code,
                    lot_number: entry.lot.lot_number,
                }
                .into())
            }
        };

        let movement = Movement::new(
            &lot.medication_code,
            &entry.responsible,
            MovementKind::Entry {
                lot_id: lot.id,
                lot_number: lot.lot_number.clone(),
                expiry: lot.expiry,
                quantity: lot.initial_quantity,
                unit_cost: lot.unit_cost,
                procurement: entry.procurement,
            },
        );
        insert_movement(&mut *tx, &movement).await?;

        tx.commit().await?;

        Ok((movement, lot))
    }

    async fn record_exit(&self, exit: ExitCommand) -> AppResult<(Movement, Vec<Allocation>)> {
        let mut tx = self.db.begin().await?;

        // Serializes exits of this medication until commit or rollback
        let locked: Option<String> =
            sqlx::query_scalar("SELECT code FROM medications WHERE code = $1 FOR UPDATE")
                .bind(&exit.medication_code)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::NotFound("Medication".to_string()));
        }

        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {} FROM lots WHERE medication_code = $1 AND remaining > 0",
            LOT_COLUMNS
        ))
        .bind(&exit.medication_code)
        .fetch_all(&mut *tx)
        .await?;
        let lots: Vec<Lot> = rows.into_iter().map(Into::into).collect();

        let allocations = plan_exit(&exit.medication_code, &lots, exit.quantity)?;

        for allocation in &allocations {
            let result = sqlx::query(
                "UPDATE lots SET remaining = remaining - $1 WHERE id = $2 AND remaining >= $1",
            )
            .bind(allocation.quantity)
            .bind(allocation.lot_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() != 1 {
                return Err(stale_allocation(&lots, allocation).into());
            }
        }

        let movement = Movement::new(
            &exit.medication_code,
            &exit.responsible,
            MovementKind::Exit {
                requested_quantity: exit.quantity,
                reason: exit.reason,
                patient: exit.patient,
                allocations: allocations.clone(),
            },
        );
        insert_movement(&mut *tx, &movement).await?;

        tx.commit().await?;

        Ok((movement, allocations))
    }

    async fn list_active_lots(&self, medication_code: &str) -> AppResult<Vec<Lot>> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {} FROM lots WHERE medication_code = $1 AND remaining > 0 ORDER BY created_at, id",
            LOT_COLUMNS
        ))
        .bind(medication_code)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_lots(&self, medication_code: &str) -> AppResult<Vec<Lot>> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {} FROM lots WHERE medication_code = $1 ORDER BY created_at, id",
            LOT_COLUMNS
        ))
        .bind(medication_code)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_movements(&self, query: &MovementQuery) -> AppResult<Vec<Movement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, medication_code, responsible, recorded_at, details
            FROM movements
            WHERE ($1::TEXT IS NULL OR medication_code = $1)
              AND ($2::TEXT IS NULL OR kind = $2)
            ORDER BY recorded_at DESC, seq DESC
            "#,
        )
        .bind(query.medication_code.as_deref())
        .bind(query.kind.map(|kind| kind.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
