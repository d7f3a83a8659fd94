//! Water MCP Tools
//!
//! Tools for logging water. Amounts may be given in any volume unit and are
//! stored in milliliters.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Database;
use crate::models::{WaterEntry, WaterEntryCreate, WaterEntryUpdate};
use crate::nutrition::{categorize_unit, to_ml, UnitCategory};
use crate::reporting::summary::TodayWaterStats;
use crate::reporting::{Reporter, Zone};

/// Response for list_water
#[derive(Debug, Serialize)]
pub struct ListWaterResponse {
    pub entries: Vec<WaterEntry>,
    pub total_ml: i64,
    /// Today's intake, regardless of the listed range
    pub today: TodayWaterStats,
}

#[derive(Debug, Serialize)]
pub struct DeleteWaterResponse {
    pub success: bool,
    pub id: i64,
}

/// Convert an amount in `unit` to milliliters
pub fn amount_in_ml(amount: f64, unit: &str) -> Result<f64, String> {
    to_ml(amount, unit).ok_or_else(|| match categorize_unit(unit) {
        UnitCategory::Weight => format!("'{}' is a weight unit; water needs a volume unit", unit),
        _ => format!("Unknown volume unit '{}'", unit),
    })
}

/// Log water intake
pub fn log_water(
    db: &Database,
    owner_id: i64,
    occurred_at: DateTime<Utc>,
    amount: f64,
    unit: &str,
) -> Result<WaterEntry, String> {
    let amount_ml = amount_in_ml(amount, unit)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entry = WaterEntry::create(
        &conn,
        &WaterEntryCreate {
            owner_id,
            occurred_at,
            amount_ml,
        },
    )
    .map_err(|e| format!("Failed to log water: {}", e))?;

    tracing::info!(owner_id, id = entry.id, amount_ml = entry.amount_ml, "logged water");
    Ok(entry)
}

/// List water entries, newest first, with today's totals
pub fn list_water(
    db: &Database,
    reporter: &Reporter<Database, Zone>,
    owner_id: i64,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<ListWaterResponse, String> {
    let entries = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        WaterEntry::list(&conn, owner_id, start.as_ref(), end.as_ref())
            .map_err(|e| format!("Failed to list water: {}", e))?
    };

    let today = reporter
        .today_water_stats(owner_id, now)
        .map_err(|e| format!("Failed to get today's water: {}", e))?;

    Ok(ListWaterResponse {
        total_ml: entries.iter().fold(0i64, |acc, w| acc.saturating_add(w.amount_ml)),
        entries,
        today,
    })
}

pub fn update_water(
    db: &Database,
    owner_id: i64,
    id: i64,
    occurred_at: Option<DateTime<Utc>>,
    amount: Option<f64>,
    unit: &str,
) -> Result<Option<WaterEntry>, String> {
    let amount_ml = amount.map(|a| amount_in_ml(a, unit)).transpose()?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    WaterEntry::update(&conn, owner_id, id, &WaterEntryUpdate { occurred_at, amount_ml })
        .map_err(|e| format!("Failed to update water entry: {}", e))
}

pub fn delete_water(db: &Database, owner_id: i64, id: i64) -> Result<DeleteWaterResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let success = WaterEntry::delete(&conn, owner_id, id)
        .map_err(|e| format!("Failed to delete water entry: {}", e))?;
    Ok(DeleteWaterResponse { success, id })
}
