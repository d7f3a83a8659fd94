//! Water Entry model

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{instant, DbError, DbResult};
use crate::nutrition::round_whole;

/// A logged glass (or bottle, or jug) of water
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterEntry {
    pub id: i64,
    pub owner_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub amount_ml: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for logging water
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterEntryCreate {
    pub owner_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub amount_ml: f64,
}

/// Data for updating a water entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaterEntryUpdate {
    pub occurred_at: Option<DateTime<Utc>>,
    pub amount_ml: Option<f64>,
}

/// Largest single intake accepted, in ml
pub const MAX_WATER_ML: f64 = 100_000.0;

/// Rounded volume; must stay positive after rounding
fn ingest_amount(amount_ml: f64) -> DbResult<i64> {
    if amount_ml > MAX_WATER_ML {
        return Err(DbError::Invalid(format!("amount_ml must be at most {}", MAX_WATER_ML)));
    }
    let rounded = round_whole(amount_ml);
    if !amount_ml.is_finite() || rounded <= 0 {
        return Err(DbError::Invalid("amount_ml must be greater than zero".to_string()));
    }
    Ok(rounded)
}

impl WaterEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            occurred_at: instant::from_row(row, "occurred_at")?,
            amount_ml: row.get("amount_ml")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Log water intake
    pub fn create(conn: &Connection, data: &WaterEntryCreate) -> DbResult<Self> {
        let amount_ml = ingest_amount(data.amount_ml)?;

        conn.execute(
            "INSERT INTO water_entries (owner_id, occurred_at, amount_ml) VALUES (?1, ?2, ?3)",
            params![data.owner_id, instant::to_column(&data.occurred_at), amount_ml],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, data.owner_id, id)?
            .ok_or_else(|| DbError::NotFound(format!("Water entry {}", id)))
    }

    /// Get a water entry by ID, scoped to its owner
    pub fn get_by_id(conn: &Connection, owner_id: i64, id: i64) -> DbResult<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM water_entries WHERE id = ?1 AND owner_id = ?2")?;

        let result = stmt.query_row(params![id, owner_id], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List an owner's water entries within optional inclusive bounds, newest first
    pub fn list(
        conn: &Connection,
        owner_id: i64,
        start: Option<&DateTime<Utc>>,
        end: Option<&DateTime<Utc>>,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM water_entries WHERE owner_id = ?1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(owner_id)];

        if let Some(start) = start {
            params_vec.push(Box::new(instant::to_column(start)));
            sql.push_str(&format!(" AND occurred_at >= ?{}", params_vec.len()));
        }

        if let Some(end) = end {
            params_vec.push(Box::new(instant::to_column(end)));
            sql.push_str(&format!(" AND occurred_at <= ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY occurred_at DESC, id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let entries = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Apply a partial update. Returns `None` if the entry does not exist.
    pub fn update(
        conn: &Connection,
        owner_id: i64,
        id: i64,
        data: &WaterEntryUpdate,
    ) -> DbResult<Option<Self>> {
        let Some(existing) = Self::get_by_id(conn, owner_id, id)? else {
            return Ok(None);
        };

        let occurred_at = data.occurred_at.unwrap_or(existing.occurred_at);
        let amount_ml = match data.amount_ml {
            Some(v) => ingest_amount(v)?,
            None => existing.amount_ml,
        };

        conn.execute(
            r#"
            UPDATE water_entries SET
                occurred_at = ?1,
                amount_ml = ?2,
                updated_at = datetime('now')
            WHERE id = ?3 AND owner_id = ?4
            "#,
            params![instant::to_column(&occurred_at), amount_ml, id, owner_id],
        )?;

        Self::get_by_id(conn, owner_id, id)
    }

    /// Delete a water entry
    pub fn delete(conn: &Connection, owner_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM water_entries WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )?;
        Ok(rows > 0)
    }

    /// Total number of stored water entries
    pub fn count_all(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM water_entries", [], |row| row.get(0))?;
        Ok(count)
    }
}
