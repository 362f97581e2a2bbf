use sqlx::{SqliteConnection, SqlitePool};
use std::str::FromStr;

use crate::models::{Communication, CommunicationProfile};

pub struct CommunicationRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct CommunicationRow {
    identifier: String,
    profile: String,
    task_id: String,
    insurance_id: String,
    telematik_id: String,
    order_id: Option<String>,
    timestamp: String,
    is_read: bool,
    payload_json: String,
}

impl TryFrom<CommunicationRow> for Communication {
    type Error = sqlx::Error;

    fn try_from(row: CommunicationRow) -> Result<Self, Self::Error> {
        let profile = CommunicationProfile::from_str(&row.profile)
            .map_err(|e| sqlx::Error::Decode(e.into()))?;
        Ok(Communication {
            identifier: row.identifier,
            profile,
            task_id: row.task_id,
            insurance_id: row.insurance_id,
            telematik_id: row.telematik_id,
            order_id: row.order_id,
            timestamp: row.timestamp,
            is_read: row.is_read,
            payload_json: row.payload_json,
        })
    }
}

fn from_rows(rows: Vec<CommunicationRow>) -> Result<Vec<Communication>, sqlx::Error> {
    rows.into_iter().map(Communication::try_from).collect()
}

impl CommunicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest first. `CommunicationProfile::All` returns every profile.
    pub async fn list(
        &self,
        profile: CommunicationProfile,
    ) -> Result<Vec<Communication>, sqlx::Error> {
        let rows: Vec<CommunicationRow> = if profile.is_all() {
            sqlx::query_as("SELECT * FROM communications ORDER BY timestamp DESC")
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query_as(
                "SELECT * FROM communications WHERE profile = ? ORDER BY timestamp DESC",
            )
            .bind(profile.to_string())
            .fetch_all(&self.pool)
            .await?
        };
        from_rows(rows)
    }

    pub async fn list_for_task(&self, task_id: &str) -> Result<Vec<Communication>, sqlx::Error> {
        let rows: Vec<CommunicationRow> = sqlx::query_as(
            "SELECT * FROM communications WHERE task_id = ? ORDER BY timestamp DESC",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        from_rows(rows)
    }

    pub async fn latest_timestamp(&self) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT MAX(timestamp) FROM communications")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn save(&self, communications: &[Communication]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for communication in communications {
            upsert(&mut *tx, communication).await?;
        }
        tx.commit().await
    }
}

/// Inserts a communication. An existing row keeps its content and can only
/// become read, never unread again.
pub(super) async fn upsert(
    conn: &mut SqliteConnection,
    communication: &Communication,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO communications (identifier, profile, task_id, insurance_id, telematik_id, order_id, timestamp, is_read, payload_json)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(identifier) DO UPDATE SET
            is_read = MAX(communications.is_read, excluded.is_read)
        "#,
    )
    .bind(&communication.identifier)
    .bind(communication.profile.to_string())
    .bind(&communication.task_id)
    .bind(&communication.insurance_id)
    .bind(&communication.telematik_id)
    .bind(&communication.order_id)
    .bind(&communication.timestamp)
    .bind(communication.is_read)
    .bind(&communication.payload_json)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
