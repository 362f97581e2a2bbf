use sqlx::SqlitePool;

use crate::models::{AuditEvent, PageRequest};

pub struct AuditEventRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct AuditEventRow {
    identifier: String,
    task_id: Option<String>,
    title: Option<String>,
    text: Option<String>,
    timestamp: String,
    locale: Option<String>,
}

impl From<AuditEventRow> for AuditEvent {
    fn from(row: AuditEventRow) -> Self {
        AuditEvent {
            identifier: row.identifier,
            task_id: row.task_id,
            title: row.title,
            text: row.text,
            timestamp: row.timestamp,
            locale: row.locale,
        }
    }
}

impl AuditEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// One page of events, newest first.
    pub async fn list(
        &self,
        task_id: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<AuditEvent>, sqlx::Error> {
        let rows: Vec<AuditEventRow> = sqlx::query_as(
            r#"
            SELECT * FROM audit_events
            WHERE (?1 IS NULL OR task_id = ?1)
            ORDER BY timestamp DESC, identifier
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(task_id)
        .bind(i64::try_from(page.size).unwrap_or(i64::MAX))
        .bind(i64::try_from(page.offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AuditEvent::from).collect())
    }

    pub async fn latest_timestamp(&self) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT MAX(timestamp) FROM audit_events")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn save(&self, events: &[AuditEvent]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for event in events {
            sqlx::query(
                r#"
                INSERT INTO audit_events (identifier, task_id, title, text, timestamp, locale)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(identifier) DO UPDATE SET
                    task_id = excluded.task_id,
                    title = excluded.title,
                    text = excluded.text,
                    timestamp = excluded.timestamp,
                    locale = excluded.locale
                "#,
            )
            .bind(&event.identifier)
            .bind(&event.task_id)
            .bind(&event.title)
            .bind(&event.text)
            .bind(&event.timestamp)
            .bind(&event.locale)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }
}
