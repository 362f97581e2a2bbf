use chrono::Utc;
use sqlx::SqlitePool;
use std::str::FromStr;

use super::communication_repo::{self, CommunicationRepository};
use super::dispense_repo::{self, MedicationDispenseRepository};
use crate::models::{Task, TaskSource, TaskStatus};

pub struct TaskRepository {
    pool: SqlitePool,
    communications: CommunicationRepository,
    dispenses: MedicationDispenseRepository,
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    identifier: String,
    status: String,
    source: String,
    access_code: Option<String>,
    last_modified: Option<String>,
    authored_on: Option<String>,
    expires_on: Option<String>,
    redeemed_on: Option<String>,
    prescription_id: Option<String>,
    medication_name: Option<String>,
}

impl TaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            communications: CommunicationRepository::new(pool.clone()),
            dispenses: MedicationDispenseRepository::new(pool.clone()),
            pool,
        }
    }

    /// Looks a task up by id. A given `access_code` must match the stored one.
    pub async fn get_by_id(
        &self,
        id: &str,
        access_code: Option<&str>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT * FROM tasks WHERE identifier = ?1 AND (?2 IS NULL OR access_code = ?2)",
        )
        .bind(id)
        .bind(access_code)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.hydrate_task(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// All tasks, oldest authored first.
    pub async fn list(&self) -> Result<Vec<Task>, sqlx::Error> {
        let rows: Vec<TaskRow> =
            sqlx::query_as("SELECT * FROM tasks ORDER BY authored_on ASC, identifier ASC")
                .fetch_all(&self.pool)
                .await?;

        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            tasks.push(self.hydrate_task(row).await?);
        }
        Ok(tasks)
    }

    pub async fn latest_modified(&self) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT MAX(last_modified) FROM tasks")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn last_authenticated(&self) -> Result<Option<String>, sqlx::Error> {
        let marker: Option<Option<String>> =
            sqlx::query_scalar("SELECT last_authenticated FROM profile WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(marker.flatten())
    }

    /// Upserts tasks with their communications and dispenses in one transaction.
    pub async fn save(
        &self,
        tasks: &[Task],
        update_last_authenticated: bool,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for task in tasks {
            sqlx::query(
                r#"
                INSERT INTO tasks (identifier, status, source, access_code, last_modified, authored_on, expires_on, redeemed_on, prescription_id, medication_name)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(identifier) DO UPDATE SET
                    status = excluded.status,
                    source = excluded.source,
                    access_code = excluded.access_code,
                    last_modified = excluded.last_modified,
                    authored_on = excluded.authored_on,
                    expires_on = excluded.expires_on,
                    redeemed_on = excluded.redeemed_on,
                    prescription_id = excluded.prescription_id,
                    medication_name = excluded.medication_name
                "#,
            )
            .bind(&task.identifier)
            .bind(task.status.to_string())
            .bind(task.source.to_string())
            .bind(&task.access_code)
            .bind(&task.last_modified)
            .bind(&task.authored_on)
            .bind(&task.expires_on)
            .bind(&task.redeemed_on)
            .bind(&task.prescription_id)
            .bind(&task.medication_name)
            .execute(&mut *tx)
            .await?;

            for communication in &task.communications {
                communication_repo::upsert(&mut *tx, communication).await?;
            }
            for dispense in &task.medication_dispenses {
                dispense_repo::upsert(&mut *tx, dispense).await?;
            }
        }

        if update_last_authenticated {
            sqlx::query(
                r#"
                INSERT INTO profile (id, last_authenticated) VALUES (1, ?)
                ON CONFLICT(id) DO UPDATE SET last_authenticated = excluded.last_authenticated
                "#,
            )
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Deletes tasks and the dispenses stored for them.
    pub async fn delete(&self, tasks: &[Task]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for task in tasks {
            sqlx::query("DELETE FROM tasks WHERE identifier = ?")
                .bind(&task.identifier)
                .execute(&mut *tx)
                .await?;
            dispense_repo::delete_for_task(&mut *tx, &task.identifier).await?;
        }
        tx.commit().await
    }

    async fn hydrate_task(&self, row: TaskRow) -> Result<Task, sqlx::Error> {
        let communications = self.communications.list_for_task(&row.identifier).await?;
        let medication_dispenses = self.dispenses.list_for_task(&row.identifier).await?;
        let source =
            TaskSource::from_str(&row.source).map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(Task {
            identifier: row.identifier,
            status: TaskStatus::from(row.status),
            source,
            access_code: row.access_code,
            last_modified: row.last_modified,
            authored_on: row.authored_on,
            expires_on: row.expires_on,
            redeemed_on: row.redeemed_on,
            prescription_id: row.prescription_id,
            medication_name: row.medication_name,
            communications,
            medication_dispenses,
        })
    }
}
