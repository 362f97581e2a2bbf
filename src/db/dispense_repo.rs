use sqlx::{SqliteConnection, SqlitePool};

use crate::models::MedicationDispense;

pub struct MedicationDispenseRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct MedicationDispenseRow {
    identifier: String,
    task_id: String,
    telematik_id: Option<String>,
    when_handed_over: Option<String>,
    medication_name: Option<String>,
    quantity: Option<String>,
}

impl From<MedicationDispenseRow> for MedicationDispense {
    fn from(row: MedicationDispenseRow) -> Self {
        MedicationDispense {
            identifier: row.identifier,
            task_id: row.task_id,
            telematik_id: row.telematik_id,
            when_handed_over: row.when_handed_over,
            medication_name: row.medication_name,
            quantity: row.quantity,
        }
    }
}

impl MedicationDispenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_for_task(
        &self,
        task_id: &str,
    ) -> Result<Vec<MedicationDispense>, sqlx::Error> {
        let rows: Vec<MedicationDispenseRow> = sqlx::query_as(
            "SELECT * FROM medication_dispenses WHERE task_id = ? ORDER BY when_handed_over, identifier",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MedicationDispense::from).collect())
    }

    pub async fn save(&self, dispenses: &[MedicationDispense]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for dispense in dispenses {
            upsert(&mut *tx, dispense).await?;
        }
        tx.commit().await
    }
}

pub(super) async fn upsert(
    conn: &mut SqliteConnection,
    dispense: &MedicationDispense,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO medication_dispenses (identifier, task_id, telematik_id, when_handed_over, medication_name, quantity)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(identifier, task_id) DO UPDATE SET
            telematik_id = excluded.telematik_id,
            when_handed_over = excluded.when_handed_over,
            medication_name = excluded.medication_name,
            quantity = excluded.quantity
        "#,
    )
    .bind(&dispense.identifier)
    .bind(&dispense.task_id)
    .bind(&dispense.telematik_id)
    .bind(&dispense.when_handed_over)
    .bind(&dispense.medication_name)
    .bind(&dispense.quantity)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(super) async fn delete_for_task(
    conn: &mut SqliteConnection,
    task_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM medication_dispenses WHERE task_id = ?")
        .bind(task_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_is_upsert_per_task() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        let repo = MedicationDispenseRepository::new(pool);

        repo.save(&[
            MedicationDispense::new("d-1", "task-1").with_medication_name("Aspirin"),
            MedicationDispense::new("d-1", "task-2"),
        ])
        .await
        .unwrap();
        repo.save(&[MedicationDispense::new("d-1", "task-1").with_medication_name("Aspirin 500")])
            .await
            .unwrap();

        let task_1 = repo.list_for_task("task-1").await.unwrap();
        assert_eq!(task_1.len(), 1);
        assert_eq!(task_1[0].medication_name.as_deref(), Some("Aspirin 500"));
        assert_eq!(repo.list_for_task("task-2").await.unwrap().len(), 1);
    }
}
