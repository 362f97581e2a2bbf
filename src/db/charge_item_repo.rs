use sqlx::SqlitePool;

use crate::models::SparseChargeItem;

pub struct ChargeItemRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ChargeItemRow {
    identifier: String,
    task_id: Option<String>,
    entered_date: String,
    medication_name: Option<String>,
    is_read: bool,
}

impl From<ChargeItemRow> for SparseChargeItem {
    fn from(row: ChargeItemRow) -> Self {
        SparseChargeItem {
            identifier: row.identifier,
            task_id: row.task_id,
            entered_date: row.entered_date,
            medication_name: row.medication_name,
            is_read: row.is_read,
        }
    }
}

impl ChargeItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<SparseChargeItem>, sqlx::Error> {
        let row: Option<ChargeItemRow> =
            sqlx::query_as("SELECT * FROM charge_items WHERE identifier = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(SparseChargeItem::from))
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<SparseChargeItem>, sqlx::Error> {
        let rows: Vec<ChargeItemRow> =
            sqlx::query_as("SELECT * FROM charge_items ORDER BY entered_date DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(SparseChargeItem::from).collect())
    }

    pub async fn latest_entered_date(&self) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT MAX(entered_date) FROM charge_items")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn save(&self, items: &[SparseChargeItem]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO charge_items (identifier, task_id, entered_date, medication_name, is_read)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(identifier) DO UPDATE SET
                    task_id = excluded.task_id,
                    entered_date = excluded.entered_date,
                    medication_name = excluded.medication_name,
                    is_read = excluded.is_read
                "#,
            )
            .bind(&item.identifier)
            .bind(&item.task_id)
            .bind(&item.entered_date)
            .bind(&item.medication_name)
            .bind(item.is_read)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    pub async fn delete(&self, items: &[SparseChargeItem]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for item in items {
            sqlx::query("DELETE FROM charge_items WHERE identifier = ?")
                .bind(&item.identifier)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await
    }
}
