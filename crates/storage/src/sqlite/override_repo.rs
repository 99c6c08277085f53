use chrono::Utc;
use quiz_core::model::Question;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{DurableStore, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl DurableStore for SqliteRepository {
    async fn read_overrides(&self) -> Result<String, StorageError> {
        let rows = sqlx::query("SELECT id, payload FROM custom_questions ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id").map_err(ser)?;
            let payload: String = row.try_get("payload").map_err(ser)?;
            match serde_json::from_str::<serde_json::Value>(&payload) {
                Ok(value) => records.push(value),
                Err(err) => tracing::warn!(id, error = %err, "skipping unreadable stored question"),
            }
        }

        serde_json::to_string(&records).map_err(ser)
    }

    async fn write_overrides(&self, questions: &[Question]) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM custom_questions")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for question in questions {
            let id = i64::try_from(question.id.value())
                .map_err(|_| StorageError::Serialization("question id overflow".into()))?;
            let payload = serde_json::to_string(question).map_err(ser)?;
            sqlx::query(
                r"
                INSERT INTO custom_questions (id, section, payload, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    section = excluded.section,
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(id)
            .bind(question.section.as_str())
            .bind(payload)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        tracing::debug!(count = questions.len(), "stored question overrides");
        Ok(())
    }
}
