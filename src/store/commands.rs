use uuid::Uuid;

use super::Store;
use crate::db::models::ControlCommand;

impl Store {
    pub async fn insert_command(
        &self,
        greenhouse_id: Uuid,
        device: &str,
        action: &str,
    ) -> sqlx::Result<ControlCommand> {
        sqlx::query_as::<_, ControlCommand>(
            r#"
            INSERT INTO control_commands (greenhouse_id, device, action)
            VALUES ($1, $2, $3)
            RETURNING id, greenhouse_id, device, action, executed, created_at
            "#,
        )
        .bind(greenhouse_id)
        .bind(device)
        .bind(action)
        .fetch_one(&self.pool)
        .await
    }

    /// Oldest first.
    pub async fn pending_commands(&self, greenhouse_id: Uuid) -> sqlx::Result<Vec<ControlCommand>> {
        sqlx::query_as::<_, ControlCommand>(
            r#"
            SELECT id, greenhouse_id, device, action, executed, created_at
            FROM control_commands
            WHERE greenhouse_id = $1
              AND executed = FALSE
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(greenhouse_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Sets `executed` regardless of its current value. `None` when no such
    /// command exists in the greenhouse.
    pub async fn mark_command_executed(
        &self,
        greenhouse_id: Uuid,
        command_id: Uuid,
    ) -> sqlx::Result<Option<ControlCommand>> {
        sqlx::query_as::<_, ControlCommand>(
            r#"
            UPDATE control_commands
            SET executed = TRUE
            WHERE id = $1
              AND greenhouse_id = $2
            RETURNING id, greenhouse_id, device, action, executed, created_at
            "#,
        )
        .bind(command_id)
        .bind(greenhouse_id)
        .fetch_optional(&self.pool)
        .await
    }

    #[cfg(test)]
    pub async fn count_commands(&self, greenhouse_id: Uuid) -> sqlx::Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM control_commands WHERE greenhouse_id = $1")
            .bind(greenhouse_id)
            .fetch_one(&self.pool)
            .await
    }
}
