use uuid::Uuid;

use super::Store;
use crate::db::models::Issue;

impl Store {
    pub async fn insert_issue(&self, greenhouse_id: Uuid, description: &str) -> sqlx::Result<Issue> {
        sqlx::query_as::<_, Issue>(
            r#"
            INSERT INTO issues (greenhouse_id, description)
            VALUES ($1, $2)
            RETURNING id, greenhouse_id, description, resolved, created_at
            "#,
        )
        .bind(greenhouse_id)
        .bind(description)
        .fetch_one(&self.pool)
        .await
    }

    /// Returns the number of rows touched (0 when the issue does not exist).
    pub async fn resolve_issue(&self, id: Uuid) -> sqlx::Result<u64> {
        let done = sqlx::query("UPDATE issues SET resolved = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }

    pub async fn list_issues(&self, greenhouse_id: Uuid) -> sqlx::Result<Vec<Issue>> {
        sqlx::query_as::<_, Issue>(
            r#"
            SELECT id, greenhouse_id, description, resolved, created_at
            FROM issues
            WHERE greenhouse_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(greenhouse_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_unresolved_issues(&self) -> sqlx::Result<Vec<Issue>> {
        sqlx::query_as::<_, Issue>(
            r#"
            SELECT id, greenhouse_id, description, resolved, created_at
            FROM issues
            WHERE resolved = FALSE
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
