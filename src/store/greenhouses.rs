use uuid::Uuid;

use super::Store;
use crate::db::models::Greenhouse;

impl Store {
    pub async fn insert_greenhouse(
        &self,
        name: &str,
        location: Option<&str>,
        owner_id: Uuid,
        plant_id: Option<Uuid>,
    ) -> sqlx::Result<Greenhouse> {
        sqlx::query_as::<_, Greenhouse>(
            r#"
            INSERT INTO greenhouses (name, location, owner_id, plant_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, location, owner_id, plant_id, created_at
            "#,
        )
        .bind(name)
        .bind(location)
        .bind(owner_id)
        .bind(plant_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_greenhouse(&self, id: Uuid) -> sqlx::Result<Option<Greenhouse>> {
        sqlx::query_as::<_, Greenhouse>(
            r#"
            SELECT id, name, location, owner_id, plant_id, created_at
            FROM greenhouses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_greenhouses_for_owner(&self, owner_id: Uuid) -> sqlx::Result<Vec<Greenhouse>> {
        sqlx::query_as::<_, Greenhouse>(
            r#"
            SELECT id, name, location, owner_id, plant_id, created_at
            FROM greenhouses
            WHERE owner_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_all_greenhouses(&self) -> sqlx::Result<Vec<Greenhouse>> {
        sqlx::query_as::<_, Greenhouse>(
            r#"
            SELECT id, name, location, owner_id, plant_id, created_at
            FROM greenhouses
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
