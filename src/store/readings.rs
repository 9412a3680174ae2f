use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Store;
use crate::db::models::SensorReading;

/// One telemetry sample as pushed by a device. Every measurement is optional
/// and stored as-is.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewReading {
    pub greenhouse_id: Uuid,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub co2: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub ph: Option<f64>,
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
}

impl Store {
    pub async fn insert_reading(&self, r: &NewReading) -> sqlx::Result<SensorReading> {
        sqlx::query_as::<_, SensorReading>(
            r#"
            INSERT INTO sensor_readings
                (greenhouse_id, temperature, humidity, co2, soil_moisture,
                 ph, nitrogen, phosphorus, potassium)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(r.greenhouse_id)
        .bind(r.temperature)
        .bind(r.humidity)
        .bind(r.co2)
        .bind(r.soil_moisture)
        .bind(r.ph)
        .bind(r.nitrogen)
        .bind(r.phosphorus)
        .bind(r.potassium)
        .fetch_one(&self.pool)
        .await
    }

    /// Newest first.
    pub async fn recent_readings(
        &self,
        greenhouse_id: Uuid,
        limit: i64,
    ) -> sqlx::Result<Vec<SensorReading>> {
        sqlx::query_as::<_, SensorReading>(
            r#"
            SELECT * FROM sensor_readings
            WHERE greenhouse_id = $1
            ORDER BY recorded_at DESC
            LIMIT $2
            "#,
        )
        .bind(greenhouse_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn latest_reading(&self, greenhouse_id: Uuid) -> sqlx::Result<Option<SensorReading>> {
        Ok(self.recent_readings(greenhouse_id, 1).await?.into_iter().next())
    }
}
