use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    db::models::SensorReading,
    store::{is_foreign_key_violation, NewReading, Store},
};

/// Readings shown on a greenhouse detail page.
pub const RECENT_READINGS_LIMIT: i64 = 20;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("greenhouse {0} not found")]
    GreenhouseNotFound(Uuid),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct TelemetryService {
    store: Store,
}

impl TelemetryService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Stores one reading as received. Values are not range-checked.
    pub async fn ingest(&self, reading: &NewReading) -> Result<SensorReading, TelemetryError> {
        let stored = self.store.insert_reading(reading).await.map_err(|e| {
            if is_foreign_key_violation(&e) {
                warn!(greenhouse_id = %reading.greenhouse_id, "Reading for unknown greenhouse");
                TelemetryError::GreenhouseNotFound(reading.greenhouse_id)
            } else {
                TelemetryError::Storage(e)
            }
        })?;

        info!(greenhouse_id = %stored.greenhouse_id, reading_id = %stored.id, "Sensor reading ingested");
        Ok(stored)
    }

    pub async fn recent(&self, greenhouse_id: Uuid) -> Result<Vec<SensorReading>, TelemetryError> {
        Ok(self
            .store
            .recent_readings(greenhouse_id, RECENT_READINGS_LIMIT)
            .await?)
    }

    pub async fn latest(&self, greenhouse_id: Uuid) -> Result<Option<SensorReading>, TelemetryError> {
        Ok(self.store.latest_reading(greenhouse_id).await?)
    }
}
