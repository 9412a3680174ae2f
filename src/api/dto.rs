use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::models::{ControlCommand, SensorReading};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SensorReadingDto {
    pub id: Uuid,
    pub greenhouse_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Relative humidity percentage
    pub humidity: Option<f64>,
    /// ppm
    pub co2: Option<f64>,
    /// Volumetric percentage
    pub soil_moisture: Option<f64>,
    pub ph: Option<f64>,
    /// mg/kg
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
}

impl From<SensorReading> for SensorReadingDto {
    fn from(r: SensorReading) -> Self {
        Self {
            id: r.id,
            greenhouse_id: r.greenhouse_id,
            recorded_at: r.recorded_at,
            temperature: r.temperature,
            humidity: r.humidity,
            co2: r.co2,
            soil_moisture: r.soil_moisture,
            ph: r.ph,
            nitrogen: r.nitrogen,
            phosphorus: r.phosphorus,
            potassium: r.potassium,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ControlCommandDto {
    pub id: Uuid,
    pub greenhouse_id: Uuid,
    /// e.g. `pump`, `fan`, `light`
    pub device: String,
    /// e.g. `on`, `off`
    pub action: String,
    pub executed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ControlCommand> for ControlCommandDto {
    fn from(c: ControlCommand) -> Self {
        Self {
            id: c.id,
            greenhouse_id: c.greenhouse_id,
            device: c.device,
            action: c.action,
            executed: c.executed,
            created_at: c.created_at,
        }
    }
}

/// Response for `POST /api/greenhouse/{id}/commands/{command_id}/acknowledge`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AcknowledgeResponse {
    pub status: String,
    pub command: ControlCommandDto,
}

/// Request body for `POST /api/greenhouse/{id}/image`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImageUploadRequest {
    /// Base64 image bytes; a `data:<mime>;base64,` prefix is accepted.
    pub image: String,
    /// Client-supplied file name, used for the stored extension.
    pub file_name: Option<String>,
    /// `en` or `es`. Falls back to `?lang=`, the `lang` cookie, then the default.
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImageAnalysisResponse {
    pub analysis: String,
    pub language: String,
    /// Server-side file name of the stored upload.
    pub stored_as: String,
}
