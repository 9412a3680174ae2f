use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Mirrors the `user_role` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Sees and controls only the greenhouses they own.
    Farmer,
    /// Cross-greenhouse visibility into unresolved issues.
    Technician,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Farmer => "farmer",
            Role::Technician => "technician",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Argon2id PHC string (salt embedded).
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Reference profile of acceptable environmental ranges. Display only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plant {
    pub id: Uuid,
    pub name: String,
    /// Degrees Celsius
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    /// Relative humidity percentage
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
    /// ppm
    pub co2_min: Option<f64>,
    pub co2_max: Option<f64>,
    /// Volumetric percentage
    pub soil_moisture_min: Option<f64>,
    pub soil_moisture_max: Option<f64>,
    pub ph_min: Option<f64>,
    pub ph_max: Option<f64>,
    /// mg/kg
    pub nitrogen_min: Option<f64>,
    pub nitrogen_max: Option<f64>,
    pub phosphorus_min: Option<f64>,
    pub phosphorus_max: Option<f64>,
    pub potassium_min: Option<f64>,
    pub potassium_max: Option<f64>,
    /// Lux
    pub light_min: Option<f64>,
    pub light_max: Option<f64>,
}

impl Plant {
    /// `(label, min, max)` rows in display order.
    pub fn ranges(&self) -> [(&'static str, Option<f64>, Option<f64>); 9] {
        [
            ("temperature", self.temperature_min, self.temperature_max),
            ("humidity", self.humidity_min, self.humidity_max),
            ("co2", self.co2_min, self.co2_max),
            ("soil_moisture", self.soil_moisture_min, self.soil_moisture_max),
            ("ph", self.ph_min, self.ph_max),
            ("nitrogen", self.nitrogen_min, self.nitrogen_max),
            ("phosphorus", self.phosphorus_min, self.phosphorus_max),
            ("potassium", self.potassium_min, self.potassium_max),
            ("light", self.light_min, self.light_max),
        ]
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Greenhouse {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub owner_id: Uuid,
    pub plant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SensorReading {
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

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Issue {
    pub id: Uuid,
    pub greenhouse_id: Uuid,
    pub description: String,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

/// A device instruction. `executed` only ever goes `false → true`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ControlCommand {
    pub id: Uuid,
    pub greenhouse_id: Uuid,
    pub device: String,
    pub action: String,
    pub executed: bool,
    pub created_at: DateTime<Utc>,
}
