use uuid::Uuid;

use super::Store;
use crate::db::models::Plant;

const PLANT_COLUMNS: &str = r#"
    id, name,
    temperature_min, temperature_max,
    humidity_min, humidity_max,
    co2_min, co2_max,
    soil_moisture_min, soil_moisture_max,
    ph_min, ph_max,
    nitrogen_min, nitrogen_max,
    phosphorus_min, phosphorus_max,
    potassium_min, potassium_max,
    light_min, light_max
"#;

impl Store {
    pub async fn list_plants(&self) -> sqlx::Result<Vec<Plant>> {
        let sql = format!("SELECT {PLANT_COLUMNS} FROM plants ORDER BY name ASC");
        sqlx::query_as::<_, Plant>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_plant(&self, id: Uuid) -> sqlx::Result<Option<Plant>> {
        let sql = format!("SELECT {PLANT_COLUMNS} FROM plants WHERE id = $1");
        sqlx::query_as::<_, Plant>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
