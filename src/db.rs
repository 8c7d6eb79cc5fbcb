use sqlx::{PgPool, Row};

use crate::error::HarvestError;
use crate::models::HarvestRecord;

/// Creates the harvest records table. Safe to call on every startup: an
/// existing table is a no-op success, any other DDL failure surfaces.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), HarvestError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS registros_colheita (
            id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
            data_colheita DATE NOT NULL,
            area_hectares DECIMAL(10,2) NOT NULL,
            id_colhedora VARCHAR(50) NOT NULL,
            total_toneladas DECIMAL(10,2) NOT NULL,
            toneladas_perdidas DECIMAL(10,2) NOT NULL,
            percentual_perda DECIMAL(5,2) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Appends one record; the row id is assigned by the table.
pub async fn insert_record(pool: &PgPool, record: &HarvestRecord) -> Result<(), HarvestError> {
    sqlx::query(
        r#"
        INSERT INTO registros_colheita
        (data_colheita, area_hectares, id_colhedora, total_toneladas,
         toneladas_perdidas, percentual_perda)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(record.date)
    .bind(record.area_hectares)
    .bind(&record.harvester_id)
    .bind(record.total_tons)
    .bind(record.lost_tons)
    .bind(record.loss_percentage)
    .execute(pool)
    .await?;

    Ok(())
}

/// Every persisted record, oldest harvest first. Ties on the same day keep
/// insertion order via the id column.
pub async fn fetch_records(pool: &PgPool) -> Result<Vec<HarvestRecord>, HarvestError> {
    let rows = sqlx::query(
        "SELECT data_colheita, area_hectares, id_colhedora, total_toneladas, \
         toneladas_perdidas, percentual_perda \
         FROM registros_colheita \
         ORDER BY data_colheita ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(HarvestRecord {
            date: row.get("data_colheita"),
            area_hectares: row.get("area_hectares"),
            harvester_id: row.get("id_colhedora"),
            total_tons: row.get("total_toneladas"),
            lost_tons: row.get("toneladas_perdidas"),
            loss_percentage: row.get("percentual_perda"),
        });
    }

    Ok(records)
}
