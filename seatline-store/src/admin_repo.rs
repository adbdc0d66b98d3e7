use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use seatline_core::{AdminCodeStore, StoreError};

use crate::backend_error;

pub struct PgAdminCodeStore {
    pool: PgPool,
}

impl PgAdminCodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert configured codes, leaving existing ones alone. Blank codes are skipped.
    pub async fn seed_codes(&self, codes: &[String]) -> Result<u64, StoreError> {
        let mut inserted = 0;
        for code in codes.iter().filter(|c| !c.trim().is_empty()) {
            let result = sqlx::query("INSERT INTO admin_codes (code) VALUES ($1) ON CONFLICT (code) DO NOTHING")
                .bind(code)
                .execute(&self.pool)
                .await
                .map_err(backend_error)?;
            inserted += result.rows_affected();
        }
        info!("Seeded {} admin codes", inserted);
        Ok(inserted)
    }
}

#[async_trait]
impl AdminCodeStore for PgAdminCodeStore {
    async fn is_valid_code(&self, submitted: &str) -> Result<bool, StoreError> {
        if submitted.trim().is_empty() {
            return Ok(false);
        }

        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM admin_codes WHERE code = $1)")
            .bind(submitted)
            .fetch_one(&self.pool)
            .await
            .map_err(backend_error)
    }
}
