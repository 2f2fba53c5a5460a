//! License repository implementation.

use sqlx::PgPool;

use livehub_core::error::{AppError, ErrorKind};
use livehub_core::result::AppResult;
use livehub_core::types::id::LicenseId;
use livehub_entity::license::{CreateLicense, License};

use super::map_db_error;

/// Repository for the meeting license pool.
#[derive(Debug, Clone)]
pub struct LicenseRepository {
    pool: PgPool,
}

impl LicenseRepository {
    /// Create a new license repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a license by ID.
    pub async fn find_by_id(&self, id: LicenseId) -> AppResult<Option<License>> {
        sqlx::query_as::<_, License>("SELECT * FROM licenses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find license", e))
    }

    /// All licenses, active or not, ordered by ID.
    pub async fn list_all(&self) -> AppResult<Vec<License>> {
        sqlx::query_as::<_, License>("SELECT * FROM licenses ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list licenses", e))
    }

    /// Active licenses ordered by ID, the order allocation prefers them in.
    pub async fn find_active(&self) -> AppResult<Vec<License>> {
        sqlx::query_as::<_, License>("SELECT * FROM licenses WHERE is_active ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find active licenses", e)
            })
    }

    /// Register a license. Duplicate e-mails are rejected as a conflict.
    pub async fn create(&self, data: &CreateLicense) -> AppResult<License> {
        sqlx::query_as::<_, License>(
            "INSERT INTO licenses (id, email, host_id, capacity) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(LicenseId::new())
        .bind(&data.email)
        .bind(&data.host_id)
        .bind(data.capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to create license", e))
    }

    /// Flip the active flag. Returns `None` when the license does not exist.
    pub async fn set_active(&self, id: LicenseId, active: bool) -> AppResult<Option<License>> {
        sqlx::query_as::<_, License>(
            "UPDATE licenses SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update license", e))
    }
}
