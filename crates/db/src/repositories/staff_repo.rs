//! Repository for the `staff` table.

use sqlx::PgPool;

use comanda_core::types::DbId;

use crate::models::staff::StaffMember;

const STAFF_COLUMNS: &str = "\
    id, business_id, name, email, phone, role, active, created_at, updated_at";

/// Provides CRUD operations for staff members.
pub struct StaffRepo;

impl StaffRepo {
    /// Create a staff member.
    pub async fn create(
        pool: &PgPool,
        business_id: DbId,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        role: &str,
    ) -> Result<StaffMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO staff (business_id, name, email, phone, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {STAFF_COLUMNS}"
        );
        sqlx::query_as::<_, StaffMember>(&query)
            .bind(business_id)
            .bind(name)
            .bind(email)
            .bind(phone)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// Find a staff member scoped to their tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        business_id: DbId,
        id: DbId,
    ) -> Result<Option<StaffMember>, sqlx::Error> {
        let query = format!("SELECT {STAFF_COLUMNS} FROM staff WHERE business_id = $1 AND id = $2");
        sqlx::query_as::<_, StaffMember>(&query)
            .bind(business_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a tenant's staff.
    pub async fn list(pool: &PgPool, business_id: DbId) -> Result<Vec<StaffMember>, sqlx::Error> {
        let query =
            format!("SELECT {STAFF_COLUMNS} FROM staff WHERE business_id = $1 ORDER BY name");
        sqlx::query_as::<_, StaffMember>(&query)
            .bind(business_id)
            .fetch_all(pool)
            .await
    }

    /// Partially update a staff member.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        pool: &PgPool,
        business_id: DbId,
        id: DbId,
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        role: Option<&str>,
        active: Option<bool>,
    ) -> Result<Option<StaffMember>, sqlx::Error> {
        let query = format!(
            "UPDATE staff SET \
                 name = COALESCE($3, name), \
                 email = COALESCE($4, email), \
                 phone = COALESCE($5, phone), \
                 role = COALESCE($6, role), \
                 active = COALESCE($7, active), \
                 updated_at = NOW() \
             WHERE business_id = $1 AND id = $2 \
             RETURNING {STAFF_COLUMNS}"
        );
        sqlx::query_as::<_, StaffMember>(&query)
            .bind(business_id)
            .bind(id)
            .bind(name)
            .bind(email)
            .bind(phone)
            .bind(role)
            .bind(active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a staff member.
    pub async fn delete(pool: &PgPool, business_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM staff WHERE business_id = $1 AND id = $2")
            .bind(business_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
