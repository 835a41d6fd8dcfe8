//! Staff member models. Basic records only; scheduling is out of scope.

use comanda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `staff` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StaffMember {
    pub id: DbId,
    pub business_id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for creating a staff member.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStaff {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: String,
}

/// Request body for partially updating a staff member.
#[derive(Debug, Deserialize)]
pub struct UpdateStaff {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub active: Option<bool>,
}
