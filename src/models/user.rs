use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Console account. Only rows with `is_operator = TRUE` may mutate
/// announcements or maintenance settings; the claim is granted by the
/// `set-admin-claim` CLI.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_operator: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AdminProfile {
    pub id: Uuid,
    pub email: String,
    pub is_operator: bool,
}

impl From<AdminUser> for AdminProfile {
    fn from(u: AdminUser) -> Self {
        Self {
            id: u.id,
            email: u.email,
            is_operator: u.is_operator,
        }
    }
}
