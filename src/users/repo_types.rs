use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User row as read back after an insert. The password hash is never selected.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub national_id: String,
    pub email: String,
    pub phone: String,
    pub created_at: OffsetDateTime,
}

/// Column values for an insert; `id` and `created_at` come from the database.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub national_id: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

/// Columns guarded by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    NationalId,
    Email,
}

impl UniqueField {
    pub fn as_str(self) -> &'static str {
        match self {
            UniqueField::NationalId => "nationalId",
            UniqueField::Email => "email",
        }
    }
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
