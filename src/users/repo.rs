use async_trait::async_trait;
use sqlx::{postgres::PgDatabaseError, PgPool};
use thiserror::Error;
use tracing::debug;

pub use crate::users::repo_types::{NewUser, UniqueField, User};

/// SQLSTATE reported by Postgres for a unique violation.
const UNIQUE_VIOLATION: &str = "23505";
const NATIONAL_ID_CONSTRAINT: &str = "users_national_id_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

#[derive(Debug, Error)]
pub enum InsertError {
    #[error("unique constraint violated on {0}")]
    Conflict(UniqueField),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence seam for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; the store assigns `id` and `created_at`.
    async fn insert(&self, new_user: NewUser) -> Result<User, InsertError>;

    /// Cheap round-trip used by the health check.
    async fn ping(&self) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, new_user: NewUser) -> Result<User, InsertError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, national_id, email, phone, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, national_id, email, phone, created_at
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.national_id)
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(&new_user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|err| match unique_violation_field(&err) {
            Some(field) => InsertError::Conflict(field),
            None => InsertError::Database(err),
        })?;
        debug!(user_id = %user.id, "user row inserted");
        Ok(user)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        let ok: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.db).await?;
        anyhow::ensure!(ok == 1, "unexpected ping result {ok}");
        Ok(())
    }
}

/// Maps a unique violation to the column it guards.
///
/// The constraint name is authoritative. Drivers that omit it fall back to the
/// `Key (column)=(...)` detail text, and anything still unresolved is reported
/// as `email`. Returns `None` for every other error.
pub(crate) fn unique_violation_field(err: &sqlx::Error) -> Option<UniqueField> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if db_err.code().as_deref() != Some(UNIQUE_VIOLATION) {
        return None;
    }
    let field = match db_err.constraint() {
        Some(NATIONAL_ID_CONSTRAINT) => UniqueField::NationalId,
        Some(EMAIL_CONSTRAINT) => UniqueField::Email,
        _ => {
            let detail = db_err
                .try_downcast_ref::<PgDatabaseError>()
                .and_then(PgDatabaseError::detail);
            field_from_detail(detail)
        }
    };
    Some(field)
}

fn field_from_detail(detail: Option<&str>) -> UniqueField {
    match detail {
        Some(d) if d.contains("(national_id)") => UniqueField::NationalId,
        _ => UniqueField::Email,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::{borrow::Cow, error::Error as StdError, fmt};

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
        constraint: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    fn db_error(code: Option<&'static str>, constraint: Option<&'static str>) -> sqlx::Error {
        sqlx::Error::Database(Box::new(TestDbError { code, constraint }))
    }

    #[test]
    fn resolves_field_from_constraint_name() {
        let err = db_error(Some("23505"), Some("users_national_id_key"));
        assert_eq!(unique_violation_field(&err), Some(UniqueField::NationalId));

        let err = db_error(Some("23505"), Some("users_email_key"));
        assert_eq!(unique_violation_field(&err), Some(UniqueField::Email));
    }

    #[test]
    fn ambiguous_violation_defaults_to_email() {
        let err = db_error(Some("23505"), None);
        assert_eq!(unique_violation_field(&err), Some(UniqueField::Email));

        let err = db_error(Some("23505"), Some("some_other_idx"));
        assert_eq!(unique_violation_field(&err), Some(UniqueField::Email));
    }

    #[test]
    fn other_errors_are_not_conflicts() {
        let err = db_error(Some("42P01"), Some("users_email_key"));
        assert_eq!(unique_violation_field(&err), None);

        let err = db_error(None, None);
        assert_eq!(unique_violation_field(&err), None);

        assert_eq!(unique_violation_field(&sqlx::Error::RowNotFound), None);
        assert_eq!(unique_violation_field(&sqlx::Error::PoolTimedOut), None);
    }

    #[test]
    fn detail_text_names_the_column() {
        assert_eq!(
            field_from_detail(Some("Key (national_id)=(123) already exists.")),
            UniqueField::NationalId
        );
        assert_eq!(
            field_from_detail(Some("Key (email)=(a@x.com) already exists.")),
            UniqueField::Email
        );
        assert_eq!(field_from_detail(None), UniqueField::Email);
    }
}
