use std::sync::Arc;

use axum::extract::FromRef;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    state::AppState,
    users::{
        dto::{PublicUser, RegisterRequest},
        password::CredentialHasher,
        repo::{InsertError, NewUser, UniqueField, UserStore},
    },
};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    MissingFields,
    WeakPassword,
}

impl ValidationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationReason::MissingFields => "missing_fields",
            ValidationReason::WeakPassword => "weak_password",
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("validation failed: {}", .0.as_str())]
    Validation(ValidationReason),
    #[error("{0} already registered")]
    Conflict(UniqueField),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

/// Registration request after validation; text fields are trimmed.
struct ValidRegistration {
    name: String,
    national_id: String,
    email: String,
    phone: String,
    password: String,
}

impl std::fmt::Debug for ValidRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidRegistration")
            .field("name", &self.name)
            .field("national_id", &self.national_id)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[redacted]")
            .finish()
    }
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate(request: RegisterRequest) -> Result<ValidRegistration, ValidationReason> {
    let (Some(name), Some(national_id), Some(email), Some(phone)) = (
        required(request.name),
        required(request.national_id),
        required(request.email),
        required(request.phone),
    ) else {
        return Err(ValidationReason::MissingFields);
    };
    // The password is kept verbatim; only its trimmed form must be non-empty.
    let password = match request.password {
        Some(p) if !p.trim().is_empty() => p,
        _ => return Err(ValidationReason::MissingFields),
    };
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationReason::WeakPassword);
    }
    Ok(ValidRegistration {
        name,
        national_id,
        email,
        phone,
        password,
    })
}

#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn UserStore>,
    hasher: CredentialHasher,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn UserStore>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<PublicUser, RegistrationError> {
        let valid = validate(request).map_err(|reason| {
            warn!(reason = reason.as_str(), "registration rejected");
            RegistrationError::Validation(reason)
        })?;

        let password_hash = self
            .hasher
            .hash_blocking(valid.password)
            .await
            .map_err(|e| {
                error!(error = ?e, "password hashing failed");
                RegistrationError::Internal(e)
            })?;

        let new_user = NewUser {
            name: valid.name,
            national_id: valid.national_id,
            email: valid.email,
            phone: valid.phone,
            password_hash,
        };

        match self.store.insert(new_user).await {
            Ok(user) => {
                info!(user_id = %user.id, "user registered");
                Ok(user.into())
            }
            Err(InsertError::Conflict(field)) => {
                warn!(field = field.as_str(), "registration conflict");
                Err(RegistrationError::Conflict(field))
            }
            Err(InsertError::Database(e)) => {
                error!(error = %e, "insert user failed");
                Err(RegistrationError::Internal(e.into()))
            }
        }
    }
}

impl FromRef<AppState> for RegistrationService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            state.users.clone(),
            CredentialHasher::new(state.config.hash.cost),
        )
    }
}
