//! Domain service for the account lifecycle.
//!
//! Registration with activation mail, token activation, credential
//! authentication and self-service profile update all go through here; the
//! HTTP layer only translates errors into responses.

use thiserror::Error;

use crate::db::{Account, AccountPage};

/// Errors specific to account lifecycle operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Unique email index rejected the insert.
    #[error("e-mail already registered")]
    EmailInUse,

    /// Unknown email or wrong password; deliberately the same variant so
    /// callers cannot enumerate registered addresses.
    #[error("incorrect credentials")]
    InvalidCredentials,

    /// Credentials were correct but the account was never activated.
    #[error("account is inactive")]
    InactiveAccount,

    #[error("caller is not allowed to update this account")]
    UnauthorizedUpdate,

    #[error("account not found")]
    NotFound,

    /// Unknown or already-consumed activation token; the two cases are
    /// indistinguishable because consumption clears the stored token.
    #[error("invalid activation token")]
    InvalidActivationToken,

    /// Activation mail could not be dispatched; the registration was rolled
    /// back.
    #[error("activation e-mail dispatch failed")]
    EmailDispatch,

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Registration input. There is deliberately no way to request an initial
/// active state: every registration starts inactive with a fresh token.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
}

/// Profile fields a holder may change about themselves.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub username: Option<String>,
}

/// The caller identity resolved by an authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: i32,
}

/// Domain service trait for the account lifecycle.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Persists a new inactive account and dispatches its activation mail as
    /// one atomic unit.
    ///
    /// # Errors
    ///
    /// [`AccountError::EmailDispatch`] if the mail could not be sent (the
    /// row is rolled back); [`AccountError::EmailInUse`] if the unique email
    /// index rejected the insert.
    async fn register(&self, registration: Registration) -> Result<(), AccountError>;

    /// Consumes an activation token, flipping the account to active exactly
    /// once.
    ///
    /// # Errors
    ///
    /// [`AccountError::InvalidActivationToken`] for unknown and
    /// already-consumed tokens alike.
    async fn activate(&self, token: &str) -> Result<(), AccountError>;

    /// Verifies credentials and enforces the active-state gate.
    ///
    /// # Errors
    ///
    /// [`AccountError::InvalidCredentials`] for unknown email or wrong
    /// password; [`AccountError::InactiveAccount`] when the password was
    /// correct but the account is inactive.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AccountError>;

    /// Applies a profile patch; only the account holder may update their row.
    async fn update_profile(
        &self,
        caller: Option<Identity>,
        target_id: i32,
        patch: ProfilePatch,
    ) -> Result<Account, AccountError>;

    /// One page of active accounts, optionally excluding the caller's own
    /// row.
    async fn list_accounts(
        &self,
        page: u64,
        size: u64,
        exclude: Option<Identity>,
    ) -> Result<AccountPage, AccountError>;

    /// Looks up a single active account; inactive rows are invisible here.
    async fn get_account(&self, id: i32) -> Result<Account, AccountError>;
}
