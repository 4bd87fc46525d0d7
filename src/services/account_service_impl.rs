//! `SeaORM` implementation of the `AccountService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::TransactionTrait;
use tracing::{info, warn};

use crate::auth::{password, token};
use crate::config::SecurityConfig;
use crate::db::repositories::account as account_repo;
use crate::db::{Account, AccountPage, NewAccount, Store};
use crate::mail::Mailer;
use crate::services::account_service::{
    AccountError, AccountService, Identity, ProfilePatch, Registration,
};

pub struct SeaOrmAccountService {
    store: Store,
    mailer: Arc<dyn Mailer>,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub fn new(store: Store, mailer: Arc<dyn Mailer>, security: SecurityConfig) -> Self {
        Self {
            store,
            mailer,
            security,
        }
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(&self, registration: Registration) -> Result<(), AccountError> {
        // An absent or empty password stores no hash at all; such accounts
        // can never pass authentication.
        let password_hash = match registration.password.as_deref().filter(|p| !p.is_empty()) {
            Some(plain) => Some(password::hash(plain, &self.security).await?),
            None => None,
        };

        let activation_token = token::activation_code();

        // Insert and mail dispatch are one unit: a row must never become
        // visible without its token having left the building.
        let txn = self.store.conn.begin().await?;

        let row = account_repo::insert(
            &txn,
            NewAccount {
                username: registration.username,
                email: registration.email,
                password_hash,
                inactive: true,
                activation_token: Some(activation_token.clone()),
            },
        )
        .await
        .map_err(|err| {
            if matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) {
                AccountError::EmailInUse
            } else {
                AccountError::from(err)
            }
        })?;

        if let Err(err) = self
            .mailer
            .send_activation(&row.email, &activation_token)
            .await
        {
            warn!("Activation mail dispatch failed, rolling back: {err}");
            if let Err(rollback_err) = txn.rollback().await {
                warn!("Rollback after mail failure also failed: {rollback_err}");
            }
            return Err(AccountError::EmailDispatch);
        }

        txn.commit().await?;

        info!("Registered account for {}", row.email);
        Ok(())
    }

    async fn activate(&self, token: &str) -> Result<(), AccountError> {
        let account = self
            .store
            .find_account_by_activation_token(token)
            .await?
            .ok_or(AccountError::InvalidActivationToken)?;

        self.store.activate_account(account.id).await?;

        info!("Activated account {}", account.id);
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AccountError> {
        let (account, password_hash) = self
            .store
            .find_account_with_password(email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let hash = password_hash.ok_or(AccountError::InvalidCredentials)?;

        let matches = password::verify(password, &hash).await?;
        if !matches {
            return Err(AccountError::InvalidCredentials);
        }

        // Correct password on an unconfirmed account is a distinct outcome.
        if account.inactive {
            return Err(AccountError::InactiveAccount);
        }

        Ok(account)
    }

    async fn update_profile(
        &self,
        caller: Option<Identity>,
        target_id: i32,
        patch: ProfilePatch,
    ) -> Result<Account, AccountError> {
        let caller = caller.ok_or(AccountError::UnauthorizedUpdate)?;
        if caller.id != target_id {
            return Err(AccountError::UnauthorizedUpdate);
        }

        self.store
            .update_account_profile(target_id, patch.username)
            .await?
            .ok_or(AccountError::NotFound)
    }

    async fn list_accounts(
        &self,
        page: u64,
        size: u64,
        exclude: Option<Identity>,
    ) -> Result<AccountPage, AccountError> {
        let page = self
            .store
            .find_active_account_page(page, size, exclude.map(|identity| identity.id))
            .await?;

        Ok(page)
    }

    async fn get_account(&self, id: i32) -> Result<Account, AccountError> {
        let account = self
            .store
            .find_account_by_id(id)
            .await?
            .filter(|account| !account.inactive)
            .ok_or(AccountError::NotFound)?;

        Ok(account)
    }
}
