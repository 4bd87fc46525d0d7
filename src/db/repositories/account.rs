use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::accounts;

/// Account data returned from the repository (without password hash or
/// activation token — those stay behind dedicated lookups).
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub inactive: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            inactive: model.inactive,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Column values for a new account row.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub inactive: bool,
    pub activation_token: Option<String>,
}

/// One page of active accounts.
#[derive(Debug, Clone)]
pub struct AccountPage {
    pub content: Vec<Account>,
    pub page: u64,
    pub size: u64,
    pub total_pages: u64,
}

/// Insert a new account row. Generic over the connection so the registration
/// flow can run it on an open transaction.
pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    new: NewAccount,
) -> Result<accounts::Model, sea_orm::DbErr> {
    let now = chrono::Utc::now().to_rfc3339();

    let active = accounts::ActiveModel {
        username: Set(new.username),
        email: Set(new.email),
        password_hash: Set(new.password_hash),
        inactive: Set(new.inactive),
        activation_token: Set(new.activation_token),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    active.insert(conn).await
}

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query account by email")?;

        Ok(account.map(Account::from))
    }

    /// Get account by email together with its stored password hash
    /// (credential verification path).
    pub async fn get_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(Account, Option<String>)>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query account by email")?;

        Ok(account.map(|a| {
            let password_hash = a.password_hash.clone();
            (Account::from(a), password_hash)
        }))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Account>> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account by ID")?;

        Ok(account.map(Account::from))
    }

    pub async fn get_by_activation_token(&self, token: &str) -> Result<Option<Account>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::ActivationToken.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query account by activation token")?;

        Ok(account.map(Account::from))
    }

    /// Flip the account to active and consume its activation token.
    pub async fn activate(&self, id: i32) -> Result<()> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account for activation")?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {id}"))?;

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: accounts::ActiveModel = account.into();
        active.inactive = Set(false);
        active.activation_token = Set(None);
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Update profile fields. Id, password hash, inactive flag and activation
    /// token are not reachable through this path.
    pub async fn update_profile(
        &self,
        id: i32,
        username: Option<String>,
    ) -> Result<Option<Account>> {
        let Some(account) = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account for update")?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: accounts::ActiveModel = account.into();
        if let Some(username) = username {
            active.username = Set(username);
        }
        active.updated_at = Set(now);
        let updated = active.update(&self.conn).await?;

        Ok(Some(Account::from(updated)))
    }

    /// One page of active accounts ordered by id, optionally excluding one
    /// row (the calling identity never sees itself in the directory).
    pub async fn get_active_page(
        &self,
        page: u64,
        size: u64,
        exclude_id: Option<i32>,
    ) -> Result<AccountPage> {
        let mut query = accounts::Entity::find().filter(accounts::Column::Inactive.eq(false));

        if let Some(id) = exclude_id {
            query = query.filter(accounts::Column::Id.ne(id));
        }

        let paginator = query
            .order_by_asc(accounts::Column::Id)
            .paginate(&self.conn, size);

        let total_pages = paginator
            .num_pages()
            .await
            .context("Failed to count account pages")?;

        let content = paginator
            .fetch_page(page)
            .await
            .context("Failed to fetch account page")?
            .into_iter()
            .map(Account::from)
            .collect();

        Ok(AccountPage {
            content,
            page,
            size,
            total_pages,
        })
    }
}
