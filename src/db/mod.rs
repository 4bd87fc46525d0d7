use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::account::{Account, AccountPage, NewAccount};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Each pooled connection to an in-memory SQLite database would get
        // its own empty database, so the pool must stay at one connection.
        let (max_connections, min_connections) = if db_url.contains(":memory:") {
            (1, 1)
        } else {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    /// Insert an account row directly (seed/administrative path — no
    /// activation flow involved).
    pub async fn create_account(&self, new: NewAccount) -> Result<Account> {
        let model = repositories::account::insert(&self.conn, new).await?;
        Ok(Account::from(model))
    }

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.account_repo().get_by_email(email).await
    }

    pub async fn find_account_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(Account, Option<String>)>> {
        self.account_repo().get_by_email_with_password(email).await
    }

    pub async fn find_account_by_id(&self, id: i32) -> Result<Option<Account>> {
        self.account_repo().get_by_id(id).await
    }

    pub async fn find_account_by_activation_token(
        &self,
        token: &str,
    ) -> Result<Option<Account>> {
        self.account_repo().get_by_activation_token(token).await
    }

    pub async fn activate_account(&self, id: i32) -> Result<()> {
        self.account_repo().activate(id).await
    }

    pub async fn update_account_profile(
        &self,
        id: i32,
        username: Option<String>,
    ) -> Result<Option<Account>> {
        self.account_repo().update_profile(id, username).await
    }

    pub async fn find_active_account_page(
        &self,
        page: u64,
        size: u64,
        exclude_id: Option<i32>,
    ) -> Result<AccountPage> {
        self.account_repo()
            .get_active_page(page, size, exclude_id)
            .await
    }
}
