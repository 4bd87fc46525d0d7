use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::config::Config;
use crate::db::Store;
use crate::mail::{Mailer, SmtpMailer};
use crate::services::{AccountService, SeaOrmAccountService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub mailer: Arc<dyn Mailer>,

    pub tokens: Arc<TokenCodec>,

    pub accounts: Arc<dyn AccountService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(&config.mail)?);
        Self::with_mailer(config, mailer).await
    }

    /// Build state around a caller-supplied mail transport (tests swap in a
    /// capturing mock here).
    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let tokens = Arc::new(TokenCodec::new(&config.token));

        let accounts: Arc<dyn AccountService> = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            mailer.clone(),
            config.security.clone(),
        ));

        Ok(Self {
            config,
            store,
            mailer,
            tokens,
            accounts,
        })
    }
}
