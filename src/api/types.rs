use serde::{Deserialize, Serialize};

use crate::db::{Account, AccountPage};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Outward-facing account representation; hash, activation token and the
/// inactive flag never leave the service.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<Account> for UserView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub content: Vec<UserView>,
    pub page: u64,
    pub size: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl From<AccountPage> for PageResponse {
    fn from(page: AccountPage) -> Self {
        Self {
            content: page.content.into_iter().map(UserView::from).collect(),
            page: page.page,
            size: page.size,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub id: i32,
    pub username: String,
    pub token: String,
}
