use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::types::RegisterRequest;
use crate::db::Store;
use crate::locale::keys;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Field-level validation for registration. Returns `{field: message key}`;
/// an empty map means the request may proceed.
pub async fn validate_registration(
    store: &Store,
    request: &RegisterRequest,
) -> anyhow::Result<BTreeMap<&'static str, &'static str>> {
    let mut errors = syntactic_errors(request);

    // Uniqueness is only worth checking once the address itself is valid.
    if !errors.contains_key("email")
        && let Some(email) = request.email.as_deref()
        && store.find_account_by_email(email).await?.is_some()
    {
        errors.insert("email", keys::EMAIL_IN_USE);
    }

    Ok(errors)
}

fn syntactic_errors(request: &RegisterRequest) -> BTreeMap<&'static str, &'static str> {
    let mut errors = BTreeMap::new();

    match request.username.as_deref() {
        None | Some("") => {
            errors.insert("username", keys::USERNAME_NULL);
        }
        Some(username) => {
            let length = username.chars().count();
            if !(4..=32).contains(&length) {
                errors.insert("username", keys::USERNAME_SIZE);
            }
        }
    }

    match request.email.as_deref() {
        None | Some("") => {
            errors.insert("email", keys::EMAIL_NULL);
        }
        Some(email) => {
            if !EMAIL_RE.is_match(email) {
                errors.insert("email", keys::EMAIL_INVALID);
            }
        }
    }

    match request.password.as_deref() {
        None | Some("") => {
            errors.insert("password", keys::PASSWORD_NULL);
        }
        Some(password) => {
            if password.chars().count() < 6 {
                errors.insert("password", keys::PASSWORD_SIZE);
            } else if !has_required_mix(password) {
                errors.insert("password", keys::PASSWORD_PATTERN);
            }
        }
    }

    errors
}

fn has_required_mix(password: &str) -> bool {
    password.chars().any(char::is_lowercase)
        && password.chars().any(char::is_uppercase)
        && password.chars().any(|c| c.is_ascii_digit())
}
