//! Localized message catalogs.
//!
//! Handlers and services only ever produce message *keys*; this module maps
//! a key to user-facing text for the language negotiated from the request's
//! `Accept-Language` header. Catalogs are embedded at compile time.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Stable message keys produced by the core. The catalogs must cover every
/// one of these.
pub mod keys {
    pub const USER_SUCCESS: &str = "USER_SUCCESS";
    pub const ACCOUNT_ACTIVATION_SUCCESS: &str = "ACCOUNT_ACTIVATION_SUCCESS";
    pub const VALIDATION_FAILURE: &str = "VALIDATION_FAILURE";
    pub const AUTHENTICATION_FAILURE: &str = "AUTHENTICATION_FAILURE";
    pub const INACTIVE_ACCOUNT: &str = "INACTIVE_ACCOUNT";
    pub const UNAUTHORIZED_USER_UPDATE: &str = "UNAUTHORIZED_USER_UPDATE";
    pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";
    pub const ACCOUNT_ACTIVATION_FAILURE: &str = "ACCOUNT_ACTIVATION_FAILURE";
    pub const EMAIL_FAILURE: &str = "EMAIL_FAILURE";
    pub const INTERNAL_FAILURE: &str = "INTERNAL_FAILURE";
    pub const USERNAME_NULL: &str = "USERNAME_NULL";
    pub const USERNAME_SIZE: &str = "USERNAME_SIZE";
    pub const EMAIL_NULL: &str = "EMAIL_NULL";
    pub const EMAIL_INVALID: &str = "EMAIL_INVALID";
    pub const EMAIL_IN_USE: &str = "EMAIL_IN_USE";
    pub const PASSWORD_NULL: &str = "PASSWORD_NULL";
    pub const PASSWORD_SIZE: &str = "PASSWORD_SIZE";
    pub const PASSWORD_PATTERN: &str = "PASSWORD_PATTERN";
}

static EN: LazyLock<HashMap<String, String>> = LazyLock::new(|| load(include_str!("en.json")));
static ES: LazyLock<HashMap<String, String>> = LazyLock::new(|| load(include_str!("es.json")));

fn load(raw: &str) -> HashMap<String, String> {
    serde_json::from_str(raw).expect("embedded locale catalog is valid JSON")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    En,
    Es,
}

impl Lang {
    /// Negotiate from an `Accept-Language` header value; first supported
    /// primary tag wins, English is the fallback.
    #[must_use]
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::En;
        };

        for entry in value.split(',') {
            let tag = entry.split(';').next().unwrap_or("").trim();
            let primary = tag.split('-').next().unwrap_or("");
            match primary.to_ascii_lowercase().as_str() {
                "en" => return Self::En,
                "es" => return Self::Es,
                _ => {}
            }
        }

        Self::En
    }

    fn catalog(self) -> &'static HashMap<String, String> {
        match self {
            Self::En => &EN,
            Self::Es => &ES,
        }
    }
}

/// Resolve a message key for a language, falling back to English and then to
/// the key itself for anything a catalog is missing.
#[must_use]
pub fn translate(lang: Lang, key: &str) -> String {
    lang.catalog()
        .get(key)
        .or_else(|| EN.get(key))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiates_primary_language_tags() {
        assert_eq!(Lang::from_header(None), Lang::En);
        assert_eq!(Lang::from_header(Some("en")), Lang::En);
        assert_eq!(Lang::from_header(Some("es")), Lang::Es);
        assert_eq!(Lang::from_header(Some("es-AR,en;q=0.8")), Lang::Es);
        assert_eq!(Lang::from_header(Some("fr,es;q=0.9")), Lang::Es);
        assert_eq!(Lang::from_header(Some("de")), Lang::En);
    }

    #[test]
    fn translates_per_language_with_english_fallback() {
        assert_eq!(translate(Lang::En, keys::USER_NOT_FOUND), "User not found");
        assert_eq!(
            translate(Lang::Es, keys::USER_NOT_FOUND),
            "Usuario no encontrado"
        );
        assert_eq!(translate(Lang::Es, "NO_SUCH_KEY"), "NO_SUCH_KEY");
    }

    #[test]
    fn catalogs_cover_every_message_key() {
        for key in [
            keys::USER_SUCCESS,
            keys::ACCOUNT_ACTIVATION_SUCCESS,
            keys::VALIDATION_FAILURE,
            keys::AUTHENTICATION_FAILURE,
            keys::INACTIVE_ACCOUNT,
            keys::UNAUTHORIZED_USER_UPDATE,
            keys::USER_NOT_FOUND,
            keys::ACCOUNT_ACTIVATION_FAILURE,
            keys::EMAIL_FAILURE,
            keys::INTERNAL_FAILURE,
            keys::USERNAME_NULL,
            keys::USERNAME_SIZE,
            keys::EMAIL_NULL,
            keys::EMAIL_INVALID,
            keys::EMAIL_IN_USE,
            keys::PASSWORD_NULL,
            keys::PASSWORD_SIZE,
            keys::PASSWORD_PATTERN,
        ] {
            assert!(EN.contains_key(key), "en catalog missing {key}");
            assert!(ES.contains_key(key), "es catalog missing {key}");
        }
    }
}
