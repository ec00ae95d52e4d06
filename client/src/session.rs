//! Session credential access for outgoing requests.
//!
//! The login flow writes the bearer token; the API client only ever reads it
//! through [`CredentialStore`].

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;
use std::sync::RwLock;

pub trait CredentialStore: Send + Sync {
    /// Current bearer token, if any. Empty tokens are treated as absent.
    fn token(&self) -> Option<String>;
}

/// Store with no credential; every request goes out anonymously.
#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

impl CredentialStore for Anonymous {
    fn token(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct StaticCredential(String);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialStore for StaticCredential {
    fn token(&self) -> Option<String> {
        Some(self.0.clone()).filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    access: RwLock<Option<String>>,
    refresh: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, access: impl Into<String>, refresh: Option<String>) {
        if let Ok(mut slot) = self.access.write() {
            *slot = Some(access.into());
        }
        if let Ok(mut slot) = self.refresh.write() {
            *slot = refresh;
        }
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.refresh.read().ok().and_then(|slot| slot.clone())
    }

    pub fn clear(&self) {
        if let Ok(mut slot) = self.access.write() {
            *slot = None;
        }
        if let Ok(mut slot) = self.refresh.write() {
            *slot = None;
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self) -> Option<String> {
        self.access
            .read()
            .ok()
            .and_then(|slot| slot.clone())
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone_number: String,
    pub initials: String,
}

#[derive(Debug, Default, Deserialize)]
struct TokenClaims {
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
}

impl CurrentUser {
    pub fn guest() -> Self {
        Self {
            first_name: "Guest".into(),
            last_name: String::new(),
            full_name: "Guest".into(),
            phone_number: String::new(),
            initials: "G".into(),
        }
    }

    /// Display identity from the JWT payload. The signature is not checked;
    /// this only feeds the header avatar.
    pub fn from_token(token: Option<&str>) -> Self {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Self::guest();
        };
        let claims = decode_claims(token).unwrap_or_default();

        let first_name = claims
            .first_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "User".into());
        let last_name = claims.last_name.unwrap_or_default();
        let full_name = if last_name.is_empty() {
            first_name.clone()
        } else {
            format!("{} {}", first_name, last_name)
        };
        let initials = first_name
            .chars()
            .take(1)
            .chain(last_name.chars().take(1))
            .collect::<String>()
            .to_uppercase();

        Self {
            first_name,
            last_name,
            full_name,
            phone_number: claims.phone_number.unwrap_or_default(),
            initials,
        }
    }
}

fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}
