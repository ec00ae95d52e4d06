use serde::{Deserialize, Serialize};

use crate::{
    api::{ApiClient, ApiError},
    session::{CurrentUser, MemoryCredentialStore},
};

const LOGIN_PATH: &str = "users/login/";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub phone_number: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
}

impl LoginResponse {
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser::from_token(Some(&self.access))
    }
}

pub struct AuthService<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, phone_number: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.client
            .post(
                LOGIN_PATH,
                &LoginRequest {
                    phone_number,
                    password,
                },
            )
            .await
    }

    /// Logs in and keeps both tokens in `store` so later requests carry the
    /// bearer credential.
    pub async fn login_into(
        &self,
        store: &MemoryCredentialStore,
        phone_number: &str,
        password: &str,
    ) -> Result<CurrentUser, ApiError> {
        let tokens = self.login(phone_number, password).await?;
        store.store(tokens.access.clone(), Some(tokens.refresh.clone()));
        log::info!("signed in as {}", phone_number);
        Ok(tokens.current_user())
    }

    pub fn logout(store: &MemoryCredentialStore) {
        store.clear();
        log::info!("signed out");
    }
}

impl ApiClient {
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self)
    }
}
