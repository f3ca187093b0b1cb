use serde::Serialize;

use crate::ApiClient;
use crate::error::ApiError;
use crate::models::LoginResponse;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    password: &'a str,
}

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// POST /auth/login
    ///
    /// Exchanges the admin password for a session token. A wrong password
    /// comes back either as `success: false` or as a rejected request;
    /// callers must not store a token in either case.
    pub async fn login(&self, password: &str) -> Result<LoginResponse, ApiError> {
        self.client
            .post("/auth/login", &LoginRequest { password })
            .await
    }
}
