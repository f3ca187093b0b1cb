use crate::ApiClient;
use crate::error::ApiError;
use crate::models::{User, UserListResponse, UserPayload};
use crate::params::UserListParams;

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// GET /users
    ///
    /// Server-side paginated user listing with an optional free-text search
    /// over name, admission number, and email.
    ///
    /// ### Query Parameters
    /// - `search` (optional): case-insensitive partial match
    /// - `page` (optional): page number, min 1
    /// - `limit` (optional): items per page, 1..=100
    pub async fn list(&self, params: &UserListParams) -> Result<UserListResponse, ApiError> {
        let query = params.to_query()?;
        self.client.get("/users", &query).await
    }

    /// GET /users/{id}
    pub async fn get(&self, id: &str) -> Result<User, ApiError> {
        self.client.get(&format!("/users/{id}"), &[]).await
    }

    /// POST /users
    pub async fn create(&self, payload: &UserPayload) -> Result<User, ApiError> {
        self.client.post("/users", payload).await
    }

    /// PUT /users/{id}
    pub async fn update(&self, id: &str, payload: &UserPayload) -> Result<User, ApiError> {
        self.client.put(&format!("/users/{id}"), payload).await
    }

    /// DELETE /users/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("/users/{id}")).await
    }
}
