//! Remote users resource: list, create, update and delete over HTTP.

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::UserId,
    protocol::{NewUser, User},
};
use tracing::debug;

use crate::error::GatewayError;

pub const DEFAULT_USERS_URL: &str = "http://localhost:3000/users";

/// The four remote calls the controller relies on. Every call is single-shot: no retry,
/// no caching, and no shared state is touched.
#[async_trait]
pub trait UsersGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, GatewayError>;
    async fn create(&self, user: NewUser) -> Result<User, GatewayError>;
    async fn update(&self, user: User) -> Result<User, GatewayError>;
    async fn delete(&self, id: UserId) -> Result<(), GatewayError>;
}

pub struct HttpUsersGateway {
    http: Client,
    base_url: String,
}

impl HttpUsersGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn user_url(&self, id: UserId) -> String {
        format!("{}/{}", self.base_url, id.0)
    }
}

impl Default for HttpUsersGateway {
    fn default() -> Self {
        Self::new(DEFAULT_USERS_URL)
    }
}

#[async_trait]
impl UsersGateway for HttpUsersGateway {
    async fn list(&self) -> Result<Vec<User>, GatewayError> {
        debug!(method = "GET", url = %self.base_url, "users request");
        let response = self.http.get(&self.base_url).send().await?;
        let users = ensure_success(response).await?.json().await?;
        Ok(users)
    }

    async fn create(&self, user: NewUser) -> Result<User, GatewayError> {
        debug!(method = "POST", url = %self.base_url, "users request");
        let response = self.http.post(&self.base_url).json(&user).send().await?;
        let created = ensure_success(response).await?.json().await?;
        Ok(created)
    }

    async fn update(&self, user: User) -> Result<User, GatewayError> {
        let url = self.user_url(user.id);
        debug!(method = "PUT", %url, "users request");
        let response = self.http.put(&url).json(&user).send().await?;
        let updated = ensure_success(response).await?.json().await?;
        Ok(updated)
    }

    async fn delete(&self, id: UserId) -> Result<(), GatewayError> {
        let url = self.user_url(id);
        debug!(method = "DELETE", %url, "users request");
        let response = self.http.delete(&url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // Keep the remote body: validation failures are only visible there.
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Remote {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
