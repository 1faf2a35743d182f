use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::client::ClientError;
use crate::error::FieldErrors;
use crate::models::{LeaveStatus, LeaveView, Role, User};
use crate::routes::admin::EmployeeDirectory;
use crate::routes::auth::AuthResponse;
use crate::routes::leaves::LeaveUpdated;

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    errors: Option<FieldErrors>,
}

/// Thin typed wrapper over the REST API. Holds the bearer token, if any, and
/// attaches it to every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .http
            .request(method, format!("{}/api{path}", self.base_url))
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let body = resp.json::<ErrorBody>().await.ok();
        let (message, errors) = match body {
            Some(body) => (body.message, body.errors),
            None => (None, None),
        };

        tracing::debug!(status = status.as_u16(), ?message, "API request failed");

        Err(ClientError::Api {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            }),
            errors,
        })
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ClientError> {
        self.send(self.request(Method::POST, "/register").json(registration))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        self.send(
            self.request(Method::POST, "/login")
                .json(&json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let _: serde_json::Value = self.send(self.request(Method::POST, "/logout")).await?;
        Ok(())
    }

    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.send(self.request(Method::GET, "/user")).await
    }

    pub async fn leaves(&self) -> Result<Vec<LeaveView>, ClientError> {
        self.send(self.request(Method::GET, "/leaves")).await
    }

    pub async fn create_leave<B: Serialize>(&self, body: &B) -> Result<LeaveView, ClientError> {
        self.send(self.request(Method::POST, "/leaves").json(body))
            .await
    }

    pub async fn leave(&self, id: Uuid) -> Result<LeaveView, ClientError> {
        self.send(self.request(Method::GET, &format!("/leaves/{id}")))
            .await
    }

    pub async fn update_leave_status(
        &self,
        id: Uuid,
        status: LeaveStatus,
    ) -> Result<LeaveUpdated, ClientError> {
        self.send(
            self.request(Method::PUT, &format!("/leaves/{id}"))
                .json(&json!({ "status": status })),
        )
        .await
    }

    pub async fn user_leaves(&self, user_id: Uuid) -> Result<Vec<LeaveView>, ClientError> {
        self.send(self.request(Method::GET, &format!("/users/{user_id}/leaves")))
            .await
    }

    pub async fn employees(&self) -> Result<EmployeeDirectory, ClientError> {
        self.send(self.request(Method::GET, "/admin/employees"))
            .await
    }
}
