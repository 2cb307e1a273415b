//! REST client for the Echo HTTP API.
//!
//! Every route except register/login needs the session token, which is
//! sent in the `x-auth-token` header.

use echo_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientError;
use crate::types::{
    AuthResponse, Comment, Customer, CustomerChanges, CustomerDetail, CustomerWithRequestCount,
    DashboardStats, Message, NewComment, NewCustomer, NewRequest, Request, RequestChanges,
    RequestDetail, RequestWithRelations, User,
};

/// Header carrying the session token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// HTTP client for one Echo API server.
#[derive(Debug, Clone)]
pub struct EchoApi {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl EchoApi {
    /// * `api_url` - Base URL, e.g. `http://localhost:5002`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Reuse an existing [`reqwest::Client`] and its connection pool.
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    // ---- auth ----

    /// `POST /api/auth/register`
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        self.post("/api/auth/register", &body).await
    }

    /// `POST /api/auth/login`
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.post("/api/auth/login", &body).await
    }

    /// `GET /api/auth/user` for the current token.
    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.get("/api/auth/user").await
    }

    // ---- requests ----

    /// All requests, newest first, with labels and customers.
    pub async fn list_requests(&self) -> Result<Vec<RequestWithRelations>, ClientError> {
        self.get("/api/requests").await
    }

    pub async fn get_request(&self, id: &str) -> Result<RequestDetail, ClientError> {
        self.get(&format!("/api/requests/{id}")).await
    }

    pub async fn create_request(&self, input: &NewRequest) -> Result<Request, ClientError> {
        self.post("/api/requests", input).await
    }

    pub async fn update_request(
        &self,
        id: &str,
        changes: &RequestChanges,
    ) -> Result<Request, ClientError> {
        self.put(&format!("/api/requests/{id}"), changes).await
    }

    pub async fn delete_request(&self, id: &str) -> Result<Message, ClientError> {
        self.delete(&format!("/api/requests/{id}")).await
    }

    /// Comment thread, oldest first.
    pub async fn list_comments(&self, request_id: &str) -> Result<Vec<Comment>, ClientError> {
        self.get(&format!("/api/requests/{request_id}/comments"))
            .await
    }

    pub async fn add_comment(
        &self,
        request_id: &str,
        content: &str,
    ) -> Result<Comment, ClientError> {
        let body = NewComment {
            content: content.to_string(),
        };
        self.post(&format!("/api/requests/{request_id}/comments"), &body)
            .await
    }

    // ---- customers ----

    pub async fn list_customers(&self) -> Result<Vec<CustomerWithRequestCount>, ClientError> {
        self.get("/api/customers").await
    }

    pub async fn get_customer(&self, id: DbId) -> Result<CustomerDetail, ClientError> {
        self.get(&format!("/api/customers/{id}")).await
    }

    pub async fn create_customer(&self, input: &NewCustomer) -> Result<Customer, ClientError> {
        self.post("/api/customers", input).await
    }

    pub async fn update_customer(
        &self,
        id: DbId,
        changes: &CustomerChanges,
    ) -> Result<Customer, ClientError> {
        self.put(&format!("/api/customers/{id}"), changes).await
    }

    pub async fn delete_customer(&self, id: DbId) -> Result<Message, ClientError> {
        self.delete(&format!("/api/customers/{id}")).await
    }

    // ---- stats ----

    pub async fn dashboard(&self) -> Result<DashboardStats, ClientError> {
        self.get("/api/stats").await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Attach the session token, if any.
    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.header(AUTH_TOKEN_HEADER, token),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.authed(self.client.get(self.url(path))).send().await?;
        Self::parse_response(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .authed(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .authed(self.client.put(self.url(path)))
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .authed(self.client.delete(self.url(path)))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Returns the response unchanged on a 2xx status, otherwise a
    /// [`ClientError::Api`] with the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
