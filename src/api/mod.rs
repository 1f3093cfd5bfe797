//! Users endpoint transport
//!
//! `POST <base-url>/users` with the registration payload as JSON. The
//! [`UsersApi`] trait is the seam the form talks to; [`HttpUsersApi`] is the
//! reqwest implementation.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::form::payload::RegistrationPayload;

/// Path of the users resource, relative to the base URL
pub const USERS_PATH: &str = "/users";

/// Why a submission did not produce an account
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server answered {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    MalformedResponse(String),
    #[error("request aborted")]
    Aborted,
}

impl From<reqwest::Error> for SubmitError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            SubmitError::Status(status.as_u16())
        } else if e.is_decode() {
            SubmitError::MalformedResponse(e.to_string())
        } else {
            SubmitError::Transport(e.to_string())
        }
    }
}

/// Account returned by a successful `POST /users`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedUser {
    pub id: String,
}

impl CreatedUser {
    /// Pull the `id` out of a response body; numeric ids are accepted
    pub fn from_body(body: &Value) -> Result<Self, SubmitError> {
        let id = match body.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(SubmitError::MalformedResponse(format!("unusable id {}", other)))
            }
            None => return Err(SubmitError::MalformedResponse("missing id".to_string())),
        };
        Ok(Self { id })
    }
}

/// Where the application is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Register,
    Home { id: String },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Register => "/register".to_string(),
            Route::Home { id } => format!("/home/{}", id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Account creation backend
pub trait UsersApi: Send + Sync + 'static {
    fn create_user(
        &self,
        payload: RegistrationPayload,
    ) -> impl Future<Output = Result<CreatedUser, SubmitError>> + Send;
}

/// reqwest client for the users endpoint
#[derive(Debug, Clone)]
pub struct HttpUsersApi {
    client: Client,
    base_url: String,
}

impl HttpUsersApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn users_url(&self) -> String {
        format!("{}{}", self.base_url, USERS_PATH)
    }
}

impl UsersApi for HttpUsersApi {
    async fn create_user(&self, payload: RegistrationPayload) -> Result<CreatedUser, SubmitError> {
        let url = self.users_url();
        tracing::info!("POST {}", url);

        let response = self.client.post(&url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Users endpoint rejected registration: {}", status);
            return Err(SubmitError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SubmitError::MalformedResponse(e.to_string()))?;

        CreatedUser::from_body(&body)
    }
}
