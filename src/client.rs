//! API client for applications calling through the relay.
//!
//! The relay itself never authenticates. The calling application attaches
//! `Authorization: Token <value>` and treats non-2xx answers as errors; this
//! module is that calling side.

use axum::http::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{message} (status {status})")]
    Status {
        status: StatusCode,
        message: String,
        data: Value,
    },
}

/// A user registration as the backend expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "cedula")]
    pub id_number: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "ciudad")]
    pub city: String,
    /// Base64 photo.
    #[serde(rename = "foto", default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

pub fn report_endpoint(id_number: &str) -> String {
    format!("/dinamic-db/report/{}/assesmentDEV", id_number)
}

/// JSON client bound to a base URL such as `http://localhost:8080/api`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        Ok(Self {
            http: reqwest::Client::builder().no_proxy().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Send a request to `endpoint` (relative to the base URL).
    ///
    /// Non-2xx answers become [`ClientError::Status`], with the message taken
    /// from the JSON body's `message` field when there is one.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Token {}", token));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let data: Value = response
            .json()
            .await
            .unwrap_or_else(|_| Value::Object(Default::default()));
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Request failed")
            .to_string();
        tracing::warn!(status = status.as_u16(), message = %message, "API request failed");

        Err(ClientError::Status {
            status,
            message,
            data,
        })
    }

    /// Look up the report of a user by id number.
    pub async fn get_report(&self, id_number: &str) -> Result<Value, ClientError> {
        let response = self
            .request(Method::GET, &report_endpoint(id_number), None)
            .await?;
        Ok(response.json().await?)
    }

    /// Register a user.
    pub async fn register_user(&self, registration: &Registration) -> Result<Value, ClientError> {
        let body = serde_json::to_value(registration)?;
        let response = self
            .request(Method::POST, &report_endpoint(&registration.id_number), Some(&body))
            .await?;
        Ok(response.json().await?)
    }
}
