//! HTTP implementation of the persistence gateway.
//!
//! Talks to the `taskboard-server` REST API. Session authentication is
//! handled by the surrounding transport; this gateway carries the
//! authenticated user id in the `x-user-id` header on every request.

use taskboard_proto::api::{ApiResponse, CreateTaskRequest, UpdateTaskRequest};
use taskboard_proto::reorder::{Assignment, ReorderRequest};
use taskboard_proto::task::{Task, TaskId};

use crate::board::gateway::{GatewayError, TaskGateway};
use crate::config::BoardConfig;

/// Header carrying the authenticated caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Persistence gateway backed by the board server's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
}

impl HttpGateway {
    /// Creates a gateway against `base_url` (no trailing slash), acting as
    /// `user_id`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            user_id: user_id.into(),
        }
    }

    /// Builds a gateway from resolved client configuration, applying the
    /// configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &BoardConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            user_id: config.user_id.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends a request and unwraps the response envelope into its payload.
    async fn unwrap_envelope<T: serde::de::DeserializeOwned>(
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, GatewayError> {
        let envelope = Self::read_envelope::<T>(response).await?;
        envelope
            .data
            .ok_or_else(|| GatewayError::BadResponse("success envelope without data".to_string()))
    }

    /// Like [`Self::unwrap_envelope`] for operations with no payload.
    async fn expect_success(
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<(), GatewayError> {
        Self::read_envelope::<serde_json::Value>(response)
            .await
            .map(|_| ())
    }

    async fn read_envelope<T: serde::de::DeserializeOwned>(
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<ApiResponse<T>, GatewayError> {
        let response = response.map_err(|e| GatewayError::Transport(e.to_string()))?;
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::BadResponse(e.to_string()))?;
        if envelope.success {
            Ok(envelope)
        } else {
            Err(GatewayError::Rejected {
                code: envelope.code.unwrap_or_else(|| "UNKNOWN".to_string()),
                message: envelope.message.unwrap_or_default(),
            })
        }
    }
}

impl TaskGateway for HttpGateway {
    async fn fetch_tasks(&self, project_id: &str) -> Result<Vec<Task>, GatewayError> {
        let response = self
            .http
            .get(self.url(&format!("/api/tasks/{project_id}")))
            .header(USER_ID_HEADER, &self.user_id)
            .send()
            .await;
        Self::unwrap_envelope(response).await
    }

    async fn persist_assignments(
        &self,
        project_id: &str,
        assignments: &[Assignment],
    ) -> Result<(), GatewayError> {
        let body = ReorderRequest::from_assignments(assignments);
        let response = self
            .http
            .put(self.url(&format!("/api/tasks/{project_id}/reorder")))
            .header(USER_ID_HEADER, &self.user_id)
            .json(&body)
            .send()
            .await;
        Self::expect_success(response).await
    }

    async fn create_task(
        &self,
        project_id: &str,
        req: &CreateTaskRequest,
    ) -> Result<Task, GatewayError> {
        let response = self
            .http
            .post(self.url(&format!("/api/tasks/{project_id}")))
            .header(USER_ID_HEADER, &self.user_id)
            .json(req)
            .send()
            .await;
        Self::unwrap_envelope(response).await
    }

    async fn update_task(
        &self,
        project_id: &str,
        task_id: &TaskId,
        req: &UpdateTaskRequest,
    ) -> Result<Task, GatewayError> {
        let response = self
            .http
            .put(self.url(&format!("/api/tasks/{project_id}/{task_id}")))
            .header(USER_ID_HEADER, &self.user_id)
            .json(req)
            .send()
            .await;
        Self::unwrap_envelope(response).await
    }

    async fn delete_task(&self, project_id: &str, task_id: &TaskId) -> Result<(), GatewayError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/tasks/{project_id}/{task_id}")))
            .header(USER_ID_HEADER, &self.user_id)
            .send()
            .await;
        Self::expect_success(response).await
    }
}
