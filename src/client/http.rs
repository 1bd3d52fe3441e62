//! HTTP transport for [`HabitApi`]

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::client::{ClientError, HabitApi};
use crate::domain::HabitRecord;
use crate::http::{ApiResponse, SESSION_COOKIE};
use crate::service::{
    CreateHabitParams, CreateHabitResponse, DeleteHabitParams, DeleteHabitResponse,
    ListHabitsResponse, ToggleParams, ToggleResponse,
};

/// Talks to a running server; the session token, if any, rides in the
/// `userId` cookie
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    session: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, session: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    fn habits_url(&self) -> String {
        format!("{}/habits", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.session {
            Some(token) => request.header(COOKIE, format!("{SESSION_COOKIE}={token}")),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await?;

        match envelope {
            ApiResponse {
                success: true,
                body: Some(body),
                ..
            } => Ok(body),
            ApiResponse { error, .. } => Err(ClientError::Rejected {
                status: status.as_u16(),
                message: error.unwrap_or_else(|| format!("request failed with status {status}")),
            }),
        }
    }
}

#[async_trait]
impl HabitApi for HttpApi {
    async fn list(&self) -> Result<Vec<HabitRecord>, ClientError> {
        let response: ListHabitsResponse = self.send(self.client.get(self.habits_url())).await?;
        Ok(response.habits)
    }

    async fn create(&self, params: CreateHabitParams) -> Result<HabitRecord, ClientError> {
        let response: CreateHabitResponse = self
            .send(self.client.post(self.habits_url()).json(&params))
            .await?;
        Ok(response.data)
    }

    async fn toggle(&self, params: ToggleParams) -> Result<bool, ClientError> {
        let response: ToggleResponse = self
            .send(self.client.patch(self.habits_url()).json(&params))
            .await?;
        Ok(response.completed)
    }

    async fn delete(&self, params: DeleteHabitParams) -> Result<(), ClientError> {
        let _: DeleteHabitResponse = self
            .send(self.client.delete(self.habits_url()).json(&params))
            .await?;
        Ok(())
    }
}
