//! REST client for the application storage backend.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::domain::{ApplicationId, ApplicationPayload, ApplicationRecord};
use super::repository::{ApplicationStorage, Created, StorageError};

/// Body of `PUT /update-apps`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub id: ApplicationId,
    pub update_data: ApplicationPayload,
}

/// Reply of `PUT /update-apps`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub data: ApplicationRecord,
}

pub struct HttpApplicationStorage {
    base_url: String,
    client: Client,
}

impl HttpApplicationStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, StorageError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, "application storage request failed");
                StorageError::Network(err.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound);
        }

        let body = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), %body, "application storage rejected request");
        Err(StorageError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StorageError> {
        response
            .json::<T>()
            .await
            .map_err(|err| StorageError::Decode(err.to_string()))
    }
}

#[async_trait]
impl ApplicationStorage for HttpApplicationStorage {
    async fn create_application(
        &self,
        payload: ApplicationPayload,
    ) -> Result<Created, StorageError> {
        debug!("posting new application");
        let response = self
            .send(self.client.post(self.url("create-app")).json(&payload))
            .await?;
        Self::decode(response).await
    }

    async fn list_applications(
        &self,
        email: &str,
    ) -> Result<Vec<ApplicationRecord>, StorageError> {
        let response = self
            .send(self.client.get(self.url("read-apps")).query(&[("email", email)]))
            .await?;
        Self::decode(response).await
    }

    async fn get_application(&self, id: &ApplicationId) -> Result<ApplicationRecord, StorageError> {
        let response = self
            .send(
                self.client
                    .get(self.url("read-apps"))
                    .query(&[("id", id.0.as_str())]),
            )
            .await?;
        Self::decode(response).await
    }

    async fn update_application(
        &self,
        id: &ApplicationId,
        payload: ApplicationPayload,
    ) -> Result<ApplicationRecord, StorageError> {
        let request = UpdateRequest {
            id: id.clone(),
            update_data: payload,
        };
        let response = self
            .send(self.client.put(self.url("update-apps")).json(&request))
            .await?;
        let UpdateResponse { data } = Self::decode(response).await?;
        Ok(data)
    }

    async fn delete_application(&self, id: &ApplicationId) -> Result<(), StorageError> {
        self.send(
            self.client
                .delete(self.url("delete-app"))
                .query(&[("id", id.0.as_str())]),
        )
        .await?;
        Ok(())
    }
}
