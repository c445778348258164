//! REST client for the dish API.

use crate::error::ClientError;
use dishboard_config::ClientConfig;
use dishboard_protocol::{
    CreateDish, DataResponse, Dish, DishPatch, Empty, ErrorResponse, HealthResponse, ListResponse,
};
use log::debug;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// Thin typed wrapper over the REST surface.
#[derive(Debug, Clone)]
pub struct DishClient {
    http: reqwest::Client,
    base_url: String,
}

impl DishClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the real-time channel derived from the API base URL.
    pub fn websocket_url(&self) -> Result<String, ClientError> {
        if let Some(rest) = self.base_url.strip_prefix("http://") {
            Ok(format!("ws://{rest}/ws"))
        } else if let Some(rest) = self.base_url.strip_prefix("https://") {
            Ok(format!("wss://{rest}/ws"))
        } else {
            Err(ClientError::InvalidUrl(self.base_url.clone()))
        }
    }

    /// Fetch the full snapshot, ordered by name.
    pub async fn list(&self) -> Result<ListResponse, ClientError> {
        self.send(self.request(Method::GET, "/api/dishes")).await
    }

    pub async fn create(&self, body: &CreateDish) -> Result<DataResponse<Dish>, ClientError> {
        self.send(self.request(Method::POST, "/api/dishes").json(body))
            .await
    }

    pub async fn update(
        &self,
        dish_id: &str,
        patch: &DishPatch,
    ) -> Result<DataResponse<Dish>, ClientError> {
        let path = format!("/api/dishes/{dish_id}");
        self.send(self.request(Method::PUT, &path).json(patch)).await
    }

    pub async fn delete(&self, dish_id: &str) -> Result<DataResponse<Empty>, ClientError> {
        let path = format!("/api/dishes/{dish_id}");
        self.send(self.request(Method::DELETE, &path)).await
    }

    pub async fn toggle(&self, dish_id: &str) -> Result<DataResponse<Dish>, ClientError> {
        let path = format!("/api/dishes/{dish_id}/toggle");
        self.send(self.request(Method::PUT, &path)).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.send(self.request(Method::GET, "/api/health")).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("api request (method={}, url={})", method, url);
        self.http.request(method, url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if status.is_success() {
        return Ok(serde_json::from_slice(&bytes)?);
    }
    let message = serde_json::from_slice::<ErrorResponse>(&bytes)
        .map(|body| body.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
