//! HTTP client for the Mesa REST API

use crate::{ClientConfig, ClientError, ClientResult};
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::error::ApiError;

/// HTTP client for making requests to the Mesa server.
///
/// The bearer token lives behind a lock so a signed-in engine can install
/// it on the shared client without taking `&mut self`.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.clone(),
            token: RwLock::new(config.token.clone()),
        }
    }

    /// Install or clear the bearer token
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    /// Get the current token
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.read().as_ref().map(|t| format!("Bearer {}", t))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut request = self.client.get(self.url(path));

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut request = self.client.post(self.url(path)).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut request = self.client.post(self.url(path));

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request without body, discarding any response body
    pub async fn post_no_content(&self, path: &str) -> ClientResult<()> {
        let mut request = self.client.post(self.url(path));

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::map_error(status, text));
        }
        Ok(())
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut request = self.client.put(self.url(path)).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request without body
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut request = self.client.put(self.url(path));

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::map_error(status, text));
        }

        response.json().await.map_err(Into::into)
    }

    /// Map a failed response to a client error. Bodies carrying a structured
    /// [`ApiError`] keep their code and details; plain bodies map by status.
    fn map_error(status: StatusCode, text: String) -> ClientError {
        if let Ok(api) = serde_json::from_str::<ApiError>(&text) {
            return match status {
                StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
                StatusCode::FORBIDDEN => ClientError::Forbidden(api.message),
                StatusCode::NOT_FOUND => ClientError::NotFound(api.message),
                StatusCode::CONFLICT => ClientError::Conflict(api.message),
                _ => ClientError::Api(api),
            };
        }

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(text),
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::CONFLICT => ClientError::Conflict(text),
            StatusCode::BAD_REQUEST => ClientError::Validation(text),
            _ => ClientError::Internal(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn structured_conflict_body_maps_to_conflict() {
        let body = serde_json::to_string(&ApiError::new(ErrorCode::OrderAlreadyClaimed)).unwrap();
        let err = HttpClient::map_error(StatusCode::CONFLICT, body);
        assert!(matches!(err, ClientError::Conflict(_)));
        assert!(err.is_conflict());
    }

    #[test]
    fn structured_validation_body_keeps_code_and_details() {
        let api = ApiError::validation("customerEmail is required")
            .with_detail("field", "customerEmail");
        let body = serde_json::to_string(&api).unwrap();
        let err = HttpClient::map_error(StatusCode::BAD_REQUEST, body);
        match err {
            ClientError::Api(decoded) => {
                assert_eq!(decoded.code, ErrorCode::ValidationFailed);
                assert!(decoded.details.is_some());
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn plain_bodies_map_by_status() {
        let err = HttpClient::map_error(StatusCode::NOT_FOUND, "gone".to_string());
        assert!(matches!(err, ClientError::NotFound(msg) if msg == "gone"));

        let err = HttpClient::map_error(StatusCode::UNAUTHORIZED, String::new());
        assert!(matches!(err, ClientError::Unauthorized));

        let err = HttpClient::map_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
        assert!(matches!(err, ClientError::Internal(_)));
    }
}
