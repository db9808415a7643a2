use std::time::Duration;

use bytes::Bytes;
use client_logging::client_debug;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, LOCATION};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::types::ApiError;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    /// Redirects into this path mean the session expired.
    pub login_path: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            login_path: "/login".to_string(),
        }
    }
}

/// Non-JSON response body plus the headers needed to name a download.
#[derive(Debug, Clone)]
pub struct BinaryBody {
    pub bytes: Bytes,
    pub content_disposition: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
    settings: ClientSettings,
}

impl ApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base =
            Url::parse(&settings.base_url).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;

        let login_path = settings.login_path.clone();
        let redirect_limit = settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            // A hop into the login path is surfaced to the caller, not followed.
            if attempt.url().path().starts_with(&login_path) {
                attempt.stop()
            } else if attempt.previous().len() >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(policy)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;

        Ok(Self {
            base,
            http,
            settings,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub(crate) fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut request = self.http.get(self.endpoint(path)?);
        if !query.is_empty() {
            request = request.query(query);
        }
        decode_json(self.execute(request).await?).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.http.post(self.endpoint(path)?).json(body);
        decode_json(self.execute(request).await?).await
    }

    pub(crate) async fn post_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = self.http.post(self.endpoint(path)?).json(body);
        self.execute(request).await.map(drop)
    }

    pub(crate) async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let request = self.http.post(self.endpoint(path)?);
        self.execute(request).await.map(drop)
    }

    pub(crate) async fn put_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = self.http.put(self.endpoint(path)?).json(body);
        self.execute(request).await.map(drop)
    }

    pub(crate) async fn delete_unit(&self, path: &str) -> Result<(), ApiError> {
        let request = self.http.delete(self.endpoint(path)?);
        self.execute(request).await.map(drop)
    }

    pub(crate) async fn delete_with_body<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = self.http.delete(self.endpoint(path)?).json(body);
        self.execute(request).await.map(drop)
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let request = self.http.post(self.endpoint(path)?).multipart(form);
        decode_json(self.execute(request).await?).await
    }

    pub(crate) async fn get_binary(&self, path: &str) -> Result<BinaryBody, ApiError> {
        let request = self.http.get(self.endpoint(path)?);
        read_binary(self.execute(request).await?).await
    }

    pub(crate) async fn post_binary<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<BinaryBody, ApiError> {
        let request = self.http.post(self.endpoint(path)?).json(body);
        read_binary(self.execute(request).await?).await
    }

    /// Sends the request and normalizes transport, redirect and status
    /// failures into the error taxonomy.
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(map_transport_error)?;

        if response.status().is_redirection() {
            // The redirect policy only stops inside the login path.
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if location.contains(&self.settings.login_path) {
                return Err(ApiError::AuthRequired { location });
            }
            return Err(ApiError::HttpStatus {
                status: response.status().as_u16(),
                detail: format!("unexpected redirect to {location}"),
            });
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_error_detail(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            client_debug!("request failed with status {}: {detail}", status.as_u16());
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(map_transport_error)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Parse(err.to_string()))
}

async fn read_binary(response: Response) -> Result<BinaryBody, ApiError> {
    let content_disposition = header_string(&response, CONTENT_DISPOSITION);
    let content_type = header_string(&response, CONTENT_TYPE);
    let bytes = response.bytes().await.map_err(map_transport_error)?;
    Ok(BinaryBody {
        bytes,
        content_disposition,
        content_type,
    })
}

fn header_string(response: &Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

pub(crate) fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    ApiError::Network(err.to_string())
}

/// Pulls a human-readable message out of an error body. The services answer
/// with `detail`, `message` or `error` fields depending on the endpoint.
fn extract_error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["detail", "message", "error"] {
        match value.get(key) {
            Some(serde_json::Value::String(text)) if !text.is_empty() => {
                return Some(text.clone());
            }
            Some(other) if !other.is_null() => return Some(other.to_string()),
            _ => {}
        }
    }
    None
}
