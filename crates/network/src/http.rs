// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! A thin HTTP client with a per-call timeout budget and typed transport errors.

use std::{collections::HashMap, time::Duration};

use reclaim_core::consts::RECLAIM_USER_AGENT;
use reqwest::{
    Method, StatusCode,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT},
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// The default timeout budget for a single provider call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A typed transport error for outbound HTTP calls.
#[derive(Clone, Debug, Error)]
pub enum HttpClientError {
    /// The call exceeded its timeout budget.
    #[error("HTTP request timed out: {0}")]
    Timeout(String),
    /// The connection could not be established (refused, DNS resolution, TLS).
    #[error("HTTP connection failed: {0}")]
    Connect(String),
    /// The server answered with a non-success status.
    #[error("Unexpected HTTP status code {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),
    /// Invalid request or any other failure.
    #[error("HTTP error: {0}")]
    Other(String),
}

impl HttpClientError {
    /// Returns whether the failure is transient and the call may be re-submitted as-is.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connect(_))
    }
}

impl From<reqwest::Error> for HttpClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if error.is_decode() || error.is_body() {
            Self::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            Self::Status {
                status: status.as_u16(),
                body: error.to_string(),
            }
        } else {
            Self::Other(error.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpClientError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// A buffered HTTP response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the body as (lossy) UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Converts a non-success status into [`HttpClientError::Status`].
    ///
    /// # Errors
    ///
    /// Returns an error if the status is not a success status.
    pub fn error_for_status(self) -> Result<Self, HttpClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HttpClientError::Status {
                status: self.status.as_u16(),
                body: self.text(),
            })
        }
    }
}

/// The body of an outbound request.
#[derive(Clone, Debug)]
pub enum HttpBody {
    Json(Vec<u8>),
    Form(String),
}

/// An HTTP client enforcing a fixed timeout budget on every call.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a new [`HttpClient`] instance.
    ///
    /// `headers` are sent with every request, after the `User-Agent` header.
    ///
    /// # Errors
    ///
    /// Returns an error if a header is invalid or the underlying client cannot be built.
    pub fn new(
        headers: HashMap<String, String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, HttpClientError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(RECLAIM_USER_AGENT));
        for (key, value) in &headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| HttpClientError::Other(format!("Invalid header name {key}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| HttpClientError::Other(format!("Invalid header value {key}: {e}")))?;
            default_headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Returns the timeout budget applied to each call.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends a request and buffers the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body cannot be read.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        params: Option<&[(&str, &str)]>,
        headers: Option<HashMap<String, String>>,
        body: Option<HttpBody>,
    ) -> Result<HttpResponse, HttpClientError> {
        tracing::debug!("{method} {url}");

        let mut request = self.client.request(method, url);
        if let Some(params) = params {
            request = request.query(params);
        }
        for (key, value) in headers.unwrap_or_default() {
            request = request.header(key, value);
        }
        request = match body {
            Some(HttpBody::Json(bytes)) => request
                .header(CONTENT_TYPE, "application/json")
                .body(bytes),
            Some(HttpBody::Form(encoded)) => request
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encoded),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        tracing::trace!("{status} {}", String::from_utf8_lossy(&body));

        Ok(HttpResponse { status, body })
    }

    /// Sends a `GET` request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn get(
        &self,
        url: &str,
        params: Option<&[(&str, &str)]>,
        headers: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpClientError> {
        self.request(Method::GET, url, params, headers, None).await
    }

    /// Sends a `POST` request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized or the request fails at the transport level.
    pub async fn post_json<T: Serialize>(
        &self,
        url: &str,
        body: &T,
        headers: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpClientError> {
        let bytes = serde_json::to_vec(body)?;
        self.request(Method::POST, url, None, headers, Some(HttpBody::Json(bytes)))
            .await
    }

    /// Sends a `POST` request with a form-encoded body.
    ///
    /// # Errors
    ///
    /// Returns an error if `form` cannot be encoded or the request fails at the transport level.
    pub async fn post_form<T: Serialize>(
        &self,
        url: &str,
        form: &T,
        headers: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpClientError> {
        let encoded =
            serde_urlencoded::to_string(form).map_err(|e| HttpClientError::Other(e.to_string()))?;
        self.request(Method::POST, url, None, headers, Some(HttpBody::Form(encoded)))
            .await
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(HttpClientError::Timeout("t".to_string()), true)]
    #[case(HttpClientError::Connect("c".to_string()), true)]
    #[case(HttpClientError::Status { status: 502, body: String::new() }, false)]
    #[case(HttpClientError::Decode("d".to_string()), false)]
    #[case(HttpClientError::Other("o".to_string()), false)]
    fn test_is_retryable(#[case] error: HttpClientError, #[case] expected: bool) {
        assert_eq!(error.is_retryable(), expected);
    }

    #[rstest]
    fn test_status_display() {
        let error = HttpClientError::Status {
            status: 404,
            body: "missing".to_string(),
        };
        assert_eq!(error.to_string(), "Unexpected HTTP status code 404: missing");
    }

    #[rstest]
    fn test_response_helpers() {
        let response = HttpResponse {
            status: StatusCode::OK,
            body: br#"{"code":"00"}"#.to_vec(),
        };
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["code"], "00");
        assert!(response.error_for_status().is_ok());

        let response = HttpResponse {
            status: StatusCode::BAD_GATEWAY,
            body: b"upstream".to_vec(),
        };
        match response.error_for_status() {
            Err(HttpClientError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[rstest]
    fn test_invalid_header_rejected() {
        let headers = HashMap::from([("bad header".to_string(), "x".to_string())]);
        assert!(matches!(
            HttpClient::new(headers, None),
            Err(HttpClientError::Other(_))
        ));
    }

    #[rstest]
    fn test_default_timeout() {
        let client = HttpClient::new(HashMap::new(), None).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
