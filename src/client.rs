//! HTTP client for the Immich API.
//!
//! A thin envelope around `reqwest`: every request is resolved against the
//! configured host, carries the JSON media type headers and the `x-api-key`
//! header, and has its response mapped to [`ApiError`] when the status is not
//! 2xx. Endpoint-specific calls live in [`crate::remote`] and [`crate::info`].
//!
//! ## Error mapping
//!
//! | Response | Error status | Message |
//! |----------|--------------|---------|
//! | non-2xx, empty body | 500 | `request error` |
//! | non-2xx, body not JSON | 500 | decode error |
//! | non-2xx, `{"message": ...}` | response status | server message (arrays joined with `, `) |
//! | connection refused / DNS failure | 503 | transport error |
//! | other transport failure | 500 | transport error |
//! | 2xx, body does not decode | 500 | decode error |

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

const MEDIA_TYPE: &str = "application/json";
const API_KEY_HEADER: &str = "x-api-key";
const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Config(&'static str),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("unable to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status describing the failure.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Status { status, .. } => *status,
            ApiError::Network(e) if e.is_connect() => 503,
            _ => 500,
        }
    }
}

/// Error body returned by the server on non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Message,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Message {
    Text(String),
    List(Vec<String>),
}

impl Default for Message {
    fn default() -> Self {
        Message::Text(String::new())
    }
}

impl Message {
    fn into_string(self) -> String {
        match self {
            Message::Text(text) => text,
            Message::List(parts) => parts.join(", "),
        }
    }
}

pub struct Client {
    http: reqwest::Client,
    base: Url,
    key: String,
}

impl Client {
    /// Build a client for `host` authenticating with `key`.
    pub fn new(host: &str, key: &str) -> Result<Self, ApiError> {
        if host.is_empty() {
            return Err(ApiError::Config("empty url is not allowed"));
        }
        if key.is_empty() {
            return Err(ApiError::Config("empty api key is not allowed"));
        }

        let base = Url::parse(host)?;
        let http = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(user_agent())
            .build()?;

        Ok(Self {
            http,
            base,
            key: key.to_string(),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, resource: &str) -> Result<T, ApiError> {
        self.get_with_query(resource, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let mut req = self.request(Method::GET, resource)?;
        if !query.is_empty() {
            req = req.query(query);
        }
        decode(self.send(req).await?).await
    }

    pub async fn post<B, T>(&self, resource: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(Method::POST, resource)?.json(body);
        decode(self.send(req).await?).await
    }

    /// PUT `body` to `resource`. The response body is not read.
    pub async fn put<B>(&self, resource: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::PUT, resource)?.json(body);
        self.send(req).await?;
        Ok(())
    }

    fn request(&self, method: Method, resource: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.base.join(resource)?;
        debug!(%method, %url, "api request");
        Ok(self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, MEDIA_TYPE)
            .header(ACCEPT, MEDIA_TYPE)
            .header(API_KEY_HEADER, &self.key))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let res = req.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.bytes().await?;
        if body.is_empty() {
            return Err(ApiError::Status {
                status: 500,
                message: "request error".into(),
            });
        }

        let err: ErrorBody = serde_json::from_slice(&body)?;
        Err(ApiError::Status {
            status: status.as_u16(),
            message: err.message.into_string(),
        })
    }
}

async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ApiError> {
    let body = res.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

pub fn user_agent() -> String {
    format!("immich-tools/{}", env!("CARGO_PKG_VERSION"))
}
