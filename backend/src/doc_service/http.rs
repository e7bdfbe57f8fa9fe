//! Reqwest-backed document service adapter.
//!
//! Owns transport details only: request encoding, timeout, retry policy,
//! status classification and JSON/base64 decoding.

use super::{DocServiceError, DocumentProcessor, GeneratedSchema, RenderedDocument};
use crate::config::DocServiceConfig;
use crate::mapping::Mapping;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::model::document::{ParseResult, ParsedPlaceholder};
use common::requests::PreviewResponse;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout and retry behaviour for document service calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Extra attempts granted to retryable operations.
    pub max_retries: u32,
    /// Base delay; attempt `n` waits `n * backoff` before retrying.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &DocServiceConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_retries: config.max_retries,
            backoff: config.backoff(),
        }
    }

    fn delay_before_retry(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Parse,
    ToHtml,
    Schema,
    Render,
}

impl Operation {
    fn path(self) -> &'static str {
        match self {
            Operation::Parse => "/parse",
            Operation::ToHtml => "/to_html",
            Operation::Schema => "/schema",
            Operation::Render => "/render",
        }
    }

    /// Only the read-only operations are repeated.
    fn is_retryable(self) -> bool {
        matches!(self, Operation::Parse | Operation::ToHtml)
    }
}

#[derive(Serialize)]
struct SchemaRequest<'a> {
    placeholders: &'a [ParsedPlaceholder],
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    doc_bytes_b64: String,
    mapping: &'a Mapping,
    filename: &'a str,
}

#[derive(Deserialize)]
struct RenderResponse {
    filled_bytes_b64: String,
    #[serde(default)]
    filled_filename: String,
}

/// Document service adapter performing HTTP calls against one base URL.
pub struct HttpDocService {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

impl HttpDocService {
    /// Builds an adapter whose client applies the policy timeout to every request.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: impl Into<String>, policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(policy.timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy,
        })
    }

    fn url(&self, operation: Operation) -> String {
        format!("{}{}", self.base_url, operation.path())
    }

    async fn execute<F>(&self, operation: Operation, build: F) -> Result<Vec<u8>, DocServiceError>
    where
        F: Fn(&Client, String) -> RequestBuilder + Send + Sync,
    {
        let attempts = if operation.is_retryable() {
            self.policy.max_retries + 1
        } else {
            1
        };
        let mut attempt = 1;
        loop {
            let request = build(&self.client, self.url(operation));
            match send_once(request).await {
                Err(err) if attempt < attempts && err.is_transient() => {
                    warn!(
                        "doc-service {:?} attempt {}/{} failed, retrying: {}",
                        operation, attempt, attempts, err
                    );
                    tokio::time::sleep(self.policy.delay_before_retry(attempt)).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

async fn send_once(request: RequestBuilder) -> Result<Vec<u8>, DocServiceError> {
    let response = request
        .send()
        .await
        .map_err(|e| DocServiceError::Unreachable(e.to_string()))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| DocServiceError::Unreachable(e.to_string()))?;

    if !status.is_success() {
        return Err(DocServiceError::Status {
            status: status.as_u16(),
            detail: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    Ok(body.to_vec())
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, DocServiceError> {
    serde_json::from_slice(body).map_err(|e| DocServiceError::Decode(e.to_string()))
}

fn file_form(filename: &str, bytes: &[u8]) -> Form {
    Form::new().part("file", Part::bytes(bytes.to_vec()).file_name(filename.to_string()))
}

#[async_trait]
impl DocumentProcessor for HttpDocService {
    async fn parse(&self, filename: &str, bytes: &[u8]) -> Result<ParseResult, DocServiceError> {
        let body = self
            .execute(Operation::Parse, |client, url| {
                client.post(url).multipart(file_form(filename, bytes))
            })
            .await?;
        let parsed: ParseResult = decode(&body)?;
        debug!("parsed {} placeholders from {}", parsed.placeholders.len(), filename);
        Ok(parsed)
    }

    async fn to_html(&self, filename: &str, bytes: &[u8]) -> Result<String, DocServiceError> {
        let body = self
            .execute(Operation::ToHtml, |client, url| {
                client.post(url).multipart(file_form(filename, bytes))
            })
            .await?;
        let preview: PreviewResponse = decode(&body)?;
        Ok(preview.html)
    }

    async fn generate_schema(
        &self,
        placeholders: &[ParsedPlaceholder],
    ) -> Result<GeneratedSchema, DocServiceError> {
        let payload = SchemaRequest { placeholders };
        let body = self
            .execute(Operation::Schema, |client, url| client.post(url).json(&payload))
            .await?;
        decode(&body)
    }

    async fn render(
        &self,
        filename: &str,
        bytes: &[u8],
        mapping: &Mapping,
    ) -> Result<RenderedDocument, DocServiceError> {
        let payload = RenderRequest {
            doc_bytes_b64: BASE64.encode(bytes),
            mapping,
            filename,
        };
        let body = self
            .execute(Operation::Render, |client, url| client.post(url).json(&payload))
            .await?;
        let rendered: RenderResponse = decode(&body)?;
        let bytes = BASE64
            .decode(rendered.filled_bytes_b64.as_bytes())
            .map_err(|e| DocServiceError::Decode(format!("filled_bytes_b64: {e}")))?;
        Ok(RenderedDocument {
            bytes,
            filename: rendered.filled_filename,
        })
    }
}
