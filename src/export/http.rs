use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::error::TransportFailure;
use crate::export::config::ExportConfig;
use crate::export::{Artifact, BuildRequest, BuildService};

/// Longest slice of an error body kept in a `TransportFailure::Status`.
const MAX_ERROR_BODY: usize = 512;

/// Posts documents to a remote build endpoint with reqwest.
#[derive(Debug, Clone)]
pub struct HttpBuildService {
    client: Client,
    endpoint: String,
}

impl HttpBuildService {
    pub fn new(config: &ExportConfig) -> Result<Self, TransportFailure> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.effective_user_agent())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BuildService for HttpBuildService {
    async fn build(&self, request: &BuildRequest) -> Result<Artifact, TransportFailure> {
        debug!(
            request_id = %request.request_id,
            endpoint = %self.endpoint,
            bytes = request.body.len(),
            "Posting configuration document"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header("X-Request-Id", request.request_id.to_string())
            .body(request.body.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(TransportFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        debug!(request_id = %request.request_id, status = status.as_u16(), bytes = bytes.len(), "Build service responded");

        Ok(Artifact {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
