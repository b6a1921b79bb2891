pub mod config;
pub mod http;
pub mod pipeline;

pub use config::ExportConfig;
pub use http::HttpBuildService;
pub use pipeline::ExportPipeline;

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::document::ConfigDocument;
use crate::error::TransportFailure;

/// One export attempt as handed to a build service.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub request_id: Uuid,
    pub document: ConfigDocument,
    /// `document` serialized as JSON.
    pub body: Vec<u8>,
}

/// Remote collaborator that turns a configuration document into an artifact.
#[async_trait]
pub trait BuildService: Send + Sync {
    async fn build(&self, request: &BuildRequest) -> Result<Artifact, TransportFailure>;
}

/// Opaque build output, conventionally a zip archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl Artifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Writes next to `path` first and renames, so a failed write never
    /// leaves a truncated artifact at `path`. The partial file is removed on
    /// any failure.
    pub async fn save(&self, path: &Path) -> std::io::Result<()> {
        let partial = partial_path(path);
        if let Err(e) = tokio::fs::write(&partial, &self.bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&partial, path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
