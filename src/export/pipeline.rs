use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};
use uuid::Uuid;

use crate::compiler::Compiler;
use crate::error::ExportError;
use crate::export::{Artifact, BuildRequest, BuildService};
use crate::graph::Snapshot;

/// Compile, ship to the build service, hand back the artifact.
///
/// Only one export runs at a time; the busy flag is what the UI disables its
/// export button on.
pub struct ExportPipeline<S> {
    service: S,
    busy: AtomicBool,
}

/// Clears the busy flag on every exit path, including errors.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl<S: BuildService> ExportPipeline<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            busy: AtomicBool::new(false),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn export(&self, compiler: &Compiler, snapshot: &Snapshot) -> Result<Artifact, ExportError> {
        let _guard = BusyGuard::acquire(&self.busy).ok_or(ExportError::Busy)?;
        self.run(compiler, snapshot).await
    }

    /// Like [`export`](Self::export), then saves the artifact to `path`.
    /// Nothing is written if any step fails.
    pub async fn export_to(&self, compiler: &Compiler, snapshot: &Snapshot, path: &Path) -> Result<Artifact, ExportError> {
        let _guard = BusyGuard::acquire(&self.busy).ok_or(ExportError::Busy)?;
        let artifact = self.run(compiler, snapshot).await?;
        artifact.save(path).await?;
        info!(path = %path.display(), bytes = artifact.len(), "Artifact saved");
        Ok(artifact)
    }

    async fn run(&self, compiler: &Compiler, snapshot: &Snapshot) -> Result<Artifact, ExportError> {
        let document = compiler.compile_snapshot(snapshot)?;
        let body = serde_json::to_vec(&document)?;
        let request = BuildRequest {
            request_id: Uuid::new_v4(),
            document,
            body,
        };

        info!(
            request_id = %request.request_id,
            nodes = request.document.nodes.len(),
            edges = request.document.edges.len(),
            "Exporting configuration document"
        );

        match self.service.build(&request).await {
            Ok(artifact) => {
                info!(request_id = %request.request_id, bytes = artifact.len(), "Build artifact received");
                Ok(artifact)
            }
            Err(e) => {
                error!(request_id = %request.request_id, error = %e, "Export failed");
                Err(e.into())
            }
        }
    }
}
