//! Artifact generation pipeline.
//!
//! Renders an [`EntitySpec`](crate::entity::EntitySpec) into the fixed set of
//! scaffolding artifacts and writes them to disk under a backup-or-fail
//! policy. Every kind is rendered from the same spec, so type names, field
//! names, and storage types are consistent across the whole file set.

pub mod api_py;
pub mod migration_py;
pub mod model_py;
pub mod schemas_py;
pub mod service_py;
pub mod test_api_py;
pub mod test_service_py;

use std::fs;
use std::path::{Path, PathBuf};

use crate::entity::EntitySpec;
use crate::error::{Result, ScaffoldError};
use crate::layout::ProjectLayout;

/// The closed set of artifact kinds produced for one entity. Anything else
/// is a programmer error, not a runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    Service,
    Schemas,
    Api,
    ApiTests,
    ServiceTests,
}

impl ArtifactKind {
    /// Fixed generation order. This ordering is a contract: a write failure
    /// at artifact `k` implies artifacts before `k` already exist on disk,
    /// and callers report partial failures in these terms.
    pub const ORDERED: [ArtifactKind; 6] = [
        ArtifactKind::Model,
        ArtifactKind::Service,
        ArtifactKind::Schemas,
        ArtifactKind::Api,
        ArtifactKind::ApiTests,
        ArtifactKind::ServiceTests,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Service => "service",
            ArtifactKind::Schemas => "schemas",
            ArtifactKind::Api => "api",
            ArtifactKind::ApiTests => "api tests",
            ArtifactKind::ServiceTests => "service tests",
        }
    }

    /// Deterministic output path, derived only from the layout and the
    /// entity's naming-transform outputs.
    pub fn path(&self, layout: &ProjectLayout, spec: &EntitySpec) -> PathBuf {
        match self {
            ArtifactKind::Model => layout.models_dir().join(format!("{}.py", spec.entity_name)),
            ArtifactKind::Service => layout
                .services_dir()
                .join(format!("{}_service.py", spec.entity_name)),
            ArtifactKind::Schemas => layout
                .schemas_dir()
                .join(format!("{}_schemas.py", spec.entity_name)),
            ArtifactKind::Api => layout.api_dir().join(format!("{}.py", spec.plural_name)),
            ArtifactKind::ApiTests => layout
                .tests_dir()
                .join(format!("test_{}_api.py", spec.plural_name)),
            ArtifactKind::ServiceTests => layout
                .tests_dir()
                .join(format!("test_{}_service.py", spec.plural_name)),
        }
    }
}

/// Render one artifact kind to text. Pure: no I/O, deterministic for a
/// fixed spec.
pub fn render(kind: ArtifactKind, spec: &EntitySpec) -> String {
    match kind {
        ArtifactKind::Model => model_py::render(spec),
        ArtifactKind::Service => service_py::render(spec),
        ArtifactKind::Schemas => schemas_py::render(spec),
        ArtifactKind::Api => api_py::render(spec),
        ArtifactKind::ApiTests => test_api_py::render(spec),
        ArtifactKind::ServiceTests => test_service_py::render(spec),
    }
}

/// Policy when a destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnExists {
    /// Copy the current content to `<path>.bak`, then overwrite
    Backup,
    /// Abort with `ArtifactExists`; nothing is written
    Fail,
}

/// Write artifact content, creating parent directories as needed.
pub fn write_artifact(path: &Path, content: &str, on_exists: OnExists) -> Result<()> {
    if path.exists() {
        match on_exists {
            OnExists::Fail => return Err(ScaffoldError::ArtifactExists(path.to_path_buf())),
            OnExists::Backup => {
                let mut backup = path.as_os_str().to_os_string();
                backup.push(".bak");
                fs::copy(path, PathBuf::from(&backup))?;
                tracing::debug!(path = %path.display(), "backed up existing file");
            }
        }
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    tracing::debug!(path = %path.display(), "wrote artifact");
    Ok(())
}
