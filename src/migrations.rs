//! Migration chain management.
//!
//! Generated migrations form a linear chain: each new file's
//! `down_revision` points at the revision of the previous head. The head is
//! found by scanning the versions directory, so external edits (hand-written
//! migrations, merges) are picked up as long as they keep revision
//! identifiers unique.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use uuid::Uuid;

use crate::artifacts::migration_py;
use crate::entity::EntitySpec;
use crate::error::{Result, ScaffoldError};
use crate::layout::ProjectLayout;

// Anchored to line starts so `down_revision = ...` can never match as
// `revision = ...`.
static REVISION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^revision\s*=\s*['"]([^'"]+)['"]"#).unwrap());
static REVISION_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^revision\s*=\s*"None""#).unwrap());
static DOWN_REVISION_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^down_revision\s*=\s*"None""#).unwrap());
static DOWN_REVISION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^down_revision\s*=\s*(.+)$"#).unwrap());

/// A newly generated migration file.
#[derive(Debug, Clone)]
pub struct GeneratedMigration {
    pub path: PathBuf,
    pub revision: String,
    pub down_revision: Option<String>,
}

/// Revision identifiers parsed out of an existing migration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationInfo {
    pub path: PathBuf,
    pub revision: String,
    pub down_revision: Option<String>,
}

/// Generates Alembic migration files and keeps the revision chain linear.
#[derive(Debug, Clone)]
pub struct MigrationGenerator {
    versions_dir: PathBuf,
}

impl MigrationGenerator {
    pub fn new(layout: &ProjectLayout) -> MigrationGenerator {
        MigrationGenerator {
            versions_dir: layout.versions_dir(),
        }
    }

    pub fn with_versions_dir(versions_dir: impl Into<PathBuf>) -> MigrationGenerator {
        MigrationGenerator {
            versions_dir: versions_dir.into(),
        }
    }

    /// Migration files in the versions directory, sorted by filename.
    pub fn list_migrations(&self) -> Result<Vec<PathBuf>> {
        if !self.versions_dir.exists() {
            return Ok(Vec::new());
        }
        let mut files: Vec<PathBuf> = fs::read_dir(&self.versions_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension().map(|ext| ext == "py").unwrap_or(false)
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| n != "__init__.py")
                        .unwrap_or(false)
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Parse the revision identifiers out of one migration file.
    pub fn migration_info(&self, path: &Path) -> Result<MigrationInfo> {
        let content = fs::read_to_string(path)?;
        let revision = REVISION_RE
            .captures(&content)
            .map(|c| c[1].to_string())
            .ok_or_else(|| {
                ScaffoldError::MigrationChain(format!(
                    "no revision assignment found in {}",
                    path.display()
                ))
            })?;
        let down_revision = DOWN_REVISION_RE
            .captures(&content)
            .map(|c| {
                c[1].trim()
                    .trim_matches(|c| c == '\'' || c == '"')
                    .to_string()
            })
            .filter(|v| v != "None");
        Ok(MigrationInfo {
            path: path.to_path_buf(),
            revision,
            down_revision,
        })
    }

    /// The revision of the chain head, or `None` for an empty directory.
    ///
    /// The head is the one revision no other file references as its
    /// `down_revision`. Duplicate revisions and forked or cyclic chains are
    /// `MigrationChain` errors, since generating on top of an ambiguous
    /// head would branch the history.
    pub fn latest_revision(&self) -> Result<Option<String>> {
        let files = self.list_migrations()?;
        if files.is_empty() {
            return Ok(None);
        }

        let mut revisions: Vec<String> = Vec::new();
        let mut referenced: Vec<String> = Vec::new();
        for path in &files {
            let info = self.migration_info(path)?;
            if revisions.contains(&info.revision) {
                return Err(ScaffoldError::MigrationChain(format!(
                    "duplicate revision '{}' in {}",
                    info.revision,
                    path.display()
                )));
            }
            revisions.push(info.revision);
            if let Some(down) = info.down_revision {
                referenced.push(down);
            }
        }

        let mut heads = revisions.iter().filter(|rev| !referenced.contains(rev));
        let head = heads.next().ok_or_else(|| {
            ScaffoldError::MigrationChain(format!(
                "migration chain in {} has a cycle",
                self.versions_dir.display()
            ))
        })?;
        if let Some(other) = heads.next() {
            return Err(ScaffoldError::MigrationChain(format!(
                "migration chain has multiple heads: '{}' and '{}'",
                head, other
            )));
        }
        Ok(Some(head.clone()))
    }

    /// Render and write a create-table migration linked onto the current
    /// head.
    pub fn generate(&self, spec: &EntitySpec) -> Result<GeneratedMigration> {
        let down_revision = self.latest_revision()?;
        let revision = new_revision_id();
        let now = Utc::now();

        let create_date = now.format("%Y-%m-%d %H:%M:%S").to_string();
        let mut content = migration_py::render(spec, &create_date);
        content = REVISION_PLACEHOLDER_RE
            .replace(&content, format!("revision = \"{}\"", revision).as_str())
            .into_owned();
        let down_value = match &down_revision {
            Some(rev) => format!("down_revision = '{}'", rev),
            None => "down_revision = None".to_string(),
        };
        content = DOWN_REVISION_PLACEHOLDER_RE
            .replace(&content, down_value.as_str())
            .into_owned();

        let timestamp = now.format("%Y%m%d_%H%M%S");
        let filename = format!(
            "{}_{}_create_{}_table.py",
            revision, timestamp, spec.entity_name
        );
        fs::create_dir_all(&self.versions_dir)?;
        let path = self.versions_dir.join(filename);
        fs::write(&path, content)?;
        tracing::info!(revision = %revision, path = %path.display(), "generated migration");

        Ok(GeneratedMigration {
            path,
            revision,
            down_revision,
        })
    }
}

/// 12-character hex revision identifier.
fn new_revision_id() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}
