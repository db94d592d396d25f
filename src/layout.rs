//! Output layout configuration.
//!
//! Every path the generator touches derives from a [`ProjectLayout`], so the
//! directory structure is a single configuration concern of the caller. The
//! defaults match the conventional FastAPI backend layout.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Backend root directory (contains `app/` and `alembic/`)
    pub root: PathBuf,
    pub models_dir: String,
    pub services_dir: String,
    pub schemas_dir: String,
    pub api_dir: String,
    pub tests_dir: String,
    /// Alembic migration versions directory
    pub versions_dir: String,
    /// The shared router registration file
    pub main_py: String,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> ProjectLayout {
        ProjectLayout {
            root: root.into(),
            models_dir: "app/models".to_string(),
            services_dir: "app/services".to_string(),
            schemas_dir: "app/schemas".to_string(),
            api_dir: "app/api".to_string(),
            tests_dir: "tests".to_string(),
            versions_dir: "alembic/versions".to_string(),
            main_py: "app/main.py".to_string(),
        }
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join(&self.models_dir)
    }

    pub fn services_dir(&self) -> PathBuf {
        self.root.join(&self.services_dir)
    }

    pub fn schemas_dir(&self) -> PathBuf {
        self.root.join(&self.schemas_dir)
    }

    pub fn api_dir(&self) -> PathBuf {
        self.root.join(&self.api_dir)
    }

    pub fn tests_dir(&self) -> PathBuf {
        self.root.join(&self.tests_dir)
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join(&self.versions_dir)
    }

    pub fn main_py(&self) -> PathBuf {
        self.root.join(&self.main_py)
    }
}

impl Default for ProjectLayout {
    fn default() -> Self {
        ProjectLayout::new(Path::new("."))
    }
}
