//! Router registration in `app/main.py`.
//!
//! Works purely on lines: an import and an `include_router` call are
//! inserted at the right spots and everything else is left byte-for-byte
//! untouched. Re-registering an already-registered router is a no-op, so
//! the operation is idempotent.

use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, ScaffoldError};
use crate::layout::ProjectLayout;

static ROUTER_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"APIRouter\([^)]*prefix\s*=\s*["']([^"']+)["']"#).unwrap());
static INCLUDE_ROUTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"app\.include_router\((\w+)_router").unwrap());

/// Patches the shared FastAPI entrypoint to wire generated routers in and
/// out.
#[derive(Debug, Clone)]
pub struct RouterRegistration {
    main_py: PathBuf,
    api_dir: PathBuf,
}

impl RouterRegistration {
    pub fn new(layout: &ProjectLayout) -> RouterRegistration {
        RouterRegistration {
            main_py: layout.main_py(),
            api_dir: layout.api_dir(),
        }
    }

    fn load(&self) -> Result<Vec<String>> {
        if !self.main_py.exists() {
            return Err(ScaffoldError::validation(format!(
                "main.py not found at {}",
                self.main_py.display()
            )));
        }
        let content = fs::read_to_string(&self.main_py)?;
        Ok(content.split('\n').map(String::from).collect())
    }

    fn save(&self, lines: &[String]) -> Result<()> {
        fs::write(&self.main_py, lines.join("\n"))?;
        Ok(())
    }

    fn import_line(plural: &str) -> String {
        format!(
            "from app.api.{} import router as {}_router",
            plural, plural
        )
    }

    /// Index of the last import line, tracking parenthesized multi-line
    /// imports so the insertion point lands after their closing paren.
    fn find_import_section_end(lines: &[String]) -> Option<usize> {
        let mut last_import = None;
        let mut in_multiline = false;

        for (i, line) in lines.iter().enumerate() {
            let stripped = line.trim();
            if stripped.is_empty() || stripped.starts_with('#') {
                continue;
            }
            if line.contains('(') && (line.contains("import ") || line.contains("from ")) {
                in_multiline = !line.contains(')');
                last_import = Some(i);
            } else if in_multiline {
                last_import = Some(i);
                if line.contains(')') {
                    in_multiline = false;
                }
            } else if stripped.starts_with("import ") || stripped.starts_with("from ") {
                last_import = Some(i);
            } else if last_import.is_some()
                && !stripped.starts_with("\"\"\"")
                && !stripped.starts_with("'''")
            {
                break;
            }
        }
        last_import
    }

    /// Index of the last line of the registration block: the
    /// `# Include routers` marker or the last `app.include_router` call.
    fn find_registration_section_end(lines: &[String]) -> Option<usize> {
        let mut end = None;
        for (i, line) in lines.iter().enumerate() {
            if line.contains("# Include routers")
                || line.trim().starts_with("app.include_router(")
            {
                end = Some(i);
            }
        }
        end
    }

    /// The prefix the generated router declares for itself, if any.
    fn router_prefix(&self, plural: &str) -> Option<String> {
        let router_file = self.api_dir.join(format!("{}.py", plural));
        let content = fs::read_to_string(router_file).ok()?;
        ROUTER_PREFIX_RE
            .captures(&content)
            .map(|c| c[1].to_string())
    }

    /// Add the import and registration for one router.
    ///
    /// Returns `false` when both lines are already present (nothing is
    /// written, so the file stays byte-identical). With `skip_if_exists`
    /// off, that same state is a `RegistrationConflict` instead.
    pub fn register(
        &self,
        plural: &str,
        api_prefix: &str,
        skip_if_exists: bool,
    ) -> Result<bool> {
        let mut lines = self.load()?;

        let import_line = Self::import_line(plural);
        let registration_marker = format!("app.include_router({}_router", plural);
        let import_exists = lines.iter().any(|l| l.contains(&import_line));
        let registration_exists = lines.iter().any(|l| l.contains(&registration_marker));

        if import_exists && registration_exists {
            if skip_if_exists {
                tracing::debug!(router = plural, "router already registered");
                return Ok(false);
            }
            return Err(ScaffoldError::RegistrationConflict(format!(
                "router {}_router already registered in {}",
                plural,
                self.main_py.display()
            )));
        }

        if !import_exists {
            let idx = Self::find_import_section_end(&lines).ok_or_else(|| {
                ScaffoldError::validation(format!(
                    "could not find import section in {}",
                    self.main_py.display()
                ))
            })?;
            lines.insert(idx + 1, import_line);
        }

        if !registration_exists {
            let idx = Self::find_registration_section_end(&lines).ok_or_else(|| {
                ScaffoldError::validation(format!(
                    "could not find router registration section in {}",
                    self.main_py.display()
                ))
            })?;
            // A router that declares its own prefix composes with the bare
            // API prefix; otherwise the entity segment is appended here.
            let prefix = if self.router_prefix(plural).is_some() {
                api_prefix.to_string()
            } else {
                format!("{}/{}", api_prefix, plural)
            };
            lines.insert(
                idx + 1,
                format!(
                    "app.include_router({}_router, prefix=\"{}\", tags=[\"{}\"])",
                    plural, prefix, plural
                ),
            );
        }

        self.save(&lines)?;
        tracing::info!(router = plural, "registered router");
        Ok(true)
    }

    /// Remove the import and registration for one router. Returns `false`
    /// when neither line was present.
    pub fn unregister(&self, plural: &str) -> Result<bool> {
        let mut lines = self.load()?;

        let import_line = Self::import_line(plural);
        let registration_marker = format!("app.include_router({}_router", plural);

        let before = lines.len();
        if let Some(idx) = lines.iter().position(|l| l.contains(&import_line)) {
            lines.remove(idx);
        }
        if let Some(idx) = lines.iter().position(|l| l.contains(&registration_marker)) {
            lines.remove(idx);
        }

        if lines.len() == before {
            return Ok(false);
        }
        self.save(&lines)?;
        tracing::info!(router = plural, "unregistered router");
        Ok(true)
    }

    /// Plural names of every router wired into main.py, in file order.
    pub fn list_registered(&self) -> Result<Vec<String>> {
        let lines = self.load()?;
        Ok(lines
            .iter()
            .filter_map(|line| INCLUDE_ROUTER_RE.captures(line))
            .map(|c| c[1].to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN_PY: &str = "\"\"\"App entrypoint.\"\"\"\n\
from fastapi import FastAPI\n\
\n\
from app.api.departments import router as departments_router\n\
\n\
app = FastAPI()\n\
\n\
# Include routers\n\
app.include_router(departments_router, prefix=\"/api/v1\", tags=[\"departments\"])\n";

    fn setup(main_py: &str) -> (tempfile::TempDir, RouterRegistration, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let path = layout.main_py();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, main_py).unwrap();
        let registry = RouterRegistration::new(&layout);
        (dir, registry, path)
    }

    #[test]
    fn test_register_inserts_import_and_registration() {
        let (_dir, registry, path) = setup(MAIN_PY);
        assert!(registry.register("users", "/api/v1", true).unwrap());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("from app.api.users import router as users_router"));
        assert!(content.contains(
            "app.include_router(users_router, prefix=\"/api/v1/users\", tags=[\"users\"])"
        ));
        // existing wiring untouched
        assert!(content.contains("app.include_router(departments_router"));
    }

    #[test]
    fn test_register_is_idempotent() {
        let (_dir, registry, path) = setup(MAIN_PY);
        assert!(registry.register("users", "/api/v1", true).unwrap());
        let after_first = fs::read_to_string(&path).unwrap();

        assert!(!registry.register("users", "/api/v1", true).unwrap());
        let after_second = fs::read_to_string(&path).unwrap();
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_register_conflict_without_skip() {
        let (_dir, registry, _path) = setup(MAIN_PY);
        registry.register("users", "/api/v1", true).unwrap();
        let err = registry.register("users", "/api/v1", false).unwrap_err();
        assert!(matches!(err, ScaffoldError::RegistrationConflict(_)));
    }

    #[test]
    fn test_router_with_own_prefix_composes_bare_api_prefix() {
        let (dir, registry, path) = setup(MAIN_PY);
        let api_dir = ProjectLayout::new(dir.path()).api_dir();
        fs::create_dir_all(&api_dir).unwrap();
        fs::write(
            api_dir.join("users.py"),
            "router = APIRouter(prefix=\"/users\", tags=[\"users\"])\n",
        )
        .unwrap();

        registry.register("users", "/api/v1", true).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(
            "app.include_router(users_router, prefix=\"/api/v1\", tags=[\"users\"])"
        ));
    }

    #[test]
    fn test_multiline_import_tracked() {
        let main_py = concat!(
            "from fastapi import FastAPI\n",
            "from app.schemas.base import (\n",
            "    MessageResponse,\n",
            "    PaginationParams,\n",
            ")\n",
            "\n",
            "app = FastAPI()\n",
            "\n",
            "# Include routers\n",
        );
        let (_dir, registry, path) = setup(main_py);
        registry.register("users", "/api/v1", true).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.split('\n').collect();
        let closing = lines.iter().position(|l| *l == ")").unwrap();
        assert_eq!(
            lines[closing + 1],
            "from app.api.users import router as users_router"
        );
    }

    #[test]
    fn test_unregister_removes_both_lines() {
        let (_dir, registry, path) = setup(MAIN_PY);
        registry.register("users", "/api/v1", true).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        assert!(registry.unregister("users").unwrap());
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("users_router"));
        assert_ne!(before, content);

        assert!(!registry.unregister("users").unwrap());
    }

    #[test]
    fn test_list_registered_in_file_order() {
        let (_dir, registry, _path) = setup(MAIN_PY);
        registry.register("users", "/api/v1", true).unwrap();
        registry.register("products", "/api/v1", true).unwrap();
        assert_eq!(
            registry.list_registered().unwrap(),
            vec!["departments", "users", "products"]
        );
    }

    #[test]
    fn test_missing_main_py_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = RouterRegistration::new(&ProjectLayout::new(dir.path()));
        let err = registry.register("users", "/api/v1", true).unwrap_err();
        assert!(matches!(err, ScaffoldError::Validation(_)));
    }
}
