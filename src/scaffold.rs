//! Scaffolding orchestrator.
//!
//! Drives the full pipeline for one entity: name validation, the six
//! artifacts in their fixed order, router registration, then the migration.
//! There is deliberately no rollback: a failure partway leaves the files
//! already written on disk, and the error tells the caller where the
//! pipeline stopped.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::artifacts::{self, ArtifactKind, OnExists};
use crate::entity::EntitySpec;
use crate::error::{Result, ScaffoldError};
use crate::layout::ProjectLayout;
use crate::migrations::{GeneratedMigration, MigrationGenerator};
use crate::naming;
use crate::registry::RouterRegistration;

/// Python keywords; entity names must not shadow them since they become
/// module and variable names in the generated code.
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Names that collide with scaffolding infrastructure modules.
const RESERVED_ENTITY_NAMES: &[&str] = &[
    "model", "schema", "service", "api", "test", "base", "main", "app",
];

/// Per-run generation options.
#[derive(Debug, Clone)]
pub struct ScaffoldOptions {
    pub on_exists: OnExists,
    pub api_prefix: String,
    pub register: bool,
    pub migration: bool,
}

impl Default for ScaffoldOptions {
    fn default() -> Self {
        ScaffoldOptions {
            on_exists: OnExists::Backup,
            api_prefix: "/api/v1".to_string(),
            register: true,
            migration: true,
        }
    }
}

/// Everything one `generate` call produced.
#[derive(Debug)]
pub struct GeneratedSet {
    pub artifacts: Vec<(ArtifactKind, PathBuf)>,
    pub migration: Option<GeneratedMigration>,
    pub registered: bool,
}

pub struct Scaffolder {
    layout: ProjectLayout,
    seen_plurals: HashSet<String>,
}

impl Scaffolder {
    pub fn new(layout: ProjectLayout) -> Scaffolder {
        Scaffolder {
            layout,
            seen_plurals: HashSet::new(),
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Reject entity names that would produce broken or colliding Python
    /// modules.
    pub fn validate_entity_name(&self, spec: &EntitySpec) -> Result<()> {
        let name = spec.entity_name.as_str();
        if !naming::is_identifier(name) {
            return Err(ScaffoldError::validation(format!(
                "entity name '{}' is not a valid identifier",
                name
            )));
        }
        if PYTHON_KEYWORDS.contains(&name) {
            return Err(ScaffoldError::validation(format!(
                "entity name '{}' is a Python keyword",
                name
            )));
        }
        if RESERVED_ENTITY_NAMES.contains(&name) {
            return Err(ScaffoldError::validation(format!(
                "entity name '{}' is reserved",
                name
            )));
        }
        if self.seen_plurals.contains(&spec.plural_name) {
            return Err(ScaffoldError::validation(format!(
                "entity '{}' pluralizes to '{}', which was already scaffolded in this run",
                name, spec.plural_name
            )));
        }
        Ok(())
    }

    /// Destination paths for every artifact, in generation order. Used by
    /// dry runs; performs no I/O.
    pub fn plan(&self, spec: &EntitySpec) -> Vec<(ArtifactKind, PathBuf)> {
        ArtifactKind::ORDERED
            .iter()
            .map(|&kind| (kind, kind.path(&self.layout, spec)))
            .collect()
    }

    /// Run the full pipeline for one entity.
    pub fn generate(
        &mut self,
        spec: &EntitySpec,
        options: &ScaffoldOptions,
    ) -> Result<GeneratedSet> {
        self.validate_entity_name(spec)?;
        tracing::info!(entity = %spec.entity_name, "scaffolding entity");

        let mut written = Vec::new();
        for &kind in &ArtifactKind::ORDERED {
            let path = kind.path(&self.layout, spec);
            let content = artifacts::render(kind, spec);
            artifacts::write_artifact(&path, &content, options.on_exists)?;
            written.push((kind, path));
        }

        let registered = if options.register {
            RouterRegistration::new(&self.layout).register(
                &spec.plural_name,
                &options.api_prefix,
                true,
            )?
        } else {
            false
        };

        let migration = if options.migration {
            Some(MigrationGenerator::new(&self.layout).generate(spec)?)
        } else {
            None
        };

        self.seen_plurals.insert(spec.plural_name.clone());
        Ok(GeneratedSet {
            artifacts: written,
            migration,
            registered,
        })
    }

    /// Remove an entity's router wiring from main.py. Accepts the singular
    /// or plural name. Generated files stay on disk.
    pub fn unregister(&self, entity_name: &str) -> Result<bool> {
        let name = naming::to_snake_case(entity_name);
        let registry = RouterRegistration::new(&self.layout);
        if registry.unregister(&name)? {
            return Ok(true);
        }
        let plural = naming::pluralize(&name);
        if plural != name {
            return registry.unregister(&plural);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::parse_fields;
    use std::fs;

    const MAIN_PY: &str = "from fastapi import FastAPI\n\
\n\
app = FastAPI()\n\
\n\
# Include routers\n";

    fn setup() -> (tempfile::TempDir, Scaffolder) {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let main_py = layout.main_py();
        fs::create_dir_all(main_py.parent().unwrap()).unwrap();
        fs::write(&main_py, MAIN_PY).unwrap();
        let scaffolder = Scaffolder::new(layout);
        (dir, scaffolder)
    }

    fn customer_spec() -> EntitySpec {
        let fields = parse_fields("name:str,email:str:unique").unwrap();
        EntitySpec::new("customer", fields, true, true, true, None)
    }

    #[test]
    fn test_generate_writes_all_artifacts() {
        let (_dir, mut scaffolder) = setup();
        let generated = scaffolder
            .generate(&customer_spec(), &ScaffoldOptions::default())
            .unwrap();

        assert_eq!(generated.artifacts.len(), 6);
        for (_, path) in &generated.artifacts {
            assert!(path.exists(), "missing artifact {}", path.display());
        }
        let migration = generated.migration.unwrap();
        assert!(migration.path.exists());
        assert!(generated.registered);

        let main_py = fs::read_to_string(scaffolder.layout().main_py()).unwrap();
        assert!(main_py.contains("from app.api.customers import router as customers_router"));
    }

    #[test]
    fn test_generate_without_migration_or_registration() {
        let (_dir, mut scaffolder) = setup();
        let options = ScaffoldOptions {
            register: false,
            migration: false,
            ..ScaffoldOptions::default()
        };
        let generated = scaffolder.generate(&customer_spec(), &options).unwrap();
        assert!(generated.migration.is_none());
        assert!(!generated.registered);
        assert!(scaffolder.layout().versions_dir().read_dir().is_err());
    }

    #[test]
    fn test_keyword_and_reserved_names_rejected() {
        let (_dir, scaffolder) = setup();
        let keyword = EntitySpec::new("class", vec![], true, true, true, None);
        assert!(matches!(
            scaffolder.validate_entity_name(&keyword).unwrap_err(),
            ScaffoldError::Validation(_)
        ));
        let reserved = EntitySpec::new("model", vec![], true, true, true, None);
        assert!(scaffolder.validate_entity_name(&reserved).is_err());
    }

    #[test]
    fn test_plural_collision_within_run() {
        let (_dir, mut scaffolder) = setup();
        scaffolder
            .generate(&customer_spec(), &ScaffoldOptions::default())
            .unwrap();
        let err = scaffolder
            .generate(&customer_spec(), &ScaffoldOptions::default())
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::Validation(_)));
    }

    #[test]
    fn test_fail_policy_stops_at_existing_artifact() {
        let (_dir, mut scaffolder) = setup();
        let spec = customer_spec();
        let model_path = ArtifactKind::Model.path(scaffolder.layout(), &spec);
        fs::create_dir_all(model_path.parent().unwrap()).unwrap();
        fs::write(&model_path, "# existing\n").unwrap();

        let options = ScaffoldOptions {
            on_exists: OnExists::Fail,
            ..ScaffoldOptions::default()
        };
        let err = scaffolder.generate(&spec, &options).unwrap_err();
        assert!(matches!(err, ScaffoldError::ArtifactExists(_)));
        // existing file untouched, nothing downstream written
        assert_eq!(fs::read_to_string(&model_path).unwrap(), "# existing\n");
        assert!(!ArtifactKind::Service
            .path(scaffolder.layout(), &spec)
            .exists());
    }

    #[test]
    fn test_registration_failure_leaves_migration_chain_untouched() {
        // no app/main.py in this tree, so registration fails
        let dir = tempfile::tempdir().unwrap();
        let mut scaffolder = Scaffolder::new(ProjectLayout::new(dir.path()));
        let err = scaffolder
            .generate(&customer_spec(), &ScaffoldOptions::default())
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::Validation(_)));
        assert!(!scaffolder.layout().versions_dir().exists());
    }

    #[test]
    fn test_plan_matches_generated_paths() {
        let (_dir, mut scaffolder) = setup();
        let spec = customer_spec();
        let planned = scaffolder.plan(&spec);
        let generated = scaffolder
            .generate(&spec, &ScaffoldOptions::default())
            .unwrap();
        assert_eq!(planned, generated.artifacts);
    }

    #[test]
    fn test_unregister_round_trip() {
        let (_dir, mut scaffolder) = setup();
        scaffolder
            .generate(&customer_spec(), &ScaffoldOptions::default())
            .unwrap();
        assert!(scaffolder.unregister("customer").unwrap());
        let main_py = fs::read_to_string(scaffolder.layout().main_py()).unwrap();
        assert!(!main_py.contains("customers_router"));
    }
}
