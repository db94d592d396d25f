//! # Crudgen: CRUD Entity Scaffolding Generator
//!
//! Crudgen turns a one-line field specification into the full file set a
//! FastAPI backend expects for a new entity: model, service, schemas,
//! router, tests, and an Alembic migration linked onto the existing
//! revision chain, with the router wired into `app/main.py`.
//!
//! ## Example: inline field DSL
//!
//! ```text
//! crudgen generate customer --fields "name:str,email:email:unique,age:int:nullable"
//! ```
//!
//! ## Example: YAML spec file
//!
//! ```yaml
//! entity:
//!   name: position
//!   fields:
//!     - name: title
//!       type: str
//!       unique: true
//!     - name: department_id
//!       type: int
//!       fk: departments
//! ```
//!
//! Every derived name (`Customer`, `customers`, `CustomerCreate`, ...) comes
//! from one [`EntitySpec`], so the generated files always agree with each
//! other.

// Core modules
pub mod entity;
pub mod error;
pub mod fields;
pub mod naming;

// Artifact rendering and output layout
pub mod artifacts;
pub mod layout;

// Pipeline: migrations, registration, orchestration
pub mod migrations;
pub mod registry;
pub mod scaffold;

// YAML entity-spec input
pub mod yaml_spec;

// Re-export key types
pub use entity::{DomainProfile, EntitySpec};
pub use error::{Result, ScaffoldError};
pub use fields::{parse_fields, Constraint, FieldDefinition, FieldType};

// Re-export pipeline types
pub use artifacts::{ArtifactKind, OnExists};
pub use layout::ProjectLayout;
pub use migrations::{GeneratedMigration, MigrationGenerator};
pub use registry::RouterRegistration;
pub use scaffold::{GeneratedSet, ScaffoldOptions, Scaffolder};
