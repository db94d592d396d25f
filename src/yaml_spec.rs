//! YAML entity-spec loader.
//!
//! An entity can be described in a YAML file instead of the inline field
//! DSL. Fields accept either a single DSL string or a list of per-field
//! maps; both are folded into the same `FieldDefinition` IR through the
//! same validation pass.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::entity::{DomainProfile, EntitySpec};
use crate::error::{Result, ScaffoldError};
use crate::fields::parse_fields;

#[derive(Debug, Deserialize)]
struct SpecFile {
    entity: EntityDoc,
}

#[derive(Debug, Deserialize)]
struct EntityDoc {
    name: String,
    #[serde(default)]
    fields: FieldsDoc,
    #[serde(default = "default_true")]
    soft_delete: bool,
    #[serde(default = "default_true")]
    timestamps: bool,
    #[serde(default = "default_true")]
    audit: bool,
    #[serde(default)]
    domain: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldsDoc {
    Dsl(String),
    Structured(Vec<FieldDoc>),
}

impl Default for FieldsDoc {
    fn default() -> Self {
        FieldsDoc::Dsl(String::new())
    }
}

#[derive(Debug, Deserialize)]
struct FieldDoc {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    unique: bool,
    #[serde(default)]
    nullable: bool,
    #[serde(default)]
    index: bool,
    #[serde(default)]
    fk: Option<String>,
}

impl FieldDoc {
    /// Rebuild the DSL clause for this field so structured and string
    /// specs share one parser.
    fn to_clause(&self) -> String {
        let mut clause = format!("{}:{}", self.name, self.field_type);
        if self.unique {
            clause.push_str(":unique");
        }
        if self.nullable {
            clause.push_str(":nullable");
        }
        if self.index {
            clause.push_str(":index");
        }
        if let Some(table) = &self.fk {
            clause.push_str(&format!(":fk({})", table));
        }
        clause
    }
}

/// Load one entity spec from a YAML file.
pub fn load_spec_file(path: &Path) -> Result<EntitySpec> {
    let content = fs::read_to_string(path)?;
    let doc: SpecFile = serde_yaml::from_str(&content).map_err(|e| {
        ScaffoldError::Parse(format!("invalid spec file {}: {}", path.display(), e))
    })?;

    let dsl = match &doc.entity.fields {
        FieldsDoc::Dsl(spec) => spec.clone(),
        FieldsDoc::Structured(fields) => fields
            .iter()
            .map(FieldDoc::to_clause)
            .collect::<Vec<_>>()
            .join(","),
    };
    let fields = if dsl.trim().is_empty() {
        Vec::new()
    } else {
        parse_fields(&dsl)?
    };

    let domain = match &doc.entity.domain {
        Some(name) => Some(DomainProfile::from_name(name).ok_or_else(|| {
            ScaffoldError::Parse(format!("unknown domain profile '{}'", name))
        })?),
        None => None,
    };

    Ok(EntitySpec::new(
        &doc.entity.name,
        fields,
        doc.entity.soft_delete,
        doc.entity.timestamps,
        doc.entity.audit,
        domain,
    ))
}
