//! Entity specification — the unit of generation.

use serde::{Deserialize, Serialize};

use crate::fields::FieldDefinition;
use crate::naming;

/// Named bundle of pre-defined field groups mixed into the generated model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainProfile {
    Employee,
    Customer,
    Generic,
}

impl DomainProfile {
    pub fn from_name(name: &str) -> Option<DomainProfile> {
        match name.to_lowercase().as_str() {
            "employee" => Some(DomainProfile::Employee),
            "customer" => Some(DomainProfile::Customer),
            "generic" => Some(DomainProfile::Generic),
            _ => None,
        }
    }

    /// Model mixin classes contributed by this profile.
    pub fn mixins(&self) -> &'static [&'static str] {
        match self {
            DomainProfile::Employee => &["PersonMixin", "ContactMixin", "EmployeeMixin"],
            DomainProfile::Customer => &["PersonMixin", "ContactMixin", "CustomerMixin"],
            DomainProfile::Generic => &[],
        }
    }
}

/// The full, validated description of one entity to be scaffolded.
///
/// `type_name`, `plural_name`, and `table_name` are pure functions of
/// `entity_name`; every artifact kind is rendered from this one value so that
/// names stay consistent across the whole generated file set. Read-only after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpec {
    /// snake_case entity name (e.g. "work_log")
    pub entity_name: String,
    /// PascalCase class name (e.g. "WorkLog")
    pub type_name: String,
    /// Pluralized name: table, route prefix, and test filenames (e.g. "work_logs")
    pub plural_name: String,
    /// Database table name; equal to `plural_name`
    pub table_name: String,
    pub fields: Vec<FieldDefinition>,
    pub soft_delete: bool,
    pub timestamps: bool,
    pub audit: bool,
    pub domain: Option<DomainProfile>,
}

impl EntitySpec {
    pub fn new(
        entity_name: &str,
        fields: Vec<FieldDefinition>,
        soft_delete: bool,
        timestamps: bool,
        audit: bool,
        domain: Option<DomainProfile>,
    ) -> EntitySpec {
        let entity_snake = naming::to_snake_case(entity_name);
        let type_name = naming::to_pascal_case(&entity_snake);
        let plural_name = naming::pluralize(&entity_snake);
        EntitySpec {
            entity_name: entity_snake,
            type_name,
            table_name: plural_name.clone(),
            plural_name,
            fields,
            soft_delete,
            timestamps,
            audit,
            domain,
        }
    }

    pub fn unique_fields(&self) -> Vec<&FieldDefinition> {
        self.fields.iter().filter(|f| f.is_unique()).collect()
    }

    pub fn indexed_fields(&self) -> Vec<&FieldDefinition> {
        self.fields.iter().filter(|f| f.is_indexed()).collect()
    }

    /// (column, target table) pairs for every foreign-key field.
    pub fn foreign_keys(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .filter_map(|f| f.foreign_table().map(|t| (f.name.as_str(), t)))
            .collect()
    }

    /// Whether any field uses one of the CRM custom column types.
    pub fn uses_custom_types(&self) -> bool {
        self.fields.iter().any(|f| f.field_type.is_custom())
    }

    pub fn has_decimal_fields(&self) -> bool {
        self.fields.iter().any(|f| f.python_type() == "Decimal")
    }

    pub fn has_date_fields(&self) -> bool {
        self.fields.iter().any(|f| f.python_type() == "date")
    }

    pub fn has_datetime_fields(&self) -> bool {
        self.fields.iter().any(|f| f.python_type() == "datetime")
    }

    pub fn domain_mixins(&self) -> &'static [&'static str] {
        self.domain.map(|d| d.mixins()).unwrap_or(&[])
    }

    /// `__repr__` body fragment built from the first two non-nullable fields.
    pub fn repr_fields(&self) -> String {
        self.fields
            .iter()
            .take(2)
            .filter(|f| !f.is_nullable())
            .map(|f| format!("{}='{{self.{}}}'", f.name, f.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
