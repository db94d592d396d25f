//! Field DSL parser and type resolver.
//!
//! Parses comma-separated field definitions from the CLI into a validated,
//! typed intermediate representation. Pure, no I/O.
//!
//! Format: `name:type` or `name:type:constraint[:constraint...]`
//! Examples: `email:str:unique`, `age:int:nullable`, `manager_id:int:fk`,
//! `owner_id:int:fk(users)`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, ScaffoldError};
use crate::naming;

/// Field names provided by the generated base model; user fields may not
/// shadow them.
pub const RESERVED_FIELD_NAMES: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "is_deleted",
    "deleted_at",
    "created_by_id",
    "updated_by_id",
];

/// Default length for bounded string columns.
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// Default precision/scale for fixed-point columns.
pub const DEFAULT_NUMERIC_PRECISION: u32 = 15;
pub const DEFAULT_NUMERIC_SCALE: u32 = 2;

/// Supported DSL type tokens, in documentation order. Used verbatim in the
/// "unsupported type" error message.
pub const SUPPORTED_TYPE_TOKENS: &[&str] = &[
    "str", "string", "text", "int", "integer", "float", "decimal", "money", "bool", "boolean",
    "date", "datetime", "timestamp", "email", "phone",
];

/// Resolved field type. A closed enum rather than a token lookup table so
/// that adding a type forces every match below to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Str,
    Text,
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Email,
    Phone,
}

impl FieldType {
    /// Resolve a DSL token to a field type. Aliases (`string`, `integer`,
    /// `money`, `timestamp`, ...) collapse onto the same variant.
    pub fn from_token(token: &str) -> Option<FieldType> {
        match token {
            "str" | "string" => Some(FieldType::Str),
            "text" => Some(FieldType::Text),
            "int" | "integer" => Some(FieldType::Integer),
            "float" => Some(FieldType::Float),
            "decimal" | "money" => Some(FieldType::Decimal),
            "bool" | "boolean" => Some(FieldType::Boolean),
            "date" => Some(FieldType::Date),
            "datetime" | "timestamp" => Some(FieldType::DateTime),
            "email" => Some(FieldType::Email),
            "phone" => Some(FieldType::Phone),
            _ => None,
        }
    }

    /// SQLAlchemy column type name used in generated models and migrations.
    pub fn storage_type(&self) -> &'static str {
        match self {
            FieldType::Str => "String",
            FieldType::Text => "Text",
            FieldType::Integer => "Integer",
            FieldType::Float => "Float",
            FieldType::Decimal => "Numeric",
            FieldType::Boolean => "Boolean",
            FieldType::Date => "Date",
            FieldType::DateTime => "DateTime",
            FieldType::Email => "EmailType",
            FieldType::Phone => "PhoneNumberType",
        }
    }

    /// Host-language (Python) type category for schemas and test fixtures.
    pub fn language_kind(&self) -> LanguageKind {
        match self {
            FieldType::Str | FieldType::Text | FieldType::Email | FieldType::Phone => {
                LanguageKind::Str
            }
            FieldType::Integer => LanguageKind::Int,
            FieldType::Float => LanguageKind::Float,
            FieldType::Decimal => LanguageKind::Decimal,
            FieldType::Boolean => LanguageKind::Bool,
            FieldType::Date => LanguageKind::Date,
            FieldType::DateTime => LanguageKind::DateTime,
        }
    }

    /// Whether the storage type is one of the CRM custom column types.
    pub fn is_custom(&self) -> bool {
        matches!(self, FieldType::Email | FieldType::Phone)
    }
}

/// Host-language type category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageKind {
    Str,
    Int,
    Float,
    Decimal,
    Bool,
    Date,
    DateTime,
}

impl LanguageKind {
    /// Python type hint for generated schemas.
    pub fn python_hint(&self) -> &'static str {
        match self {
            LanguageKind::Str => "str",
            LanguageKind::Int => "int",
            LanguageKind::Float => "float",
            LanguageKind::Decimal => "Decimal",
            LanguageKind::Bool => "bool",
            LanguageKind::Date => "date",
            LanguageKind::DateTime => "datetime",
        }
    }

    /// Canonical sample literal for generated test bodies. Deterministic so
    /// repeated runs with identical input produce byte-identical tests.
    pub fn sample_literal(&self, field_name: &str) -> String {
        match self {
            LanguageKind::Str => format!("\"{}_value\"", field_name),
            LanguageKind::Int => "123".to_string(),
            LanguageKind::Float => "123.45".to_string(),
            LanguageKind::Decimal => "Decimal(\"123.45\")".to_string(),
            LanguageKind::Bool => "True".to_string(),
            LanguageKind::Date => "date(2025, 1, 1)".to_string(),
            LanguageKind::DateTime => "datetime(2025, 1, 1, 12, 0, 0)".to_string(),
        }
    }

    /// Indexed sample pattern, used when generated tests build lists of
    /// fixtures in a loop over `i`.
    pub fn sample_pattern(&self, field_name: &str) -> String {
        match self {
            LanguageKind::Str => format!("f\"{}_{{i}}\"", field_name),
            LanguageKind::Int => "i".to_string(),
            LanguageKind::Float => "float(i)".to_string(),
            LanguageKind::Decimal => "Decimal(f\"{i}.99\")".to_string(),
            LanguageKind::Bool => "bool(i % 2)".to_string(),
            LanguageKind::Date => "date(2025, 1, i)".to_string(),
            LanguageKind::DateTime => "datetime(2025, 1, i, 12, 0, 0)".to_string(),
        }
    }

    /// Literal used by generated update tests.
    pub fn updated_sample_literal(&self, field_name: &str) -> String {
        match self {
            LanguageKind::Str => format!("\"{}_updated\"", field_name),
            LanguageKind::Int => "456".to_string(),
            LanguageKind::Float => "456.78".to_string(),
            LanguageKind::Decimal => "Decimal(\"456.78\")".to_string(),
            LanguageKind::Bool => "False".to_string(),
            LanguageKind::Date => "date(2025, 12, 31)".to_string(),
            LanguageKind::DateTime => "datetime(2025, 12, 31, 23, 59, 59)".to_string(),
        }
    }
}

/// A named constraint on a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Unique,
    Nullable,
    Index,
    /// Foreign key with its resolved target table
    ForeignKey(String),
}

/// One resolved field of an entity. Created by the parser, immutable
/// thereafter, consumed by the artifact pipeline and the migration manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name (snake_case identifier)
    pub name: String,
    /// Raw DSL token as written (e.g. `money`, `timestamp`)
    pub declared_type: String,
    /// Resolved type
    pub field_type: FieldType,
    pub constraints: Vec<Constraint>,
    /// String length, for bounded string columns
    pub length: Option<u32>,
    /// Numeric precision/scale, for fixed-point columns
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    /// Docstring used in generated column definitions
    pub doc: String,
    /// Deterministic Python literals for generated test bodies
    pub sample_literal: String,
    pub sample_pattern: String,
    pub updated_sample_literal: String,
}

impl FieldDefinition {
    pub fn is_unique(&self) -> bool {
        self.constraints.contains(&Constraint::Unique)
    }

    pub fn is_nullable(&self) -> bool {
        self.constraints.contains(&Constraint::Nullable)
    }

    pub fn is_indexed(&self) -> bool {
        self.constraints.contains(&Constraint::Index)
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign_table().is_some()
    }

    /// Target table of the foreign-key constraint, if any.
    pub fn foreign_table(&self) -> Option<&str> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::ForeignKey(table) => Some(table.as_str()),
            _ => None,
        })
    }

    /// Python type hint for generated schemas.
    pub fn python_type(&self) -> &'static str {
        self.field_type.language_kind().python_hint()
    }

    /// SQLAlchemy type expression with sizing, e.g. `String(255)` or
    /// `Numeric(15, 2)`.
    pub fn sa_type(&self) -> String {
        match (self.field_type.storage_type(), self.length, self.precision) {
            ("String", Some(length), _) => format!("String({})", length),
            ("Numeric", _, Some(precision)) => match self.scale {
                Some(scale) => format!("Numeric({}, {})", precision, scale),
                None => format!("Numeric({})", precision),
            },
            (storage, _, _) => format!("{}()", storage),
        }
    }

    /// Full SQLAlchemy column argument list used by the model renderer.
    pub fn column_definition(&self) -> String {
        let mut parts = vec![self.sa_type()];
        if let Some(table) = self.foreign_table() {
            parts.push(format!("ForeignKey(\"{}.id\")", table));
        }
        parts.push(format!(
            "nullable={}",
            if self.is_nullable() { "True" } else { "False" }
        ));
        if self.is_unique() {
            parts.push("unique=True".to_string());
        }
        if self.is_indexed() {
            parts.push("index=True".to_string());
        }
        parts.join(", ")
    }
}

/// Split a spec string into field clauses on commas at parenthesis depth
/// zero, so parameterized constraints like `fk(users)` survive intact.
fn split_clauses(spec: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;

    for c in spec.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                if !current.trim().is_empty() {
                    clauses.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        clauses.push(current.trim().to_string());
    }
    clauses
}

/// Parse a single field clause: `name ':' type (':' constraint)*`.
fn parse_clause(clause: &str) -> Result<FieldDefinition> {
    let parts: Vec<&str> = clause.split(':').map(str::trim).collect();
    if parts.len() < 2 {
        return Err(ScaffoldError::Parse(format!(
            "invalid field definition '{}'. Expected format: name:type[:constraints]",
            clause
        )));
    }

    let name = parts[0];
    let type_token = parts[1].to_lowercase();
    let constraint_tokens = &parts[2..];

    if !naming::is_identifier(name) {
        return Err(ScaffoldError::Parse(format!(
            "invalid field name '{}'. Must be a valid identifier",
            name
        )));
    }

    let field_type = FieldType::from_token(&type_token).ok_or_else(|| {
        ScaffoldError::Parse(format!(
            "unsupported field type '{}'. Supported types: {}",
            type_token,
            SUPPORTED_TYPE_TOKENS.join(", ")
        ))
    })?;

    let mut constraints = Vec::new();
    let mut i = 0;
    while i < constraint_tokens.len() {
        let token = constraint_tokens[i];
        if token == "fk" || token.starts_with("fk(") {
            let target = if let Some(open) = token.find('(') {
                // fk(users)
                let close = token.rfind(')').ok_or_else(|| {
                    ScaffoldError::Parse(format!(
                        "unterminated foreign-key constraint '{}' on field '{}'",
                        token, name
                    ))
                })?;
                token[open + 1..close].trim().to_string()
            } else if i + 1 < constraint_tokens.len() {
                // fk:users — the next colon segment is the target table
                i += 1;
                constraint_tokens[i].to_string()
            } else if let Some(stem) = name.strip_suffix("_id") {
                // bare fk — infer target from the field name
                naming::pluralize(stem)
            } else {
                return Err(ScaffoldError::validation(format!(
                    "cannot infer foreign table for field '{}'. Specify as fk:table_name or fk(table_name)",
                    name
                )));
            };
            constraints.push(Constraint::ForeignKey(target));
        } else {
            match token {
                "unique" => constraints.push(Constraint::Unique),
                "nullable" => constraints.push(Constraint::Nullable),
                "index" => constraints.push(Constraint::Index),
                other => {
                    return Err(ScaffoldError::Parse(format!(
                        "unknown constraint '{}' on field '{}'. Supported constraints: unique, nullable, index, fk",
                        other, name
                    )));
                }
            }
        }
        i += 1;
    }

    let (length, precision, scale) = match field_type {
        FieldType::Str => (Some(DEFAULT_STRING_LENGTH), None, None),
        FieldType::Decimal => (
            None,
            Some(DEFAULT_NUMERIC_PRECISION),
            Some(DEFAULT_NUMERIC_SCALE),
        ),
        _ => (None, None, None),
    };

    let kind = field_type.language_kind();
    Ok(FieldDefinition {
        name: name.to_string(),
        declared_type: type_token.clone(),
        field_type,
        constraints,
        length,
        precision,
        scale,
        doc: format!("The {} field", name),
        sample_literal: kind.sample_literal(name),
        sample_pattern: kind.sample_pattern(name),
        updated_sample_literal: kind.updated_sample_literal(name),
    })
}

/// Whole-list validation pass: duplicate names, reserved names, foreign keys
/// without a resolvable target. All problems are collected and reported
/// together.
fn validate_fields(fields: &[FieldDefinition]) -> Result<()> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for field in fields {
        if !seen.insert(field.name.as_str()) {
            errors.push(format!("duplicate field name: {}", field.name));
        }
        if RESERVED_FIELD_NAMES.contains(&field.name.as_str()) {
            errors.push(format!(
                "field name '{}' is reserved. Reserved names: {}",
                field.name,
                RESERVED_FIELD_NAMES.join(", ")
            ));
        }
        if field
            .constraints
            .iter()
            .any(|c| matches!(c, Constraint::ForeignKey(t) if t.is_empty()))
        {
            errors.push(format!(
                "foreign key field '{}' missing table reference",
                field.name
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ScaffoldError::Validation(errors))
    }
}

/// Parse a comma-separated string of field definitions into the IR.
///
/// Fails with a `Parse` error on malformed clause syntax and a `Validation`
/// error on semantic violations. An empty or whitespace-only spec yields an
/// empty field list.
pub fn parse_fields(spec: &str) -> Result<Vec<FieldDefinition>> {
    let mut fields = Vec::new();
    for clause in split_clauses(spec) {
        fields.push(parse_clause(&clause)?);
    }
    validate_fields(&fields)?;
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_string_field() {
        let fields = parse_fields("name:str").unwrap();
        assert_eq!(fields.len(), 1);
        let f = &fields[0];
        assert_eq!(f.name, "name");
        assert_eq!(f.field_type, FieldType::Str);
        assert_eq!(f.length, Some(255));
        assert!(!f.is_nullable());
        assert_eq!(f.python_type(), "str");
        assert_eq!(f.sa_type(), "String(255)");
    }

    #[test]
    fn test_decimal_defaults() {
        let fields = parse_fields("price:decimal").unwrap();
        let f = &fields[0];
        assert_eq!(f.precision, Some(15));
        assert_eq!(f.scale, Some(2));
        assert_eq!(f.sa_type(), "Numeric(15, 2)");
        assert_eq!(f.python_type(), "Decimal");
    }

    #[test]
    fn test_money_alias_resolves_to_decimal() {
        let fields = parse_fields("salary:money").unwrap();
        assert_eq!(fields[0].field_type, FieldType::Decimal);
        assert_eq!(fields[0].declared_type, "money");
    }

    #[test]
    fn test_nullable_int() {
        let fields = parse_fields("age:int:nullable").unwrap();
        let f = &fields[0];
        assert_eq!(f.field_type, FieldType::Integer);
        assert!(f.is_nullable());
        assert_eq!(f.column_definition(), "Integer(), nullable=True");
    }

    #[test]
    fn test_multiple_fields() {
        let fields = parse_fields("name:str,email:str:unique,age:int:nullable").unwrap();
        assert_eq!(fields.len(), 3);
        assert!(fields[1].is_unique());
        assert!(fields[2].is_nullable());
    }

    #[test]
    fn test_fk_inferred_from_name() {
        let fields = parse_fields("manager_id:int:fk").unwrap();
        assert_eq!(fields[0].foreign_table(), Some("managers"));
    }

    #[test]
    fn test_fk_inference_pluralizes() {
        let fields = parse_fields("company_id:int:fk").unwrap();
        assert_eq!(fields[0].foreign_table(), Some("companies"));
    }

    #[test]
    fn test_fk_inference_requires_id_suffix() {
        let err = parse_fields("owner:int:fk").unwrap_err();
        assert!(matches!(err, ScaffoldError::Validation(_)));
        assert!(err.to_string().contains("owner"));
    }

    #[test]
    fn test_fk_explicit_parenthesized() {
        let fields = parse_fields("owner_id:int:fk(users)").unwrap();
        assert_eq!(fields[0].foreign_table(), Some("users"));
    }

    #[test]
    fn test_fk_explicit_colon_form() {
        let fields = parse_fields("owner_id:int:fk:users").unwrap();
        assert_eq!(fields[0].foreign_table(), Some("users"));
    }

    #[test]
    fn test_comma_inside_parens_does_not_split() {
        let fields = parse_fields("dept_id:int:fk(departments),name:str").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].foreign_table(), Some("departments"));
        assert_eq!(fields[1].name, "name");
    }

    #[test]
    fn test_reserved_names_rejected() {
        for spec in ["id:str", "created_at:datetime"] {
            let err = parse_fields(spec).unwrap_err();
            assert!(matches!(err, ScaffoldError::Validation(_)));
            assert!(err.to_string().contains("reserved"));
            assert!(err.to_string().contains("created_by_id"));
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = parse_fields("name:str,name:text").unwrap_err();
        assert!(err.to_string().contains("duplicate field name: name"));
    }

    #[test]
    fn test_unsupported_type_lists_tokens() {
        let err = parse_fields("name:varchar").unwrap_err();
        assert!(matches!(err, ScaffoldError::Parse(_)));
        let msg = err.to_string();
        for token in SUPPORTED_TYPE_TOKENS {
            assert!(msg.contains(token), "missing token {} in: {}", token, msg);
        }
    }

    #[test]
    fn test_missing_type_is_parse_error() {
        let err = parse_fields("name").unwrap_err();
        assert!(matches!(err, ScaffoldError::Parse(_)));
    }

    #[test]
    fn test_unknown_constraint_rejected() {
        let err = parse_fields("name:str:primary").unwrap_err();
        assert!(matches!(err, ScaffoldError::Parse(_)));
        assert!(err.to_string().contains("primary"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let spec = "name:str,price:decimal:index,hired:date:nullable,email:email:unique";
        let a = parse_fields(spec).unwrap();
        let b = parse_fields(spec).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].sample_literal, "\"name_value\"");
        assert_eq!(a[0].updated_sample_literal, "\"name_updated\"");
        assert_eq!(a[2].sample_literal, "date(2025, 1, 1)");
    }

    #[test]
    fn test_custom_types() {
        let fields = parse_fields("email:email,phone:phone").unwrap();
        assert_eq!(fields[0].field_type.storage_type(), "EmailType");
        assert_eq!(fields[1].field_type.storage_type(), "PhoneNumberType");
        assert!(fields[0].field_type.is_custom());
        assert_eq!(fields[0].python_type(), "str");
        assert_eq!(fields[0].sa_type(), "EmailType()");
    }
}
