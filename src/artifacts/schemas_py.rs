//! Pydantic schema artifact.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::entity::EntitySpec;
use crate::fields::FieldDefinition;

/// Render the schema module: `Create`, `Update`, `Response`, and
/// `ListResponse` classes sharing one field vocabulary.
pub fn render(spec: &EntitySpec) -> String {
    let mut out = String::new();

    writeln!(out, "\"\"\"").unwrap();
    writeln!(out, "{} schemas.", spec.type_name).unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "Request and response schemas for {} endpoints.",
        spec.plural_name
    )
    .unwrap();
    writeln!(out, "\"\"\"").unwrap();

    let mut datetime_imports = BTreeSet::new();
    if spec.has_date_fields() {
        datetime_imports.insert("date");
    }
    if spec.has_datetime_fields() || spec.timestamps {
        datetime_imports.insert("datetime");
    }
    if !datetime_imports.is_empty() {
        writeln!(
            out,
            "from datetime import {}",
            datetime_imports.into_iter().collect::<Vec<_>>().join(", ")
        )
        .unwrap();
    }
    if spec.has_decimal_fields() {
        writeln!(out, "from decimal import Decimal").unwrap();
    }
    writeln!(out, "from typing import List, Optional").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "from pydantic import BaseModel, ConfigDict, Field").unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // Create: nullable fields optional, everything else required
    writeln!(out, "class {}Create(BaseModel):", spec.type_name).unwrap();
    writeln!(
        out,
        "    \"\"\"Schema for creating a {}.\"\"\"",
        spec.entity_name
    )
    .unwrap();
    if spec.fields.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "    pass").unwrap();
    }
    for field in &spec.fields {
        writeln!(out).unwrap();
        write_schema_field(&mut out, field, field.is_nullable());
    }
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // Update: every field optional
    writeln!(out, "class {}Update(BaseModel):", spec.type_name).unwrap();
    writeln!(
        out,
        "    \"\"\"Schema for updating a {}. All fields optional.\"\"\"",
        spec.entity_name
    )
    .unwrap();
    if spec.fields.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "    pass").unwrap();
    }
    for field in &spec.fields {
        writeln!(out).unwrap();
        write_schema_field(&mut out, field, true);
    }
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // Response: entity fields plus the generated base columns
    writeln!(out, "class {}Response(BaseModel):", spec.type_name).unwrap();
    writeln!(
        out,
        "    \"\"\"Schema for {} responses.\"\"\"",
        spec.entity_name
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "    model_config = ConfigDict(from_attributes=True)").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "    id: int").unwrap();
    for field in &spec.fields {
        let hint = field.python_type();
        if field.is_nullable() {
            writeln!(out, "    {}: Optional[{}] = None", field.name, hint).unwrap();
        } else {
            writeln!(out, "    {}: {}", field.name, hint).unwrap();
        }
    }
    if spec.timestamps {
        writeln!(out, "    created_at: datetime").unwrap();
        writeln!(out, "    updated_at: datetime").unwrap();
    }
    if spec.soft_delete {
        writeln!(out, "    is_deleted: bool").unwrap();
    }
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    writeln!(out, "class {}ListResponse(BaseModel):", spec.type_name).unwrap();
    writeln!(
        out,
        "    \"\"\"Paginated list of {} responses.\"\"\"",
        spec.entity_name
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "    items: List[{}Response]", spec.type_name).unwrap();
    writeln!(out, "    total: int").unwrap();
    writeln!(out, "    page: int").unwrap();
    writeln!(out, "    page_size: int").unwrap();

    out
}

fn write_schema_field(out: &mut String, field: &FieldDefinition, optional: bool) {
    let hint = field.python_type();
    let (annotation, default) = if optional {
        (format!("Optional[{}]", hint), "None")
    } else {
        (hint.to_string(), "...")
    };
    writeln!(out, "    {}: {} = Field(", field.name, annotation).unwrap();
    writeln!(out, "        {},", default).unwrap();
    if let Some(length) = field.length {
        writeln!(out, "        max_length={},", length).unwrap();
    }
    writeln!(out, "        description=\"{}\"", field.doc).unwrap();
    writeln!(out, "    )").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::parse_fields;

    #[test]
    fn test_four_schema_classes() {
        let fields = parse_fields("name:str,age:int:nullable").unwrap();
        let spec = EntitySpec::new("customer", fields, true, true, true, None);
        let text = render(&spec);
        assert!(text.contains("class CustomerCreate(BaseModel):"));
        assert!(text.contains("class CustomerUpdate(BaseModel):"));
        assert!(text.contains("class CustomerResponse(BaseModel):"));
        assert!(text.contains("class CustomerListResponse(BaseModel):"));
        assert!(text.contains("items: List[CustomerResponse]"));
    }

    #[test]
    fn test_create_required_vs_nullable() {
        let fields = parse_fields("name:str,age:int:nullable").unwrap();
        let spec = EntitySpec::new("customer", fields, true, true, true, None);
        let text = render(&spec);
        assert!(text.contains("name: str = Field(\n        ...,"));
        assert!(text.contains("age: Optional[int] = Field(\n        None,"));
        assert!(text.contains("max_length=255,"));
    }

    #[test]
    fn test_response_reflects_flags() {
        let fields = parse_fields("name:str").unwrap();
        let spec = EntitySpec::new("tag", fields, false, false, false, None);
        let text = render(&spec);
        assert!(!text.contains("created_at"));
        assert!(!text.contains("is_deleted"));
    }
}
