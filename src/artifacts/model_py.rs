//! SQLAlchemy model artifact.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::entity::EntitySpec;

/// Render the model module: a declarative class deriving from `BaseModel`
/// (plus any domain mixins) with one `mapped_column` per field.
pub fn render(spec: &EntitySpec) -> String {
    let mut out = String::new();

    writeln!(out, "\"\"\"").unwrap();
    writeln!(out, "{} model.", spec.type_name).unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "Generated scaffolding for the {} table.",
        spec.table_name
    )
    .unwrap();
    writeln!(out, "\"\"\"").unwrap();

    // Value-type imports
    let mut datetime_imports = BTreeSet::new();
    if spec.has_date_fields() {
        datetime_imports.insert("date");
    }
    if spec.has_datetime_fields() {
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
    if spec.fields.iter().any(|f| f.is_nullable()) {
        writeln!(out, "from typing import Optional").unwrap();
    }
    writeln!(out).unwrap();

    // SQLAlchemy imports actually used by the column definitions
    let mut sa_names: BTreeSet<&str> = spec
        .fields
        .iter()
        .filter(|f| !f.field_type.is_custom())
        .map(|f| f.field_type.storage_type())
        .collect();
    if spec.fields.iter().any(|f| f.is_foreign_key()) {
        sa_names.insert("ForeignKey");
    }
    if !sa_names.is_empty() {
        writeln!(
            out,
            "from sqlalchemy import {}",
            sa_names.into_iter().collect::<Vec<_>>().join(", ")
        )
        .unwrap();
    }
    writeln!(out, "from sqlalchemy.orm import Mapped, mapped_column").unwrap();
    writeln!(out).unwrap();

    writeln!(out, "from app.models.base import BaseModel").unwrap();
    if spec.uses_custom_types() {
        let mut customs = BTreeSet::new();
        for field in &spec.fields {
            if field.field_type.is_custom() {
                customs.insert(field.field_type.storage_type());
            }
        }
        writeln!(
            out,
            "from app.models.crm.field_types import {}",
            customs.into_iter().collect::<Vec<_>>().join(", ")
        )
        .unwrap();
    }
    let mixins = spec.domain_mixins();
    if !mixins.is_empty() {
        let mut sorted = mixins.to_vec();
        sorted.sort_unstable();
        writeln!(
            out,
            "from app.models.crm.mixins import {}",
            sorted.join(", ")
        )
        .unwrap();
    }
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    let mut bases: Vec<&str> = mixins.to_vec();
    bases.push("BaseModel");
    writeln!(out, "class {}({}):", spec.type_name, bases.join(", ")).unwrap();
    writeln!(out, "    \"\"\"").unwrap();
    writeln!(
        out,
        "    {} model representing {} records.",
        spec.type_name, spec.plural_name
    )
    .unwrap();
    writeln!(out, "    \"\"\"").unwrap();
    writeln!(out, "    __tablename__ = \"{}\"", spec.table_name).unwrap();

    for field in &spec.fields {
        let hint = field.python_type();
        let mapped = if field.is_nullable() {
            format!("Optional[{}]", hint)
        } else {
            hint.to_string()
        };
        writeln!(out).unwrap();
        writeln!(
            out,
            "    {}: Mapped[{}] = mapped_column(",
            field.name, mapped
        )
        .unwrap();
        writeln!(out, "        {},", field.sa_type()).unwrap();
        if let Some(table) = field.foreign_table() {
            writeln!(out, "        ForeignKey(\"{}.id\"),", table).unwrap();
        }
        writeln!(
            out,
            "        nullable={},",
            if field.is_nullable() { "True" } else { "False" }
        )
        .unwrap();
        if field.is_unique() {
            writeln!(out, "        unique=True,").unwrap();
        }
        if field.is_indexed() {
            writeln!(out, "        index=True,").unwrap();
        }
        writeln!(out, "        doc=\"{}\"", field.doc).unwrap();
        writeln!(out, "    )").unwrap();
    }

    writeln!(out).unwrap();
    writeln!(out, "    def __repr__(self) -> str:").unwrap();
    writeln!(
        out,
        "        \"\"\"String representation of {}.\"\"\"",
        spec.type_name
    )
    .unwrap();
    let repr = spec.repr_fields();
    if repr.is_empty() {
        writeln!(
            out,
            "        return f\"<{}(id={{self.id}})>\"",
            spec.type_name
        )
        .unwrap();
    } else {
        writeln!(out, "        return f\"<{}({})>\"", spec.type_name, repr).unwrap();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DomainProfile;
    use crate::fields::parse_fields;

    #[test]
    fn test_model_columns_and_imports() {
        let fields = parse_fields("name:str,email:email:unique,age:int:nullable").unwrap();
        let spec = EntitySpec::new("customer", fields, true, true, true, None);
        let text = render(&spec);
        assert!(text.contains("class Customer(BaseModel):"));
        assert!(text.contains("__tablename__ = \"customers\""));
        assert!(text.contains("from sqlalchemy import Integer, String"));
        assert!(text.contains("from app.models.crm.field_types import EmailType"));
        assert!(text.contains("age: Mapped[Optional[int]] = mapped_column("));
        assert!(text.contains("unique=True"));
    }

    #[test]
    fn test_model_with_domain_mixins() {
        let fields = parse_fields("hire_date:date").unwrap();
        let spec = EntitySpec::new(
            "employee",
            fields,
            true,
            true,
            true,
            Some(DomainProfile::Employee),
        );
        let text = render(&spec);
        assert!(text
            .contains("class Employee(PersonMixin, ContactMixin, EmployeeMixin, BaseModel):"));
        assert!(text.contains("from datetime import date"));
    }

    #[test]
    fn test_foreign_key_column() {
        let fields = parse_fields("department_id:int:fk(departments)").unwrap();
        let spec = EntitySpec::new("position", fields, true, true, true, None);
        let text = render(&spec);
        assert!(text.contains("ForeignKey(\"departments.id\"),"));
        assert!(text.contains("from sqlalchemy import ForeignKey, Integer"));
    }
}
