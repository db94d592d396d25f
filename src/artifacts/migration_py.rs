//! Alembic migration artifact.
//!
//! Rendered with literal `"None"` revision placeholders; the migration chain
//! manager substitutes real identifiers when it links the file into the
//! chain.

use std::fmt::Write;

use crate::entity::EntitySpec;
use crate::fields::{FieldDefinition, FieldType};

/// SQLAlchemy type expression for migration columns. The custom CRM column
/// types decay to their storage representation here so migrations never
/// import application code.
fn sa_migration_type(field: &FieldDefinition) -> String {
    match field.field_type {
        FieldType::Email => "sa.String(255)".to_string(),
        FieldType::Phone => "sa.String(20)".to_string(),
        _ => format!("sa.{}", field.sa_type()),
    }
}

/// Render a create-table migration for the entity.
///
/// `create_date` is supplied by the caller so rendering stays deterministic
/// and side-effect free.
pub fn render(spec: &EntitySpec, create_date: &str) -> String {
    let mut out = String::new();
    let table = &spec.table_name;

    writeln!(out, "\"\"\"create_{}_table", spec.entity_name).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "Revision ID: <set at generation time>").unwrap();
    writeln!(out, "Create Date: {}", create_date).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "\"\"\"").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "from alembic import op").unwrap();
    writeln!(out, "import sqlalchemy as sa").unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "# revision identifiers, used by Alembic.").unwrap();
    writeln!(out, "revision = \"None\"").unwrap();
    writeln!(out, "down_revision = \"None\"").unwrap();
    writeln!(out, "branch_labels = None").unwrap();
    writeln!(out, "depends_on = None").unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    writeln!(out, "def upgrade() -> None:").unwrap();
    writeln!(out, "    \"\"\"Create {} table.\"\"\"", table).unwrap();
    writeln!(out, "    op.create_table(").unwrap();
    writeln!(out, "        \"{}\",", table).unwrap();
    writeln!(
        out,
        "        sa.Column(\"id\", sa.Integer(), autoincrement=True, nullable=False),"
    )
    .unwrap();
    for field in &spec.fields {
        writeln!(
            out,
            "        sa.Column(\"{}\", {}, nullable={}),",
            field.name,
            sa_migration_type(field),
            if field.is_nullable() { "True" } else { "False" }
        )
        .unwrap();
    }
    if spec.timestamps {
        writeln!(
            out,
            "        sa.Column(\"created_at\", sa.DateTime(), nullable=False),"
        )
        .unwrap();
        writeln!(
            out,
            "        sa.Column(\"updated_at\", sa.DateTime(), nullable=False),"
        )
        .unwrap();
    }
    if spec.soft_delete {
        writeln!(
            out,
            "        sa.Column(\"is_deleted\", sa.Boolean(), nullable=False, server_default=\"false\"),"
        )
        .unwrap();
        writeln!(
            out,
            "        sa.Column(\"deleted_at\", sa.DateTime(), nullable=True),"
        )
        .unwrap();
    }
    if spec.audit {
        writeln!(
            out,
            "        sa.Column(\"created_by_id\", sa.Integer(), nullable=True),"
        )
        .unwrap();
        writeln!(
            out,
            "        sa.Column(\"updated_by_id\", sa.Integer(), nullable=True),"
        )
        .unwrap();
    }
    for (column, target) in spec.foreign_keys() {
        writeln!(
            out,
            "        sa.ForeignKeyConstraint([\"{}\"], [\"{}.id\"]),",
            column, target
        )
        .unwrap();
    }
    writeln!(out, "        sa.PrimaryKeyConstraint(\"id\"),").unwrap();
    for field in spec.unique_fields() {
        writeln!(
            out,
            "        sa.UniqueConstraint(\"{}\", name=\"uq_{}_{}\"),",
            field.name, table, field.name
        )
        .unwrap();
    }
    writeln!(out, "    )").unwrap();

    let mut indexes = vec!["id".to_string()];
    indexes.extend(spec.indexed_fields().iter().map(|f| f.name.clone()));
    if spec.soft_delete {
        indexes.push("is_deleted".to_string());
    }
    writeln!(out).unwrap();
    for column in &indexes {
        writeln!(
            out,
            "    op.create_index(\"ix_{}_{}\", \"{}\", [\"{}\"], unique=False)",
            table, column, table, column
        )
        .unwrap();
    }
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    writeln!(out, "def downgrade() -> None:").unwrap();
    writeln!(out, "    \"\"\"Drop {} table.\"\"\"", table).unwrap();
    for column in indexes.iter().rev() {
        writeln!(
            out,
            "    op.drop_index(\"ix_{}_{}\", table_name=\"{}\")",
            table, column, table
        )
        .unwrap();
    }
    writeln!(out, "    op.drop_table(\"{}\")", table).unwrap();

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::parse_fields;

    const CREATE_DATE: &str = "2025-06-01 12:00:00";

    #[test]
    fn test_placeholders_present() {
        let fields = parse_fields("name:str").unwrap();
        let spec = EntitySpec::new("customer", fields, true, true, true, None);
        let text = render(&spec, CREATE_DATE);
        assert!(text.contains("revision = \"None\""));
        assert!(text.contains("down_revision = \"None\""));
        assert!(text.contains("branch_labels = None"));
        assert!(text.contains("Create Date: 2025-06-01 12:00:00"));
    }

    #[test]
    fn test_table_columns_follow_flags() {
        let fields = parse_fields("name:str,salary:decimal").unwrap();
        let spec = EntitySpec::new("employee", fields, true, true, true, None);
        let text = render(&spec, CREATE_DATE);
        assert!(text.contains("op.create_table(\n        \"employees\","));
        assert!(text.contains("sa.Column(\"salary\", sa.Numeric(15, 2), nullable=False),"));
        assert!(text.contains("sa.Column(\"created_at\", sa.DateTime(), nullable=False),"));
        assert!(text.contains("server_default=\"false\""));
        assert!(text.contains("sa.Column(\"created_by_id\", sa.Integer(), nullable=True),"));
    }

    #[test]
    fn test_flags_off_drop_base_columns() {
        let fields = parse_fields("name:str").unwrap();
        let spec = EntitySpec::new("tag", fields, false, false, false, None);
        let text = render(&spec, CREATE_DATE);
        assert!(!text.contains("created_at"));
        assert!(!text.contains("is_deleted"));
        assert!(!text.contains("created_by_id"));
    }

    #[test]
    fn test_constraints_and_indexes() {
        let fields =
            parse_fields("email:email:unique,dept_id:int:fk(departments),level:int:index")
                .unwrap();
        let spec = EntitySpec::new("employee", fields, true, true, true, None);
        let text = render(&spec, CREATE_DATE);
        assert!(text.contains("sa.Column(\"email\", sa.String(255), nullable=False),"));
        assert!(text.contains("sa.ForeignKeyConstraint([\"dept_id\"], [\"departments.id\"]),"));
        assert!(text.contains("sa.UniqueConstraint(\"email\", name=\"uq_employees_email\"),"));
        assert!(text.contains(
            "op.create_index(\"ix_employees_level\", \"employees\", [\"level\"], unique=False)"
        ));
        assert!(text.contains("op.drop_index(\"ix_employees_is_deleted\", table_name=\"employees\")"));
        assert!(text.contains("op.drop_table(\"employees\")"));
    }
}
