//! API test artifact.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::entity::EntitySpec;
use crate::fields::{FieldDefinition, LanguageKind};

/// JSON-safe payload expression for one field. Decimals are sent as strings
/// and dates as ISO-8601, matching what pydantic accepts over the wire.
fn json_sample(field: &FieldDefinition) -> String {
    match field.field_type.language_kind() {
        LanguageKind::Decimal => format!("str({})", field.sample_literal),
        LanguageKind::Date | LanguageKind::DateTime => {
            format!("{}.isoformat()", field.sample_literal)
        }
        _ => field.sample_literal.clone(),
    }
}

fn json_updated_sample(field: &FieldDefinition) -> String {
    match field.field_type.language_kind() {
        LanguageKind::Decimal => format!("str({})", field.updated_sample_literal),
        LanguageKind::Date | LanguageKind::DateTime => {
            format!("{}.isoformat()", field.updated_sample_literal)
        }
        _ => field.updated_sample_literal.clone(),
    }
}

/// Render pytest coverage for the generated endpoints: a full CRUD pass plus
/// a missing-ID check.
pub fn render(spec: &EntitySpec) -> String {
    let mut out = String::new();
    let entity = &spec.entity_name;
    let plural = &spec.plural_name;

    writeln!(out, "\"\"\"").unwrap();
    writeln!(out, "API tests for the {} endpoints.", plural).unwrap();
    writeln!(out, "\"\"\"").unwrap();

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
    writeln!(out).unwrap();
    writeln!(out, "import pytest").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "BASE_URL = \"/api/v1/{}\"", plural).unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // payload fixture
    writeln!(out, "@pytest.fixture").unwrap();
    writeln!(out, "def {}_payload():", entity).unwrap();
    writeln!(out, "    return {{").unwrap();
    for field in &spec.fields {
        writeln!(out, "        \"{}\": {},", field.name, json_sample(field)).unwrap();
    }
    writeln!(out, "    }}").unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // create
    writeln!(out, "@pytest.mark.asyncio").unwrap();
    writeln!(
        out,
        "async def test_create_{}(client, {}_payload):",
        entity, entity
    )
    .unwrap();
    writeln!(
        out,
        "    response = await client.post(f\"{{BASE_URL}}/\", json={}_payload)",
        entity
    )
    .unwrap();
    writeln!(out, "    assert response.status_code == 201").unwrap();
    writeln!(out, "    body = response.json()").unwrap();
    writeln!(out, "    assert body[\"id\"] is not None").unwrap();
    for field in &spec.fields {
        writeln!(
            out,
            "    assert body[\"{}\"] == {}_payload[\"{}\"]",
            field.name, entity, field.name
        )
        .unwrap();
    }
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // get
    writeln!(out, "@pytest.mark.asyncio").unwrap();
    writeln!(
        out,
        "async def test_get_{}(client, {}_payload):",
        entity, entity
    )
    .unwrap();
    writeln!(
        out,
        "    created = await client.post(f\"{{BASE_URL}}/\", json={}_payload)",
        entity
    )
    .unwrap();
    writeln!(out, "    obj_id = created.json()[\"id\"]").unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "    response = await client.get(f\"{{BASE_URL}}/{{obj_id}}\")"
    )
    .unwrap();
    writeln!(out, "    assert response.status_code == 200").unwrap();
    writeln!(out, "    assert response.json()[\"id\"] == obj_id").unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // get missing
    writeln!(out, "@pytest.mark.asyncio").unwrap();
    writeln!(out, "async def test_get_{}_not_found(client):", entity).unwrap();
    writeln!(
        out,
        "    response = await client.get(f\"{{BASE_URL}}/999999\")"
    )
    .unwrap();
    writeln!(out, "    assert response.status_code == 404").unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // list
    writeln!(out, "@pytest.mark.asyncio").unwrap();
    writeln!(
        out,
        "async def test_list_{}(client, {}_payload):",
        plural, entity
    )
    .unwrap();
    writeln!(
        out,
        "    created = await client.post(f\"{{BASE_URL}}/\", json={}_payload)",
        entity
    )
    .unwrap();
    writeln!(out, "    obj_id = created.json()[\"id\"]").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "    response = await client.get(f\"{{BASE_URL}}/\")").unwrap();
    writeln!(out, "    assert response.status_code == 200").unwrap();
    writeln!(out, "    body = response.json()").unwrap();
    writeln!(out, "    assert body[\"total\"] >= 1").unwrap();
    writeln!(
        out,
        "    assert any(item[\"id\"] == obj_id for item in body[\"items\"])"
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // update
    writeln!(out, "@pytest.mark.asyncio").unwrap();
    writeln!(
        out,
        "async def test_update_{}(client, {}_payload):",
        entity, entity
    )
    .unwrap();
    writeln!(
        out,
        "    created = await client.post(f\"{{BASE_URL}}/\", json={}_payload)",
        entity
    )
    .unwrap();
    writeln!(out, "    obj_id = created.json()[\"id\"]").unwrap();
    writeln!(out).unwrap();
    if let Some(first) = spec.fields.first() {
        writeln!(
            out,
            "    update = {{\"{}\": {}}}",
            first.name,
            json_updated_sample(first)
        )
        .unwrap();
    } else {
        writeln!(out, "    update = {{}}").unwrap();
    }
    writeln!(
        out,
        "    response = await client.patch(f\"{{BASE_URL}}/{{obj_id}}\", json=update)"
    )
    .unwrap();
    writeln!(out, "    assert response.status_code == 200").unwrap();
    if let Some(first) = spec.fields.first() {
        writeln!(
            out,
            "    assert response.json()[\"{}\"] == update[\"{}\"]",
            first.name, first.name
        )
        .unwrap();
    }
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // delete then 404
    writeln!(out, "@pytest.mark.asyncio").unwrap();
    writeln!(
        out,
        "async def test_delete_{}(client, {}_payload):",
        entity, entity
    )
    .unwrap();
    writeln!(
        out,
        "    created = await client.post(f\"{{BASE_URL}}/\", json={}_payload)",
        entity
    )
    .unwrap();
    writeln!(out, "    obj_id = created.json()[\"id\"]").unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "    response = await client.delete(f\"{{BASE_URL}}/{{obj_id}}\")"
    )
    .unwrap();
    writeln!(out, "    assert response.status_code == 200").unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "    response = await client.get(f\"{{BASE_URL}}/{{obj_id}}\")"
    )
    .unwrap();
    writeln!(out, "    assert response.status_code == 404").unwrap();

    out
}
