//! Service test artifact.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::entity::EntitySpec;

fn create_kwargs(spec: &EntitySpec) -> String {
    spec.fields
        .iter()
        .map(|f| format!("{}={}", f.name, f.sample_literal))
        .collect::<Vec<_>>()
        .join(", ")
}

fn pattern_kwargs(spec: &EntitySpec) -> String {
    spec.fields
        .iter()
        .map(|f| format!("{}={}", f.name, f.sample_pattern))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render pytest coverage for the generated service: create, lookup, update,
/// paginated listing, and delete semantics against a database session.
pub fn render(spec: &EntitySpec) -> String {
    let mut out = String::new();
    let entity = &spec.entity_name;
    let type_name = &spec.type_name;
    let plural = &spec.plural_name;
    let uniques = spec.unique_fields();

    writeln!(out, "\"\"\"").unwrap();
    writeln!(out, "Service tests for {}Service.", type_name).unwrap();
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
    if !uniques.is_empty() {
        writeln!(out, "from fastapi import HTTPException").unwrap();
    }
    writeln!(out).unwrap();
    writeln!(out, "from app.schemas.base import PaginationParams").unwrap();
    writeln!(
        out,
        "from app.schemas.{}_schemas import {}Create, {}Update",
        entity, type_name, type_name
    )
    .unwrap();
    writeln!(
        out,
        "from app.services.{}_service import {}Service",
        entity, type_name
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // create
    writeln!(out, "@pytest.mark.asyncio").unwrap();
    writeln!(out, "async def test_create_{}(db_session):", entity).unwrap();
    writeln!(out, "    service = {}Service(db_session)", type_name).unwrap();
    writeln!(
        out,
        "    obj = await service.create({}Create({}))",
        type_name,
        create_kwargs(spec)
    )
    .unwrap();
    writeln!(out, "    assert obj.id is not None").unwrap();
    if let Some(first) = spec.fields.first() {
        writeln!(
            out,
            "    assert obj.{} == {}",
            first.name, first.sample_literal
        )
        .unwrap();
    }
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // get_by_id
    writeln!(out, "@pytest.mark.asyncio").unwrap();
    writeln!(out, "async def test_get_{}_by_id(db_session):", entity).unwrap();
    writeln!(out, "    service = {}Service(db_session)", type_name).unwrap();
    writeln!(
        out,
        "    created = await service.create({}Create({}))",
        type_name,
        create_kwargs(spec)
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "    found = await service.get_by_id(created.id)").unwrap();
    writeln!(out, "    assert found is not None").unwrap();
    writeln!(out, "    assert found.id == created.id").unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // update
    if let Some(first) = spec.fields.first() {
        writeln!(out, "@pytest.mark.asyncio").unwrap();
        writeln!(out, "async def test_update_{}(db_session):", entity).unwrap();
        writeln!(out, "    service = {}Service(db_session)", type_name).unwrap();
        writeln!(
            out,
            "    created = await service.create({}Create({}))",
            type_name,
            create_kwargs(spec)
        )
        .unwrap();
        writeln!(out).unwrap();
        writeln!(
            out,
            "    updated = await service.update(created.id, {}Update({}={}))",
            type_name, first.name, first.updated_sample_literal
        )
        .unwrap();
        writeln!(out, "    assert updated is not None").unwrap();
        writeln!(
            out,
            "    assert updated.{} == {}",
            first.name, first.updated_sample_literal
        )
        .unwrap();
        writeln!(out).unwrap();
        writeln!(out).unwrap();
    }

    // list with pagination
    writeln!(out, "@pytest.mark.asyncio").unwrap();
    writeln!(out, "async def test_list_{}(db_session):", plural).unwrap();
    writeln!(out, "    service = {}Service(db_session)", type_name).unwrap();
    writeln!(out, "    for i in range(1, 4):").unwrap();
    writeln!(
        out,
        "        await service.create({}Create({}))",
        type_name,
        pattern_kwargs(spec)
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "    result = await service.get_list(pagination=PaginationParams())"
    )
    .unwrap();
    writeln!(out, "    assert result.total >= 3").unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // delete
    writeln!(out, "@pytest.mark.asyncio").unwrap();
    writeln!(out, "async def test_delete_{}(db_session):", entity).unwrap();
    writeln!(out, "    service = {}Service(db_session)", type_name).unwrap();
    writeln!(
        out,
        "    created = await service.create({}Create({}))",
        type_name,
        create_kwargs(spec)
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "    assert await service.delete(created.id) is True").unwrap();
    writeln!(out, "    assert await service.get_by_id(created.id) is None").unwrap();
    if spec.soft_delete {
        writeln!(out).unwrap();
        writeln!(out, "    # soft-deleted rows stay reachable on request").unwrap();
        writeln!(
            out,
            "    hidden = await service.get_by_id(created.id, include_deleted=True)"
        )
        .unwrap();
        writeln!(out, "    assert hidden is not None").unwrap();
        writeln!(out, "    assert hidden.is_deleted is True").unwrap();
    }

    // duplicate rejection per unique field
    for field in &uniques {
        writeln!(out).unwrap();
        writeln!(out).unwrap();
        writeln!(out, "@pytest.mark.asyncio").unwrap();
        writeln!(
            out,
            "async def test_duplicate_{}_rejected(db_session):",
            field.name
        )
        .unwrap();
        writeln!(out, "    service = {}Service(db_session)", type_name).unwrap();
        writeln!(
            out,
            "    await service.create({}Create({}))",
            type_name,
            create_kwargs(spec)
        )
        .unwrap();
        writeln!(out).unwrap();
        writeln!(out, "    with pytest.raises(HTTPException) as exc_info:").unwrap();
        writeln!(
            out,
            "        await service.create({}Create({}))",
            type_name,
            create_kwargs(spec)
        )
        .unwrap();
        writeln!(out, "    assert exc_info.value.status_code == 409").unwrap();
    }
    writeln!(out).unwrap();

    out
}
