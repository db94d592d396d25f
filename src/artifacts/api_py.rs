//! FastAPI router artifact.

use std::fmt::Write;

use crate::entity::EntitySpec;

/// Render the API module: an `APIRouter` carrying its own prefix, a service
/// dependency, and the five CRUD endpoints.
pub fn render(spec: &EntitySpec) -> String {
    let mut out = String::new();
    let entity = &spec.entity_name;
    let type_name = &spec.type_name;
    let plural = &spec.plural_name;

    writeln!(out, "\"\"\"").unwrap();
    writeln!(out, "{} API endpoints.", type_name).unwrap();
    writeln!(out, "\"\"\"").unwrap();
    writeln!(out, "from typing import Any").unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "from fastapi import APIRouter, Depends, HTTPException, status"
    )
    .unwrap();
    writeln!(out, "from sqlalchemy.ext.asyncio import AsyncSession").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "from app.core.database import get_db").unwrap();
    writeln!(out, "from app.schemas.base import MessageResponse, PaginationParams").unwrap();
    writeln!(out, "from app.schemas.{}_schemas import (", entity).unwrap();
    writeln!(out, "    {}Create,", type_name).unwrap();
    writeln!(out, "    {}Update,", type_name).unwrap();
    writeln!(out, "    {}Response,", type_name).unwrap();
    writeln!(out, "    {}ListResponse,", type_name).unwrap();
    writeln!(out, ")").unwrap();
    writeln!(
        out,
        "from app.services.{}_service import {}Service",
        entity, type_name
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "router = APIRouter(prefix=\"/{}\", tags=[\"{}\"])",
        plural, plural
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "def get_{}_service(db: AsyncSession = Depends(get_db)) -> {}Service:",
        entity, type_name
    )
    .unwrap();
    writeln!(out, "    return {}Service(db)", type_name).unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // create
    writeln!(
        out,
        "@router.post(\"/\", response_model={}Response, status_code=status.HTTP_201_CREATED)",
        type_name
    )
    .unwrap();
    writeln!(out, "async def create_{}(", entity).unwrap();
    writeln!(out, "    {}_in: {}Create,", entity, type_name).unwrap();
    writeln!(
        out,
        "    service: {}Service = Depends(get_{}_service),",
        type_name, entity
    )
    .unwrap();
    writeln!(out, ") -> Any:").unwrap();
    writeln!(out, "    \"\"\"Create a new {}.\"\"\"", entity).unwrap();
    writeln!(out, "    obj = await service.create({}_in)", entity).unwrap();
    writeln!(out, "    return {}Response.model_validate(obj)", type_name).unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // get by id
    writeln!(out, "@router.get(\"/{{id}}\", response_model={}Response)", type_name).unwrap();
    writeln!(out, "async def get_{}(", entity).unwrap();
    writeln!(out, "    id: int,").unwrap();
    writeln!(
        out,
        "    service: {}Service = Depends(get_{}_service),",
        type_name, entity
    )
    .unwrap();
    writeln!(out, ") -> Any:").unwrap();
    writeln!(out, "    \"\"\"Get a {} by ID.\"\"\"", entity).unwrap();
    writeln!(out, "    obj = await service.get_by_id(id)").unwrap();
    writeln!(out, "    if not obj:").unwrap();
    writeln!(out, "        raise HTTPException(").unwrap();
    writeln!(
        out,
        "            status_code=status.HTTP_404_NOT_FOUND,"
    )
    .unwrap();
    writeln!(out, "            detail=\"{} not found\",", type_name).unwrap();
    writeln!(out, "        )").unwrap();
    writeln!(out, "    return {}Response.model_validate(obj)", type_name).unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // list
    writeln!(out, "@router.get(\"/\", response_model={}ListResponse)", type_name).unwrap();
    writeln!(out, "async def list_{}(", plural).unwrap();
    writeln!(out, "    pagination: PaginationParams = Depends(),").unwrap();
    writeln!(
        out,
        "    service: {}Service = Depends(get_{}_service),",
        type_name, entity
    )
    .unwrap();
    writeln!(out, ") -> Any:").unwrap();
    writeln!(out, "    \"\"\"List {} with pagination.\"\"\"", plural).unwrap();
    writeln!(out, "    return await service.get_list(pagination=pagination)").unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // update
    writeln!(out, "@router.patch(\"/{{id}}\", response_model={}Response)", type_name).unwrap();
    writeln!(out, "async def update_{}(", entity).unwrap();
    writeln!(out, "    id: int,").unwrap();
    writeln!(out, "    {}_in: {}Update,", entity, type_name).unwrap();
    writeln!(
        out,
        "    service: {}Service = Depends(get_{}_service),",
        type_name, entity
    )
    .unwrap();
    writeln!(out, ") -> Any:").unwrap();
    writeln!(out, "    \"\"\"Update a {}.\"\"\"", entity).unwrap();
    writeln!(out, "    obj = await service.update(id, {}_in)", entity).unwrap();
    writeln!(out, "    if not obj:").unwrap();
    writeln!(out, "        raise HTTPException(").unwrap();
    writeln!(
        out,
        "            status_code=status.HTTP_404_NOT_FOUND,"
    )
    .unwrap();
    writeln!(out, "            detail=\"{} not found\",", type_name).unwrap();
    writeln!(out, "        )").unwrap();
    writeln!(out, "    return {}Response.model_validate(obj)", type_name).unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    // delete
    writeln!(out, "@router.delete(\"/{{id}}\", response_model=MessageResponse)").unwrap();
    writeln!(out, "async def delete_{}(", entity).unwrap();
    writeln!(out, "    id: int,").unwrap();
    writeln!(
        out,
        "    service: {}Service = Depends(get_{}_service),",
        type_name, entity
    )
    .unwrap();
    writeln!(out, ") -> Any:").unwrap();
    let verb = if spec.soft_delete {
        "Soft-delete"
    } else {
        "Delete"
    };
    writeln!(out, "    \"\"\"{} a {}.\"\"\"", verb, entity).unwrap();
    writeln!(out, "    success = await service.delete(id)").unwrap();
    writeln!(out, "    if not success:").unwrap();
    writeln!(out, "        raise HTTPException(").unwrap();
    writeln!(
        out,
        "            status_code=status.HTTP_404_NOT_FOUND,"
    )
    .unwrap();
    writeln!(out, "            detail=\"{} not found\",", type_name).unwrap();
    writeln!(out, "        )").unwrap();
    writeln!(
        out,
        "    return MessageResponse(message=\"{} deleted\", detail={{\"id\": str(id)}})",
        type_name
    )
    .unwrap();

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::parse_fields;

    #[test]
    fn test_router_prefix_and_endpoints() {
        let fields = parse_fields("name:str").unwrap();
        let spec = EntitySpec::new("customer", fields, true, true, true, None);
        let text = render(&spec);
        assert!(text.contains("router = APIRouter(prefix=\"/customers\", tags=[\"customers\"])"));
        assert!(text.contains("async def create_customer("));
        assert!(text.contains("async def get_customer("));
        assert!(text.contains("async def list_customers("));
        assert!(text.contains("async def update_customer("));
        assert!(text.contains("async def delete_customer("));
        assert!(text.contains("@router.get(\"/{id}\", response_model=CustomerResponse)"));
    }

    #[test]
    fn test_delete_docstring_tracks_soft_delete() {
        let fields = parse_fields("name:str").unwrap();
        let hard = EntitySpec::new("tag", fields.clone(), false, true, true, None);
        let soft = EntitySpec::new("tag", fields, true, true, true, None);
        assert!(render(&hard).contains("\"\"\"Delete a tag.\"\"\""));
        assert!(render(&soft).contains("\"\"\"Soft-delete a tag.\"\"\""));
    }
}
