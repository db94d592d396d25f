//! Service layer artifact.

use std::fmt::Write;

use crate::entity::EntitySpec;

/// Render the service module: a `BaseService` subclass with one
/// `get_by_<field>` lookup per unique field and a create override that
/// rejects duplicates with a 409.
pub fn render(spec: &EntitySpec) -> String {
    let mut out = String::new();
    let uniques = spec.unique_fields();

    writeln!(out, "\"\"\"").unwrap();
    writeln!(out, "{} service.", spec.type_name).unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "Business logic for {} on top of the generic CRUD base.",
        spec.plural_name
    )
    .unwrap();
    writeln!(out, "\"\"\"").unwrap();
    writeln!(out, "from typing import Optional").unwrap();
    writeln!(out).unwrap();
    if !uniques.is_empty() {
        writeln!(out, "from fastapi import HTTPException, status").unwrap();
    }
    writeln!(out, "from sqlalchemy import select").unwrap();
    writeln!(out, "from sqlalchemy.ext.asyncio import AsyncSession").unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "from app.models.{} import {}",
        spec.entity_name, spec.type_name
    )
    .unwrap();
    writeln!(
        out,
        "from app.schemas.{}_schemas import (",
        spec.entity_name
    )
    .unwrap();
    writeln!(out, "    {}Create,", spec.type_name).unwrap();
    writeln!(out, "    {}Update,", spec.type_name).unwrap();
    writeln!(out, "    {}Response,", spec.type_name).unwrap();
    writeln!(out, ")").unwrap();
    writeln!(out, "from app.services.base import BaseService").unwrap();
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    writeln!(
        out,
        "class {}Service(BaseService[{}, {}Create, {}Update, {}Response]):",
        spec.type_name, spec.type_name, spec.type_name, spec.type_name, spec.type_name
    )
    .unwrap();
    writeln!(
        out,
        "    \"\"\"Service for {} operations.\"\"\"",
        spec.entity_name
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "    def __init__(self, db: AsyncSession):").unwrap();
    writeln!(
        out,
        "        super().__init__({}, db, {}Response)",
        spec.type_name, spec.type_name
    )
    .unwrap();

    for field in &uniques {
        writeln!(out).unwrap();
        writeln!(
            out,
            "    async def get_by_{}(self, {}: {}) -> Optional[{}]:",
            field.name,
            field.name,
            field.python_type(),
            spec.type_name
        )
        .unwrap();
        writeln!(
            out,
            "        \"\"\"Look up a {} by its unique {}.\"\"\"",
            spec.entity_name, field.name
        )
        .unwrap();
        if spec.soft_delete {
            writeln!(
                out,
                "        stmt = select({}).where(",
                spec.type_name
            )
            .unwrap();
            writeln!(
                out,
                "            {}.{} == {},",
                spec.type_name, field.name, field.name
            )
            .unwrap();
            writeln!(
                out,
                "            {}.is_deleted == False,  # noqa: E712",
                spec.type_name
            )
            .unwrap();
            writeln!(out, "        )").unwrap();
        } else {
            writeln!(
                out,
                "        stmt = select({}).where({}.{} == {})",
                spec.type_name, spec.type_name, field.name, field.name
            )
            .unwrap();
        }
        writeln!(out, "        result = await self.db.execute(stmt)").unwrap();
        writeln!(out, "        return result.scalar_one_or_none()").unwrap();
    }

    if !uniques.is_empty() {
        writeln!(out).unwrap();
        writeln!(
            out,
            "    async def create(self, obj_in: {}Create, *, commit: bool = True) -> {}:",
            spec.type_name, spec.type_name
        )
        .unwrap();
        writeln!(
            out,
            "        \"\"\"Create a {} after checking unique constraints.\"\"\"",
            spec.entity_name
        )
        .unwrap();
        for field in &uniques {
            writeln!(
                out,
                "        if obj_in.{} is not None:",
                field.name
            )
            .unwrap();
            writeln!(
                out,
                "            existing = await self.get_by_{}(obj_in.{})",
                field.name, field.name
            )
            .unwrap();
            writeln!(out, "            if existing is not None:").unwrap();
            writeln!(out, "                raise HTTPException(").unwrap();
            writeln!(
                out,
                "                    status_code=status.HTTP_409_CONFLICT,"
            )
            .unwrap();
            writeln!(
                out,
                "                    detail=f\"{} with {} '{{obj_in.{}}}' already exists\",",
                spec.type_name, field.name, field.name
            )
            .unwrap();
            writeln!(out, "                )").unwrap();
        }
        writeln!(
            out,
            "        return await super().create(obj_in, commit=commit)"
        )
        .unwrap();
    }

    out
}
