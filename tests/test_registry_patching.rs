//! Registry patcher behavior against realistic main.py layouts.

use std::fs;
use std::path::PathBuf;

use crudgen::{ProjectLayout, RouterRegistration, ScaffoldError};

const MAIN_PY: &str = concat!(
    "\"\"\"\n",
    "CRM backend application.\n",
    "\"\"\"\n",
    "from fastapi import FastAPI\n",
    "from fastapi.middleware.cors import CORSMiddleware\n",
    "\n",
    "from app.api.departments import router as departments_router\n",
    "from app.api.employees import router as employees_router\n",
    "\n",
    "app = FastAPI(title=\"CRM Backend\")\n",
    "\n",
    "app.add_middleware(\n",
    "    CORSMiddleware,\n",
    "    allow_origins=[\"*\"],\n",
    ")\n",
    "\n",
    "# Include routers\n",
    "app.include_router(departments_router, prefix=\"/api/v1\", tags=[\"departments\"])\n",
    "app.include_router(employees_router, prefix=\"/api/v1\", tags=[\"employees\"])\n",
    "\n",
    "\n",
    "@app.get(\"/health\")\n",
    "async def health():\n",
    "    return {\"status\": \"ok\"}\n",
);

fn setup(main_py: &str) -> (tempfile::TempDir, RouterRegistration, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(dir.path());
    let path = layout.main_py();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, main_py).unwrap();
    (dir, RouterRegistration::new(&layout), path)
}

#[test]
fn registration_lands_after_last_include_router() {
    let (_dir, registry, path) = setup(MAIN_PY);
    registry.register("products", "/api/v1", true).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.split('\n').collect();
    let employees = lines
        .iter()
        .position(|l| l.contains("app.include_router(employees_router"))
        .unwrap();
    assert_eq!(
        lines[employees + 1],
        "app.include_router(products_router, prefix=\"/api/v1/products\", tags=[\"products\"])"
    );

    // import inserted after the last import line, before app construction
    let import_idx = lines
        .iter()
        .position(|l| l.contains("from app.api.products import router as products_router"))
        .unwrap();
    let app_idx = lines
        .iter()
        .position(|l| l.starts_with("app = FastAPI"))
        .unwrap();
    assert!(import_idx < app_idx);
}

#[test]
fn second_register_is_byte_identical() {
    let (_dir, registry, path) = setup(MAIN_PY);
    registry.register("products", "/api/v1", true).unwrap();
    let first = fs::read(&path).unwrap();

    assert!(!registry.register("products", "/api/v1", true).unwrap());
    assert_eq!(first, fs::read(&path).unwrap());
}

#[test]
fn conflict_raised_when_skip_disabled() {
    let (_dir, registry, _path) = setup(MAIN_PY);
    let err = registry
        .register("departments", "/api/v1", false)
        .unwrap_err();
    assert!(matches!(err, ScaffoldError::RegistrationConflict(_)));
}

#[test]
fn unrelated_lines_are_never_rewritten() {
    let (_dir, registry, path) = setup(MAIN_PY);
    let before = fs::read_to_string(&path).unwrap();
    registry.register("products", "/api/v1", true).unwrap();
    let after = fs::read_to_string(&path).unwrap();

    let before_lines: Vec<&str> = before.split('\n').collect();
    let after_lines: Vec<&str> = after
        .split('\n')
        .filter(|l| !l.contains("products"))
        .collect();
    assert_eq!(before_lines, after_lines);
}

#[test]
fn parenthesized_imports_are_not_split() {
    let main_py = concat!(
        "from fastapi import FastAPI\n",
        "from app.middleware import (\n",
        "    ErrorHandler,\n",
        "    RequestLogger,\n",
        ")\n",
        "\n",
        "app = FastAPI()\n",
        "\n",
        "# Include routers\n",
    );
    let (_dir, registry, path) = setup(main_py);
    registry.register("orders", "/api/v1", true).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.split('\n').collect();
    // import block still parses as valid Python: insertion after the
    // closing paren, not inside the parenthesized list
    let closing = lines.iter().position(|l| *l == ")").unwrap();
    assert_eq!(
        lines[closing + 1],
        "from app.api.orders import router as orders_router"
    );
    assert_eq!(lines[1], "from app.middleware import (");
    assert_eq!(lines[2], "    ErrorHandler,");
}

#[test]
fn unregister_then_list() {
    let (_dir, registry, _path) = setup(MAIN_PY);
    registry.register("products", "/api/v1", true).unwrap();
    assert_eq!(
        registry.list_registered().unwrap(),
        vec!["departments", "employees", "products"]
    );

    assert!(registry.unregister("employees").unwrap());
    assert_eq!(
        registry.list_registered().unwrap(),
        vec!["departments", "products"]
    );
    assert!(!registry.unregister("employees").unwrap());
}
