//! crudgen CLI - scaffold CRUD entities for a FastAPI backend
//!
//! Generates the model, service, schemas, router, and test files for an
//! entity, links an Alembic migration onto the revision chain, and wires
//! the router into app/main.py.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crudgen::artifacts::OnExists;
use crudgen::entity::{DomainProfile, EntitySpec};
use crudgen::fields::parse_fields;
use crudgen::layout::ProjectLayout;
use crudgen::registry::RouterRegistration;
use crudgen::scaffold::{ScaffoldOptions, Scaffolder};
use crudgen::yaml_spec;

#[derive(Parser)]
#[command(name = "crudgen")]
#[command(version, about = "CRUD entity scaffolding for FastAPI backends", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OnExistsArg {
    /// Back up the existing file to <path>.bak, then overwrite
    Backup,
    /// Abort when a destination file already exists
    Fail,
}

impl From<OnExistsArg> for OnExists {
    fn from(arg: OnExistsArg) -> OnExists {
        match arg {
            OnExistsArg::Backup => OnExists::Backup,
            OnExistsArg::Fail => OnExists::Fail,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate all scaffolding artifacts for an entity
    Generate {
        /// Entity name in singular snake_case (e.g. "work_log")
        entity: Option<String>,

        /// Inline field spec, e.g. "name:str,email:email:unique"
        #[arg(short, long, conflicts_with = "spec_file")]
        fields: Option<String>,

        /// YAML entity spec file instead of inline fields
        #[arg(short, long)]
        spec_file: Option<PathBuf>,

        /// Skip the soft-delete column set
        #[arg(long)]
        no_soft_delete: bool,

        /// Skip the created_at/updated_at columns
        #[arg(long)]
        no_timestamps: bool,

        /// Skip the created_by_id/updated_by_id columns
        #[arg(long)]
        no_audit: bool,

        /// Domain profile mixed into the model (employee, customer, generic)
        #[arg(short, long)]
        domain: Option<String>,

        /// Backend root directory (contains app/ and alembic/)
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Base API prefix for router registration
        #[arg(long, default_value = "/api/v1")]
        api_prefix: String,

        /// What to do when a destination file already exists
        #[arg(long, value_enum, default_value_t = OnExistsArg::Backup)]
        on_exists: OnExistsArg,

        /// Do not wire the router into app/main.py
        #[arg(long)]
        no_register: bool,

        /// Do not generate an Alembic migration
        #[arg(long)]
        no_migration: bool,

        /// Show what would be generated without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Emit a JSON summary instead of human-readable output
        #[arg(long)]
        json: bool,
    },

    /// Remove an entity's router wiring from app/main.py
    Unregister {
        /// Entity name (singular or plural)
        entity: String,

        /// Backend root directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// List routers currently wired into app/main.py
    ListRouters {
        /// Backend root directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            entity,
            fields,
            spec_file,
            no_soft_delete,
            no_timestamps,
            no_audit,
            domain,
            output_dir,
            api_prefix,
            on_exists,
            no_register,
            no_migration,
            dry_run,
            json,
        } => generate(GenerateArgs {
            entity,
            fields,
            spec_file,
            soft_delete: !no_soft_delete,
            timestamps: !no_timestamps,
            audit: !no_audit,
            domain,
            output_dir,
            api_prefix,
            on_exists: on_exists.into(),
            register: !no_register,
            migration: !no_migration,
            dry_run,
            json,
        }),
        Commands::Unregister { entity, output_dir } => unregister(&entity, output_dir),
        Commands::ListRouters { output_dir } => list_routers(output_dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

struct GenerateArgs {
    entity: Option<String>,
    fields: Option<String>,
    spec_file: Option<PathBuf>,
    soft_delete: bool,
    timestamps: bool,
    audit: bool,
    domain: Option<String>,
    output_dir: PathBuf,
    api_prefix: String,
    on_exists: OnExists,
    register: bool,
    migration: bool,
    dry_run: bool,
    json: bool,
}

fn build_spec(args: &GenerateArgs) -> Result<EntitySpec, String> {
    if let Some(spec_file) = &args.spec_file {
        return yaml_spec::load_spec_file(spec_file).map_err(|e| e.to_string());
    }

    let entity = args
        .entity
        .as_deref()
        .ok_or("entity name required (or pass --spec-file)")?;
    let field_spec = args
        .fields
        .as_deref()
        .ok_or("field spec required: --fields \"name:str,...\" (or pass --spec-file)")?;
    let fields = parse_fields(field_spec).map_err(|e| e.to_string())?;

    let domain = match &args.domain {
        Some(name) => Some(
            DomainProfile::from_name(name)
                .ok_or_else(|| format!("unknown domain profile '{}'", name))?,
        ),
        None => None,
    };

    Ok(EntitySpec::new(
        entity,
        fields,
        args.soft_delete,
        args.timestamps,
        args.audit,
        domain,
    ))
}

fn generate(args: GenerateArgs) -> Result<(), String> {
    let spec = build_spec(&args)?;
    let layout = ProjectLayout::new(&args.output_dir);
    let mut scaffolder = Scaffolder::new(layout);

    if args.dry_run {
        scaffolder
            .validate_entity_name(&spec)
            .map_err(|e| e.to_string())?;
        return dry_run(&scaffolder, &spec, args.json);
    }

    let options = ScaffoldOptions {
        on_exists: args.on_exists,
        api_prefix: args.api_prefix.clone(),
        register: args.register,
        migration: args.migration,
    };
    let generated = scaffolder
        .generate(&spec, &options)
        .map_err(|e| e.to_string())?;

    if args.json {
        let summary = serde_json::json!({
            "entity": spec.entity_name,
            "class": spec.type_name,
            "table": spec.table_name,
            "artifacts": generated.artifacts.iter().map(|(kind, path)| {
                serde_json::json!({ "kind": kind.label(), "path": path })
            }).collect::<Vec<_>>(),
            "migration": generated.migration.as_ref().map(|m| serde_json::json!({
                "path": m.path,
                "revision": m.revision,
                "down_revision": m.down_revision,
            })),
            "registered": generated.registered,
        });
        println!("{}", serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?);
        return Ok(());
    }

    println!("🔧 Scaffolding {} ({})...", spec.entity_name, spec.type_name);
    for (kind, path) in &generated.artifacts {
        println!("  ✓ {}: {}", kind.label(), path.display());
    }
    match &generated.migration {
        Some(migration) => println!(
            "  ✓ migration: {} (revision {})",
            migration.path.display(),
            migration.revision
        ),
        None => println!("  ℹ migration skipped"),
    }
    if generated.registered {
        println!("  ✓ router registered in app/main.py");
    } else if args.register {
        println!("  ℹ router already registered");
    } else {
        println!("  ℹ registration skipped");
    }
    println!("Done.");
    Ok(())
}

fn dry_run(scaffolder: &Scaffolder, spec: &EntitySpec, json: bool) -> Result<(), String> {
    let planned = scaffolder.plan(spec);
    if json {
        let summary = serde_json::json!({
            "entity": spec.entity_name,
            "class": spec.type_name,
            "table": spec.table_name,
            "fields": spec.fields,
            "artifacts": planned.iter().map(|(kind, path)| {
                serde_json::json!({ "kind": kind.label(), "path": path })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?);
        return Ok(());
    }

    println!("🔎 Dry run for {} ({})", spec.entity_name, spec.type_name);
    println!("Fields:");
    for field in &spec.fields {
        let mut notes = Vec::new();
        if field.is_unique() {
            notes.push("unique".to_string());
        }
        if field.is_nullable() {
            notes.push("nullable".to_string());
        }
        if field.is_indexed() {
            notes.push("index".to_string());
        }
        if let Some(table) = field.foreign_table() {
            notes.push(format!("fk -> {}", table));
        }
        println!(
            "  {:<20} {:<10} {}",
            field.name,
            field.declared_type,
            notes.join(", ")
        );
    }
    println!("Would write:");
    for (kind, path) in &planned {
        println!("  {}: {}", kind.label(), path.display());
    }
    println!("Nothing written (dry run).");
    Ok(())
}

fn unregister(entity: &str, output_dir: PathBuf) -> Result<(), String> {
    let scaffolder = Scaffolder::new(ProjectLayout::new(output_dir));
    let removed = scaffolder.unregister(entity).map_err(|e| e.to_string())?;
    if removed {
        println!("✓ Unregistered router for '{}'", entity);
    } else {
        println!("ℹ No router registered for '{}'", entity);
    }
    Ok(())
}

fn list_routers(output_dir: PathBuf) -> Result<(), String> {
    let registry = RouterRegistration::new(&ProjectLayout::new(output_dir));
    let routers = registry.list_registered().map_err(|e| e.to_string())?;
    if routers.is_empty() {
        println!("No routers registered.");
        return Ok(());
    }
    for router in routers {
        println!("{}", router);
    }
    Ok(())
}
