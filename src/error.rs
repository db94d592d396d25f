//! Error types for the scaffolding generator.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type covering every failure mode of a generation run.
///
/// `Parse` and `Validation` are raised before any filesystem write; the
/// remaining variants can surface after artifacts already exist on disk, so
/// callers must treat "artifacts generated" and "entity fully wired in" as
/// separately observable outcomes.
#[derive(Debug)]
pub enum ScaffoldError {
    /// Malformed field clause syntax
    Parse(String),
    /// Semantic violations: duplicate/reserved field names, unresolvable
    /// foreign-key targets, invalid entity identifiers
    Validation(Vec<String>),
    /// Destination exists and the `Fail` write policy was selected
    ArtifactExists(PathBuf),
    /// Entity already wired into the registration file
    RegistrationConflict(String),
    /// Unexpected or corrupt state in the migration versions directory
    MigrationChain(String),
    Io(io::Error),
}

impl ScaffoldError {
    /// Single-message validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ScaffoldError::Validation(vec![message.into()])
    }
}

impl fmt::Display for ScaffoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaffoldError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ScaffoldError::Validation(errors) => {
                if errors.len() == 1 {
                    write!(f, "Validation error: {}", errors[0])
                } else {
                    writeln!(f, "Invalid field definitions:")?;
                    for (i, e) in errors.iter().enumerate() {
                        if i + 1 < errors.len() {
                            writeln!(f, "  - {}", e)?;
                        } else {
                            write!(f, "  - {}", e)?;
                        }
                    }
                    Ok(())
                }
            }
            ScaffoldError::ArtifactExists(path) => {
                write!(f, "File already exists: {}", path.display())
            }
            ScaffoldError::RegistrationConflict(msg) => {
                write!(f, "Registration conflict: {}", msg)
            }
            ScaffoldError::MigrationChain(msg) => {
                write!(f, "Migration chain error: {}", msg)
            }
            ScaffoldError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for ScaffoldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaffoldError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ScaffoldError {
    fn from(err: io::Error) -> Self {
        ScaffoldError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;
