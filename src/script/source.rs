use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use crate::{configs::expand_path, error::DslError};

const CLASSPATH_PREFIX: &str = "classpath:";
const FILE_PREFIX: &str = "file:";

/// Script text ready for evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Shown in error messages and used as the chunk name.
    pub name: String,
    pub text: String,
}

/// Where a script comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    File(PathBuf),
    /// Relative path searched across the loader's script roots, in order.
    Classpath(String),
    Inline { name: String, text: String },
}

impl ScriptSource {
    /// `classpath:<relative>`, `file:<path>`, or a bare filesystem path.
    pub fn parse(reference: &str) -> Self {
        if let Some(relative) = reference.strip_prefix(CLASSPATH_PREFIX) {
            ScriptSource::Classpath(relative.trim_start_matches('/').to_string())
        } else if let Some(path) = reference.strip_prefix(FILE_PREFIX) {
            ScriptSource::File(PathBuf::from(path))
        } else {
            ScriptSource::File(PathBuf::from(reference))
        }
    }

    pub fn inline(name: impl Into<String>, text: impl Into<String>) -> Self {
        ScriptSource::Inline {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn resolve(&self, script_roots: &[PathBuf]) -> Result<Script, DslError> {
        match self {
            ScriptSource::Inline { name, text } => Ok(Script {
                name: name.clone(),
                text: text.clone(),
            }),
            ScriptSource::File(path) => {
                let reference = path.display().to_string();
                let path = expand_path(path.clone()).map_err(|_| DslError::ResourceNotFound {
                    reference: reference.clone(),
                })?;
                read_script(&path, reference)
            }
            ScriptSource::Classpath(relative) => {
                let reference = format!("{}{}", CLASSPATH_PREFIX, relative);
                let path = script_roots
                    .iter()
                    .map(|root| root.join(relative))
                    .find(|candidate| candidate.is_file())
                    .ok_or_else(|| DslError::ResourceNotFound {
                        reference: reference.clone(),
                    })?;
                read_script(&path, reference)
            }
        }
    }
}

fn read_script(path: &Path, reference: String) -> Result<Script, DslError> {
    if path.is_dir() {
        return Err(DslError::ResourceNotFound { reference });
    }

    match fs::read_to_string(path) {
        Ok(text) => Ok(Script {
            name: reference,
            text,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(DslError::ResourceNotFound { reference })
        }
        Err(source) => Err(DslError::Unreadable { reference, source }),
    }
}

impl fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptSource::File(path) => write!(f, "{}", path.display()),
            ScriptSource::Classpath(relative) => write!(f, "{}{}", CLASSPATH_PREFIX, relative),
            ScriptSource::Inline { name, .. } => f.write_str(name),
        }
    }
}

impl From<&str> for ScriptSource {
    fn from(reference: &str) -> Self {
        ScriptSource::parse(reference)
    }
}

impl From<String> for ScriptSource {
    fn from(reference: String) -> Self {
        ScriptSource::parse(&reference)
    }
}

impl From<PathBuf> for ScriptSource {
    fn from(path: PathBuf) -> Self {
        ScriptSource::File(path)
    }
}

impl From<&Path> for ScriptSource {
    fn from(path: &Path) -> Self {
        ScriptSource::File(path.to_path_buf())
    }
}
