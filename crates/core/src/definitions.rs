//! Project definitions declared under a module's `Build/Projects` directory.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use tracing::debug;

use crate::configs::definition::parse_definition_config;
use crate::module::{Module, BUILD_DIR, PROJECTS_DIR};
use crate::types::{NestError, NestResult};

const DEFINITION_GLOB: &str = "*.definition";

/// A single project definition discovered under a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    /// Relative to the owning module when loaded; relative to the root of
    /// the walk once returned from [`crate::walk::walk_definitions`].
    pub relative_path: String,
    /// Absolute project directory.
    pub absolute_path: PathBuf,
    /// The `.definition` file this was read from.
    pub definition_path: PathBuf,
    /// Root of the module that owns this definition.
    pub module_path: PathBuf,
    pub project_type: Option<String>,
}

/// Identity of a definition across a walk: the same name under the same
/// module root is the same definition, however the module was reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefinitionKey {
    pub module_path: PathBuf,
    pub name: String,
}

impl Definition {
    pub fn key(&self) -> DefinitionKey {
        DefinitionKey {
            module_path: self.module_path.clone(),
            name: self.name.clone(),
        }
    }

    fn load(module: &Module, definition_path: &Path) -> NestResult<Self> {
        let definition_error = |message: String| NestError::Definition {
            path: definition_path.to_path_buf(),
            message,
        };

        let content = fs::read_to_string(definition_path)
            .map_err(|e| definition_error(format!("Failed to read definition: {}", e)))?;
        let config = parse_definition_config(&content)
            .map_err(|e| definition_error(format!("Failed to parse definition: {}", e)))?;

        let name = match config.name {
            Some(name) => name,
            None => definition_path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .ok_or_else(|| definition_error("Definition file has no usable name".to_string()))?,
        };
        let relative_path = config.path.unwrap_or_else(|| name.clone());
        let absolute_path = module.root.join(relative_path.replace('\\', "/"));

        Ok(Self {
            name,
            relative_path,
            absolute_path,
            definition_path: definition_path.to_path_buf(),
            module_path: module.root.clone(),
            project_type: config.project_type,
        })
    }
}

/// Directory holding a module's definition files.
pub fn projects_dir(module: &Module) -> PathBuf {
    module.root.join(BUILD_DIR).join(PROJECTS_DIR)
}

/// Load every `*.definition` file directly inside `Build/Projects`.
///
/// A module without that directory simply has no projects.
pub fn load_definitions(module: &Module) -> NestResult<Vec<Definition>> {
    let dir = projects_dir(module);
    if !dir.is_dir() {
        debug!(module = %module.root.display(), "no projects directory");
        return Ok(Vec::new());
    }

    let matcher: GlobMatcher = Glob::new(DEFINITION_GLOB)?.compile_matcher();
    let mut definitions = Vec::new();

    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_definition = path
            .file_name()
            .map(|name| matcher.is_match(Path::new(name)))
            .unwrap_or(false);
        if !is_definition {
            continue;
        }

        let definition = Definition::load(module, &path)?;
        debug!(name = %definition.name, file = %path.display(), "loaded definition");
        definitions.push(definition);
    }

    Ok(definitions)
}
