//! Loaded modules and the descriptor store.
//!
//! A module is a directory holding `Build/Module.yml`. The descriptor never
//! records where the module lives; [`Module::load`] derives the root from the
//! descriptor's own location (`<root>/Build/Module.yml`).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::debug;

use crate::configs::module::{parse_module_descriptor, render_module_descriptor, ModuleDescriptor};
use crate::platform::{split_platform_list, HostOs};
use crate::types::{NestError, NestResult};

/// Directory inside a module root that holds the descriptor and definitions.
pub const BUILD_DIR: &str = "Build";
/// Descriptor file name inside [`BUILD_DIR`].
pub const DESCRIPTOR_FILE: &str = "Module.yml";
/// Directory inside [`BUILD_DIR`] holding `*.definition` files.
pub const PROJECTS_DIR: &str = "Projects";
/// Marker file relocating a submodule directory.
pub const REDIRECT_FILE: &str = ".redirect";

/// A module loaded from disk.
#[derive(Debug)]
pub struct Module {
    pub descriptor: ModuleDescriptor,
    /// Canonical root directory. Never persisted.
    pub root: PathBuf,
    /// Features reported by this module's own tool copy. Filled on first
    /// query and owned by this instance only.
    features: OnceLock<Vec<String>>,
}

impl Clone for Module {
    /// Clones start with an empty feature cache.
    fn clone(&self) -> Self {
        Self::from_descriptor(self.descriptor.clone(), self.root.clone())
    }
}

impl Module {
    /// Build a module from an in-memory descriptor rooted at `root`.
    pub fn from_descriptor(descriptor: ModuleDescriptor, root: PathBuf) -> Self {
        Self {
            descriptor,
            root,
            features: OnceLock::new(),
        }
    }

    /// Path of the descriptor file for a module rooted at `root`.
    pub fn descriptor_path(root: &Path) -> PathBuf {
        root.join(BUILD_DIR).join(DESCRIPTOR_FILE)
    }

    /// Load a descriptor file; the module root is the parent of the
    /// directory containing it.
    pub fn load(path: &Path) -> NestResult<Self> {
        let descriptor_error = |message: String| NestError::Descriptor {
            path: path.to_path_buf(),
            message,
        };

        let path = fs::canonicalize(path)
            .map_err(|e| descriptor_error(format!("Failed to locate descriptor: {}", e)))?;
        let content = fs::read_to_string(&path)
            .map_err(|e| descriptor_error(format!("Failed to read descriptor: {}", e)))?;
        let descriptor = parse_module_descriptor(&content)
            .map_err(|e| descriptor_error(format!("Failed to parse descriptor: {}", e)))?;

        let root = path
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| {
                descriptor_error("Descriptor has no enclosing module directory".to_string())
            })?
            .to_path_buf();

        debug!(root = %root.display(), name = ?descriptor.name, "loaded module descriptor");
        Ok(Self::from_descriptor(descriptor, root))
    }

    /// Persist the descriptor (never the root) to `path`.
    pub fn save(&self, path: &Path) -> NestResult<()> {
        let descriptor_error = |message: String| NestError::Descriptor {
            path: path.to_path_buf(),
            message,
        };

        let yaml = render_module_descriptor(&self.descriptor)
            .map_err(|e| descriptor_error(format!("Failed to serialize descriptor: {}", e)))?;
        fs::write(path, yaml)
            .map_err(|e| descriptor_error(format!("Failed to write descriptor: {}", e)))
    }

    /// Name from the descriptor, or the root directory name when unset.
    pub fn name(&self) -> String {
        self.descriptor
            .name
            .clone()
            .or_else(|| {
                self.root
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// The explicit supported-platform list, if the module restricts
    /// platforms at all. A blank list counts as no restriction.
    pub fn supported_platforms(&self) -> Option<Vec<String>> {
        let platforms = split_platform_list(self.descriptor.supported_platforms.as_deref()?);
        if platforms.is_empty() {
            None
        } else {
            Some(platforms)
        }
    }

    /// Platforms generated by default when running on `host`.
    pub fn default_platforms(&self, host: HostOs) -> Vec<String> {
        let configured = match host {
            HostOs::Windows => self.descriptor.default_windows_platforms.as_deref(),
            HostOs::MacOs => self.descriptor.default_mac_os_platforms.as_deref(),
            HostOs::Linux => self.descriptor.default_linux_platforms.as_deref(),
        };
        split_platform_list(configured.unwrap_or(host.default_platforms()))
    }

    pub(crate) fn feature_cache(&self) -> &OnceLock<Vec<String>> {
        &self.features
    }

    /// Features cached by an earlier query, without triggering one.
    pub fn cached_features(&self) -> Option<&[String]> {
        self.features.get().map(Vec::as_slice)
    }
}

/// Find the module enclosing `start_dir` (the directory itself or its
/// nearest ancestor holding `Build/Module.yml`) and load it.
pub fn locate_module(start_dir: &Path) -> NestResult<Module> {
    let start = fs::canonicalize(start_dir)?;
    for dir in start.ancestors() {
        let candidate = Module::descriptor_path(dir);
        if candidate.is_file() {
            return Module::load(&candidate);
        }
    }
    Err(NestError::Path(format!(
        "No {}/{} found at or above {}",
        BUILD_DIR,
        DESCRIPTOR_FILE,
        start.display()
    )))
}
