//! Running the tool's own entry point in this process.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{DelegateOutput, DelegateStrategy, EntryPoint};
use crate::types::NestResult;

/// Process-wide working directory change, undone on drop.
struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    fn enter(dir: &Path) -> NestResult<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        Ok(Self { previous })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            warn!(dir = %self.previous.display(), "failed to restore working directory: {}", e);
        }
    }
}

/// Re-enters the entry point with the working directory set to the target
/// module. Output goes straight to this process's streams and is never
/// captured.
pub struct InProcessDelegate {
    entry_point: EntryPoint,
}

impl InProcessDelegate {
    pub fn new(entry_point: EntryPoint) -> Self {
        Self { entry_point }
    }
}

impl DelegateStrategy for InProcessDelegate {
    fn invoke(
        &self,
        module_root: &Path,
        args: &[String],
        _capture: bool,
    ) -> NestResult<DelegateOutput> {
        info!(module = %module_root.display(), ?args, "delegating in-process");
        let _guard = WorkingDirGuard::enter(module_root)?;
        let exit_code = (self.entry_point)(args);
        Ok(DelegateOutput {
            exit_code,
            ..Default::default()
        })
    }
}
