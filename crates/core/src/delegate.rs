//! Delegated invocation of a submodule's own tool copy
//!
//! A module can hand work to the copy of this tool installed in one of its
//! submodules. Two strategies exist:
//!
//! - [`InProcessDelegate`] re-enters this process's entry point with the
//!   working directory temporarily switched to the submodule
//! - [`SubprocessDelegate`] spawns `<submodule>/nest` and streams its output
//!
//! [`ProcessDelegate`] picks between them from its [`DelegateConfig`] and
//! layers the cached `--query-features` lookup on top.

pub mod args;
pub mod in_process;
pub mod subprocess;

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use nest_protocol::{looks_like_usage_banner, parse_feature_list, QUERY_FEATURES_FLAG};
use tracing::debug;

use crate::module::Module;
use crate::types::NestResult;

pub use args::{join_arguments, split_arguments};
pub use in_process::InProcessDelegate;
pub use subprocess::SubprocessDelegate;

/// Exit code reported when the delegate executable does not exist.
pub const MISSING_EXIT_CODE: i32 = 1;

/// The tool's own entry point: takes arguments (without the program name)
/// and returns an exit code.
pub type EntryPoint = Arc<dyn Fn(&[String]) -> i32 + Send + Sync>;

/// Result of a delegated invocation. Output buffers are only filled when
/// capture was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegateOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl DelegateOutput {
    pub fn missing() -> Self {
        Self {
            exit_code: MISSING_EXIT_CODE,
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A way of running the tool inside a module directory.
pub trait DelegateStrategy {
    fn invoke(
        &self,
        module_root: &Path,
        args: &[String],
        capture: bool,
    ) -> NestResult<DelegateOutput>;
}

/// Configuration for delegated invocations
#[derive(Clone)]
pub struct DelegateConfig {
    /// File name of the tool copy inside a module root.
    pub executable_name: String,
    pub max_attempts: u32,
    /// Pause between start attempts that raced the filesystem.
    pub retry_delay: Duration,
    /// Entry point for the in-process fast path; `None` always spawns.
    pub in_process: Option<EntryPoint>,
}

impl Default for DelegateConfig {
    fn default() -> Self {
        Self {
            executable_name: format!("nest{}", std::env::consts::EXE_SUFFIX),
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            in_process: None,
        }
    }
}

impl fmt::Debug for DelegateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateConfig")
            .field("executable_name", &self.executable_name)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay", &self.retry_delay)
            .field("in_process", &self.in_process.is_some())
            .finish()
    }
}

/// Invokes the tool copies installed in modules.
#[derive(Debug, Default)]
pub struct ProcessDelegate {
    config: DelegateConfig,
}

impl ProcessDelegate {
    pub fn new(config: DelegateConfig) -> Self {
        Self { config }
    }

    /// Run the tool copy in `module` with a whitespace-separated argument
    /// string.
    ///
    /// A missing tool copy is not an error: it yields
    /// [`MISSING_EXIT_CODE`] and empty output.
    pub fn invoke(&self, module: &Module, args: &str, capture: bool) -> NestResult<DelegateOutput> {
        let executable = module.root.join(&self.config.executable_name);
        if !executable.is_file() {
            debug!(path = %executable.display(), "no tool copy in module");
            return Ok(DelegateOutput::missing());
        }

        let args = split_arguments(args);
        match (&self.config.in_process, capture) {
            (Some(entry_point), false) => {
                InProcessDelegate::new(Arc::clone(entry_point)).invoke(&module.root, &args, capture)
            }
            _ => SubprocessDelegate::new(&self.config).invoke(&module.root, &args, capture),
        }
    }

    /// Features reported by the tool copy in `module`, queried once per
    /// module instance.
    ///
    /// A failed query, or one answered with a usage banner, counts as no
    /// features.
    pub fn features<'m>(&self, module: &'m Module) -> NestResult<&'m [String]> {
        if let Some(features) = module.feature_cache().get() {
            return Ok(features.as_slice());
        }

        let output = self.invoke(module, QUERY_FEATURES_FLAG, true)?;
        let features = if !output.success() || looks_like_usage_banner(&output.stdout) {
            debug!(
                module = %module.root.display(),
                exit_code = output.exit_code,
                "module reports no features"
            );
            Vec::new()
        } else {
            parse_feature_list(&output.stdout)
        };

        Ok(module.feature_cache().get_or_init(|| features).as_slice())
    }

    pub fn has_feature(&self, module: &Module, feature: &str) -> NestResult<bool> {
        Ok(self.features(module)?.iter().any(|f| f == feature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::module::ModuleDescriptor;
    use std::fs;
    use std::sync::Mutex;

    fn module_at(root: &Path) -> Module {
        Module::from_descriptor(ModuleDescriptor::default(), root.to_path_buf())
    }

    fn quick_config() -> DelegateConfig {
        DelegateConfig {
            retry_delay: Duration::from_millis(50),
            ..Default::default()
        }
    }

    #[cfg(unix)]
    fn install_script(root: &Path, body: &str) {
        let path = root.join(quick_config().executable_name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    }

    #[test]
    fn missing_executable_reports_failure_without_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        let delegate = ProcessDelegate::new(quick_config());

        let output = delegate.invoke(&module_at(temp_dir.path()), "list", true).unwrap();

        assert_ne!(output.exit_code, 0);
        assert!(output.stdout.is_empty());
        assert!(output.stderr.is_empty());
    }

    #[test]
    fn missing_executable_means_no_features() {
        let temp_dir = tempfile::tempdir().unwrap();
        let module = module_at(temp_dir.path());
        let delegate = ProcessDelegate::new(quick_config());

        assert!(!delegate.has_feature(&module, "query-features").unwrap());
        assert_eq!(module.cached_features(), Some(&[][..]));
    }

    #[test]
    fn in_process_swaps_and_restores_working_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        fs::write(root.join(quick_config().executable_name), "").unwrap();

        let seen: Arc<Mutex<Vec<(std::path::PathBuf, Vec<String>)>>> = Arc::default();
        let recorder = Arc::clone(&seen);
        let delegate = ProcessDelegate::new(DelegateConfig {
            in_process: Some(Arc::new(move |args: &[String]| {
                let cwd = std::env::current_dir().unwrap();
                recorder.lock().unwrap().push((cwd, args.to_vec()));
                7
            })),
            ..quick_config()
        });

        let before = std::env::current_dir().unwrap();
        let output = delegate
            .invoke(&module_at(&root), "list --platform Linux", false)
            .unwrap();

        assert_eq!(output.exit_code, 7);
        assert_eq!(std::env::current_dir().unwrap(), before);
        let seen = seen.lock().unwrap();
        assert_eq!(fs::canonicalize(&seen[0].0).unwrap(), root);
        assert_eq!(seen[0].1, vec!["list", "--platform", "Linux"]);
    }

    #[cfg(unix)]
    #[test]
    fn captures_output_and_exit_code() {
        let temp_dir = tempfile::tempdir().unwrap();
        install_script(temp_dir.path(), "echo \"args: $*\"\necho oops >&2\nexit 4");
        let delegate = ProcessDelegate::new(quick_config());

        let output = delegate
            .invoke(&module_at(temp_dir.path()), "build \"two words\"", true)
            .unwrap();

        assert_eq!(output.exit_code, 4);
        assert_eq!(output.stdout, "args: build two words\n");
        assert_eq!(output.stderr, "oops\n");
    }

    #[cfg(unix)]
    #[test]
    fn capture_bypasses_in_process_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        install_script(temp_dir.path(), "pwd");
        let delegate = ProcessDelegate::new(DelegateConfig {
            in_process: Some(Arc::new(|_: &[String]| 99)),
            ..quick_config()
        });

        let output = delegate.invoke(&module_at(temp_dir.path()), "", true).unwrap();

        assert_eq!(output.exit_code, 0);
        assert_eq!(
            fs::canonicalize(output.stdout.trim()).unwrap(),
            fs::canonicalize(temp_dir.path()).unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn features_are_queried_once_per_module() {
        let temp_dir = tempfile::tempdir().unwrap();
        install_script(
            temp_dir.path(),
            "echo called >> calls.log\necho query-features\necho redirects",
        );
        let module = module_at(temp_dir.path());
        let delegate = ProcessDelegate::new(quick_config());

        assert!(delegate.has_feature(&module, "redirects").unwrap());
        assert!(!delegate.has_feature(&module, "platform-submodules").unwrap());
        assert!(delegate.has_feature(&module, "query-features").unwrap());

        let calls = fs::read_to_string(temp_dir.path().join("calls.log")).unwrap();
        assert_eq!(calls.lines().count(), 1);

        // A fresh instance for the same directory queries again.
        let other = module_at(temp_dir.path());
        assert!(delegate.has_feature(&other, "redirects").unwrap());
        let calls = fs::read_to_string(temp_dir.path().join("calls.log")).unwrap();
        assert_eq!(calls.lines().count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn usage_banner_means_no_features() {
        let temp_dir = tempfile::tempdir().unwrap();
        install_script(
            temp_dir.path(),
            "echo 'Usage: nest [OPTIONS] <COMMAND>'\necho redirects",
        );
        let module = module_at(temp_dir.path());

        assert!(!ProcessDelegate::new(quick_config())
            .has_feature(&module, "redirects")
            .unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn failing_query_means_no_features() {
        let temp_dir = tempfile::tempdir().unwrap();
        install_script(temp_dir.path(), "echo redirects\nexit 2");
        let module = module_at(temp_dir.path());

        let delegate = ProcessDelegate::new(quick_config());
        assert!(delegate.features(&module).unwrap().is_empty());
    }
}
