//! Submodule discovery.
//!
//! Every immediate child directory of a module root is a submodule
//! candidate. Redirect markers are resolved first, so the shape check
//! (`Build/Module.yml`) only ever sees the directory that will actually be
//! consumed. Children that do not have that shape are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::module::{Module, REDIRECT_FILE};
use crate::types::NestResult;

/// Resolve the `.redirect` indirection for a child directory.
///
/// Returns the directory itself when no marker is present (or the marker is
/// blank). A relative target is taken relative to the child directory.
pub fn resolve_redirect(dir: &Path) -> NestResult<PathBuf> {
    let marker = dir.join(REDIRECT_FILE);
    if !marker.is_file() {
        return Ok(dir.to_path_buf());
    }

    let contents = fs::read_to_string(&marker)?;
    let target = contents.trim();
    if target.is_empty() {
        debug!(marker = %marker.display(), "ignoring blank redirect");
        return Ok(dir.to_path_buf());
    }

    let target = dir.join(target);
    debug!(from = %dir.display(), to = %target.display(), "following redirect");
    Ok(target)
}

/// The descriptor path if `dir` has the shape of a module.
fn probe_module_dir(dir: &Path) -> Option<PathBuf> {
    let descriptor = Module::descriptor_path(dir);
    descriptor.is_file().then_some(descriptor)
}

/// Immediate child directories of `root`, sorted by name.
fn child_dirs(root: &Path) -> NestResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Discover the submodules of `module`.
///
/// Default discovery loads `<child>/Build/Module.yml` for every child
/// directory (after redirect resolution). With a `platform`, each child is
/// additionally checked for a `<child>/<platform>` module, which is appended
/// as an extra submodule.
pub fn discover_submodules(module: &Module, platform: Option<&str>) -> NestResult<Vec<Module>> {
    let children = child_dirs(&module.root)?;
    let mut submodules = Vec::new();

    for child in &children {
        let target = resolve_redirect(child)?;
        match probe_module_dir(&target) {
            Some(descriptor) => submodules.push(Module::load(&descriptor)?),
            None => debug!(dir = %target.display(), "skipping non-module directory"),
        }
    }

    if let Some(platform) = platform {
        for child in &children {
            let platform_dir = child.join(platform);
            if !platform_dir.is_dir() {
                continue;
            }
            if let Some(descriptor) = probe_module_dir(&platform_dir) {
                debug!(dir = %platform_dir.display(), "found platform-specific submodule");
                submodules.push(Module::load(&descriptor)?);
            }
        }
    }

    Ok(submodules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::module::ModuleDescriptor;
    use crate::module::{BUILD_DIR, DESCRIPTOR_FILE};

    fn make_module(root: &Path, name: &str) {
        let build = root.join(BUILD_DIR);
        fs::create_dir_all(&build).unwrap();
        fs::write(build.join(DESCRIPTOR_FILE), format!("name: {}\n", name)).unwrap();
    }

    fn root_module(root: &Path) -> Module {
        make_module(root, "Root");
        Module::load(&Module::descriptor_path(root)).unwrap()
    }

    fn names(modules: &[Module]) -> Vec<String> {
        modules.iter().map(Module::name).collect()
    }

    #[test]
    fn skips_directories_without_descriptor() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = root_module(temp_dir.path());
        make_module(&temp_dir.path().join("Physics"), "Physics");
        fs::create_dir_all(temp_dir.path().join("Source")).unwrap();
        fs::create_dir_all(temp_dir.path().join("Half").join(BUILD_DIR)).unwrap();

        let submodules = discover_submodules(&root, None).unwrap();

        assert_eq!(names(&submodules), vec!["Physics"]);
    }

    #[test]
    fn redirect_is_equivalent_to_direct_inclusion() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root_dir = temp_dir.path().join("root");
        let real = temp_dir.path().join("cache").join("real-pkg");
        make_module(&real, "Package");
        let root = root_module(&root_dir);
        fs::create_dir_all(root_dir.join("Pkg")).unwrap();
        fs::write(
            root_dir.join("Pkg").join(REDIRECT_FILE),
            format!("  {}\n", real.display()),
        )
        .unwrap();

        let submodules = discover_submodules(&root, None).unwrap();
        let direct = Module::load(&Module::descriptor_path(&real)).unwrap();

        assert_eq!(submodules.len(), 1);
        assert_eq!(submodules[0].root, direct.root);
        assert_eq!(submodules[0].descriptor, direct.descriptor);
    }

    #[test]
    fn relative_redirect_resolves_against_child() {
        let temp_dir = tempfile::tempdir().unwrap();
        let child = temp_dir.path().join("Pkg");
        fs::create_dir_all(&child).unwrap();
        fs::write(child.join(REDIRECT_FILE), "../elsewhere").unwrap();

        assert_eq!(resolve_redirect(&child).unwrap(), child.join("../elsewhere"));
    }

    #[test]
    fn dangling_redirect_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = root_module(temp_dir.path());
        let child = temp_dir.path().join("Gone");
        fs::create_dir_all(&child).unwrap();
        fs::write(child.join(REDIRECT_FILE), "/definitely/not/here").unwrap();

        assert!(discover_submodules(&root, None).unwrap().is_empty());
    }

    #[test]
    fn platform_directories_are_additional_submodules() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = root_module(temp_dir.path());
        let graphics = temp_dir.path().join("Graphics");
        make_module(&graphics, "Graphics");
        make_module(&graphics.join("Windows"), "GraphicsDirectX");
        make_module(&graphics.join("Linux"), "GraphicsGL");

        assert_eq!(names(&discover_submodules(&root, None).unwrap()), vec!["Graphics"]);
        assert_eq!(
            names(&discover_submodules(&root, Some("Linux")).unwrap()),
            vec!["Graphics", "GraphicsGL"]
        );
    }

    #[test]
    fn malformed_submodule_descriptor_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = root_module(temp_dir.path());
        let broken = temp_dir.path().join("Broken").join(BUILD_DIR);
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(DESCRIPTOR_FILE), "name: [oops\n").unwrap();

        assert!(discover_submodules(&root, None).is_err());
    }

    #[test]
    fn module_without_children_has_no_submodules() {
        let temp_dir = tempfile::tempdir().unwrap();
        let module =
            Module::from_descriptor(ModuleDescriptor::default(), temp_dir.path().to_path_buf());
        assert!(discover_submodules(&module, Some("Windows")).unwrap().is_empty());
    }
}
