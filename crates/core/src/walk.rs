//! Recursive traversal of a module tree.
//!
//! [`walk_modules`] visits a module and, depth-first, every submodule below
//! it, parents before children. Each visit carries the path of the module
//! relative to the root of the walk, composed hop by hop from the real
//! (post-redirect) directory layout. [`walk_definitions`] and
//! [`build_module_graph`] are both visitors over that traversal.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, warn};

use crate::definitions::{load_definitions, Definition, DefinitionKey};
use crate::module::Module;
use crate::submodules::discover_submodules;
use crate::types::NestResult;

/// Separator used in walk-relative paths.
pub const PATH_SEPARATOR: char = '\\';

/// One step of a module walk.
pub struct ModuleVisit<'a> {
    pub module: &'a Module,
    pub parent: Option<&'a Module>,
    /// Path of `module` relative to the root of the walk; empty for the root.
    pub relative_path: &'a str,
    pub depth: usize,
}

/// Callback invoked for every module reached by [`walk_modules`].
pub trait ModuleVisitor {
    fn visit(&mut self, visit: &ModuleVisit<'_>) -> NestResult<()>;
}

/// Join two relative paths with [`PATH_SEPARATOR`], normalising `/`.
///
/// Empty and `.` segments are dropped and `..` cancels the segment before
/// it, the way a relative URI resolves against its base. A leading root on
/// `prefix` (a module only reachable by absolute path) is kept.
pub fn compose_relative_path(prefix: &str, path: &str) -> String {
    let unrooted = prefix.trim_start_matches(['/', PATH_SEPARATOR]);
    let root = PATH_SEPARATOR
        .to_string()
        .repeat(prefix.len() - unrooted.len());

    let joined = format!("{}{}{}", unrooted, PATH_SEPARATOR, path);
    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split(['/', PATH_SEPARATOR]) {
        match segment {
            "" | "." => {}
            ".." if segments.last().is_some_and(|last| *last != "..") => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    root + &segments.join(&PATH_SEPARATOR.to_string())
}

/// Filesystem-relative path from directory `from` to directory `to`.
///
/// `None` when no relative form exists. With canonical roots that only
/// happens on Windows, across drive letters.
pub fn relative_dir(from: &Path, to: &Path) -> Option<String> {
    let relative = pathdiff::diff_paths(to, from)?;
    if relative.is_absolute() {
        return None;
    }
    Some(
        relative
            .components()
            .filter_map(|component| match component {
                Component::ParentDir => Some("..".to_string()),
                Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(&PATH_SEPARATOR.to_string()),
    )
}

/// Walk-relative path of a submodule rooted at `to`, below a module rooted
/// at `from` whose own walk-relative path is `relative_path`. A submodule
/// with no relative form is reported by its absolute path as is.
fn child_relative_path(relative_path: &str, from: &Path, to: &Path) -> String {
    match relative_dir(from, to) {
        Some(relative) => compose_relative_path(relative_path, &relative),
        None => to.display().to_string(),
    }
}

/// Visit `module` and every transitive submodule, parents first.
///
/// A submodule resolving to one of its own ancestors (a redirect loop) is
/// skipped rather than recursed into.
pub fn walk_modules(
    module: &Module,
    platform: Option<&str>,
    visitor: &mut dyn ModuleVisitor,
) -> NestResult<()> {
    let mut ancestors = Vec::new();
    walk_inner(module, None, "", 0, platform, visitor, &mut ancestors)
}

fn walk_inner(
    module: &Module,
    parent: Option<&Module>,
    relative_path: &str,
    depth: usize,
    platform: Option<&str>,
    visitor: &mut dyn ModuleVisitor,
    ancestors: &mut Vec<PathBuf>,
) -> NestResult<()> {
    visitor.visit(&ModuleVisit {
        module,
        parent,
        relative_path,
        depth,
    })?;

    ancestors.push(module.root.clone());
    for submodule in discover_submodules(module, platform)? {
        if ancestors.contains(&submodule.root) {
            warn!(
                module = %module.root.display(),
                submodule = %submodule.root.display(),
                "submodule resolves to one of its ancestors; skipping"
            );
            continue;
        }

        let child_path = child_relative_path(relative_path, &module.root, &submodule.root);
        debug!(
            submodule = %submodule.name(),
            path = %child_path,
            "descending into submodule"
        );
        walk_inner(
            &submodule,
            Some(module),
            &child_path,
            depth + 1,
            platform,
            visitor,
            ancestors,
        )?;
    }
    ancestors.pop();

    Ok(())
}

/// Collects definitions, keeping the first occurrence of each
/// (owning module, name) pair.
#[derive(Default)]
struct DefinitionCollector {
    seen: HashSet<DefinitionKey>,
    definitions: Vec<Definition>,
}

impl ModuleVisitor for DefinitionCollector {
    fn visit(&mut self, visit: &ModuleVisit<'_>) -> NestResult<()> {
        for mut definition in load_definitions(visit.module)? {
            definition.relative_path =
                compose_relative_path(visit.relative_path, &definition.relative_path);
            definition.module_path = visit.module.root.clone();

            if self.seen.insert(definition.key()) {
                self.definitions.push(definition);
            } else {
                debug!(name = %definition.name, "skipping duplicate definition");
            }
        }
        Ok(())
    }
}

/// Every project definition in `module` and its submodules, with relative
/// paths anchored at `module`'s root.
pub fn walk_definitions(module: &Module, platform: Option<&str>) -> NestResult<Vec<Definition>> {
    let mut collector = DefinitionCollector::default();
    walk_modules(module, platform, &mut collector)?;
    Ok(collector.definitions)
}

/// Builds a parent -> submodule graph, one node per module root.
#[derive(Default)]
struct GraphBuilder {
    graph: DiGraph<String, ()>,
    nodes: HashMap<PathBuf, NodeIndex>,
}

impl GraphBuilder {
    fn node_for(&mut self, module: &Module) -> NodeIndex {
        if let Some(&index) = self.nodes.get(&module.root) {
            return index;
        }
        let index = self.graph.add_node(module.name());
        self.nodes.insert(module.root.clone(), index);
        index
    }
}

impl ModuleVisitor for GraphBuilder {
    fn visit(&mut self, visit: &ModuleVisit<'_>) -> NestResult<()> {
        let node = self.node_for(visit.module);
        if let Some(parent) = visit.parent {
            let parent_node = self.node_for(parent);
            self.graph.update_edge(parent_node, node, ());
        }
        Ok(())
    }
}

/// The module tree below `module` as a directed graph of module names.
/// Modules reached along several routes share a single node.
pub fn build_module_graph(
    module: &Module,
    platform: Option<&str>,
) -> NestResult<DiGraph<String, ()>> {
    let mut builder = GraphBuilder::default();
    walk_modules(module, platform, &mut builder)?;
    Ok(builder.graph)
}
