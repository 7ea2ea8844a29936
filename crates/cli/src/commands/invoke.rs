use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use nest_core::delegate::join_arguments;
use nest_core::submodules::resolve_redirect;
use nest_core::Module;
use nest_protocol::Feature;
use tracing::warn;

use crate::Session;

/// Load the submodule at `dir` (relative to the session's module root),
/// following a redirect marker if there is one.
fn load_submodule(session: &Session, dir: &Path) -> Result<Module> {
    let dir = resolve_redirect(&session.module.root.join(dir))?;
    Module::load(&Module::descriptor_path(&dir))
        .with_context(|| format!("Failed to load submodule at {}", dir.display()))
}

pub fn execute(session: &Session, submodule: &Path, args: &[String]) -> Result<i32> {
    let module = load_submodule(session, submodule)?;
    let output = session
        .delegate
        .invoke(&module, &join_arguments(args), false)
        .with_context(|| format!("Failed to invoke the tool in '{}'", module.name()))?;

    if !output.success() {
        eprintln!(
            "{} {}",
            "✗".red().bold(),
            format!("'{}' exited with code {}", module.name(), output.exit_code).red()
        );
    }
    Ok(output.exit_code)
}

/// Older or newer copies may advertise identifiers this build does not
/// know; those are still looked up, just not recognised.
fn known_feature(feature: &str) -> Option<Feature> {
    match feature.parse::<Feature>() {
        Ok(known) => Some(known),
        Err(unknown) => {
            warn!("{}, asking the submodule anyway", unknown);
            None
        }
    }
}

pub fn has_feature(session: &Session, submodule: &Path, feature: &str) -> Result<i32> {
    let feature = known_feature(feature).map_or(feature, |known| known.as_str());
    let module = load_submodule(session, submodule)?;
    let supported = session
        .delegate
        .has_feature(&module, feature)
        .with_context(|| format!("Failed to query features of '{}'", module.name()))?;

    if supported {
        println!(
            "{} {}",
            "✓".green().bold(),
            format!("'{}' supports {}", module.name(), feature).green()
        );
        Ok(0)
    } else {
        println!(
            "{} {}",
            "✗".red().bold(),
            format!("'{}' does not support {}", module.name(), feature).red()
        );
        Ok(1)
    }
}
