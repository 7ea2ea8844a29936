use anyhow::{Context, Result};
use colored::*;
use nest_core::walk::walk_definitions;
use nest_core::Definition;
use std::path::Path;

use crate::Session;

pub fn execute(session: &Session) -> Result<()> {
    let definitions = walk_definitions(&session.module, session.platform.as_deref())
        .context("Failed to collect project definitions")?;

    let heading = match &session.platform {
        Some(platform) => format!("Projects ({})", platform),
        None => "Projects".to_string(),
    };
    println!("{}", heading.bold().underline());

    if definitions.is_empty() {
        println!("  {}", "No projects found".dimmed());
        return Ok(());
    }

    for definition in &definitions {
        let kind = definition
            .project_type
            .as_deref()
            .map(|t| format!(" [{}]", t))
            .unwrap_or_default();
        println!(
            "{}{} {} {}",
            definition.name.blue().bold(),
            kind.green(),
            definition.relative_path.dimmed(),
            format!("({})", source_label(definition, &session.module.root)).dimmed()
        );
    }

    Ok(())
}

/// The `.definition` file a project came from, relative to the listed
/// module where possible.
fn source_label(definition: &Definition, root: &Path) -> String {
    let path = &definition.definition_path;
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
