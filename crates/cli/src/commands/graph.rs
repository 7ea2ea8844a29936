use anyhow::{Context, Result};
use colored::*;
use nest_core::walk::build_module_graph;

use crate::Session;

pub fn execute(session: &Session) -> Result<()> {
    println!("{}", "Module Graph:".bold().underline());

    let graph = build_module_graph(&session.module, session.platform.as_deref())
        .context("Failed to walk the module tree")?;

    for (node_index, node_weight) in graph.node_indices().zip(graph.node_weights()) {
        println!("{}", node_weight.blue().bold());

        let submodules: Vec<String> = graph
            .neighbors(node_index)
            .filter_map(|neighbor| graph.node_weight(neighbor).cloned())
            .collect();

        if submodules.is_empty() {
            println!("  {}", "no submodules".dimmed());
        } else {
            println!("  {} {}", "submodules:".dimmed(), submodules.join(", "));
        }
        println!();
    }

    Ok(())
}
