use anyhow::{bail, Result};
use colored::*;
use nest_core::platform::{normalize_platform, HostOs};

use crate::Session;

pub fn execute(session: &Session, name: &str) -> Result<()> {
    let Some(platform) = normalize_platform(&session.module, name) else {
        let supported = session.module.supported_platforms().unwrap_or_default();
        bail!(
            "Platform '{}' is not supported by module '{}' (supported: {})",
            name,
            session.module.name(),
            supported.join(", ")
        );
    };

    println!("{}", platform.green().bold());

    let defaults = session.module.default_platforms(HostOs::current());
    println!("  {} {}", "host defaults:".dimmed(), defaults.join(", "));

    Ok(())
}
