use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use colored::*;
use nest_core::delegate::EntryPoint;
use nest_core::module::locate_module;
use nest_core::platform::normalize_platform;
use nest_core::{DelegateConfig, Module, ProcessDelegate};
use nest_protocol::Feature;

mod commands;
mod logging;

const BIN_NAME: &str = "nest";

/// nest - A multi-module build tool
#[derive(Parser)]
#[command(name = "nest")]
#[command(about = "Resolve and drive multi-module build trees")]
#[command(version)]
struct Cli {
    /// Directory inside the module to operate on (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    module: PathBuf,

    /// Platform to resolve platform-specific submodules for
    #[arg(short, long, global = true)]
    platform: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Always spawn submodule tool copies instead of re-entering this process
    #[arg(long, global = true)]
    no_in_process: bool,

    /// Print the features this build supports, one per line, and exit
    #[arg(long)]
    query_features: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List project definitions across the module tree
    List,
    /// Show the module tree
    Graph,
    /// Normalise a platform name against the module
    Platform {
        /// Platform name, in any casing
        name: String,
    },
    /// Run the tool copy installed in a submodule
    Invoke {
        /// Submodule directory, relative to the module root
        submodule: PathBuf,
        /// Arguments passed through to the submodule's tool
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Check whether a submodule's tool copy reports a feature
    HasFeature {
        /// Submodule directory, relative to the module root
        submodule: PathBuf,
        /// Feature identifier, e.g. "platform-submodules"
        feature: String,
    },
    /// Print the JSON schema of Build/Module.yml
    Schema,
}

/// State shared by commands that operate on a loaded module
pub struct Session {
    pub module: Module,
    pub platform: Option<String>,
    pub delegate: ProcessDelegate,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let module = locate_module(&cli.module)
            .with_context(|| format!("Failed to load module from {}", cli.module.display()))?;

        let platform = match &cli.platform {
            Some(requested) => Some(normalize_platform(&module, requested).with_context(|| {
                format!(
                    "Platform '{}' is not supported by module '{}'",
                    requested,
                    module.name()
                )
            })?),
            None => None,
        };

        let delegate = ProcessDelegate::new(DelegateConfig {
            in_process: (!cli.no_in_process).then(entry_point),
            ..Default::default()
        });

        Ok(Self {
            module,
            platform,
            delegate,
        })
    }
}

/// This binary's own entry point, re-entered for in-process delegation.
fn entry_point() -> EntryPoint {
    Arc::new(|args: &[String]| {
        let mut argv = vec![BIN_NAME.to_string()];
        argv.extend_from_slice(args);
        run(&argv)
    })
}

fn run(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return e.exit_code();
        }
    };

    logging::init(cli.verbose);

    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            1
        }
    }
}

fn execute(cli: Cli) -> Result<i32> {
    if cli.query_features {
        for feature in Feature::ALL {
            println!("{}", feature);
        }
        return Ok(0);
    }

    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(1);
    };

    if let Commands::Schema = command {
        commands::schema::execute()?;
        return Ok(0);
    }

    let session = Session::open(&cli)?;
    match command {
        Commands::List => commands::list::execute(&session).map(|_| 0),
        Commands::Graph => commands::graph::execute(&session).map(|_| 0),
        Commands::Platform { name } => commands::platform::execute(&session, name).map(|_| 0),
        Commands::Invoke { submodule, args } => {
            commands::invoke::execute(&session, submodule, args)
        }
        Commands::HasFeature { submodule, feature } => {
            commands::invoke::has_feature(&session, submodule, feature)
        }
        Commands::Schema => Ok(0),
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    std::process::exit(run(&args));
}
