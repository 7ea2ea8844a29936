//! Nest Core Library
//!
//! This is the core library for the nest build tool. It resolves the module
//! tree of a multi-module project and delegates work to the tool copies that
//! submodules carry.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`module`] - Module descriptors: load, save, and locating the enclosing module
//! - [`platform`] - Host detection and platform name normalisation
//! - [`definitions`] - Project definitions under `Build/Projects`
//! - [`submodules`] - Submodule discovery, redirects and platform overrides
//! - [`walk`] - Recursive module walks, definition aggregation, module graph
//! - [`delegate`] - In-process and subprocess invocation of submodule tool copies
//! - [`configs`] - On-disk formats for descriptors and definitions
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nest_core::module::locate_module;
//! use nest_core::walk::walk_definitions;
//! use std::path::Path;
//!
//! # fn example() -> nest_core::types::NestResult<()> {
//! let module = locate_module(Path::new("."))?;
//! for definition in walk_definitions(&module, Some("Linux"))? {
//!     println!("{} -> {}", definition.name, definition.relative_path);
//! }
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod definitions;
pub mod delegate;
pub mod module;
pub mod platform;
pub mod submodules;
pub mod types;
pub mod walk;

// Re-export the main types for easier usage
pub use definitions::Definition;
pub use delegate::{DelegateConfig, DelegateOutput, ProcessDelegate};
pub use module::Module;
pub use types::{NestError, NestResult};
