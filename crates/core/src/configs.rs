//! On-disk formats: the module descriptor and project definition files.

pub mod definition;
pub mod module;
