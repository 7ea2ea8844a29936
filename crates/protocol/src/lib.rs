//! Contract between `nest` and the copies of itself that submodules install.
//!
//! A module can ask the tool copy living in one of its submodules what it
//! supports before delegating work to it. The exchange is deliberately tiny:
//!
//! - the caller runs `<submodule>/nest --query-features`
//! - a capable copy prints one [`Feature`] identifier per line and exits 0
//! - anything else (non-zero exit, a usage banner) means "no features"
//!
//! [`parse_feature_list`] and [`looks_like_usage_banner`] implement the
//! caller's side of that contract; [`Feature::ALL`] is what this build
//! advertises on the answering side.

pub mod message;
pub mod types;

pub use message::{looks_like_usage_banner, parse_feature_list, QUERY_FEATURES_FLAG};
pub use types::{Feature, UnknownFeature};
