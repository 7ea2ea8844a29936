//! Feature identifiers exchanged over the `--query-features` contract.

use std::str::FromStr;

/// A capability advertised by a copy of the tool.
///
/// ## Overview
///
/// Features are reported as kebab-case identifiers, one per line. Older
/// copies may report identifiers this build does not know about; those are
/// kept as plain strings by callers and only parsed into [`Feature`] when a
/// typed check is wanted.
///
/// ## Features
///
/// ### QueryFeatures
/// The copy answers `--query-features` at all. Every copy that reports any
/// feature reports this one.
///
/// ### PlatformNormalization
/// Platform names passed to the copy are matched case-insensitively against
/// its module's supported platforms.
///
/// ### Redirects
/// Submodule directories holding a `.redirect` marker are followed.
///
/// ### PlatformSubmodules
/// `<child>/<Platform>/Build/Module.yml` directories are discovered as
/// additional, platform-conditional submodules.
///
/// ### InProcessDelegation
/// The copy can re-enter itself in-process instead of spawning a child
/// process when it delegates further down the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    QueryFeatures,
    PlatformNormalization,
    Redirects,
    PlatformSubmodules,
    InProcessDelegation,
}

impl Feature {
    /// Every feature this build advertises, in reporting order.
    pub const ALL: &'static [Feature] = &[
        Feature::QueryFeatures,
        Feature::PlatformNormalization,
        Feature::Redirects,
        Feature::PlatformSubmodules,
        Feature::InProcessDelegation,
    ];

    /// The identifier written on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::QueryFeatures => "query-features",
            Self::PlatformNormalization => "platform-normalization",
            Self::Redirects => "redirects",
            Self::PlatformSubmodules => "platform-submodules",
            Self::InProcessDelegation => "in-process-delegation",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an identifier is not a feature this build knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFeature(pub String);

impl std::fmt::Display for UnknownFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown feature '{}'", self.0)
    }
}

impl std::error::Error for UnknownFeature {}

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Feature::ALL
            .iter()
            .copied()
            .find(|feature| feature.as_str() == trimmed)
            .ok_or_else(|| UnknownFeature(trimmed.to_string()))
    }
}
