//! Platform names: host detection and normalisation against a module.

use std::env;

use crate::module::Module;

/// Well-known platform identifiers, used when a module does not restrict
/// its platforms.
pub const DEFAULT_PLATFORMS: &[&str] = &[
    "Android",
    "iOS",
    "tvOS",
    "Linux",
    "MacOS",
    "Ouya",
    "PCL",
    "PSMobile",
    "Windows",
    "Windows8",
    "WindowsGL",
    "WindowsPhone",
    "WindowsPhone81",
    "WindowsUAP",
    "Web",
];

/// Operating system the tool is running on, as far as default platform
/// selection is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
}

impl HostOs {
    /// Detect the current host
    pub fn current() -> Self {
        Self::from_os(env::consts::OS)
    }

    /// Map an `std::env::consts::OS` value to a host. Unknown Unix-likes are
    /// treated as Linux.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "macos" | "ios" => Self::MacOs,
            _ => Self::Linux,
        }
    }

    /// Comma-separated platforms generated on this host when the module
    /// descriptor does not say otherwise.
    pub fn default_platforms(&self) -> &'static str {
        match self {
            Self::Windows => {
                "Android,iOS,Linux,MacOS,Ouya,PCL,Windows8,WindowsGL,WindowsPhone,WindowsPhone81,WindowsUAP"
            }
            Self::MacOs => "Android,iOS,tvOS,MacOS,Ouya,PCL",
            Self::Linux => "Android,Linux,Ouya,PCL",
        }
    }
}

/// Split a comma-separated platform list, trimming entries and dropping
/// empty ones.
pub fn split_platform_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve a user-supplied platform name against `module`.
///
/// Matching is case-insensitive and yields the canonical spelling. When the
/// module declares `supportedPlatforms`, an unlisted platform yields `None`;
/// otherwise unmatched input is passed through unchanged.
pub fn normalize_platform(module: &Module, requested: &str) -> Option<String> {
    let (candidates, restricted) = match module.supported_platforms() {
        Some(platforms) => (platforms, true),
        None => (
            DEFAULT_PLATFORMS.iter().map(|p| p.to_string()).collect(),
            false,
        ),
    };

    if let Some(canonical) = candidates
        .into_iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(requested))
    {
        return Some(canonical);
    }

    if restricted {
        None
    } else {
        Some(requested.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::module::ModuleDescriptor;
    use std::path::PathBuf;

    fn module_with(supported: Option<&str>) -> Module {
        Module::from_descriptor(
            ModuleDescriptor {
                supported_platforms: supported.map(str::to_string),
                ..Default::default()
            },
            PathBuf::from("/modules/test"),
        )
    }

    #[test]
    fn test_host_detection() {
        let host = HostOs::current();
        assert!(!host.default_platforms().is_empty());
    }

    #[test]
    fn test_host_mapping() {
        assert_eq!(HostOs::from_os("windows"), HostOs::Windows);
        assert_eq!(HostOs::from_os("macos"), HostOs::MacOs);
        assert_eq!(HostOs::from_os("linux"), HostOs::Linux);
        assert_eq!(HostOs::from_os("freebsd"), HostOs::Linux);
    }

    #[test]
    fn test_open_mode_returns_canonical_casing() {
        let module = module_with(None);
        assert_eq!(
            normalize_platform(&module, "windowsphone81").as_deref(),
            Some("WindowsPhone81")
        );
        assert_eq!(normalize_platform(&module, "IOS").as_deref(), Some("iOS"));
    }

    #[test]
    fn test_open_mode_echoes_unknown_platform() {
        let module = module_with(None);
        assert_eq!(normalize_platform(&module, "Switch").as_deref(), Some("Switch"));
    }

    #[test]
    fn test_restricted_mode_rejects_unlisted_platform() {
        let module = module_with(Some("Windows, Linux"));
        assert_eq!(normalize_platform(&module, "linux").as_deref(), Some("Linux"));
        assert_eq!(normalize_platform(&module, "MacOS"), None);
    }

    #[test]
    fn test_normalisation_is_idempotent() {
        for module in [module_with(None), module_with(Some("Windows,Linux,Web"))] {
            for requested in ["windows", "LINUX", "web"] {
                let once = normalize_platform(&module, requested).unwrap();
                assert_eq!(normalize_platform(&module, &once), Some(once.clone()));
            }
        }
    }

    #[test]
    fn test_split_platform_list() {
        assert_eq!(split_platform_list(" Windows,,Linux , "), vec!["Windows", "Linux"]);
    }
}
