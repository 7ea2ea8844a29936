use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::NestResult;

/// Contents of `Build/Module.yml`.
///
/// The module's root directory is deliberately absent: it is derived from
/// where the file lives every time the descriptor is loaded.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_action: Option<String>,
    /// Comma-separated platforms generated by default on Windows hosts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_windows_platforms: Option<String>,
    /// Comma-separated platforms generated by default on macOS hosts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_mac_os_platforms: Option<String>,
    /// Comma-separated platforms generated by default on Linux hosts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_linux_platforms: Option<String>,
    /// Comma-separated list restricting which platforms this module accepts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_platforms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_synchronisation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auxiliary_assemblies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_startup_project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<PackageRef>>,
}

/// A package the module pulls in. Resolution happens elsewhere; this core
/// only carries the entry through load and save.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PackageRef {
    pub uri: String,
    pub folder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<String>>,
}

pub fn parse_module_descriptor(yaml_str: &str) -> NestResult<ModuleDescriptor> {
    let descriptor: ModuleDescriptor = serde_yaml::from_str(yaml_str)?;
    Ok(descriptor)
}

pub fn render_module_descriptor(descriptor: &ModuleDescriptor) -> NestResult<String> {
    Ok(serde_yaml::to_string(descriptor)?)
}

/// JSON Schema of the descriptor, for editor tooling.
pub fn descriptor_schema() -> NestResult<String> {
    let schema = schemars::schema_for!(ModuleDescriptor);
    Ok(serde_json::to_string_pretty(&schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_keys() {
        let descriptor = parse_module_descriptor(
            r#"
name: Engine
defaultAction: resync
supportedPlatforms: Windows,Linux
disableSynchronisation: true
auxiliaryAssemblies:
  - Engine.Build.dll
packages:
  - uri: https://example.com/lib.git
    folder: Lib
    gitRef: master
"#,
        )
        .unwrap();

        assert_eq!(descriptor.name.as_deref(), Some("Engine"));
        assert_eq!(descriptor.default_action.as_deref(), Some("resync"));
        assert_eq!(descriptor.supported_platforms.as_deref(), Some("Windows,Linux"));
        assert_eq!(descriptor.disable_synchronisation, Some(true));
        let packages = descriptor.packages.unwrap();
        assert_eq!(packages[0].folder, "Lib");
        assert_eq!(packages[0].git_ref.as_deref(), Some("master"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(parse_module_descriptor("name: A\nbogus: 1\n").is_err());
    }

    #[test]
    fn omits_absent_fields_when_rendering() {
        let descriptor = ModuleDescriptor {
            name: Some("Tools".to_string()),
            ..Default::default()
        };
        let yaml = render_module_descriptor(&descriptor).unwrap();
        assert_eq!(yaml.trim(), "name: Tools");
    }

    #[test]
    fn schema_mentions_fields() {
        let schema = descriptor_schema().unwrap();
        assert!(schema.contains("supportedPlatforms"));
        assert!(schema.contains("PackageRef"));
    }
}
