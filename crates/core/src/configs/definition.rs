use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::NestResult;

/// Contents of a `Build/Projects/*.definition` file.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DefinitionConfig {
    /// Project name. Falls back to the file stem.
    pub name: Option<String>,
    /// Project directory relative to the module root. Falls back to the name.
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<String>,
}

pub fn parse_definition_config(yaml_str: &str) -> NestResult<DefinitionConfig> {
    // A definition file may legitimately be empty; everything is inferred then.
    if yaml_str.trim().is_empty() {
        return Ok(DefinitionConfig::default());
    }
    let config: DefinitionConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_type_key() {
        let config = parse_definition_config("name: Game\npath: Game/Src\ntype: App\n").unwrap();
        assert_eq!(config.name.as_deref(), Some("Game"));
        assert_eq!(config.path.as_deref(), Some("Game/Src"));
        assert_eq!(config.project_type.as_deref(), Some("App"));
    }

    #[test]
    fn empty_file_means_everything_inferred() {
        assert_eq!(parse_definition_config("\n").unwrap(), DefinitionConfig::default());
    }
}
