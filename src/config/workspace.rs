use crate::config::WorkspaceArgs;
use crate::utils::error::{QuantumError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_required_field, validate_url,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 以 `qjob workspace set` 儲存的預設工作區
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl WorkspaceConfig {
    /// 檔案不存在時回傳空設定
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No workspace config at {}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 不替換 `${VAR}`，供需要寫回檔案的 `workspace set` 使用
    pub fn load_raw(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse(&Self::substitute_env_vars(content))
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| QuantumError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${AZURE_SUBSCRIPTION_ID})
    fn substitute_env_vars(content: &str) -> String {
        use regex::{Captures, Regex};
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
        });

        re.replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| QuantumError::config(format!("TOML serialization error: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved workspace config to {}", path.display());
        Ok(())
    }

    pub fn clear(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Flags given on the command line win over the saved values.
    pub fn merged_with(&self, args: &WorkspaceArgs) -> Self {
        Self {
            subscription: args.subscription.clone().or_else(|| self.subscription.clone()),
            resource_group: args.resource_group.clone().or_else(|| self.resource_group.clone()),
            workspace_name: args.workspace_name.clone().or_else(|| self.workspace_name.clone()),
            location: args.location.clone().or_else(|| self.location.clone()),
            endpoint: args.endpoint.clone().or_else(|| self.endpoint.clone()),
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    dirs::config_dir()
        .map(|dir| dir.join("qjob").join("config.toml"))
        .ok_or_else(|| {
            QuantumError::config("Could not determine the user config directory; pass --config")
        })
}

/// Fully resolved connection settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceSettings {
    pub subscription: String,
    pub resource_group: String,
    pub workspace_name: String,
    pub location: String,
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl WorkspaceSettings {
    pub fn resolve(saved: &WorkspaceConfig, args: &WorkspaceArgs) -> Result<Self> {
        let merged = saved.merged_with(args);

        let settings = Self {
            subscription: validate_required_field("--subscription", &merged.subscription)?.clone(),
            resource_group: validate_required_field("--resource-group", &merged.resource_group)?
                .clone(),
            workspace_name: validate_required_field("--workspace-name", &merged.workspace_name)?
                .clone(),
            location: validate_required_field("--location", &merged.location)?.clone(),
            endpoint: merged.endpoint,
            access_token: args.access_token.clone().filter(|t| !t.trim().is_empty()),
            request_timeout_secs: merged
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}.quantum.azure.com",
                self.location.to_lowercase().replace(' ', "")
            ),
        }
    }

    pub fn workspace_url(&self) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Quantum/workspaces/{}",
            self.base_url(),
            self.subscription,
            self.resource_group,
            self.workspace_name
        )
    }
}

impl Validate for WorkspaceSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("--subscription", &self.subscription)?;
        validate_non_empty_string("--resource-group", &self.resource_group)?;
        validate_non_empty_string("--workspace-name", &self.workspace_name)?;
        validate_non_empty_string("--location", &self.location)?;
        if let Some(endpoint) = &self.endpoint {
            validate_url("--endpoint", endpoint)?;
        }
        validate_positive_number("request_timeout_secs", self.request_timeout_secs, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args() -> WorkspaceArgs {
        WorkspaceArgs::default()
    }

    fn saved() -> WorkspaceConfig {
        WorkspaceConfig {
            subscription: Some("00000000-0000-0000-0000-000000000000".to_string()),
            resource_group: Some("quantum-rg".to_string()),
            workspace_name: Some("lab".to_string()),
            location: Some("West US".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_save_load_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        assert_eq!(WorkspaceConfig::load(&path).unwrap(), WorkspaceConfig::default());

        saved().save(&path).unwrap();
        assert_eq!(WorkspaceConfig::load(&path).unwrap(), saved());

        WorkspaceConfig::clear(&path).unwrap();
        assert!(!path.exists());
        WorkspaceConfig::clear(&path).unwrap();
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("QJOB_TEST_WORKSPACE_RG", "rg-from-env");
        let config = WorkspaceConfig::from_toml_str(
            "resource_group = \"${QJOB_TEST_WORKSPACE_RG}\"\nworkspace_name = \"${QJOB_TEST_UNSET_VAR}\"\n",
        )
        .unwrap();

        assert_eq!(config.resource_group.as_deref(), Some("rg-from-env"));
        assert_eq!(config.workspace_name.as_deref(), Some("${QJOB_TEST_UNSET_VAR}"));
    }

    #[test]
    fn test_load_raw_keeps_placeholders() {
        std::env::set_var("QJOB_TEST_RAW_SUBSCRIPTION", "sub-secret");
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "subscription = \"${QJOB_TEST_RAW_SUBSCRIPTION}\"\n").unwrap();

        let raw = WorkspaceConfig::load_raw(&path).unwrap();
        assert_eq!(raw.subscription.as_deref(), Some("${QJOB_TEST_RAW_SUBSCRIPTION}"));

        let loaded = WorkspaceConfig::load(&path).unwrap();
        assert_eq!(loaded.subscription.as_deref(), Some("sub-secret"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = WorkspaceConfig::from_toml_str("resource_group = [").unwrap_err();
        assert!(matches!(err, QuantumError::ConfigError { .. }));
    }

    #[test]
    fn test_resolve_flags_override_saved() {
        let mut overrides = args();
        overrides.workspace_name = Some("other".to_string());
        overrides.access_token = Some("token".to_string());

        let settings = WorkspaceSettings::resolve(&saved(), &overrides).unwrap();

        assert_eq!(settings.workspace_name, "other");
        assert_eq!(settings.resource_group, "quantum-rg");
        assert_eq!(settings.access_token.as_deref(), Some("token"));
        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(
            settings.workspace_url(),
            "https://westus.quantum.azure.com/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/quantum-rg/providers/Microsoft.Quantum/workspaces/other"
        );
    }

    #[test]
    fn test_resolve_requires_workspace() {
        let err = WorkspaceSettings::resolve(&WorkspaceConfig::default(), &args()).unwrap_err();
        assert!(matches!(err, QuantumError::RequiredArgumentMissing { .. }));
    }

    #[test]
    fn test_resolve_endpoint_override() {
        let mut overrides = args();
        overrides.endpoint = Some("http://127.0.0.1:9000/".to_string());
        let settings = WorkspaceSettings::resolve(&saved(), &overrides).unwrap();
        assert_eq!(settings.base_url(), "http://127.0.0.1:9000");

        overrides.endpoint = Some("not-a-url".to_string());
        assert!(WorkspaceSettings::resolve(&saved(), &overrides).is_err());
    }
}
