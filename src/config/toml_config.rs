use crate::adapters::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::adapters::workbook::SUPPORTED_EXTENSIONS;
use crate::domain::model::BundlePolicy;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{BundleError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 完整設定；所有表格都可省略，省略時使用預設值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub data: DataConfig,
    pub generator: GeneratorConfig,
    pub policy: BundlePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub path: String,
    pub sheet: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: "customerdata.xlsx".to_string(),
            sheet: "orders".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_seconds: 60,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| BundleError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BundleError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BundleError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("data.path", &self.data.path)?;
        validation::validate_file_extension("data.path", &self.data.path, SUPPORTED_EXTENSIONS)?;
        validation::validate_non_empty_string("data.sheet", &self.data.sheet)?;

        validation::validate_url("generator.endpoint", &self.generator.endpoint)?;
        validation::validate_non_empty_string("generator.model", &self.generator.model)?;
        validation::validate_range("generator.timeout_seconds", self.generator.timeout_seconds, 1, 600)?;

        let policy = &self.policy;
        validation::validate_range("policy.max_discount", policy.max_discount, 0.0, 1.0)?;
        validation::validate_range("policy.price_window", policy.price_window, 0.0, f64::MAX)?;
        validation::validate_range("policy.max_bundles", policy.max_bundles, 1, 20)?;
        validation::validate_range("policy.min_bundles", policy.min_bundles, 1, policy.max_bundles)?;
        validation::validate_range(
            "policy.min_bundle_total",
            policy.min_bundle_total,
            0.0,
            policy.max_bundle_total,
        )?;
        validation::validate_range(
            "policy.min_prompt_discount",
            policy.min_prompt_discount,
            0,
            policy.max_prompt_discount,
        )?;
        validation::validate_range("policy.max_prompt_discount", policy.max_prompt_discount, 0, 100)?;

        Ok(())
    }

    /// 讀取 API key 前先檢查佔位符是否已被替換
    pub fn resolved_api_key(&self) -> Option<&str> {
        self.generator
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty() && !key.starts_with("${"))
    }
}

impl ConfigProvider for TomlConfig {
    fn data_path(&self) -> &str {
        &self.data.path
    }

    fn sheet_name(&self) -> &str {
        &self.data.sheet
    }

    fn api_endpoint(&self) -> &str {
        &self.generator.endpoint
    }

    fn model(&self) -> &str {
        &self.generator.model
    }

    fn api_key(&self) -> Option<&str> {
        self.resolved_api_key()
    }

    fn timeout_seconds(&self) -> u64 {
        self.generator.timeout_seconds
    }

    fn policy(&self) -> &BundlePolicy {
        &self.policy
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
