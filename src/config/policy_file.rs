use crate::core::validator::ValidationPolicy;
use crate::utils::error::{Result, TokenizerError};
use crate::utils::validation::{validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// 驗證規則的 TOML 檔案，例如：
///
/// ```toml
/// [validation]
/// allowed_cvvs = [123, 4532]
/// allowed_email_domains = ["gmail.com", "${CORPORATE_DOMAIN}"]
/// max_years_ahead = 5
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyFile {
    #[serde(default)]
    pub validation: PolicySection,
}

/// 未填的欄位沿用預設值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicySection {
    pub allowed_cvvs: Option<BTreeSet<u32>>,
    pub allowed_email_domains: Option<BTreeSet<String>>,
    pub max_years_ahead: Option<i32>,
}

impl PolicyFile {
    /// 從 TOML 檔案載入
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        validate_path("validation_policy_file", &path.to_string_lossy())?;
        let content = std::fs::read_to_string(path).map_err(TokenizerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let file: Self = toml::from_str(&processed_content).map_err(|e| {
            TokenizerError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            }
        })?;
        file.validate()?;
        Ok(file)
    }

    /// 替換環境變數 (例如 ${CORPORATE_DOMAIN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TokenizerError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn into_policy(self) -> ValidationPolicy {
        let defaults = ValidationPolicy::default();
        let section = self.validation;

        ValidationPolicy {
            allowed_cvvs: section.allowed_cvvs.unwrap_or(defaults.allowed_cvvs),
            allowed_email_domains: section
                .allowed_email_domains
                .unwrap_or(defaults.allowed_email_domains),
            max_years_ahead: section.max_years_ahead.unwrap_or(defaults.max_years_ahead),
        }
    }
}

impl Validate for PolicyFile {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::{validate_non_empty_list, validate_range};

        if let Some(cvvs) = &self.validation.allowed_cvvs {
            validate_non_empty_list("validation.allowed_cvvs", &cvvs.iter().collect::<Vec<_>>())?;
        }
        if let Some(domains) = &self.validation.allowed_email_domains {
            validate_non_empty_list(
                "validation.allowed_email_domains",
                &domains.iter().collect::<Vec<_>>(),
            )?;
            if let Some(bad) = domains.iter().find(|d| d.is_empty() || d.contains('@')) {
                return Err(TokenizerError::InvalidConfigValueError {
                    field: "validation.allowed_email_domains".to_string(),
                    value: bad.clone(),
                    reason: "Domain must be non-empty and must not contain '@'".to_string(),
                });
            }
        }
        if let Some(years) = self.validation.max_years_ahead {
            validate_range("validation.max_years_ahead", years, 0, 50)?;
        }
        Ok(())
    }
}
