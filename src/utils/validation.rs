use crate::utils::error::{Result, TokenizerError};
use url::Url;

/// 配置檢查
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_redis_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => {
            match url.scheme() {
                "redis" | "rediss" => {}
                scheme => {
                    return Err(invalid(
                        field_name,
                        url_str,
                        &format!("Unsupported URL scheme: {}", scheme),
                    ))
                }
            }

            if url.host_str().map_or(true, str::is_empty) {
                return Err(invalid(field_name, url_str, "URL has no host"));
            }

            Ok(())
        }
        Err(e) => Err(invalid(
            field_name,
            url_str,
            &format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            &value.to_string(),
            &format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_list<T>(field_name: &str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Err(invalid(field_name, "[]", "List must contain at least one entry"));
    }
    Ok(())
}

fn invalid(field_name: &str, value: &str, reason: &str) -> TokenizerError {
    TokenizerError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
