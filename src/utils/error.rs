use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 卡片欄位驗證失敗，每條規則一個變體
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid card number")]
    CardNumber,

    #[error("Invalid CVV")]
    Cvv,

    #[error("Invalid expiration month")]
    ExpirationMonth,

    #[error("Invalid expiration year")]
    ExpirationYear,

    #[error("Invalid email address")]
    Email,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Error storing card token")]
    Write {
        #[source]
        source: BoxError,
    },

    #[error("Error retrieving card data by token")]
    Read {
        #[source]
        source: BoxError,
    },

    #[error("Error connecting to card store: {message}")]
    Connection { message: String },

    #[error("Error retrieving card data by token")]
    Corrupt { key: String, reason: String },
}

impl StoreError {
    pub fn write(source: impl Into<BoxError>) -> Self {
        Self::Write {
            source: source.into(),
        }
    }

    pub fn read(source: impl Into<BoxError>) -> Self {
        Self::Read {
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Validation,
    Auth,
    Storage,
    Config,
}

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl TokenizerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::Parse,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthorized => ErrorKind::Auth,
            Self::Storage(_) => ErrorKind::Storage,
            Self::IoError(_) | Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorKind::Config
            }
        }
    }

    /// 回應狀態碼：只有授權失敗是 401，其餘一律 500
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Auth => 401,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, TokenizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_collapses_to_500() {
        assert_eq!(TokenizerError::Unauthorized.status_code(), 401);
        assert_eq!(
            TokenizerError::from(ValidationError::Cvv).status_code(),
            500
        );
        let store = StoreError::write(std::io::Error::other("connection reset"));
        assert_eq!(TokenizerError::from(store).status_code(), 500);
    }

    #[test]
    fn test_messages_hide_backend_detail() {
        let err = TokenizerError::from(StoreError::read(std::io::Error::other("ECONNREFUSED")));
        assert_eq!(err.to_string(), "Error retrieving card data by token");
        assert_eq!(err.kind(), ErrorKind::Storage);

        let err = TokenizerError::from(ValidationError::ExpirationYear);
        assert_eq!(err.to_string(), "Invalid expiration year");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
