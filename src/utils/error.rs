use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Failed to load dataset: {message}")]
    DataLoadError { message: String },

    #[error("No products matched '{query}'")]
    NoMatchesError { query: String },

    #[error("Generation service error: {message}")]
    GenerationError { message: String },

    #[error("Could not parse bundle proposals: {message}")]
    ParseError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Network,
    Generation,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BundleError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BundleError::ConfigError { .. }
            | BundleError::InvalidConfigValueError { .. }
            | BundleError::MissingConfigError { .. } => ErrorCategory::Configuration,
            BundleError::CsvError(_)
            | BundleError::WorkbookError(_)
            | BundleError::IoError(_)
            | BundleError::DataLoadError { .. } => ErrorCategory::Data,
            BundleError::ApiError(_) => ErrorCategory::Network,
            BundleError::SerializationError(_)
            | BundleError::GenerationError { .. }
            | BundleError::ParseError { .. } => ErrorCategory::Generation,
            BundleError::NoMatchesError { .. } => ErrorCategory::Query,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 查無結果只是警告
            BundleError::NoMatchesError { .. } => ErrorSeverity::Low,
            BundleError::ApiError(_)
            | BundleError::GenerationError { .. }
            | BundleError::ParseError { .. }
            | BundleError::SerializationError(_) => ErrorSeverity::Medium,
            BundleError::CsvError(_)
            | BundleError::WorkbookError(_)
            | BundleError::DataLoadError { .. } => ErrorSeverity::High,
            BundleError::IoError(_)
            | BundleError::ConfigError { .. }
            | BundleError::InvalidConfigValueError { .. }
            | BundleError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 是否可以在同一個互動階段中繼續下一個查詢
    pub fn is_recoverable(&self) -> bool {
        self.severity() <= ErrorSeverity::Medium
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BundleError::ApiError(_) => {
                "Could not reach the bundle generation service.".to_string()
            }
            BundleError::CsvError(_) | BundleError::WorkbookError(_) => {
                "The order history file could not be read.".to_string()
            }
            BundleError::DataLoadError { message } => {
                format!("No data available: {}", message)
            }
            BundleError::NoMatchesError { query } => {
                format!("No related products found for '{}'.", query)
            }
            BundleError::GenerationError { message } => {
                format!("The generation service failed: {}", message)
            }
            BundleError::ParseError { .. } | BundleError::SerializationError(_) => {
                "The generation service returned an unreadable answer.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command line flags and the TOML configuration file"
            }
            ErrorCategory::Data => {
                "Make sure the workbook exists, the sheet name is correct and the header row has the expected columns"
            }
            ErrorCategory::Network => "Check the network connection and the API key, then retry",
            ErrorCategory::Generation => "Retry the request; model answers vary between calls",
            ErrorCategory::Query => "Try a shorter or different search term",
        }
    }
}

pub type Result<T> = std::result::Result<T, BundleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matches_is_low_severity() {
        let err = BundleError::NoMatchesError {
            query: "lamp".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.category(), ErrorCategory::Query);
        assert!(err.is_recoverable());
        assert!(err.user_friendly_message().contains("lamp"));
    }

    #[test]
    fn test_generation_errors_are_recoverable() {
        let err = BundleError::ParseError {
            message: "no array".to_string(),
        };
        assert!(err.is_recoverable());

        let err = BundleError::DataLoadError {
            message: "missing sheet".to_string(),
        };
        assert!(!err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
