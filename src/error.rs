use crate::types::TradeError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Invalid trade: {0}")]
    InvalidTrade(#[from] TradeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AppError::Persistence("trade_log.json".into()).to_string(),
            "Persistence error: trade_log.json"
        );
        assert_eq!(
            AppError::from(TradeError::MissingPnl).to_string(),
            "Invalid trade: trade is missing its pnl"
        );
    }

    #[test]
    fn test_serde_error_converts() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(AppError::from(err), AppError::SerdeJson(_)));
    }
}
