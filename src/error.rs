use crate::models::Side;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecoError {
    /// 缺少必需列，整个对账中止
    #[error("{table}: missing required column '{column}'")]
    Schema { table: Side, column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
