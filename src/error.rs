use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid chart dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("render backend failure: {0}")]
    Backend(String),
}

impl ChartError {
    pub(crate) fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
