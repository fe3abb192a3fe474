use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("unknown range key: {0}")]
    UnknownRange(String),

    #[error("invalid plot box size: width={width}, height={height}")]
    InvalidPlotBox { width: f64, height: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),
}
