use thiserror::Error;

/// Reasons a [`ManipulationConfig`](crate::ManipulationConfig) is rejected.
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("smoothing must be a finite value in [0, 1), got {0}")]
    InvalidSmoothing(f64),
    #[error("scale limits must be positive, finite and ordered, got ({min}, {max})")]
    InvalidScaleLimits { min: f64, max: f64 },
}
