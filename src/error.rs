//! Error taxonomy for the integrators
//!
//! Configuration problems are reported immediately and never corrected,
//! force evaluation failures abort the running `step` call, and a stalled
//! step is only an error when the integrator runs in strict mode

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegratorError {
    /// Bad accuracy, step bounds, masses or particle counts
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The force provider could not produce finite forces for a configuration
    #[error("force evaluation failed: {0}")]
    ForceEvaluation(String),

    /// The minimum step size was still too large for the accuracy target
    #[error("step stalled at step size {step_size} with error ratio {error_ratio}")]
    StepStall { step_size: f64, error_ratio: f64 },

    /// `step` was called before `initialize` bound the integrator to a context
    #[error("integrator is not bound to a context; call initialize first")]
    NotInitialized,
}

impl IntegratorError {
    pub fn config(message: impl Into<String>) -> Self {
        IntegratorError::InvalidConfig(message.into())
    }

    pub fn force(message: impl Into<String>) -> Self {
        IntegratorError::ForceEvaluation(message.into())
    }
}
