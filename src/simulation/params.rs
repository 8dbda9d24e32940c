//! Numerical parameters for the integrators
//!
//! `IntegratorConfig` holds runtime settings:
//! - accuracy target and initial step size,
//! - stability bounds on the step size,
//! - controller guards (growth cap, shrink floor, rejection limit),
//! - strict mode for stalled steps

use crate::error::IntegratorError;

#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorConfig {
    pub accuracy: f64, // error tolerance, smaller = stricter
    pub step_size: f64, // initial step size
    pub min_step: f64, // smallest allowed step size
    pub max_step: f64, // largest allowed step size
    pub growth_cap: f64, // max growth factor per accepted step
    pub shrink_floor: f64, // min shrink factor per rejected attempt
    pub max_rejections: u32, // rejected attempts before dropping to min_step
    pub strict: bool, // fail instead of forcing a stalled step
}

impl IntegratorConfig {
    /// Defaults for everything except step size and accuracy
    pub fn new(step_size: f64, accuracy: f64) -> Self {
        Self {
            accuracy,
            step_size,
            min_step: step_size * 1e-6,
            max_step: step_size * 1e3,
            growth_cap: 2.0,
            shrink_floor: 0.1,
            max_rejections: 10,
            strict: false,
        }
    }

    pub fn with_step_bounds(mut self, min_step: f64, max_step: f64) -> Self {
        self.min_step = min_step;
        self.max_step = max_step;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Reject anything the controller could not work with
    pub fn validate(&self) -> Result<(), IntegratorError> {
        check_accuracy(self.accuracy)?;
        if !(self.min_step > 0.0 && self.min_step.is_finite()) {
            return Err(IntegratorError::config(format!(
                "minimum step size must be positive and finite, got {}",
                self.min_step
            )));
        }
        // max_step may be infinite
        if !(self.max_step >= self.min_step) {
            return Err(IntegratorError::config(format!(
                "maximum step size {} is below minimum step size {}",
                self.max_step, self.min_step
            )));
        }
        if !(self.step_size >= self.min_step && self.step_size <= self.max_step) {
            return Err(IntegratorError::config(format!(
                "step size {} outside [{}, {}]",
                self.step_size, self.min_step, self.max_step
            )));
        }
        if !(self.growth_cap >= 1.0 && self.growth_cap.is_finite()) {
            return Err(IntegratorError::config(format!(
                "growth cap must be at least 1, got {}",
                self.growth_cap
            )));
        }
        if !(self.shrink_floor > 0.0 && self.shrink_floor < 1.0) {
            return Err(IntegratorError::config(format!(
                "shrink floor must lie in (0, 1), got {}",
                self.shrink_floor
            )));
        }
        Ok(())
    }
}

pub(crate) fn check_accuracy(accuracy: f64) -> Result<(), IntegratorError> {
    if accuracy > 0.0 && accuracy.is_finite() {
        Ok(())
    } else {
        Err(IntegratorError::config(format!(
            "accuracy must be positive and finite, got {}",
            accuracy
        )))
    }
}
