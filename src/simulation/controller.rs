//! Step-size feedback for the variable Verlet integrator
//!
//! The estimated error grows like h^2, so the step that would land exactly
//! on tolerance is h * ratio^(-1/2). On acceptance the controller moves
//! toward it, capped at `growth_cap`; growth below `HOLD_BAND` is dropped so
//! the step stays constant near tolerance. On rejection it shrinks by the
//! same law with a safety margin, never by more than `shrink_floor`. Once a
//! step has been rejected too often it drops straight to `min_step`.
//! Every proposal is clamped to `[min_step, max_step]`.

use crate::simulation::params::IntegratorConfig;

/// Growth factors below this keep the current step size
const HOLD_BAND: f64 = 1.2;
/// Margin applied when shrinking after a rejection
const SAFETY: f64 = 0.9;

/// What the driver should do after a rejected attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Retry {
    /// Try again with the new, smaller step size
    Shrunk(f64),
    /// Rejected at `min_step`; force the attempt through
    Stalled,
}

#[derive(Debug, Clone)]
pub struct StepSizeController {
    step_size: f64,
    min_step: f64,
    max_step: f64,
    growth_cap: f64,
    shrink_floor: f64,
    max_rejections: u32,
}

impl StepSizeController {
    pub fn new(config: &IntegratorConfig) -> Self {
        Self {
            step_size: config.step_size.max(config.min_step).min(config.max_step),
            min_step: config.min_step,
            max_step: config.max_step,
            growth_cap: config.growth_cap,
            shrink_floor: config.shrink_floor,
            max_rejections: config.max_rejections,
        }
    }

    /// Step size to try next
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min_step, self.max_step)
    }

    /// Growth factor after an accepted step, f(0) = growth_cap, f(1) = 1
    pub fn growth_factor(&self, error_ratio: f64) -> f64 {
        let ideal = if error_ratio > 0.0 {
            error_ratio.sqrt().recip()
        } else {
            f64::INFINITY
        };
        let factor = ideal.min(self.growth_cap);
        if factor < HOLD_BAND {
            // near tolerance, or a forced step above it: keep or shrink
            factor.min(1.0).max(self.shrink_floor)
        } else {
            factor
        }
    }

    /// Shrink factor after a rejected attempt, bounded below by shrink_floor
    pub fn shrink_factor(&self, error_ratio: f64) -> f64 {
        (SAFETY / error_ratio.sqrt()).min(SAFETY).max(self.shrink_floor)
    }

    /// Record an accepted (or forced) step and propose the next step size
    pub fn accepted(&mut self, error_ratio: f64) -> f64 {
        self.step_size = self.clamp(self.step_size * self.growth_factor(error_ratio));
        self.step_size
    }

    /// Record a rejected attempt; `rejections` counts rejections of the
    /// current step including this one
    ///
    /// Past `max_rejections` the next attempt drops straight to `min_step`.
    /// Only a rejection at `min_step` stalls.
    pub fn rejected(&mut self, error_ratio: f64, rejections: u32) -> Retry {
        if self.step_size <= self.min_step {
            return Retry::Stalled;
        }
        self.step_size = if rejections > self.max_rejections {
            self.min_step
        } else {
            self.clamp(self.step_size * self.shrink_factor(error_ratio))
        };
        Retry::Shrunk(self.step_size)
    }

    // min/max rather than f64::clamp, which panics on inverted bounds
    fn clamp(&self, h: f64) -> f64 {
        h.max(self.min_step).min(self.max_step)
    }
}
