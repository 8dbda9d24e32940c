//! Time integrators for a bound [`Context`]
//!
//! Provides a fixed-step velocity-Verlet integrator and an error-controlled
//! variable-step one, both behind the [`Integrator`] trait. Every step is
//! computed on a copy of the particle state and committed in one piece, so a
//! failed step never leaves the context half updated.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::error::IntegratorError;
use crate::simulation::context::Context;
use crate::simulation::controller::{Retry, StepSizeController};
use crate::simulation::error_estimator::{self, StepAttempt};
use crate::simulation::params::{check_accuracy, IntegratorConfig};
use crate::simulation::states::{ForceSet, ParticleState, SimulationClock};

/// A time-stepping scheme that advances a [`Context`]
pub trait Integrator {
    /// Bind to `context` and validate the configuration against it.
    /// Called again whenever the context is rebuilt.
    fn initialize(&mut self, context: &Context) -> Result<(), IntegratorError>;

    /// Advance by exactly `steps` accepted steps
    fn step(&mut self, context: &mut Context, steps: usize) -> Result<(), IntegratorError>;

    /// Names of the backend kernels this scheme needs
    fn kernel_names(&self) -> Vec<&'static str>;

    /// Elapsed simulation time
    fn time(&self) -> f64;

    /// Like [`Integrator::step`], but stops early once `cancel` is set.
    /// The flag is only checked between accepted steps. Returns the number
    /// of steps taken.
    fn step_until_cancelled(
        &mut self,
        context: &mut Context,
        steps: usize,
        cancel: &AtomicBool,
    ) -> Result<usize, IntegratorError> {
        let mut taken = 0;
        while taken < steps && !cancel.load(Ordering::Relaxed) {
            self.step(context, 1)?;
            taken += 1;
        }
        Ok(taken)
    }
}

/// Counters collected over the lifetime of an integrator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrationStats {
    pub accepted: u64, // committed steps, forced ones included
    pub rejected: u64, // discarded attempts
    pub forced: u64, // steps pushed through at the floor
    pub last_step: f64,
    pub smallest_step: f64,
    pub largest_step: f64,
    pub elapsed: f64, // sum of accepted step sizes
}

impl IntegrationStats {
    fn record_accepted(&mut self, h: f64) {
        if self.accepted == 0 {
            self.smallest_step = h;
            self.largest_step = h;
        } else {
            self.smallest_step = self.smallest_step.min(h);
            self.largest_step = self.largest_step.max(h);
        }
        self.accepted += 1;
        self.last_step = h;
        self.elapsed += h;
    }

    /// Mean accepted step size, 0 before the first step
    pub fn average_step(&self) -> f64 {
        if self.accepted == 0 {
            0.0
        } else {
            self.elapsed / self.accepted as f64
        }
    }
}

/// Forces at the last committed configuration, tagged with the context
/// revision they belong to
#[derive(Debug, Clone)]
struct CachedForces {
    revision: u64,
    forces: ForceSet,
}

/// Forces at the start of a step: reuse the cache if the context has not
/// changed since it was filled, otherwise evaluate
fn starting_forces(
    cache: &mut Option<CachedForces>,
    context: &Context,
) -> Result<ForceSet, IntegratorError> {
    match cache.take() {
        Some(cached) if cached.revision == context.revision() => Ok(cached.forces),
        _ => context.current_forces(),
    }
}

/// The context an integrator was initialized against
#[derive(Debug, Clone, Copy)]
struct Binding {
    context: u64,
    particles: usize,
}

impl Binding {
    fn to(context: &Context) -> Self {
        Self {
            context: context.id(),
            particles: context.state().len(),
        }
    }
}

fn check_binding(bound: Option<Binding>, context: &Context) -> Result<(), IntegratorError> {
    let binding = bound.ok_or(IntegratorError::NotInitialized)?;
    if context.id() != binding.context {
        return Err(IntegratorError::config(format!(
            "integrator was bound to context {}, got context {}; call initialize first",
            binding.context,
            context.id()
        )));
    }
    if context.state().len() != binding.particles {
        return Err(IntegratorError::config(format!(
            "integrator was bound to {} particles, context has {}",
            binding.particles,
            context.state().len()
        )));
    }
    Ok(())
}

// =========================================================================================
// Fixed step velocity-Verlet
// =========================================================================================

/// Velocity-Verlet with a constant step size
#[derive(Debug, Clone)]
pub struct VerletIntegrator {
    step_size: f64,
    clock: SimulationClock,
    bound: Option<Binding>,
    cache: Option<CachedForces>,
}

impl VerletIntegrator {
    pub fn new(step_size: f64) -> Self {
        Self {
            step_size,
            clock: SimulationClock::default(),
            bound: None,
            cache: None,
        }
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Advance one step of size `dt`:
    /// kick v_half = v + dt/2 a_n, drift x_n+1 = x + dt v_half,
    /// kick v_n+1 = v_half + dt/2 a_n+1
    fn take_step(&mut self, context: &mut Context) -> Result<(), IntegratorError> {
        let dt = self.step_size;
        let half_dt = 0.5 * dt;

        let a_old = starting_forces(&mut self.cache, context)?;
        let mut next: ParticleState = context.state().clone();
        for (p, f) in next.particles.iter_mut().zip(a_old.iter()) {
            if p.is_fixed() {
                continue;
            }
            p.v += half_dt * p.inv_m * *f;
            p.x += dt * p.v;
        }

        let a_new = context.forces_for(&next)?;
        for (p, f) in next.particles.iter_mut().zip(a_new.iter()) {
            if p.is_fixed() {
                continue;
            }
            p.v += half_dt * p.inv_m * *f;
        }

        context.commit(next);
        self.clock.advance(dt);
        self.cache = Some(CachedForces {
            revision: context.revision(),
            forces: a_new,
        });
        Ok(())
    }
}

impl Integrator for VerletIntegrator {
    fn initialize(&mut self, context: &Context) -> Result<(), IntegratorError> {
        if !(self.step_size > 0.0 && self.step_size.is_finite()) {
            return Err(IntegratorError::config(format!(
                "step size must be positive and finite, got {}",
                self.step_size
            )));
        }
        context.state().validate()?;
        self.bound = Some(Binding::to(context));
        self.cache = None;
        info!(
            "verlet: bound to {} particles, dt = {}",
            context.state().len(),
            self.step_size
        );
        Ok(())
    }

    fn step(&mut self, context: &mut Context, steps: usize) -> Result<(), IntegratorError> {
        check_binding(self.bound, context)?;
        for _ in 0..steps {
            self.take_step(context)?;
        }
        Ok(())
    }

    fn kernel_names(&self) -> Vec<&'static str> {
        vec!["IntegrateVerletStep"]
    }

    fn time(&self) -> f64 {
        self.clock.time()
    }
}

// =========================================================================================
// Error controlled variable step velocity-Verlet
// =========================================================================================

/// Velocity-Verlet whose step size follows the local error estimate.
///
/// Each step is compared against an explicit Euler step over the same
/// interval; the difference is the error measure (see
/// [`error_estimator`]). Attempts above tolerance are discarded and retried
/// with a smaller step; accepted steps let the step size grow again. The
/// adapted step size carries over between `step` calls.
///
/// Unlike fixed-step Verlet this scheme is not symplectic, so long runs
/// conserve energy less precisely at a given accuracy.
#[derive(Debug, Clone)]
pub struct VariableVerletIntegrator {
    config: IntegratorConfig,
    controller: StepSizeController,
    clock: SimulationClock,
    stats: IntegrationStats,
    bound: Option<Binding>,
    cache: Option<CachedForces>,
}

impl VariableVerletIntegrator {
    /// `step_size` seeds the controller, `accuracy` is the error tolerance
    pub fn new(step_size: f64, accuracy: f64) -> Self {
        Self::with_config(IntegratorConfig::new(step_size, accuracy))
    }

    pub fn with_config(config: IntegratorConfig) -> Self {
        Self {
            controller: StepSizeController::new(&config),
            config,
            clock: SimulationClock::default(),
            stats: IntegrationStats::default(),
            bound: None,
            cache: None,
        }
    }

    pub fn accuracy(&self) -> f64 {
        self.config.accuracy
    }

    /// Takes effect with the next attempted step
    pub fn set_accuracy(&mut self, accuracy: f64) -> Result<(), IntegratorError> {
        check_accuracy(accuracy)?;
        self.config.accuracy = accuracy;
        Ok(())
    }

    /// Step size the next attempt will use
    pub fn step_size(&self) -> f64 {
        self.controller.step_size()
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    pub fn stats(&self) -> &IntegrationStats {
        &self.stats
    }

    /// Attempt steps until one is accepted (or forced) and commit it
    fn take_step(&mut self, context: &mut Context) -> Result<(), IntegratorError> {
        let forces = starting_forces(&mut self.cache, context)?;
        let mut rejections = 0;

        let attempt: StepAttempt = loop {
            let h = self.controller.step_size();
            let attempt = error_estimator::attempt(context.state(), &forces, h, self.config.accuracy);
            if attempt.is_acceptable() {
                break attempt;
            }

            rejections += 1;
            self.stats.rejected += 1;

            match self.controller.rejected(attempt.error_ratio, rejections) {
                Retry::Shrunk(retry) => {
                    debug!(
                        "variable verlet: rejected h = {:e} at error ratio {:.3}, retrying with h = {:e}",
                        h, attempt.error_ratio, retry
                    );
                    continue;
                }
                Retry::Stalled if self.config.strict => {
                    return Err(IntegratorError::StepStall {
                        step_size: h,
                        error_ratio: attempt.error_ratio,
                    });
                }
                Retry::Stalled => {
                    warn!(
                        "variable verlet: forcing step at minimum h = {:e}, error ratio {:.3} after {} rejections, accuracy not guaranteed",
                        h, attempt.error_ratio, rejections
                    );
                    self.stats.forced += 1;
                    break attempt;
                }
            }
        };

        // Nothing below may fail once the context has been touched
        let new_forces = context.forces_for(&attempt.trial)?;
        let h = attempt.step_size;
        let error_ratio = attempt.error_ratio;
        context.commit(attempt.finish(&new_forces));

        self.clock.advance(h);
        self.stats.record_accepted(h);
        self.controller.accepted(error_ratio);
        self.cache = Some(CachedForces {
            revision: context.revision(),
            forces: new_forces,
        });
        Ok(())
    }
}

impl Integrator for VariableVerletIntegrator {
    fn initialize(&mut self, context: &Context) -> Result<(), IntegratorError> {
        self.config.validate()?;
        let state = context.state();
        state.validate()?;
        if state.moving_count() == 0 {
            return Err(IntegratorError::config(
                "every particle has zero inverse mass, nothing to integrate",
            ));
        }

        self.bound = Some(Binding::to(context));
        self.cache = None;
        let (min_step, max_step) = self.controller.bounds();
        info!(
            "variable verlet: bound to {} particles ({} moving), accuracy = {}, h in [{:e}, {:e}]",
            state.len(),
            state.moving_count(),
            self.config.accuracy,
            min_step,
            max_step
        );
        Ok(())
    }

    fn step(&mut self, context: &mut Context, steps: usize) -> Result<(), IntegratorError> {
        check_binding(self.bound, context)?;
        let rejected_before = self.stats.rejected;

        for _ in 0..steps {
            self.take_step(context)?;
        }

        debug!(
            "variable verlet: {} steps to t = {}, {} rejected, next h = {:e}",
            steps,
            self.clock.time(),
            self.stats.rejected - rejected_before,
            self.controller.step_size()
        );
        Ok(())
    }

    fn kernel_names(&self) -> Vec<&'static str> {
        vec!["IntegrateVariableVerletStep"]
    }

    fn time(&self) -> f64 {
        self.clock.time()
    }
}
