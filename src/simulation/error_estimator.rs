//! Local error estimate for a trial velocity-Verlet step
//!
//! Over a step `h` the Verlet position is
//!   x' = x + v h + 1/2 m^-1 F h^2
//! while an explicit Euler step only reaches
//!   x_E = x + v h
//! so the per-particle difference is x' - x_E = 1/2 m^-1 F h^2. Light or
//! strongly pushed particles therefore dominate the estimate.
//!
//! The aggregate is the RMS of that difference over every Cartesian
//! component of the moving particles, divided by the accuracy. A ratio of
//! 1.0 means the step sits exactly at tolerance.

use crate::simulation::states::{ForceSet, ParticleState};

/// A trial step waiting for an accept/reject decision
///
/// `trial` holds x' and the half-kicked velocity v + 1/2 m^-1 F h. The
/// second half kick needs the force at x' and is only applied on commit.
#[derive(Debug, Clone)]
pub struct StepAttempt {
    pub step_size: f64,
    pub trial: ParticleState,
    pub error_ratio: f64,
}

impl StepAttempt {
    pub fn is_acceptable(&self) -> bool {
        self.error_ratio <= 1.0
    }

    /// Second half kick with the force at the trial positions,
    /// v' = v + 1/2 m^-1 (F + F') h
    pub fn finish(mut self, new_forces: &ForceSet) -> ParticleState {
        let half_h = 0.5 * self.step_size;
        for (p, f) in self.trial.particles.iter_mut().zip(new_forces.iter()) {
            if p.is_fixed() {
                continue;
            }
            p.v += half_h * p.inv_m * *f;
        }
        self.trial
    }
}

/// Error ratio of a step of size `h` from `state` under `forces`
///
/// Returns 0 when no particle would deviate from the Euler reference
pub fn error_ratio(state: &ParticleState, forces: &ForceSet, h: f64, accuracy: f64) -> f64 {
    let mut sum_sq = 0.0;
    let mut components = 0usize;
    let half_h2 = 0.5 * h * h;

    for (p, f) in state.particles.iter().zip(forces.iter()) {
        if p.is_fixed() {
            continue;
        }
        // x' - x_E, written out directly to avoid cancellation
        let deviation = half_h2 * p.inv_m * *f;
        sum_sq += deviation.norm_squared();
        components += 3;
    }

    if components == 0 {
        return 0.0;
    }
    (sum_sq / components as f64).sqrt() / accuracy
}

/// Build the trial Verlet step and its error ratio without touching `state`
pub fn attempt(state: &ParticleState, forces: &ForceSet, h: f64, accuracy: f64) -> StepAttempt {
    debug_assert_eq!(state.len(), forces.len());

    let mut trial = state.clone();
    let half_h = 0.5 * h;
    for (p, f) in trial.particles.iter_mut().zip(forces.iter()) {
        if p.is_fixed() {
            continue;
        }
        // Kick: v_half = v + 1/2 m^-1 F h
        p.v += half_h * p.inv_m * *f;
        // Drift: x' = x + v_half h = x + v h + 1/2 m^-1 F h^2
        p.x += h * p.v;
    }

    StepAttempt {
        step_size: h,
        trial,
        error_ratio: error_ratio(state, forces, h, accuracy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::{NVec3, Particle};

    fn single(x: NVec3, v: NVec3, m: f64) -> ParticleState {
        ParticleState::new(vec![Particle::new(x, v, m)])
    }

    #[test]
    fn zero_motion_gives_zero_error_and_unchanged_state() {
        let state = single(NVec3::new(1.0, -2.0, 3.0), NVec3::zeros(), 2.0);
        let forces = vec![NVec3::zeros()];

        for h in [1e-6, 0.01, 1.0, 100.0] {
            let a = attempt(&state, &forces, h, 1e-3);
            assert_eq!(a.error_ratio, 0.0);
            assert_eq!(a.trial, state);
        }
    }

    #[test]
    fn error_matches_half_acceleration_h_squared() {
        // |a| = 4, h = 0.1 -> deviation 0.02 on one axis, RMS over 3 components
        let state = single(NVec3::zeros(), NVec3::new(1.0, 0.0, 0.0), 0.5);
        let forces = vec![NVec3::new(2.0, 0.0, 0.0)];

        let ratio = error_ratio(&state, &forces, 0.1, 1.0);
        let expected = (0.02f64 * 0.02 / 3.0).sqrt();
        assert!((ratio - expected).abs() < 1e-15);
    }

    #[test]
    fn error_scales_with_step_squared() {
        let state = single(NVec3::zeros(), NVec3::zeros(), 1.0);
        let forces = vec![NVec3::new(0.0, 3.0, 0.0)];

        let r1 = error_ratio(&state, &forces, 0.01, 1e-4);
        let r2 = error_ratio(&state, &forces, 0.02, 1e-4);
        assert!((r2 / r1 - 4.0).abs() < 1e-12);
    }

    #[test]
    fn fixed_particles_are_not_moved_or_counted() {
        let state = ParticleState::new(vec![
            Particle::new(NVec3::zeros(), NVec3::new(1.0, 0.0, 0.0), 0.0),
            Particle::new(NVec3::zeros(), NVec3::zeros(), 1.0),
        ]);
        let forces = vec![NVec3::new(1e6, 0.0, 0.0), NVec3::zeros()];

        let a = attempt(&state, &forces, 0.1, 1e-3);
        assert_eq!(a.error_ratio, 0.0);
        assert_eq!(a.trial.particles[0], state.particles[0]);
    }
}
