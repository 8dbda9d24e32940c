//! Core state types for the integrators.
//!
//! Defines:
//! - `Particle` / `ParticleState` using `NVec3`
//! - `ForceSet`, one force vector per particle
//! - `SimulationClock`, the elapsed simulation time
//!
//! A `ParticleState` keeps position, velocity and inverse mass together per
//! particle, so the three arrays can never disagree in length.

use nalgebra::Vector3;

use crate::error::IntegratorError;

pub type NVec3 = Vector3<f64>;

/// Forces on each particle, indexed like `ParticleState::particles`
pub type ForceSet = Vec<NVec3>;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub inv_m: f64, // inverse mass, 0 = fixed
}

impl Particle {
    /// Build a particle from its mass; a zero mass marks it as fixed
    pub fn new(x: NVec3, v: NVec3, m: f64) -> Self {
        let inv_m = if m == 0.0 { 0.0 } else { m.recip() };
        Self { x, v, inv_m }
    }

    pub fn is_fixed(&self) -> bool {
        self.inv_m == 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleState {
    pub particles: Vec<Particle>,
}

impl ParticleState {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of particles the integrator is allowed to move
    pub fn moving_count(&self) -> usize {
        self.particles.iter().filter(|p| !p.is_fixed()).count()
    }

    /// Check every particle has finite coordinates and a usable inverse mass
    pub fn validate(&self) -> Result<(), IntegratorError> {
        for (i, p) in self.particles.iter().enumerate() {
            if !(p.inv_m >= 0.0 && p.inv_m.is_finite()) {
                return Err(IntegratorError::config(format!(
                    "particle {} has invalid inverse mass {}",
                    i, p.inv_m
                )));
            }
            if !(p.x.iter().all(|c| c.is_finite()) && p.v.iter().all(|c| c.is_finite())) {
                return Err(IntegratorError::config(format!(
                    "particle {} has non-finite position or velocity",
                    i
                )));
            }
        }
        Ok(())
    }

    /// Total kinetic energy, sum of 1/2 m v^2 over moving particles
    pub fn kinetic_energy(&self) -> f64 {
        self.particles
            .iter()
            .filter(|p| !p.is_fixed())
            .map(|p| 0.5 * p.v.norm_squared() / p.inv_m)
            .sum()
    }
}

/// Elapsed simulation time, advanced only by accepted steps
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationClock {
    time: f64,
}

impl SimulationClock {
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn advance(&mut self, dt: f64) {
        debug_assert!(dt > 0.0);
        self.time += dt;
    }
}
