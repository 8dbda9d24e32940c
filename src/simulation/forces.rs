//! Force providers for the integrators
//!
//! `ForceProvider` is the only thing an integrator knows about the force
//! field: positions in, one force per particle out. `ForceField` is the
//! provider used by scenarios, a sum of `ForceTerm`s (harmonic wells,
//! uniform forces, softened Newtonian gravity)

use crate::error::IntegratorError;
use crate::simulation::states::{ForceSet, NVec3, ParticleState};

/// Computes the force on every particle for a given configuration
///
/// Implementations must be a pure function of the state: calling twice on
/// the same state gives the same forces. The returned set has exactly one
/// entry per particle
pub trait ForceProvider {
    fn forces(&self, state: &ParticleState) -> Result<ForceSet, IntegratorError>;
}

/// Trait for force sources operating on [`ParticleState`]
/// Implementations add their contribution into `out[i]` for each particle
pub trait ForceTerm {
    fn force(&self, state: &ParticleState, out: &mut [NVec3]);
}

/// Collection of force terms (springs, fields, gravity, etc.)
/// Contributions of all terms are summed into a single force per particle
pub struct ForceField {
    terms: Vec<Box<dyn ForceTerm + Send + Sync>>,
}

impl ForceField {
    /// Create an empty force field, every particle feels zero force
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a force term
    pub fn with(mut self, term: impl ForceTerm + Send + Sync + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    /// Compute total forces for all particles in `state`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_forces(&self, state: &ParticleState, out: &mut [NVec3]) {
        // Zero buffer
        for f in out.iter_mut() {
            *f = NVec3::zeros();
        }
        for term in &self.terms {
            term.force(state, out);
        }
    }
}

impl Default for ForceField {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceProvider for ForceField {
    fn forces(&self, state: &ParticleState) -> Result<ForceSet, IntegratorError> {
        let mut out = vec![NVec3::zeros(); state.len()];
        self.accumulate_forces(state, &mut out);

        // Overflow or a singular potential shows up as inf/NaN
        if let Some(i) = out.iter().position(|f| !f.iter().all(|c| c.is_finite())) {
            return Err(IntegratorError::force(format!(
                "non-finite force {:?} on particle {}",
                out[i], i
            )));
        }
        Ok(out)
    }
}

/// Isotropic spring pulling every particle toward `anchor`
/// F = -k (x - anchor)
pub struct HarmonicWell {
    pub k: f64, // spring constant
    pub anchor: NVec3,
}

impl ForceTerm for HarmonicWell {
    fn force(&self, state: &ParticleState, out: &mut [NVec3]) {
        for (p, f) in state.particles.iter().zip(out.iter_mut()) {
            *f -= self.k * (p.x - self.anchor);
        }
    }
}

/// The same constant force on every particle
pub struct UniformForce {
    pub force: NVec3,
}

impl ForceTerm for UniformForce {
    fn force(&self, _state: &ParticleState, out: &mut [NVec3]) {
        for f in out.iter_mut() {
            *f += self.force;
        }
    }
}

/// Newtonian gravity with softening (direct n^2 sum)
/// Fixed particles (inverse mass 0) carry no mass and are skipped
#[allow(non_snake_case)]
pub struct NewtonianGravity {
    pub G: f64, // gravitational constant
    pub eps2: f64, // softening
}

impl ForceTerm for NewtonianGravity {
    fn force(&self, state: &ParticleState, out: &mut [NVec3]) {
        let n = state.len();

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let pi = &state.particles[i];
            if pi.is_fixed() {
                continue;
            }
            let mi = pi.inv_m.recip();

            for j in (i + 1)..n {
                let pj = &state.particles[j];
                if pj.is_fixed() {
                    continue;
                }
                let mj = pj.inv_m.recip();

                // r points from i to j: i is pulled along +r, j along -r
                let r = pj.x - pi.x;
                let d2 = r.norm_squared() + self.eps2;
                let inv_r = d2.sqrt().recip();
                let inv_r3 = inv_r * inv_r * inv_r;

                // F = G m_i m_j r / |r_soft|^3, equal and opposite
                let f = self.G * mi * mj * inv_r3 * r;
                out[i] += f;
                out[j] -= f;
            }
        }
    }
}
