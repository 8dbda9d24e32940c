//! Simulation context an integrator is bound to
//!
//! The context owns the particle state and the force provider. Integrators
//! borrow it for the duration of a `step` call and never keep it, so a
//! sequence of steps on one context is serialized by the borrow checker.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::IntegratorError;
use crate::simulation::forces::ForceProvider;
use crate::simulation::states::{ForceSet, ParticleState};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(0);

pub struct Context {
    id: u64,
    state: ParticleState,
    forces: Box<dyn ForceProvider + Send + Sync>,
    // bumped on every state change, lets integrators reuse cached forces
    revision: u64,
}

impl Context {
    pub fn new(state: ParticleState, forces: impl ForceProvider + Send + Sync + 'static) -> Self {
        Self {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            state,
            forces: Box::new(forces),
            revision: 0,
        }
    }

    pub fn state(&self) -> &ParticleState {
        &self.state
    }

    /// Mutable access for the caller; invalidates any cached forces
    pub fn state_mut(&mut self) -> &mut ParticleState {
        self.revision += 1;
        &mut self.state
    }

    /// Unique per process, so a binding can tell two contexts apart
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Evaluate forces for an arbitrary configuration, checking the length
    /// contract of the provider
    pub fn forces_for(&self, state: &ParticleState) -> Result<ForceSet, IntegratorError> {
        let forces = self.forces.forces(state)?;
        if forces.len() != state.len() {
            return Err(IntegratorError::force(format!(
                "force provider returned {} forces for {} particles",
                forces.len(),
                state.len()
            )));
        }
        Ok(forces)
    }

    /// Forces at the current configuration
    pub fn current_forces(&self) -> Result<ForceSet, IntegratorError> {
        self.forces_for(&self.state)
    }

    /// Replace the state with a fully computed trial state
    pub(crate) fn commit(&mut self, state: ParticleState) {
        debug_assert_eq!(state.len(), self.state.len());
        self.state = state;
        self.revision += 1;
    }
}
