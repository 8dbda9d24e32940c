//! High-level runtime engine settings
//!
//! Selects the integrator used when building and running a `Scenario`

use crate::configuration::config::IntegratorKind;
use crate::simulation::integrator::{Integrator, VariableVerletIntegrator, VerletIntegrator};
use crate::simulation::params::IntegratorConfig;

#[derive(Debug, Clone)]
pub struct Engine {
    pub integrator: IntegratorKind, // verlet or variable_verlet
    pub steps: usize, // accepted steps per run
    pub report_every: usize, // steps between progress reports
}

impl Engine {
    /// Build the selected integrator; a fixed-step Verlet only uses
    /// `config.step_size`
    pub fn build_integrator(&self, config: &IntegratorConfig) -> Box<dyn Integrator> {
        match self.integrator {
            IntegratorKind::Verlet => Box::new(VerletIntegrator::new(config.step_size)),
            IntegratorKind::VariableVerlet => {
                Box::new(VariableVerletIntegrator::with_config(config.clone()))
            }
        }
    }
}
