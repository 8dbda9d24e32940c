pub mod simulation;
pub mod configuration;
pub mod benchmark;
pub mod error;

pub use error::IntegratorError;

pub use simulation::states::{Particle, ParticleState, ForceSet, SimulationClock, NVec3};
pub use simulation::forces::{ForceProvider, ForceTerm, ForceField, HarmonicWell, UniformForce, NewtonianGravity};
pub use simulation::context::Context;
pub use simulation::params::IntegratorConfig;
pub use simulation::controller::{StepSizeController, Retry};
pub use simulation::error_estimator::StepAttempt;
pub use simulation::integrator::{Integrator, IntegrationStats, VariableVerletIntegrator, VerletIntegrator};
pub use simulation::scenario::Scenario;

pub use configuration::config::{IntegratorKind, EngineConfig, ParametersConfig, RunConfig, ForceConfig, ParticleConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_verlet, bench_variable_verlet_curve};
