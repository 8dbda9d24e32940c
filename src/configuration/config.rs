//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – which integrator drives the run
//! - [`ParametersConfig`] – step size, accuracy and controller guards
//! - [`RunConfig`]        – how many steps to take and how often to report
//! - [`ForceConfig`]      – the force terms acting on the particles
//! - [`ParticleConfig`]   – initial state for each particle
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A single harmonic oscillator matching these types:
//!
//! ```yaml
//! engine:
//!   integrator: "variable_verlet"   # or "verlet"
//!
//! parameters:
//!   step_size: 0.001      # initial step size (fixed for "verlet")
//!   accuracy: 1.0e-4      # error tolerance
//!   max_step: 0.05        # optional, defaults to 1000 * step_size
//!
//! run:
//!   steps: 1000
//!   report_every: 100
//!
//! forces:
//!   - type: harmonic
//!     k: 1.0
//!     anchor: [0.0, 0.0, 0.0]
//!
//! particles:
//!   - x: [1.0, 0.0, 0.0]
//!     v: [0.0, 0.0, 0.0]
//!     m: 1.0              # 0 marks a fixed particle
//! ```
//!
//! [`crate::Scenario::build_scenario`] maps this into runtime types and
//! rejects malformed vectors or masses.

use serde::Deserialize;

/// Which integrator the engine uses
/// `integrator: "verlet"` or `integrator: "variable_verlet"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum IntegratorKind {
    #[serde(rename = "verlet")] // Velocity Verlet, fixed step size, symplectic
    Verlet,

    #[serde(rename = "variable_verlet")] // Velocity Verlet with error controlled step size
    VariableVerlet,
}

/// High-level engine configuration
#[derive(Deserialize, Debug)]
pub struct EngineConfig {
    pub integrator: IntegratorKind,
}

/// Numerical parameters for the integrator
/// Only `step_size` and `accuracy` are required
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub step_size: f64, // initial (or fixed) step size
    pub accuracy: f64, // error tolerance
    pub min_step: Option<f64>, // smallest step the controller may use
    pub max_step: Option<f64>, // largest step the controller may use
    pub growth_cap: Option<f64>, // max growth per accepted step
    pub shrink_floor: Option<f64>, // min shrink per rejected attempt
    pub max_rejections: Option<u32>, // rejections before a step is forced
    #[serde(default)]
    pub strict: bool, // error out instead of forcing a stalled step
}

/// Length of the run
#[derive(Deserialize, Debug, Clone)]
pub struct RunConfig {
    pub steps: usize, // accepted steps to take
    pub report_every: Option<usize>, // steps between progress reports
}

/// One force term, tagged by `type`
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ForceConfig {
    /// Spring of stiffness `k` toward `anchor`
    Harmonic { k: f64, anchor: Vec<f64> },
    /// Constant force on every particle, `field` is accepted as well
    Uniform {
        #[serde(alias = "field")]
        force: Vec<f64>,
    },
    /// Softened pairwise Newtonian attraction
    #[allow(non_snake_case)]
    Gravity { G: f64, eps2: f64 },
}

/// Configuration for a single particle's initial state
#[derive(Deserialize, Debug)]
pub struct ParticleConfig {
    pub x: Vec<f64>, // initial position
    pub v: Vec<f64>, // initial velocity
    pub m: f64, // mass, 0 for a fixed particle
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub run: RunConfig,
    #[serde(default)]
    pub forces: Vec<ForceConfig>, // no forces = free particles
    pub particles: Vec<ParticleConfig>,
}
