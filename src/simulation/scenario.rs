//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! containing:
//! - engine settings (`Engine`)
//! - integrator parameters (`IntegratorConfig`)
//! - the simulation `Context`: particles at t = 0 and the active force field

use crate::configuration::config::{ForceConfig, ParametersConfig, ParticleConfig, ScenarioConfig};
use crate::error::IntegratorError;
use crate::simulation::context::Context;
use crate::simulation::engine::Engine;
use crate::simulation::forces::{ForceField, HarmonicWell, NewtonianGravity, UniformForce};
use crate::simulation::integrator::Integrator;
use crate::simulation::params::IntegratorConfig;
use crate::simulation::states::{NVec3, Particle, ParticleState};

/// Runtime bundle constructed from a [`ScenarioConfig`]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: IntegratorConfig,
    pub context: Context,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, IntegratorError> {
        // Particles: map `ParticleConfig` -> runtime `Particle` using nalgebra vectors
        let particles = cfg
            .particles
            .iter()
            .enumerate()
            .map(|(i, pc)| build_particle(i, pc))
            .collect::<Result<Vec<_>, _>>()?;

        let mut forces = ForceField::new();
        for fc in &cfg.forces {
            forces = match fc {
                ForceConfig::Harmonic { k, anchor } => forces.with(HarmonicWell {
                    k: *k,
                    anchor: vec3("harmonic anchor", anchor)?,
                }),
                ForceConfig::Uniform { force } => forces.with(UniformForce {
                    force: vec3("uniform force", force)?,
                }),
                ForceConfig::Gravity { G: g, eps2 } => forces.with(NewtonianGravity {
                    G: *g,
                    eps2: *eps2,
                }),
            };
        }

        let engine = Engine {
            integrator: cfg.engine.integrator,
            steps: cfg.run.steps,
            report_every: cfg.run.report_every.unwrap_or(cfg.run.steps).max(1),
        };

        Ok(Self {
            engine,
            parameters: build_parameters(&cfg.parameters),
            context: Context::new(ParticleState::new(particles), forces),
        })
    }

    /// Build the configured integrator and bind it to this scenario's context
    pub fn integrator(&self) -> Result<Box<dyn Integrator>, IntegratorError> {
        let mut integrator = self.engine.build_integrator(&self.parameters);
        integrator.initialize(&self.context)?;
        Ok(integrator)
    }
}

fn build_parameters(p_cfg: &ParametersConfig) -> IntegratorConfig {
    let defaults = IntegratorConfig::new(p_cfg.step_size, p_cfg.accuracy);
    IntegratorConfig {
        min_step: p_cfg.min_step.unwrap_or(defaults.min_step),
        max_step: p_cfg.max_step.unwrap_or(defaults.max_step),
        growth_cap: p_cfg.growth_cap.unwrap_or(defaults.growth_cap),
        shrink_floor: p_cfg.shrink_floor.unwrap_or(defaults.shrink_floor),
        max_rejections: p_cfg.max_rejections.unwrap_or(defaults.max_rejections),
        strict: p_cfg.strict,
        ..defaults
    }
}

fn build_particle(i: usize, pc: &ParticleConfig) -> Result<Particle, IntegratorError> {
    if !(pc.m >= 0.0 && pc.m.is_finite()) {
        return Err(IntegratorError::config(format!(
            "particle {} has invalid mass {}",
            i, pc.m
        )));
    }
    Ok(Particle::new(
        vec3(&format!("particle {} position", i), &pc.x)?,
        vec3(&format!("particle {} velocity", i), &pc.v)?,
        pc.m,
    ))
}

fn vec3(what: &str, v: &[f64]) -> Result<NVec3, IntegratorError> {
    match v {
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        _ => Err(IntegratorError::config(format!(
            "{} needs 3 components, got {}",
            what,
            v.len()
        ))),
    }
}
