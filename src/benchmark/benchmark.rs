use std::time::Instant;

use crate::error::IntegratorError;
use crate::simulation::context::Context;
use crate::simulation::forces::{ForceField, HarmonicWell, NewtonianGravity};
use crate::simulation::integrator::{Integrator, VariableVerletIntegrator, VerletIntegrator};
use crate::simulation::states::{NVec3, Particle, ParticleState};

/// Helper to build a deterministic cloud of `n` particles
fn make_state(n: usize) -> ParticleState {
    let particles = (0..n)
        .map(|i| {
            let i_f = i as f64;
            // deterministic positions, no rand needed
            let x = NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            Particle::new(x, NVec3::zeros(), 1.0)
        })
        .collect();
    ParticleState::new(particles)
}

/// Gravity plus a confining well so the cloud stays bounded
fn make_context(n: usize) -> Context {
    let forces = ForceField::new()
        .with(NewtonianGravity { G: 0.1, eps2: 1e-2 })
        .with(HarmonicWell {
            k: 0.5,
            anchor: NVec3::zeros(),
        });
    Context::new(make_state(n), forces)
}

/// Wall-clock time per accepted step for fixed and variable Verlet
pub fn bench_verlet() -> Result<(), IntegratorError> {
    let ns = [100, 200, 400, 800, 1600];
    let steps = 5; // number of integrator steps per model (tune as needed)

    for n in ns {
        // Fixed step
        let mut ctx_fixed = make_context(n);
        let mut fixed = VerletIntegrator::new(0.001);
        fixed.initialize(&ctx_fixed)?;

        // Warm-up
        fixed.step(&mut ctx_fixed, 1)?;

        let t0 = Instant::now();
        fixed.step(&mut ctx_fixed, steps)?;
        let fixed_per_step = t0.elapsed().as_secs_f64() / steps as f64;

        // Variable step
        let mut ctx_var = make_context(n);
        let mut variable = VariableVerletIntegrator::new(0.001, 1e-3);
        variable.initialize(&ctx_var)?;

        variable.step(&mut ctx_var, 1)?;

        let t1 = Instant::now();
        variable.step(&mut ctx_var, steps)?;
        let var_per_step = t1.elapsed().as_secs_f64() / steps as f64;

        println!(
            "N = {:5}, fixed step = {:8.6} s, variable step = {:8.6} s, avg h = {:.3e}",
            n,
            fixed_per_step,
            var_per_step,
            variable.stats().average_step()
        );
    }
    Ok(())
}

/// Average accepted step size and rejection count against accuracy
/// Paste output directly into a spreadsheet to graph
pub fn bench_variable_verlet_curve() -> Result<(), IntegratorError> {
    let n = 200;
    let steps = 500;

    println!("accuracy,avg_step,rejected,forced,ms");

    for exp in 2..=7 {
        let accuracy = 10f64.powi(-exp);
        let mut ctx = make_context(n);
        let mut integrator = VariableVerletIntegrator::new(0.001, accuracy);
        integrator.initialize(&ctx)?;

        let t0 = Instant::now();
        integrator.step(&mut ctx, steps)?;
        let ms = t0.elapsed().as_secs_f64() * 1000.0;

        let stats = integrator.stats();
        println!(
            "{:e},{:.6e},{},{},{:.3}",
            accuracy,
            stats.average_step(),
            stats.rejected,
            stats.forced,
            ms
        );
    }
    Ok(())
}
