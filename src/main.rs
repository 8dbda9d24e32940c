use vverlet::{bench_variable_verlet_curve, bench_verlet};
use vverlet::{Scenario, ScenarioConfig};

use anyhow::Result;
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under scenarios/
    #[arg(short, default_value = "harmonic.yaml")]
    file_name: String,

    /// Override the number of steps in the scenario
    #[arg(long)]
    steps: Option<usize>,

    /// Run the benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_verlet()?;
        bench_variable_verlet_curve()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg)?;
    if let Some(steps) = args.steps {
        scenario.engine.steps = steps;
    }

    let mut integrator = scenario.integrator()?;
    info!(
        "running {} with kernels {:?}",
        args.file_name,
        integrator.kernel_names()
    );

    let mut done = 0;
    while done < scenario.engine.steps {
        let chunk = scenario.engine.report_every.min(scenario.engine.steps - done);
        integrator.step(&mut scenario.context, chunk)?;
        done += chunk;

        println!(
            "step {:6}  t = {:12.6}  KE = {:14.8e}",
            done,
            integrator.time(),
            scenario.context.state().kinetic_energy()
        );
    }

    Ok(())
}
