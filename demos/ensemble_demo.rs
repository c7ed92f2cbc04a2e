use ou_sde::analytics::ou_analytic;
use ou_sde::mc::batch::Executor;
use ou_sde::mc::ensemble::{simulate_ensemble, Ensemble, EnsembleConfig};
use ou_sde::models::ou_process::OuParams;
use ou_sde::output;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let config = EnsembleConfig {
        replicates: 10_000,
        num_steps: 200,
        params: OuParams {
            x0: 5.0,
            ..OuParams::default()
        },
        seed: 2024,
        executor: Executor::available_parallelism(),
    };

    println!(
        "OU ensemble: {} replicates × {} steps",
        config.replicates, config.num_steps
    );
    println!("Parameters: {:?}\n", config.params);

    let ensemble = simulate_ensemble(&config)?;
    let means = ensemble.mean_path();
    let variances = ensemble.variance_path();

    println!("{:>6} {:>10} {:>10} {:>10} {:>10}", "step", "mean", "exact", "var", "exact");
    for step in [0, 1, 5, 10, 25, 50, 100, 200] {
        println!(
            "{:>6} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
            step,
            means[step],
            ou_analytic::mean_at(&config.params, step)?,
            variances[step],
            ou_analytic::variance_at(&config.params, step)?,
        );
    }

    let fit = ou_analytic::estimate_params(&ensemble.paths()[0], config.params.dt)?;
    println!("\nFitted from replicate 0: tau = {:.3}, sigma = {:.3}", fit.tau, fit.sigma);

    std::fs::create_dir_all("results")?;
    let head = Ensemble::from_paths(ensemble.paths()[..10].to_vec(), config.params)?;
    output::write_ensemble_to_csv("results/ou_ensemble_head.csv", &head)?;

    let replicates = config.replicates.to_string();
    let num_steps = config.num_steps.to_string();
    let terminal_var = variances[config.num_steps].to_string();
    output::write_summary_to_csv(
        "results/ou_summary.csv",
        &[
            ("replicates", replicates.as_str()),
            ("num_steps", num_steps.as_str()),
            ("terminal_variance", terminal_var.as_str()),
        ],
    )?;
    println!("Wrote results/ou_ensemble_head.csv and results/ou_summary.csv");

    Ok(())
}
