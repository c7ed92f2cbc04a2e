use ou_sde::error::SdeError;
use ou_sde::mc::batch::{run_replicates, CancellationToken, Executor, ReplicateJob};
use ou_sde::mc::ensemble::{simulate_ensemble, EnsembleConfig};
use ou_sde::models::ou_process::{evaluate, OuParams};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    println!("Error Handling Demo for ou-sde");
    println!("==============================\n");

    // Test 1: Noise shorter than the number of steps
    println!("1. Testing short noise sequence...");

    match evaluate(5, &[0.1, -0.2, 0.3], &OuParams::default()) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 2: Non-positive relaxation time
    println!("\n2. Testing invalid tau...");

    let bad_tau = OuParams {
        tau: 0.0,
        ..OuParams::default()
    };
    match evaluate(3, &[0.0; 3], &bad_tau) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 3: Zero sigma is valid and deterministic
    println!("\n3. Testing sigma = 0...");

    let quiet = OuParams {
        x0: 1.0,
        sigma: 0.0,
        ..OuParams::default()
    };
    match evaluate(3, &[1.0, 1.0, 1.0], &quiet) {
        Ok(path) => println!("   ✓ Deterministic decay: {:?}", path.as_slice()),
        Err(e) => println!("   Unexpected error: {}", e),
    }

    // Test 4: Invalid ensemble configuration
    println!("\n4. Testing invalid ensemble configuration...");

    let invalid_config = EnsembleConfig {
        replicates: 0,
        ..Default::default()
    };
    match simulate_ensemble(&invalid_config) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 5: One failing replicate in a batch
    println!("\n5. Testing a batch with one bad replicate...");

    let mut jobs: Vec<ReplicateJob> = (0..4)
        .map(|_| ReplicateJob::new(3, vec![0.5, -0.5, 0.5], OuParams::default()))
        .collect();
    jobs[2].params.dt = -0.1;

    match run_replicates(&jobs, &Executor::Rayon, &CancellationToken::new()) {
        Ok(report) => {
            println!(
                "   ✓ {} of {} replicates succeeded",
                report.successes().count(),
                report.requested
            );
            for (index, error) in report.failures() {
                println!("   ✓ Replicate {} failed: {}", index, error);
            }
        }
        Err(e) => println!("   Unexpected error: {}", e),
    }

    // Test 6: Error type matching
    println!("\n6. Testing error type matching...");

    match evaluate(2, &[0.0, 0.0], &OuParams { sigma: -1.0, ..OuParams::default() }) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(SdeError::InvalidArgument { parameter, reason }) => {
            println!("   ✓ Caught InvalidArgument: {} ({})", parameter, reason);
        }
        Err(other) => println!("   Unexpected error type: {}", other),
    }

    println!("\n✓ Error handling demo complete!");
}
