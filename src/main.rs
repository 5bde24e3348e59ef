//! Genetic Expression CLI - Evolve a formula that fits a target expression.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::PathBuf;

use genetic_expression::{
    ast::parse,
    compute::{
        evolution::{FitnessEvaluator, GeneticExpressionGenerator, ProgressCallback, SearchProgress},
        node_count,
    },
    schema::RunConfig,
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <target-expression> [config.json]", args[0]);
        eprintln!();
        eprintln!("Search for a formula in x and y matching the target over a sample grid.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  target-expression  Expression to sample, e.g. \"x * x + y\"");
        eprintln!("  config.json        Path to run configuration file (default: built-in)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config = match args.get(2) {
        Some(path) => RunConfig::from_json_file(PathBuf::from(path)).unwrap_or_else(|e| {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }),
        None => RunConfig::default(),
    };

    let target = match parse(&args[1]) {
        Ok(Some(target)) => target,
        Ok(None) => {
            eprintln!("Error: target expression is empty");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error parsing target expression: {}", e);
            std::process::exit(1);
        }
    };

    let evaluator = FitnessEvaluator::new(config.x_bound, config.y_bound);
    let mut theoretical = evaluator.grid();
    if let Err(e) = evaluator.compute(&target, &mut theoretical) {
        eprintln!("Error sampling target: {}", e);
        std::process::exit(1);
    }

    println!("Genetic Expression Search");
    println!("=========================");
    println!("Target: {} ({} nodes)", target, node_count(&target));
    println!(
        "x: [{}, {}] in {} steps, y: [{}, {}] in {} steps",
        config.x_bound.lower(),
        config.x_bound.upper(),
        config.x_bound.step_count(),
        config.y_bound.lower(),
        config.y_bound.upper(),
        config.y_bound.step_count()
    );
    println!(
        "Population: {}, generations: {}",
        config.search.population_size, config.search.generation_count
    );
    println!();

    let mut engine = GeneticExpressionGenerator::new(
        theoretical,
        config.x_bound,
        config.y_bound,
        config.search.clone(),
    )
    .unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    // Print progress every 10%
    let interval = (config.search.generation_count / 10).max(1);
    let report: ProgressCallback = Box::new(move |progress: &SearchProgress| {
        if progress.generation % interval == 0 {
            println!(
                "  Generation {}/{}: difference={:.6e}, size={}, elites={}",
                progress.generation,
                progress.total_generations,
                progress.best_difference,
                progress.best_size,
                progress.elite_count
            );
        }
    });

    let result = engine.run_with_callback(report).unwrap_or_else(|e| {
        eprintln!("Search failed: {}", e);
        std::process::exit(1);
    });

    println!();
    println!("Best expression: {}", result.best.expression);
    println!("  Size: {}", result.best.size);
    println!("  Difference: {:.6e}", result.best.difference);
    println!(
        "Time: {:.2}s ({} evaluations, {:?})",
        result.stats.elapsed_seconds, result.stats.evaluations, result.stats.stop_reason
    );
}

fn print_example_config() {
    let config = RunConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
