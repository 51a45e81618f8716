//! Gramexp Command Line Interface
//!
//! Runs kernel-matrix classification experiments: loads a precomputed
//! kernel matrix and a label list, evaluates repeated train/test trials,
//! and reports the average accuracy.

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use gramexp::core::Result;
use gramexp::data::read_labels;
use gramexp::harness::Harness;
use gramexp::matrix::KernelMatrix;
use gramexp::report::RunReport;
use gramexp::utils::ClassDistribution;
use log::{error, info};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "gramexp")]
#[command(about = "Kernel-matrix classification experiment harness")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run repeated train/test trials over a kernel matrix
    Run(RunArgs),
    /// Display kernel matrix and label diagnostics
    Inspect(InspectArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Kernel matrix file
    #[arg(short, long)]
    kernel: PathBuf,

    /// Label list file
    #[arg(short, long)]
    labels: PathBuf,

    /// Number of classes (default: max label + 1)
    #[arg(long)]
    classes: Option<usize>,

    /// Held-out testing items per class per trial
    #[arg(short, long, default_value = "1")]
    test_size: usize,

    /// Number of trials to run
    #[arg(long, default_value = "1")]
    trials: usize,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "10000")]
    cost: f64,

    /// Convergence tolerance
    #[arg(short = 'e', long, default_value = "0.001")]
    tolerance: f64,

    /// Optimizer iteration budget per binary subproblem
    #[arg(short, long, default_value = "10000")]
    max_iterations: usize,

    /// Write a JSON run report to this path
    #[arg(short, long)]
    report: Option<PathBuf>,
}

#[derive(Args)]
struct InspectArgs {
    /// Kernel matrix file
    #[arg(short, long)]
    kernel: PathBuf,

    /// Label list file (optional)
    #[arg(short, long)]
    labels: Option<PathBuf>,

    /// Number of classes (default: max label + 1)
    #[arg(long)]
    classes: Option<usize>,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Run(args) => run_command(args),
        Commands::Inspect(args) => inspect_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(args: RunArgs) -> Result<()> {
    info!("Loading kernel matrix from {:?}", args.kernel);
    let matrix = KernelMatrix::from_file(&args.kernel)?;
    info!("Loaded {} items", matrix.size());

    info!("Loading labels from {:?}", args.labels);
    let labels = read_labels(&args.labels)?;

    let mut harness = Harness::new(matrix, labels)?
        .with_test_size(args.test_size)
        .with_cost(args.cost)
        .with_tolerance(args.tolerance)
        .with_max_iterations(args.max_iterations);

    if let Some(classes) = args.classes {
        harness = harness.with_classes(classes);
    }

    info!(
        "Running {} trials: {} classes, test size {}, C={}",
        args.trials,
        harness.num_classes(),
        harness.test_size(),
        harness.cost()
    );

    let summary = harness.run(args.trials)?;

    println!("=== Experiment Results ===");
    println!("Corpus size: {}", harness.corpus_size());
    println!("Classes: {}", harness.num_classes());
    println!("Trials: {}", summary.num_trials());
    for result in summary.results() {
        println!(
            "  trial {}: {}/{} correct ({:.2}%)",
            result.trial,
            result.num_correct,
            result.num_test,
            result.accuracy() * 100.0
        );
    }
    println!("Average accuracy: {:.4}", summary.mean_accuracy());

    if let Some(report_path) = args.report {
        let report = RunReport::from_run(&harness, &summary);
        report.save_to_file(&report_path)?;
        info!("Report saved to {report_path:?}");
    }

    Ok(())
}

fn inspect_command(args: InspectArgs) -> Result<()> {
    info!("Loading kernel matrix from {:?}", args.kernel);
    let matrix = KernelMatrix::from_file(&args.kernel)?;

    let mut diag_min = f64::INFINITY;
    let mut diag_max = f64::NEG_INFINITY;
    for i in 0..matrix.size() {
        let value = matrix.value_at(i, i);
        diag_min = diag_min.min(value);
        diag_max = diag_max.max(value);
    }

    println!("=== Kernel Matrix ===");
    println!("Items: {}", matrix.size());
    if matrix.size() > 0 {
        println!("Diagonal range: [{diag_min}, {diag_max}]");
    }

    if let Some(label_path) = args.labels {
        let labels = read_labels(&label_path)?;
        if labels.len() != matrix.size() {
            error!(
                "label list has {} entries for {} matrix items",
                labels.len(),
                matrix.size()
            );
        }

        let num_classes = args
            .classes
            .unwrap_or_else(|| labels.iter().max().map_or(0, |&max| max + 1));
        let dist = ClassDistribution::fit(&labels, num_classes);

        println!("\n=== Labels ===");
        println!("Items: {}", labels.len());
        println!("Classes: {num_classes}");
        for (class, count) in dist.entries() {
            println!("  class {class}: {count} items");
        }
        if dist.excluded() > 0 {
            println!("  excluded (label >= {num_classes}): {}", dist.excluded());
        }
    }

    Ok(())
}
