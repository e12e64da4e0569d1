// CLI entry for binseg
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use log::{info, warn};

use binseg::kmeans::{InitMethod, KMeansConfig};
use binseg::mean_shift::{MeanShiftParams, UpdateMode};
use binseg::pipeline::{
    process_kmeans, process_kmeans_posterize, process_mean_shift, KMeansParams, MeanShiftJob, KMEANS_OUTPUT,
    MEAN_SHIFT_BINARY_OUTPUT, MEAN_SHIFT_OUTPUT,
};

#[derive(Parser, Debug)]
#[command(name = "binseg", version, about = "Binary color image segmentation (k-means / mean-shift)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Two-cluster k-means on pixel colors
    Kmeans(KmeansArgs),
    /// Mean-shift filtering followed by global binarization
    Meanshift(MeanshiftArgs),
}

#[derive(clap::Args, Debug)]
struct KmeansArgs {
    /// Input image path
    #[arg(value_hint = ValueHint::FilePath)]
    image: PathBuf,
    /// Number of clusters (the binary mask needs 2)
    k: usize,
    /// Initialization: "perso"/"custom" or "opcv"/"reference"
    method: Option<String>,
    /// Ground-truth mask; enables metric reporting
    #[arg(value_hint = ValueHint::FilePath)]
    ground_truth: Option<PathBuf>,

    /// Iteration cap
    #[arg(long = "max-iterations")]
    max_iterations: Option<usize>,
    /// Seed for center initialization (random when omitted)
    #[arg(long = "seed")]
    seed: Option<u64>,
    /// Write a posterized color image when K is not 2
    #[arg(long = "posterize", action = ArgAction::SetTrue)]
    posterize: bool,
    /// Output image path
    #[arg(short = 'o', long = "output", value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct MeanshiftArgs {
    /// Input image path
    #[arg(value_hint = ValueHint::FilePath)]
    image: PathBuf,
    /// Spatial radius (window half-width is hs/2)
    #[arg(allow_negative_numbers = true)]
    hs: f64,
    /// Color radius
    #[arg(allow_negative_numbers = true)]
    hc: f64,
    /// Per-pixel convergence threshold
    #[arg(allow_negative_numbers = true)]
    epsilon: f64,
    /// Per-pixel iteration cap
    #[arg(allow_negative_numbers = true)]
    kmax: i64,
    /// Ground-truth mask
    #[arg(value_hint = ValueHint::FilePath)]
    ground_truth: PathBuf,

    /// Update mode: "inplace" (default) or "snapshot"
    #[arg(long = "mode")]
    mode: Option<String>,
    /// Invert the mask when it is mostly black
    #[arg(long = "normalize-polarity", action = ArgAction::SetTrue)]
    normalize_polarity: bool,
    /// Binary output image path
    #[arg(short = 'o', long = "output", value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
    /// Filtered color image path
    #[arg(long = "filtered-output", value_hint = ValueHint::FilePath)]
    filtered_output: Option<PathBuf>,
}

fn build_config(args: &KmeansArgs) -> KMeansConfig {
    let mut cfg = KMeansConfig { k: args.k, ..KMeansConfig::default() };
    if let Some(m) = &args.method { cfg.init = InitMethod::from_name(m); }
    if let Some(v) = args.max_iterations { cfg.max_iterations = v; }
    if let Some(v) = args.seed { cfg.seed = Some(v); }
    cfg
}

fn build_params(args: &MeanshiftArgs) -> Result<MeanShiftParams> {
    let mut params = MeanShiftParams::new(args.hs, args.hc, args.epsilon, args.kmax)?;
    if let Some(m) = &args.mode { params = params.with_mode(UpdateMode::from_name(m)); }
    Ok(params)
}

fn run_kmeans(args: KmeansArgs) -> Result<()> {
    let config = build_config(&args);
    let output = args.output.clone().unwrap_or_else(|| PathBuf::from(KMEANS_OUTPUT));
    let params = KMeansParams { in_image_name: args.image, ground_truth_name: args.ground_truth, out_image_name: output, config };

    if params.config.k != 2 {
        if !args.posterize {
            bail!(
                "K={} given, but the binary segmentation uses exactly 2 clusters (pass --posterize for a K-color image)",
                params.config.k
            );
        }
        if params.ground_truth_name.is_some() {
            warn!("ground truth ignored: metrics need a binary mask");
        }
        process_kmeans_posterize(params)?;
        return Ok(());
    }

    let report = process_kmeans(params)?;
    println!("k-means: {} iterations (converged: {})", report.iterations, report.converged);
    if let Some(m) = report.metrics {
        println!("--------------------");
        println!("{m}");
    }
    Ok(())
}

fn run_meanshift(args: MeanshiftArgs) -> Result<()> {
    let params = build_params(&args)?;
    let job = MeanShiftJob {
        in_image_name: args.image,
        ground_truth_name: Some(args.ground_truth),
        filtered_image_name: args.filtered_output.unwrap_or_else(|| PathBuf::from(MEAN_SHIFT_OUTPUT)),
        out_image_name: args.output.unwrap_or_else(|| PathBuf::from(MEAN_SHIFT_BINARY_OUTPUT)),
        params,
        normalize_polarity: args.normalize_polarity,
    };
    let report = process_mean_shift(job)?;
    println!("binarization threshold = {:.6}", report.threshold);
    if let Some(m) = report.metrics {
        println!("--------------------");
        println!("{m}");
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            // status 1 for usage errors; nothing to report if stderr is gone
            e.print().ok();
            return ExitCode::FAILURE;
        }
        Err(e) => e.exit(),
    };
    info!("{:?}", cli.command);

    let result = match cli.command {
        Command::Kmeans(args) => run_kmeans(args),
        Command::Meanshift(args) => run_meanshift(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
