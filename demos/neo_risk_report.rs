use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use neorisk::records::{read_observations, write_results};
use neorisk::{
    ImpactEngine, NeoRiskError, ObjectObservation, SigmaScale, SimulationConfig,
    SimulationResult, UncertaintyProfile,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Output {
    /// Full text report per object
    Report,
    /// One summary line per object
    Summary,
    /// Flat CSV rows on stdout
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "neo_risk_report")]
#[command(about = "Monte Carlo impact-risk estimates for near-Earth close approaches")]
struct Args {
    /// CSV of close approaches (neo_id,miss_distance_km,velocity_km_s,orbit_uncertainty,
    /// is_potentially_hazardous). Built-in sample objects are used when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Optional calibration CSV (class,sigma)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Interpret calibration entries as kilometers instead of fractions of the miss distance
    #[arg(long)]
    absolute_sigma: bool,

    /// Trial ceiling per object
    #[arg(long, default_value_t = 100_000)]
    max_trials: usize,

    /// Two-sided confidence level of the Wilson interval
    #[arg(long, default_value_t = 0.95)]
    confidence: f64,

    /// Run every object to the trial ceiling
    #[arg(long)]
    no_early_stop: bool,

    /// Base seed of the batch
    #[arg(long, default_value_t = 2029)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = Output::Report)]
    output: Output,
}

fn sample_objects() -> Vec<ObjectObservation> {
    vec![
        // Apophis 2029 flyby
        ObjectObservation::new("99942 Apophis", 31_600.0, 7.4, 4, true),
        ObjectObservation::new("2023 BU", 9_970.0, 9.3, 6, false),
        ObjectObservation::new("2012 DA14", 34_100.0, 7.8, 1, false),
        ObjectObservation::new("distant", 5_000_000.0, 15.0, 0, false),
    ]
}

fn main() -> Result<(), NeoRiskError> {
    env_logger::init();
    let args = Args::parse();

    let scale = if args.absolute_sigma {
        SigmaScale::Absolute
    } else {
        SigmaScale::Relative
    };
    let profile = match &args.profile {
        Some(path) => UncertaintyProfile::from_csv_reader(File::open(path)?, scale)?,
        None => UncertaintyProfile::default(),
    };
    let config = SimulationConfig::builder()
        .max_trials(args.max_trials)
        .confidence_level(args.confidence)
        .early_stop(!args.no_early_stop)
        .build()?;

    let observations = match &args.input {
        Some(path) => read_observations(File::open(path)?)?,
        None => sample_objects(),
    };

    if !matches!(args.output, Output::Csv) {
        println!("{config:#}");
        println!("{profile:#}");
    }

    let engine = ImpactEngine::new(profile, config)?;
    let mut results: Vec<SimulationResult> = Vec::with_capacity(observations.len());
    for (neo_id, outcome) in engine.simulate_batch(&observations, args.seed) {
        match outcome {
            Ok(result) => results.push(result),
            Err(err) => eprintln!("{neo_id}: {err}"),
        }
    }
    results.sort_by(|a, b| b.impact_probability.total_cmp(&a.impact_probability));

    match args.output {
        Output::Report => results.iter().for_each(|r| println!("{r:#}\n")),
        Output::Summary => results.iter().for_each(|r| println!("{r}")),
        Output::Csv => write_results(stdout().lock(), &results)?,
    }
    Ok(())
}
