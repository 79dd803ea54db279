//! The command line front end: parses arguments, loads and overrides the parameters, runs the
//! model and writes its reports.
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::error::ResistanceError;
use crate::log::{info, set_log_level, LevelFilter};
use crate::model::Model;
use crate::parameters::Parameters;
use crate::report::{write_final_state_json, write_timestep_csv};

/// File name of the per-timestep report inside the output directory.
pub const TIMESTEP_REPORT: &str = "timesteps.csv";
/// File name of the final state summary inside the output directory.
pub const FINAL_STATE_REPORT: &str = "final_state.json";

/// Default cli arguments for the simulator
#[derive(Parser, Debug, Default)]
#[command(name = "tiered_resistance", version, about)]
pub struct BaseArgs {
    /// Random seed, overriding the one in the parameters file
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Optional path for a JSON parameters file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Optional directory for timesteps.csv and final_state.json
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Replace existing reports in the output directory
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Enable logging at the given level (error, warn, info, debug, trace)
    #[arg(short, long, value_parser = parse_log_level)]
    pub log_level: Option<LevelFilter>,

    /// Number of timesteps to run, overriding the parameters file
    #[arg(short, long)]
    pub timesteps: Option<usize>,

    /// Run without the rapid detection product
    #[arg(long)]
    pub no_product: bool,

    /// Show a progress bar over the timesteps
    #[arg(long)]
    pub progress: bool,
}

fn parse_log_level(level: &str) -> Result<LevelFilter, String> {
    level
        .parse()
        .map_err(|_| format!("unknown log level: {level:?}"))
}

impl BaseArgs {
    /// Loads the parameters file, if any, and applies the command line overrides.
    pub fn parameters(&self) -> Result<Parameters, ResistanceError> {
        let mut parameters = match &self.config {
            Some(path) => {
                info!("loading parameters from {}", path.display());
                Parameters::from_json_file(path)?
            }
            None => Parameters::default(),
        };
        if let Some(seed) = self.random_seed {
            parameters.seed = Some(seed);
        }
        if let Some(timesteps) = self.timesteps {
            parameters.num_timesteps = timesteps;
        }
        if self.no_product {
            parameters.product.in_use = false;
        }
        Ok(parameters)
    }
}

/// Parses the process's command line and runs the simulation.
///
/// # Errors
/// Returns an error if the parameters are invalid or a report cannot be written
pub fn run() -> Result<Model, ResistanceError> {
    run_with_args(BaseArgs::parse())
}

/// Runs the simulation described by `args` and writes its reports.
///
/// # Errors
/// Returns an error if the parameters are invalid or a report cannot be written
pub fn run_with_args(args: BaseArgs) -> Result<Model, ResistanceError> {
    if let Some(level) = args.log_level {
        set_log_level(level);
    }

    let parameters = args.parameters()?;
    let mut model = Model::new(&parameters)?;

    #[cfg(feature = "progress_bar")]
    if args.progress {
        crate::progress::init_timestep_progress_bar(parameters.num_timesteps);
    }
    model.run(parameters.num_timesteps)?;

    if let Some(output_dir) = &args.output_dir {
        write_reports(&model, output_dir, args.force_overwrite)?;
    }
    Ok(model)
}

/// Writes the timestep report and the final state into `output_dir`.
pub fn write_reports(
    model: &Model,
    output_dir: &Path,
    overwrite: bool,
) -> Result<(), ResistanceError> {
    write_timestep_csv(
        &output_dir.join(TIMESTEP_REPORT),
        &model.config().formulary,
        model.tabulation(),
        overwrite,
    )?;
    write_final_state_json(
        &output_dir.join(FINAL_STATE_REPORT),
        &model.final_state(),
        overwrite,
    )
}
