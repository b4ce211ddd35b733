use clap::Parser;
use log::{info, debug, warn};
use std::path::PathBuf;

mod config;
mod models;
mod dosing;
mod simulation;
mod error;

use crate::config::Config;
use crate::simulation::{Simulator, SeriesSummary};
use crate::error::PKError;

#[derive(Parser)]
#[command(name = "infusion_sim")]
#[command(about = "Plasma concentration simulation for loading dose plus recurring IV maintenance infusions")]
struct Cli {
    /// Configuration file path (JSON)
    #[arg(short, long)]
    config: PathBuf,
    
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), PKError> {
    let cli = Cli::parse();
    
    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
    
    let config = Config::from_file(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);
    
    let simulator = Simulator::new(&config)?;
    let params = simulator.parameters();
    info!(
        "Vd = {:.2} L, CL = {:.3} L/h, ke = {:.4} 1/h, t1/2 = {:.2} h",
        params.distribution_volume, params.clearance, params.ke, params.half_life
    );
    let regimen = simulator.regimen();
    info!(
        "Loading dose {} mg, then {} mg over {} h every {} h for {} h (step {} h)",
        regimen.loading_dose,
        regimen.maintenance_dose,
        regimen.infusion_duration,
        regimen.dosing_interval,
        regimen.treatment_duration,
        regimen.time_step
    );
    
    let series = simulator.run();
    let summary = SeriesSummary::from_series(&series, config.therapeutic_band);
    
    info!(
        "Cmax {:.2} mg/L at {:.1} h, Cmin {:.2} mg/L, AUC {:.1} mg*h/L",
        summary.cmax, summary.tmax, summary.cmin, summary.auc
    );
    info!(
        "{:.1}% of time points within {}-{} mg/L ({:.1}% below, {:.1}% above)",
        summary.fraction_in_band * 100.0,
        summary.band.lower,
        summary.band.upper,
        summary.fraction_below * 100.0,
        summary.fraction_above * 100.0
    );
    for (i, trough) in summary.troughs.iter().enumerate() {
        if !summary.band.contains(*trough) {
            warn!("Trough before maintenance dose #{} is {:.2} mg/L, outside the therapeutic band", i + 1, trough);
        }
    }
    debug!("Summary: {}", serde_json::to_string_pretty(&summary)?);
    
    Ok(())
}
