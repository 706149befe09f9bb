//! Jet response: heavy-ion jet energy scale and resolution validation
//!
//!
//! # Introduction (for the physicist)
//!
//! This program measures how well reconstructed jets reproduce the transverse
//! momentum of the generator-level jets which they originate from, in heavy-ion
//! collisions where a large underlying event smears and shifts the
//! reconstructed jet energies.
//!
//! Each generator jet is matched to the nearest reconstructed jet in (eta, phi)
//! space, and the ratio of their transverse momenta (the response) is recorded
//! as a function of detector region, generator jet pT and collision
//! centrality. The mean of the response is the jet energy scale, its spread is
//! the jet energy resolution.
//!
//!
//! # Introduction (for the computer guy)
//!
//! The program is organized like a small Monte Carlo job:
//!
//! * read in parameters and book the histograms
//! * loop over (randomly generated) events,
//!     * monitoring the event's jets and particle flow candidates,
//!     * matching generator jets to reconstructed jets,
//!     * accumulating the response of each match into its histogram cell
//! * then finalize, display and store the results.
//!
//! Events are processed in batches which each have their own histograms and
//! random number stream, so that the work may be spread across threads without
//! affecting the results.

#![warn(missing_docs)]

mod analyzer;
mod binning;
mod config;
mod evgen;
mod histogram;
mod jet;
mod kinematics;
mod matching;
mod monitor;
mod numeric;
mod output;
mod random;
mod resacc;
mod resfin;
mod scheduling;

use eyre::WrapErr;

use crate::{
    analyzer::JetResponseAnalyzer, config::Configuration, evgen::EventGenerator,
    random::RandomGenerator, resacc::ResultsAccumulator,
};

use std::time::Instant;

/// We'll use eyre's type-erased result type throughout the application
type Result<T> = eyre::Result<T>;

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    env_logger::init();

    // ### CONFIGURATION READOUT ###

    let config_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_FILE.to_string());
    let cfg = Configuration::load(&config_file).wrap_err("Failed to load the configuration")?;

    // ### ANALYSIS INITIALIZATION ###

    // Start the clock after configuration I/O, to avoid IO-induced timing
    // fluctuations
    let saved_time = Instant::now();

    let analyzer = JetResponseAnalyzer::configure(cfg.analysis_options());
    let evgen = EventGenerator::new().wrap_err("Failed to set up the event generator")?;

    // ### ANALYSIS EXECUTION ###

    // This kernel generates and analyzes a number of events, given an initial
    // random number generator state, and returns the accumulated histograms
    let analyze_events = |num_events: usize, rng: &mut RandomGenerator| -> ResultsAccumulator {
        let mut acc = analyzer.prepare_storage();
        for _ in 0..num_events {
            let event = evgen.generate(rng);
            match analyzer.process_event(&event, &mut acc) {
                Ok(summary) => log::trace!(
                    "Event with {} reco jets, {} matched gen jets",
                    summary.reco_jets,
                    summary.matched_gen_jets
                ),
                Err(reason) => log::debug!("Event abandoned: {}", reason),
            }
        }
        acc
    };

    let result = scheduling::run_analysis(cfg.num_events, cfg.seed, analyze_events);

    // ### RESULTS DISPLAY AND STORAGE ###

    let elapsed_time = saved_time.elapsed();
    log::info!(
        "Analyzed {} events in {:.3} s",
        cfg.num_events,
        elapsed_time.as_secs_f64()
    );

    output::dump_results(&cfg, &result, elapsed_time).wrap_err("Failed to output the results")?;

    Ok(())
}
