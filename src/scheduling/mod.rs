//! This module takes care of scheduling the analysis work, encapsulating use
//! of multiple threads and anything else that will come in the future

#[cfg(any(test, not(feature = "multi-threading")))]
mod sequential;
#[cfg(feature = "multi-threading")]
mod multi_threading;

use crate::{random::RandomGenerator, resacc::ResultsAccumulator, resfin::FinalResults};

/// Size of the analyzed event batches
///
/// Events are grouped in batches of a certain size, each of which is generated
/// from its own random number stream and accumulated into its own storage.
/// Batch results are then merged in batch order, which makes sequential and
/// parallel runs of the analysis produce identical results.
///
const EVENT_BATCH_SIZE: usize = 10_000;

/// Run the analysis in the manner that was configured at build time.
///
/// Takes as parameters the total number of events to be analyzed, the seed of
/// the random number generator, and a kernel that generates and analyzes a
/// certain number of events given an initial random number generator state.
///
/// Returns the finalized analysis results
///
pub fn run_analysis(
    num_events: usize,
    seed: u64,
    analyze_events: impl Send + Sync + Fn(usize, &mut RandomGenerator) -> ResultsAccumulator,
) -> FinalResults {
    // Check that the user is being reasonable (should have already been checked
    // at configuration time, but bugs can happen...)
    assert!(num_events > 0, "Must analyze at least one event");

    let rng = RandomGenerator::new(seed);

    let accumulator = {
        #[cfg(not(feature = "multi-threading"))]
        {
            sequential::run_analysis_impl(num_events, EVENT_BATCH_SIZE, rng, analyze_events)
        }

        #[cfg(feature = "multi-threading")]
        {
            multi_threading::run_analysis_impl(num_events, EVENT_BATCH_SIZE, rng, analyze_events)
        }
    };

    accumulator.finalize()
}

/// Number of batches needed to cover num_events
#[cfg(any(test, feature = "multi-threading"))]
fn num_batches(num_events: usize, batch_size: usize) -> usize {
    num_events / batch_size + usize::from(num_events % batch_size != 0)
}

/// Split off the random number stream of the next batch, and move the master
/// generator past it
fn next_batch_rng(rng: &mut RandomGenerator) -> RandomGenerator {
    let batch_rng = rng.clone();
    rng.jump();
    batch_rng
}
