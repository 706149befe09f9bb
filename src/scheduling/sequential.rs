//! Sequential back-end of the analysis

use crate::{
    random::RandomGenerator,
    resacc::ResultsAccumulator,
    scheduling::next_batch_rng,
};

/// Analyze events one batch after another on the current thread
///
/// Each batch draws its events from its own random number stream and fills
/// its own histograms, exactly as a thread of the multi-threaded back-end
/// would, so both back-ends produce identical histograms for a given seed.
///
pub fn run_analysis_impl(
    mut num_events: usize,
    batch_size: usize,
    mut rng: RandomGenerator,
    analyze_events: impl Fn(usize, &mut RandomGenerator) -> ResultsAccumulator,
) -> ResultsAccumulator {
    assert!(num_events > 0, "Must analyze at least one event");

    // The first batch provides the storage which later batches merge into
    let first_batch_size = num_events.min(batch_size);
    num_events -= first_batch_size;
    let mut accumulator = analyze_events(first_batch_size, &mut next_batch_rng(&mut rng));

    while num_events > 0 {
        let current_batch_size = num_events.min(batch_size);
        num_events -= current_batch_size;
        accumulator.merge(analyze_events(current_batch_size, &mut next_batch_rng(&mut rng)));
        log::debug!("{} events left to be analyzed", num_events);
    }

    accumulator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::tests::options;

    use std::cell::RefCell;

    #[test]
    fn batches_cover_every_event() {
        let batch_sizes = RefCell::new(Vec::new());
        let kernel = |num_events: usize, rng: &mut RandomGenerator| {
            batch_sizes.borrow_mut().push(num_events);
            let mut acc = ResultsAccumulator::new(&options());
            acc.counters.processed = num_events;
            // Every batch starts from a fresh stream
            acc.counters.real_data = (rng.random() * 1e6) as usize;
            acc
        };
        let result = run_analysis_impl(23, 10, RandomGenerator::new(4), kernel);
        assert_eq!(batch_sizes.into_inner(), vec![10, 10, 3]);
        assert_eq!(result.counters.processed, 23);

        let mut rng = RandomGenerator::new(4);
        let draws: usize = (0..3)
            .map(|_| (next_batch_rng(&mut rng).random() * 1e6) as usize)
            .sum();
        assert_eq!(result.counters.real_data, draws);
    }
}
