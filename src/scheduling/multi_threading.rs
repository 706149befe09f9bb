//! Multi-threaded back-end of the analysis

use crate::{
    random::RandomGenerator,
    resacc::ResultsAccumulator,
    scheduling::{next_batch_rng, num_batches},
};

use std::sync::Mutex;

/// Analyze event batches as parallel rayon tasks
///
/// Batch random number streams are handed out in batch order before any task
/// runs, and batch results are merged in that same order once every task is
/// done, so the thread count and task timing never show up in the histograms.
///
pub fn run_analysis_impl(
    mut num_events: usize,
    batch_size: usize,
    mut rng: RandomGenerator,
    analyze_events: impl Send + Sync + Fn(usize, &mut RandomGenerator) -> ResultsAccumulator,
) -> ResultsAccumulator {
    assert!(num_events > 0, "Must analyze at least one event");

    let num_batches = num_batches(num_events, batch_size);
    let batch_results = BatchResults::new(num_batches);

    // Returns once every batch task has completed
    rayon::scope(|scope| {
        for batch_id in 0..num_batches {
            let current_batch_size = num_events.min(batch_size);
            num_events -= current_batch_size;

            let mut batch_rng = next_batch_rng(&mut rng);
            let batch_results = &batch_results;
            let analyze_events = &analyze_events;
            scope.spawn(move |_| {
                let histograms = analyze_events(current_batch_size, &mut batch_rng);
                batch_results.store(batch_id, histograms);
            });
        }
    });

    batch_results.merge_in_order()
}

/// Histograms of each event batch, kept apart until every batch is done
struct BatchResults {
    /// One slot per batch, indexed by batch number
    slots: Box<[Mutex<Option<ResultsAccumulator>>]>,
}
//
impl BatchResults {
    /// Reserve one empty slot per batch
    fn new(num_batches: usize) -> Self {
        assert!(num_batches > 0, "There should be at least one batch");
        Self {
            slots: (0..num_batches).map(|_| Mutex::new(None)).collect(),
        }
    }

    /// Record the histograms of one batch, in whatever order batches finish
    fn store(&self, batch_id: usize, histograms: ResultsAccumulator) {
        let mut slot = self.slots[batch_id]
            .lock()
            .expect("Mutex data should be valid");
        assert!(slot.is_none(), "Batch {} was analyzed twice", batch_id);
        *slot = Some(histograms);
    }

    /// Merge every batch into the first one, by increasing batch number
    fn merge_in_order(self) -> ResultsAccumulator {
        let mut batches = self.slots.into_vec().into_iter().map(|slot| {
            slot.into_inner()
                .expect("Mutex data should be valid")
                .expect("Every batch should have been analyzed")
        });
        let first = batches.next().expect("There should be at least one batch");
        batches.fold(first, |mut merged, batch| {
            merged.merge(batch);
            merged
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::tests::options;

    fn batch(processed: usize) -> ResultsAccumulator {
        let mut acc = ResultsAccumulator::new(&options());
        acc.counters.processed = processed;
        acc.monitor.fill_hf_energy(processed as crate::numeric::Float);
        acc
    }

    #[test]
    fn late_batches_do_not_reorder_the_merge() {
        let slots = BatchResults::new(3);
        slots.store(2, batch(30));
        slots.store(0, batch(10));
        slots.store(1, batch(20));
        let merged = slots.merge_in_order();

        let mut expected = batch(10);
        expected.merge(batch(20));
        expected.merge(batch(30));
        assert_eq!(merged, expected);
    }

    #[test]
    #[should_panic]
    fn missing_batches_are_a_bug() {
        let slots = BatchResults::new(2);
        slots.store(0, batch(1));
        slots.merge_in_order();
    }
}
