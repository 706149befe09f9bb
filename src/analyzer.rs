//! Per-event driver of the jet response analysis

use crate::{
    binning::RegionBounds,
    jet::{Event, ParticleId},
    matching,
    numeric::Float,
    resacc::ResultsAccumulator,
};
use thiserror::Error;

/// Which particle flow species histograms a candidate is recorded into
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PfFillPolicy {
    /// Only the histograms of the candidate's own species
    OwnSpecies,

    /// The candidate's own species and every species with a higher id, which
    /// reproduces historical monitoring plots
    Cumulative,
}
//
impl PfFillPolicy {
    /// Species whose histograms receive a candidate of species `id`
    pub fn species_to_fill(self, id: ParticleId) -> &'static [ParticleId] {
        let idx = id.index();
        match self {
            Self::OwnSpecies => &ParticleId::ALL[idx..=idx],
            Self::Cumulative => &ParticleId::ALL[idx..],
        }
    }
}

/// Tunable parameters of the analysis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalysisOptions {
    /// Minimal pT (GeV) of reconstructed jets in the monitoring spectra
    pub reco_jet_pt_threshold: Float,

    /// Minimal pT (GeV) of generator jets to be matched
    pub match_gen_pt_threshold: Float,

    /// Generator jets farther than this from their match are not used
    pub r_threshold: Float,

    /// Pseudorapidity region boundaries
    pub region_bounds: RegionBounds,

    /// Particle flow species histogram fill policy
    pub pf_fill_policy: PfFillPolicy,
}

/// Reason why the analysis of an event was cut short
///
/// Histograms which were filled before the missing input was noticed keep
/// their contents.
///
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum MissingInput {
    #[error("centrality information is not available")]
    Centrality,

    #[error("reconstructed jets are not available")]
    RecoJets,

    #[error("generator jets are not available")]
    GenJets,
}

/// What happened to a fully processed event
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EventSummary {
    /// Number of reconstructed jets
    pub reco_jets: usize,

    /// Number of generator jets which found a reconstructed match within the
    /// distance cut
    pub matched_gen_jets: usize,
}

/// Jet response analysis, configured once and then run on every event
#[derive(Clone, Debug)]
pub struct JetResponseAnalyzer {
    options: AnalysisOptions,
}
//
impl JetResponseAnalyzer {
    /// Set up the analysis
    pub fn configure(options: AnalysisOptions) -> Self {
        Self { options }
    }

    /// Book the storage for one independent stream of events
    pub fn prepare_storage(&self) -> ResultsAccumulator {
        ResultsAccumulator::new(&self.options)
    }

    /// Analyze one event, recording its contribution into `acc`
    pub fn process_event(
        &self,
        event: &Event,
        acc: &mut ResultsAccumulator,
    ) -> Result<EventSummary, MissingInput> {
        let result = self.analyze(event, acc);
        match &result {
            Ok(_) => acc.counters.processed += 1,
            Err(reason) => acc.counters.record_skip(reason),
        }
        result
    }

    fn analyze(
        &self,
        event: &Event,
        acc: &mut ResultsAccumulator,
    ) -> Result<EventSummary, MissingInput> {
        let centrality = event.centrality.ok_or(MissingInput::Centrality)?;
        acc.monitor.fill_hf_energy(centrality.hf_energy);

        if let Some(candidates) = &event.pf_candidates {
            acc.monitor.fill_pf_candidates(candidates, centrality.hf_energy);
        }

        let reco_jets = event.reco_jets.as_ref().ok_or(MissingInput::RecoJets)?;
        acc.monitor.fill_reco_jets(reco_jets);
        let mut summary = EventSummary {
            reco_jets: reco_jets.len(),
            matched_gen_jets: 0,
        };

        if event.is_real_data {
            acc.counters.real_data += 1;
            return Ok(summary);
        }

        let gen_jets = event.gen_jets.as_ref().ok_or(MissingInput::GenJets)?;
        acc.monitor.fill_gen_jets(gen_jets);

        let matches =
            matching::match_jets(gen_jets, reco_jets, self.options.match_gen_pt_threshold);
        for matched in &matches {
            log::trace!(
                "Generator jet with pT {} matched to reco jet #{} at dR {}",
                matched.gen_jet.pt,
                matched.reco_index,
                matched.delta_r
            );
            if acc.response.accumulate(matched, centrality.bin) {
                summary.matched_gen_jets += 1;
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        binning::{CentralityRange, EtaRegion, PtRange},
        jet::{Centrality, PfCandidate},
        matching::tests::{gen, reco},
    };

    pub(crate) fn options() -> AnalysisOptions {
        AnalysisOptions {
            reco_jet_pt_threshold: 20.,
            match_gen_pt_threshold: 20.,
            r_threshold: 0.3,
            region_bounds: RegionBounds {
                barrel_eta: 2.0,
                endcap_eta: 3.0,
                forward_eta: 5.0,
            },
            pf_fill_policy: PfFillPolicy::OwnSpecies,
        }
    }

    fn full_event() -> Event {
        Event {
            centrality: Some(Centrality {
                bin: 10,
                hf_energy: 3500.,
            }),
            reco_jets: Some(vec![reco(26., 0.12, 0.5), reco(80., -2.2, 2.0)]),
            gen_jets: Some(vec![gen(25., 0.1, 0.5), gen(5., 1., 1.)]),
            pf_candidates: Some(vec![PfCandidate {
                pt: 2.,
                eta: 0.3,
                phi: 0.,
                id: ParticleId::ChargedHadron,
            }]),
            is_real_data: false,
        }
    }

    fn response_entries(acc: &ResultsAccumulator) -> usize {
        let (accepted, rejected) = acc.response.match_counts();
        accepted + rejected
    }

    #[test]
    fn species_fill_policies() {
        assert_eq!(
            PfFillPolicy::OwnSpecies.species_to_fill(ParticleId::Photon),
            &[ParticleId::Photon]
        );
        assert_eq!(
            PfFillPolicy::Cumulative.species_to_fill(ParticleId::HadronicHf),
            &[ParticleId::HadronicHf, ParticleId::EmHf]
        );
        assert_eq!(PfFillPolicy::Cumulative.species_to_fill(ParticleId::Unknown).len(), 8);
    }

    #[test]
    fn complete_event() {
        let analyzer = JetResponseAnalyzer::configure(options());
        let mut acc = analyzer.prepare_storage();
        let summary = analyzer.process_event(&full_event(), &mut acc).unwrap();
        assert_eq!(
            summary,
            EventSummary {
                reco_jets: 2,
                matched_gen_jets: 1
            }
        );
        assert_eq!(acc.counters.processed, 1);
        assert_eq!(acc.monitor.hf_energy.entries(), 1);
        let hf_vs_pt = acc.monitor.pf_candidates.hf_energy_vs_sum_pt();
        assert_eq!(hf_vs_pt.total_entries(), 1);
        assert_eq!(hf_vs_pt.bin_mean(hf_vs_pt.axis().find_bin(2.).unwrap()), Some(3500.));
        assert_eq!(acc.monitor.reco_jets.pt.entries(), 2);
        assert_eq!(acc.monitor.gen_jets.pt.entries(), 1);
        let bucket = acc.response.bucket(
            EtaRegion::Barrel,
            PtRange::Pt20To30,
            CentralityRange::Cent0To10,
        );
        assert_eq!(bucket.entries(), 1);
    }

    #[test]
    fn distant_matches_are_not_counted() {
        let analyzer = JetResponseAnalyzer::configure(options());
        let mut acc = analyzer.prepare_storage();
        let event = Event {
            reco_jets: Some(vec![reco(26., 0.12, 0.5), reco(40., 1.5, 0.)]),
            gen_jets: Some(vec![gen(25., 0.1, 0.5), gen(45., 0.6, 0.)]),
            ..full_event()
        };
        let summary = analyzer.process_event(&event, &mut acc).unwrap();
        assert_eq!(summary.matched_gen_jets, 1);
        assert_eq!(acc.response.match_counts(), (1, 1));
    }

    #[test]
    fn missing_centrality_fills_nothing() {
        let analyzer = JetResponseAnalyzer::configure(options());
        let mut acc = analyzer.prepare_storage();
        let event = Event {
            centrality: None,
            ..full_event()
        };
        assert_eq!(
            analyzer.process_event(&event, &mut acc),
            Err(MissingInput::Centrality)
        );
        let mut expected = analyzer.prepare_storage();
        expected.counters.missing_centrality = 1;
        assert_eq!(acc, expected);
    }

    #[test]
    fn missing_reco_jets_keeps_earlier_fills() {
        let analyzer = JetResponseAnalyzer::configure(options());
        let mut acc = analyzer.prepare_storage();
        let event = Event {
            reco_jets: None,
            ..full_event()
        };
        assert_eq!(
            analyzer.process_event(&event, &mut acc),
            Err(MissingInput::RecoJets)
        );
        assert_eq!(acc.counters.missing_reco_jets, 1);
        assert_eq!(acc.monitor.hf_energy.entries(), 1);
        assert_eq!(acc.monitor.pf_candidates.num_candidates().entries(), 1);
        assert_eq!(acc.monitor.reco_jets.num_jets.entries(), 0);
    }

    #[test]
    fn missing_gen_jets_leaves_the_grid_untouched() {
        let analyzer = JetResponseAnalyzer::configure(options());
        let mut acc = analyzer.prepare_storage();
        let event = Event {
            gen_jets: None,
            ..full_event()
        };
        assert_eq!(
            analyzer.process_event(&event, &mut acc),
            Err(MissingInput::GenJets)
        );
        assert_eq!(acc.monitor.reco_jets.pt.entries(), 2);
        assert_eq!(response_entries(&acc), 0);
        assert_eq!(acc.counters.skipped(), 1);
        assert_eq!(acc.counters.processed, 0);
    }

    #[test]
    fn real_data_stops_after_reco_spectra() {
        let analyzer = JetResponseAnalyzer::configure(options());
        let mut acc = analyzer.prepare_storage();
        let event = Event {
            gen_jets: None,
            is_real_data: true,
            ..full_event()
        };
        let summary = analyzer.process_event(&event, &mut acc).unwrap();
        assert_eq!(summary.matched_gen_jets, 0);
        assert_eq!(acc.counters.processed, 1);
        assert_eq!(acc.counters.real_data, 1);
        assert_eq!(acc.monitor.reco_jets.pt.entries(), 2);
        assert_eq!(acc.monitor.gen_jets.pt.entries(), 0);
        assert_eq!(response_entries(&acc), 0);
    }
}
