//! Monitoring histograms of the analysis inputs: jet spectra, HF energy and
//! particle flow candidates

use crate::{
    analyzer::{AnalysisOptions, PfFillPolicy},
    binning::{EtaRegion, RegionBounds},
    histogram::{Axis, Histo1D, Profile1D},
    jet::{GenJet, ParticleId, PfCandidate, RecoJet},
    numeric::Float,
};

/// Reconstructed jets above this pT (GeV) are counted as hard jets
const HARD_JET_PT: Float = 40.;

/// Particle flow candidates below this pT (GeV) are ignored
const PF_CANDIDATE_PT_MIN: Float = 0.5;

/// Number of pseudorapidity slices for the particle flow pT sums
pub const NUM_ETA_SLICES: usize = 15;

/// Edges of the pseudorapidity slices, following calorimeter tower boundaries
#[rustfmt::skip]
const ETA_SLICE_EDGES: [Float; NUM_ETA_SLICES + 1] = [
    -5.191, -2.650, -2.043, -1.740, -1.479, -1.131, -0.783, -0.522,
     0.522,  0.783,  1.131,  1.479,  1.740,  2.043,  2.650,  5.191,
];

/// Slices beyond this |eta| see the busy forward calorimeters, and get a wider
/// pT sum range
const WIDE_SLICE_ETA: Float = 2.;

/// Largest HF energy recorded against the event pT sum (GeV)
const HF_ENERGY_MAX: Float = 10000.;

/// Histograms of reconstructed jet properties
#[derive(Clone, Debug, PartialEq)]
pub struct RecoJetHistograms {
    pub eta: Histo1D,
    pub phi: Histo1D,
    pub pt: Histo1D,
    pub p: Histo1D,
    pub energy: Histo1D,
    pub mass: Histo1D,
    pub constituents: Histo1D,
    pub area: Histo1D,
    pub pileup: Histo1D,
    /// Number of reconstructed jets per event
    pub num_jets: Histo1D,
    /// Number of jets above the reco threshold and 40 GeV per event
    pub num_hard_jets: Histo1D,
}
//
impl RecoJetHistograms {
    fn new() -> Self {
        Self {
            eta: Histo1D::new(Axis::uniform(120, -6., 6.)),
            phi: Histo1D::new(Axis::uniform(70, -3.5, 3.5)),
            pt: Histo1D::new(Axis::uniform(100, 0., 1000.)),
            p: Histo1D::new(Axis::uniform(100, 0., 1000.)),
            energy: Histo1D::new(Axis::uniform(100, 0., 1000.)),
            mass: Histo1D::new(Axis::uniform(100, 0., 200.)),
            constituents: Histo1D::new(Axis::uniform(100, 0., 100.)),
            area: Histo1D::new(Axis::uniform(100, 0., 4.)),
            pileup: Histo1D::new(Axis::uniform(100, 0., 150.)),
            num_jets: Histo1D::new(Axis::uniform(50, 0., 100.)),
            num_hard_jets: Histo1D::new(Axis::uniform(50, 0., 100.)),
        }
    }

    /// Record the reconstructed jets of one event
    fn fill(&mut self, jets: &[RecoJet], pt_threshold: Float) {
        self.num_jets.fill(jets.len() as Float);
        let mut num_hard_jets = 0;
        for jet in jets.iter().filter(|jet| jet.pt > pt_threshold) {
            if jet.pt > HARD_JET_PT {
                num_hard_jets += 1;
            }
            self.eta.fill(jet.eta);
            self.pileup.fill(jet.pileup);
            self.area.fill(jet.area);
            self.phi.fill(jet.phi);
            self.energy.fill(jet.energy);
            self.p.fill(jet.p());
            self.pt.fill(jet.pt);
            self.mass.fill(jet.mass);
            self.constituents.fill(jet.constituents as Float);
        }
        self.num_hard_jets.fill(num_hard_jets as Float);
    }

    fn all_mut(&mut self) -> [&mut Histo1D; 11] {
        [
            &mut self.eta,
            &mut self.phi,
            &mut self.pt,
            &mut self.p,
            &mut self.energy,
            &mut self.mass,
            &mut self.constituents,
            &mut self.area,
            &mut self.pileup,
            &mut self.num_jets,
            &mut self.num_hard_jets,
        ]
    }

    fn all(&self) -> [&Histo1D; 11] {
        [
            &self.eta,
            &self.phi,
            &self.pt,
            &self.p,
            &self.energy,
            &self.mass,
            &self.constituents,
            &self.area,
            &self.pileup,
            &self.num_jets,
            &self.num_hard_jets,
        ]
    }

    fn merge(&mut self, other: &Self) {
        for (mine, theirs) in self.all_mut().into_iter().zip(other.all()) {
            mine.merge(theirs);
        }
    }
}

/// Histograms of generator jet kinematics
#[derive(Clone, Debug, PartialEq)]
pub struct GenJetHistograms {
    pub eta: Histo1D,
    pub phi: Histo1D,
    pub pt: Histo1D,
}
//
impl GenJetHistograms {
    fn new() -> Self {
        Self {
            eta: Histo1D::new(Axis::uniform(120, -6., 6.)),
            phi: Histo1D::new(Axis::uniform(70, -3.5, 3.5)),
            pt: Histo1D::new(Axis::uniform(100, 0., 1000.)),
        }
    }

    /// Record the generator jets of one event
    fn fill(&mut self, jets: &[GenJet], pt_threshold: Float) {
        for jet in jets.iter().filter(|jet| jet.pt > pt_threshold) {
            self.eta.fill(jet.eta);
            self.phi.fill(jet.phi);
            self.pt.fill(jet.pt);
        }
    }

    fn merge(&mut self, other: &Self) {
        self.eta.merge(&other.eta);
        self.phi.merge(&other.phi);
        self.pt.merge(&other.pt);
    }
}

/// Histograms of particle flow candidates
#[derive(Clone, Debug, PartialEq)]
pub struct PfCandidateHistograms {
    /// Candidate pT, eta and phi, for every candidate above the pT floor
    pt: Histo1D,
    eta: Histo1D,
    phi: Histo1D,

    /// Candidate pT, per species and detector region
    pt_by_species: [[Histo1D; EtaRegion::COUNT]; ParticleId::COUNT],

    /// Mean candidate pT vs eta slice, per species
    pt_vs_eta: [Profile1D; ParticleId::COUNT],

    /// Pseudorapidity slices of the pT sums
    slices: Axis,

    /// Per-event candidate pT sum, per pseudorapidity slice
    slice_sum_pt: [Histo1D; NUM_ETA_SLICES],

    /// Per-event candidate pT sum
    sum_pt: Histo1D,

    /// Per-event sum of squared candidate pT
    sum_squared_pt: Histo1D,

    /// Mean HF energy vs per-event candidate pT sum
    hf_energy_vs_sum_pt: Profile1D,

    /// Per-event candidate count
    num_candidates: Histo1D,

    /// Which species buckets a candidate goes to
    fill_policy: PfFillPolicy,

    /// Region boundaries, for the per-region pT spectra
    bounds: RegionBounds,
}
//
impl PfCandidateHistograms {
    fn new(fill_policy: PfFillPolicy, bounds: RegionBounds) -> Self {
        let slices = Axis::variable(&ETA_SLICE_EDGES[..]);
        Self {
            pt: Histo1D::new(Axis::uniform(1000, -5000., 5000.)),
            eta: Histo1D::new(Axis::uniform(120, -6., 6.)),
            phi: Histo1D::new(Axis::uniform(70, -3.5, 3.5)),
            pt_by_species: std::array::from_fn(|_| {
                std::array::from_fn(|_| Histo1D::new(Axis::uniform(300, 0., 300.)))
            }),
            pt_vs_eta: std::array::from_fn(|_| Profile1D::new(slices.clone(), 0., 300.)),
            slice_sum_pt: std::array::from_fn(|slice| {
                let inner = ETA_SLICE_EDGES[slice].abs().min(ETA_SLICE_EDGES[slice + 1].abs());
                let range = if inner > WIDE_SLICE_ETA { 5000. } else { 1000. };
                Histo1D::new(Axis::uniform(1000, -range, range))
            }),
            slices,
            sum_pt: Histo1D::new(Axis::uniform(1000, 0., 10000.)),
            sum_squared_pt: Histo1D::new(Axis::uniform(10000, 0., 10000.)),
            hf_energy_vs_sum_pt: Profile1D::new(
                Axis::uniform(1000, -1000., 1000.),
                0.,
                HF_ENERGY_MAX,
            ),
            num_candidates: Histo1D::new(Axis::uniform(1000, 0., 10000.)),
            fill_policy,
            bounds,
        }
    }

    /// Record the particle flow candidates of one event, along with the
    /// event's HF energy
    fn fill(&mut self, candidates: &[PfCandidate], hf_energy: Float) {
        let mut slice_sums = [0. as Float; NUM_ETA_SLICES];
        let mut sum_pt = 0.;
        let mut sum_squared_pt = 0.;
        let mut num_candidates = 0;
        for cand in candidates.iter().filter(|c| c.pt >= PF_CANDIDATE_PT_MIN) {
            num_candidates += 1;
            self.pt.fill(cand.pt);
            self.eta.fill(cand.eta);
            self.phi.fill(cand.phi);
            let region = self.bounds.classify(cand.eta);
            for &species in self.fill_policy.species_to_fill(cand.id) {
                self.pt_vs_eta[species.index()].fill(cand.eta, cand.pt);
                if let Some(region) = region {
                    self.pt_by_species[species.index()][region.index()].fill(cand.pt);
                }
            }
            if let Some(slice) = self.slices.find_bin(cand.eta) {
                slice_sums[slice] += cand.pt;
            }
            sum_pt += cand.pt;
            sum_squared_pt += cand.pt * cand.pt;
        }
        for (histo, &sum) in self.slice_sum_pt.iter_mut().zip(slice_sums.iter()) {
            histo.fill(sum);
        }
        self.sum_pt.fill(sum_pt);
        self.sum_squared_pt.fill(sum_squared_pt);
        self.hf_energy_vs_sum_pt.fill(sum_pt, hf_energy);
        self.num_candidates.fill(num_candidates as Float);
    }

    /// Candidate pT spectrum, all species
    pub fn pt(&self) -> &Histo1D {
        &self.pt
    }

    /// Candidate pseudorapidity distribution
    pub fn eta(&self) -> &Histo1D {
        &self.eta
    }

    /// Candidate azimuth distribution
    pub fn phi(&self) -> &Histo1D {
        &self.phi
    }

    /// Candidate pT spectrum of one species in one region
    pub fn pt_spectrum(&self, species: ParticleId, region: EtaRegion) -> &Histo1D {
        &self.pt_by_species[species.index()][region.index()]
    }

    /// Mean candidate pT of one species per pseudorapidity slice
    pub fn pt_vs_eta(&self, species: ParticleId) -> &Profile1D {
        &self.pt_vs_eta[species.index()]
    }

    /// Distribution of the per-event pT sum in one pseudorapidity slice
    pub fn slice_sum_pt(&self, slice: usize) -> &Histo1D {
        &self.slice_sum_pt[slice]
    }

    /// Distribution of the per-event candidate count
    pub fn num_candidates(&self) -> &Histo1D {
        &self.num_candidates
    }

    /// Distribution of the per-event candidate pT sum
    pub fn sum_pt(&self) -> &Histo1D {
        &self.sum_pt
    }

    /// Distribution of the per-event sum of squared candidate pT
    pub fn sum_squared_pt(&self) -> &Histo1D {
        &self.sum_squared_pt
    }

    /// Mean HF energy as a function of the per-event candidate pT sum
    pub fn hf_energy_vs_sum_pt(&self) -> &Profile1D {
        &self.hf_energy_vs_sum_pt
    }

    fn merge(&mut self, other: &Self) {
        self.pt.merge(&other.pt);
        self.eta.merge(&other.eta);
        self.phi.merge(&other.phi);
        let theirs = other.pt_by_species.iter().flatten();
        for (mine, theirs) in self.pt_by_species.iter_mut().flatten().zip(theirs) {
            mine.merge(theirs);
        }
        for (mine, theirs) in self.pt_vs_eta.iter_mut().zip(other.pt_vs_eta.iter()) {
            mine.merge(theirs);
        }
        for (mine, theirs) in self.slice_sum_pt.iter_mut().zip(other.slice_sum_pt.iter()) {
            mine.merge(theirs);
        }
        self.sum_pt.merge(&other.sum_pt);
        self.sum_squared_pt.merge(&other.sum_squared_pt);
        self.hf_energy_vs_sum_pt.merge(&other.hf_energy_vs_sum_pt);
        self.num_candidates.merge(&other.num_candidates);
    }
}

/// All monitoring histograms
#[derive(Clone, Debug, PartialEq)]
pub struct MonitorHistograms {
    /// HF tower energy sum
    pub hf_energy: Histo1D,

    /// Reconstructed jets
    pub reco_jets: RecoJetHistograms,

    /// Generator jets
    pub gen_jets: GenJetHistograms,

    /// Particle flow candidates
    pub pf_candidates: PfCandidateHistograms,

    /// Reco jet pT threshold of the spectra
    reco_pt_threshold: Float,

    /// Generator jet pT threshold of the spectra
    gen_pt_threshold: Float,
}
//
impl MonitorHistograms {
    /// Book all monitoring histograms
    pub fn new(options: &AnalysisOptions) -> Self {
        Self {
            hf_energy: Histo1D::new(Axis::uniform(1000, 0., 10000.)),
            reco_jets: RecoJetHistograms::new(),
            gen_jets: GenJetHistograms::new(),
            pf_candidates: PfCandidateHistograms::new(options.pf_fill_policy, options.region_bounds),
            reco_pt_threshold: options.reco_jet_pt_threshold,
            gen_pt_threshold: options.match_gen_pt_threshold,
        }
    }

    /// Record the HF energy of one event
    pub fn fill_hf_energy(&mut self, hf_energy: Float) {
        self.hf_energy.fill(hf_energy);
    }

    /// Record the reconstructed jets of one event
    pub fn fill_reco_jets(&mut self, jets: &[RecoJet]) {
        self.reco_jets.fill(jets, self.reco_pt_threshold);
    }

    /// Record the generator jets of one event
    pub fn fill_gen_jets(&mut self, jets: &[GenJet]) {
        self.gen_jets.fill(jets, self.gen_pt_threshold);
    }

    /// Record the particle flow candidates of one event with a known HF
    /// energy
    pub fn fill_pf_candidates(&mut self, candidates: &[PfCandidate], hf_energy: Float) {
        self.pf_candidates.fill(candidates, hf_energy);
    }

    /// Integrate the contents of another set of monitoring histograms
    pub fn merge(&mut self, other: &Self) {
        self.hf_energy.merge(&other.hf_energy);
        self.reco_jets.merge(&other.reco_jets);
        self.gen_jets.merge(&other.gen_jets);
        self.pf_candidates.merge(&other.pf_candidates);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::tests::reco;

    fn bounds() -> RegionBounds {
        RegionBounds {
            barrel_eta: 2.0,
            endcap_eta: 3.0,
            forward_eta: 5.0,
        }
    }

    fn candidate(pt: Float, eta: Float, id: ParticleId) -> PfCandidate {
        PfCandidate { pt, eta, phi: 0., id }
    }

    fn filled_species(histos: &PfCandidateHistograms, region: EtaRegion) -> Vec<ParticleId> {
        ParticleId::ALL
            .iter()
            .copied()
            .filter(|&id| histos.pt_spectrum(id, region).entries() > 0)
            .collect()
    }

    #[test]
    fn own_species_fill() {
        let mut histos = PfCandidateHistograms::new(PfFillPolicy::OwnSpecies, bounds());
        histos.fill(&[candidate(5., 0.3, ParticleId::Muon)], 100.);
        assert_eq!(filled_species(&histos, EtaRegion::Barrel), vec![ParticleId::Muon]);
        assert!(filled_species(&histos, EtaRegion::Endcap).is_empty());
    }

    #[test]
    fn cumulative_species_fill() {
        let mut histos = PfCandidateHistograms::new(PfFillPolicy::Cumulative, bounds());
        histos.fill(&[candidate(5., -2.5, ParticleId::Muon)], 100.);
        assert_eq!(
            filled_species(&histos, EtaRegion::Endcap),
            vec![
                ParticleId::Muon,
                ParticleId::Photon,
                ParticleId::NeutralHadron,
                ParticleId::HadronicHf,
                ParticleId::EmHf,
            ]
        );
    }

    #[test]
    fn soft_candidates_are_ignored_and_slices_summed() {
        let mut histos = PfCandidateHistograms::new(PfFillPolicy::OwnSpecies, bounds());
        histos.fill(
            &[
                candidate(0.4, 0., ParticleId::Photon),
                candidate(3., 0., ParticleId::Photon),
                candidate(4., 0.1, ParticleId::ChargedHadron),
                candidate(2., 3.0, ParticleId::HadronicHf),
            ],
            100.,
        );
        assert_eq!(histos.num_candidates().mean(), Some(3.));
        assert_eq!(histos.sum_pt().mean(), Some(9.));
        assert_eq!(histos.slice_sum_pt(7).mean(), Some(7.));
        assert_eq!(histos.slice_sum_pt(14).mean(), Some(2.));
        assert_eq!(histos.slice_sum_pt(0).mean(), Some(0.));
    }

    #[test]
    fn candidate_kinematics_and_event_sums() {
        let mut histos = PfCandidateHistograms::new(PfFillPolicy::OwnSpecies, bounds());
        histos.fill(
            &[
                candidate(0.2, 0., ParticleId::Photon),
                candidate(3., 0., ParticleId::Photon),
                candidate(4., 1.0, ParticleId::Photon),
                candidate(10., 4.0, ParticleId::EmHf),
            ],
            2500.,
        );
        histos.fill(&[], 500.);

        assert_eq!(histos.pt().entries(), 3);
        assert_eq!(histos.eta().mean(), Some(5. / 3.));
        assert_eq!(histos.phi().entries(), 3);
        assert_eq!(histos.sum_squared_pt().mean(), Some((9. + 16. + 100.) / 2.));

        let photons = histos.pt_vs_eta(ParticleId::Photon);
        assert_eq!(photons.total_entries(), 2);
        assert_eq!(photons.bin_mean(7), Some(3.));
        assert_eq!(photons.bin_mean(9), Some(4.));
        assert_eq!(histos.pt_vs_eta(ParticleId::EmHf).bin_mean(14), Some(10.));
        assert_eq!(histos.pt_vs_eta(ParticleId::Muon).total_entries(), 0);

        let hf = histos.hf_energy_vs_sum_pt();
        assert_eq!(hf.total_entries(), 2);
        assert_eq!(hf.bin_mean(hf.axis().find_bin(17.).unwrap()), Some(2500.));
        assert_eq!(hf.bin_mean(hf.axis().find_bin(0.).unwrap()), Some(500.));
    }

    #[test]
    fn forward_slices_have_wider_sums() {
        let mut histos = PfCandidateHistograms::new(PfFillPolicy::OwnSpecies, bounds());
        histos.fill(
            &[
                candidate(2000., 4.0, ParticleId::HadronicHf),
                candidate(2000., -2.3, ParticleId::HadronicHf),
                candidate(2000., 1.9, ParticleId::ChargedHadron),
            ],
            0.,
        );
        assert_eq!(histos.slice_sum_pt(14).entries(), 1);
        assert_eq!(histos.slice_sum_pt(1).entries(), 1);
        assert_eq!(histos.slice_sum_pt(12).entries(), 0);
        assert_eq!(histos.slice_sum_pt(12).out_of_range(), (0, 1));
        assert_eq!(histos.slice_sum_pt(0).mean(), Some(0.));
    }

    #[test]
    fn merged_candidates_add_up() {
        let mut left = PfCandidateHistograms::new(PfFillPolicy::Cumulative, bounds());
        let mut right = left.clone();
        let mut both = left.clone();
        let first = [candidate(3., 0.2, ParticleId::Electron)];
        let second = [candidate(6., -3.5, ParticleId::Photon)];
        left.fill(&first, 1000.);
        right.fill(&second, 200.);
        both.fill(&first, 1000.);
        both.fill(&second, 200.);
        left.merge(&right);
        assert_eq!(left, both);
    }

    #[test]
    fn reco_spectra_use_the_threshold() {
        let mut histos = RecoJetHistograms::new();
        histos.fill(&[reco(15., 0., 0.), reco(35., 1., 0.), reco(55., -1., 0.)], 20.);
        assert_eq!(histos.num_jets.mean(), Some(3.));
        assert_eq!(histos.num_hard_jets.mean(), Some(1.));
        assert_eq!(histos.pt.entries(), 2);
    }
}
