//! This module provides a toy heavy-ion event source, standing in for the
//! detector simulation and reconstruction chain

use crate::{
    jet::{Centrality, Event, GenJet, ParticleId, PfCandidate, RecoJet},
    numeric::{floats::consts::PI, Float},
    random::RandomGenerator,
    Result,
};

use eyre::WrapErr;
use prefix_num_ops::real::*;
use rand_distr::{Exp, Normal, Pareto, Poisson, Uniform};

/// Number of centrality bins (0.5% wide each)
const NUM_CENTRALITY_BINS: i32 = 200;

/// Summed HF energy of the most central events (GeV)
const HF_ENERGY_MAX: Float = 5000.;

/// Probability for each optional input of an event to be unavailable
const MISSING_INPUT_PROBABILITY: Float = 0.002;

/// Fraction of generator jets that get reconstructed
const RECO_EFFICIENCY: Float = 0.95;

/// Pseudorapidity range of the generated jets and particles
const ETA_RANGE: Float = 5.5;

/// Generator of toy heavy-ion collision events
///
/// Hard generator jets are drawn from a power-law pT spectrum, then
/// reconstructed with a pT resolution which worsens at low pT, plus an offset
/// from the underlying event that grows with collision centrality. Soft fake
/// jets and particle flow candidates are added in proportion to centrality.
///
pub struct EventGenerator {
    /// Number of hard jets per event
    num_gen_jets: Poisson<Float>,

    /// Generator jet pT spectrum
    gen_jet_pt: Pareto<Float>,

    /// Number of fake jets per event in the most central collisions
    num_fake_jets: Poisson<Float>,

    /// Fake jet pT spectrum
    fake_jet_pt: Pareto<Float>,

    /// Jet and particle pseudorapidity
    eta: Uniform<Float>,

    /// Jet and particle azimuth
    phi: Uniform<Float>,

    /// Unit gaussian, scaled as needed for detector smearing
    gaussian: Normal<Float>,

    /// Number of particle flow candidates in the most central collisions
    num_pf_candidates: Poisson<Float>,

    /// Particle flow candidate pT spectrum
    pf_candidate_pt: Exp<Float>,
}
//
impl EventGenerator {
    /// Set up the event generator
    pub fn new() -> Result<Self> {
        Ok(Self {
            num_gen_jets: Poisson::new(3.).wrap_err("Bad generator jet multiplicity")?,
            gen_jet_pt: Pareto::new(12., 2.5).wrap_err("Bad generator jet spectrum")?,
            num_fake_jets: Poisson::new(6.).wrap_err("Bad fake jet multiplicity")?,
            fake_jet_pt: Pareto::new(8., 4.).wrap_err("Bad fake jet spectrum")?,
            eta: Uniform::new(-ETA_RANGE, ETA_RANGE),
            phi: Uniform::new(-PI, PI),
            gaussian: Normal::new(0., 1.).wrap_err("Bad smearing distribution")?,
            num_pf_candidates: Poisson::new(800.).wrap_err("Bad particle multiplicity")?,
            pf_candidate_pt: Exp::new(0.7).wrap_err("Bad particle spectrum")?,
        })
    }

    /// Generate one event
    pub fn generate(&self, rng: &mut RandomGenerator) -> Event {
        let bin = (rng.random() * NUM_CENTRALITY_BINS as Float) as i32;
        let bin = bin.min(NUM_CENTRALITY_BINS - 1);
        // Overlap of the colliding nuclei, 1 for head-on collisions
        let peripherality = bin as Float / NUM_CENTRALITY_BINS as Float;
        let overlap = (1. - peripherality) * (1. - peripherality);
        let hf_energy = HF_ENERGY_MAX * overlap * (1. + 0.05 * rng.sample(&self.gaussian));

        let gen_jets = self.generate_gen_jets(rng);
        let reco_jets = self.reconstruct(&gen_jets, overlap, rng);
        let pf_candidates = self.generate_pf_candidates(overlap, rng);

        let mut keep = || rng.random() >= MISSING_INPUT_PROBABILITY;
        Event {
            centrality: keep().then_some(Centrality {
                bin,
                hf_energy: hf_energy.max(0.),
            }),
            reco_jets: keep().then_some(reco_jets),
            gen_jets: keep().then_some(gen_jets),
            pf_candidates: Some(pf_candidates),
            is_real_data: false,
        }
    }

    /// Draw the hard jets of an event
    fn generate_gen_jets(&self, rng: &mut RandomGenerator) -> Vec<GenJet> {
        let num_jets: Float = rng.sample(&self.num_gen_jets);
        (0..num_jets as usize)
            .map(|_| GenJet {
                pt: rng.sample(&self.gen_jet_pt),
                eta: rng.sample(&self.eta),
                phi: rng.sample(&self.phi),
            })
            .collect()
    }

    /// Simulate the detector response to the hard jets, and add fakes
    fn reconstruct(
        &self,
        gen_jets: &[GenJet],
        overlap: Float,
        rng: &mut RandomGenerator,
    ) -> Vec<RecoJet> {
        let mut reco_jets = Vec::with_capacity(gen_jets.len());
        for gen in gen_jets {
            if rng.random() >= RECO_EFFICIENCY {
                continue;
            }
            let resolution = 0.05 + 1. / sqrt(gen.pt) + 2. * overlap / gen.pt;
            let scale = 1. + 0.03 * overlap;
            let pt = gen.pt * (scale + resolution * rng.sample(&self.gaussian));
            if pt <= 0. {
                continue;
            }
            let eta = gen.eta + 0.03 * rng.sample(&self.gaussian);
            let phi = wrap_phi(gen.phi + 0.03 * rng.sample(&self.gaussian));
            reco_jets.push(self.make_reco_jet(pt, eta, phi, overlap, rng));
        }

        let num_fakes: Float = rng.sample(&self.num_fake_jets);
        for _ in 0..(num_fakes * overlap) as usize {
            let pt = rng.sample(&self.fake_jet_pt);
            let eta = rng.sample(&self.eta);
            let phi = rng.sample(&self.phi);
            reco_jets.push(self.make_reco_jet(pt, eta, phi, overlap, rng));
        }
        reco_jets
    }

    /// Fill in the monitoring-only attributes of a reconstructed jet
    fn make_reco_jet(
        &self,
        pt: Float,
        eta: Float,
        phi: Float,
        overlap: Float,
        rng: &mut RandomGenerator,
    ) -> RecoJet {
        let mass = pt * (0.1 + 0.02 * abs(rng.sample(&self.gaussian)));
        let p = pt * eta.cosh();
        RecoJet {
            pt,
            eta,
            phi,
            energy: sqrt(p * p + mass * mass),
            mass,
            area: 0.5 + 0.05 * rng.sample(&self.gaussian),
            constituents: 5 + (pt / 5. + 20. * overlap * rng.random()) as usize,
            pileup: 100. * overlap * rng.random(),
        }
    }

    /// Draw the particle flow candidates of an event
    fn generate_pf_candidates(&self, overlap: Float, rng: &mut RandomGenerator) -> Vec<PfCandidate> {
        let num_candidates: Float = rng.sample(&self.num_pf_candidates);
        (0..(num_candidates * (0.05 + overlap)) as usize)
            .map(|_| {
                let species = (rng.random() * ParticleId::COUNT as Float) as usize;
                PfCandidate {
                    pt: rng.sample(&self.pf_candidate_pt),
                    eta: rng.sample(&self.eta),
                    phi: rng.sample(&self.phi),
                    id: ParticleId::from_index(species).unwrap_or(ParticleId::Unknown),
                }
            })
            .collect()
    }
}

/// Bring an azimuthal angle back into [-pi, pi)
fn wrap_phi(phi: Float) -> Float {
    (phi + PI).rem_euclid(2. * PI) - PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_reproducible() {
        let evgen = EventGenerator::new().unwrap();
        let mut rng1 = RandomGenerator::new(7);
        let mut rng2 = RandomGenerator::new(7);
        for _ in 0..20 {
            assert_eq!(evgen.generate(&mut rng1), evgen.generate(&mut rng2));
        }
    }

    #[test]
    fn events_are_physical() {
        let evgen = EventGenerator::new().unwrap();
        let mut rng = RandomGenerator::new(1234);
        for _ in 0..200 {
            let event = evgen.generate(&mut rng);
            assert!(!event.is_real_data);
            if let Some(centrality) = event.centrality {
                assert!((0..NUM_CENTRALITY_BINS).contains(&centrality.bin));
                assert!(centrality.hf_energy >= 0.);
            }
            for gen in event.gen_jets.iter().flatten() {
                assert!(gen.pt >= 12.);
                assert!(gen.eta.abs() <= ETA_RANGE);
            }
            for reco in event.reco_jets.iter().flatten() {
                assert!(reco.pt > 0.);
                assert!(reco.phi.abs() <= PI);
            }
        }
    }

    #[test]
    fn reco_jets_are_on_shell() {
        let evgen = EventGenerator::new().unwrap();
        let mut rng = RandomGenerator::new(99);
        for overlap in [0., 0.25, 1.] {
            let jet = evgen.make_reco_jet(40., 1.5, 0.2, overlap, &mut rng);
            let p = jet.pt * jet.eta.cosh();
            let tolerance = 1e-4 * jet.energy * jet.energy;
            assert!((jet.energy * jet.energy - (p * p + jet.mass * jet.mass)).abs() <= tolerance);
            assert!(jet.energy > p);
        }
    }

    #[test]
    fn central_events_are_busier() {
        let evgen = EventGenerator::new().unwrap();
        let mut rng = RandomGenerator::new(5);
        let (mut central, mut peripheral) = (Vec::new(), Vec::new());
        for _ in 0..2000 {
            if let Some(centrality) = evgen.generate(&mut rng).centrality {
                match centrality.bin {
                    0..=19 => central.push(centrality.hf_energy),
                    140.. => peripheral.push(centrality.hf_energy),
                    _ => {}
                }
            }
        }
        let mean = |values: &[Float]| values.iter().sum::<Float>() / values.len() as Float;
        assert!(!central.is_empty() && !peripheral.is_empty());
        // The most central tenth keeps at least 81% of the head-on overlap
        assert!(mean(&central) > 0.75 * HF_ENERGY_MAX);
        assert!(mean(&peripheral) < 0.1 * HF_ENERGY_MAX);
    }
}
