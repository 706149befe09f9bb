//! Geometrical matching of generator-level jets to reconstructed jets

use crate::{
    jet::{GenJet, RecoJet},
    kinematics::delta_r,
    numeric::Float,
};

/// Generator jets beyond this |eta| are outside of the detector
pub const GEN_ETA_ACCEPTANCE: Float = 6.;

/// Reconstructed jets must be above this pT (GeV) to be match candidates
pub const MATCH_RECO_PT_MIN: Float = 10.;

/// Nearest reconstructed jet of a generator jet
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchResult {
    /// The generator jet which was matched
    pub gen_jet: GenJet,

    /// Position of the best reconstructed jet in the input collection
    pub reco_index: usize,

    /// Transverse momentum of the best reconstructed jet
    pub reco_pt: Float,

    /// Angular separation between the two jets
    pub delta_r: Float,
}

/// Match every eligible generator jet to its nearest reconstructed jet
///
/// Generator jets outside of the acceptance or below `match_gen_pt_threshold`
/// are skipped, and so are those which have no reconstructed jet above
/// `MATCH_RECO_PT_MIN` to be matched with. Results come out in generator jet
/// order. No cut on the distance is applied at this stage.
///
pub fn match_jets(
    gen_jets: &[GenJet],
    reco_jets: &[RecoJet],
    match_gen_pt_threshold: Float,
) -> Vec<MatchResult> {
    if reco_jets.is_empty() {
        return Vec::new();
    }
    gen_jets
        .iter()
        .filter(|gen| gen.eta.abs() <= GEN_ETA_ACCEPTANCE)
        .filter(|gen| gen.pt >= match_gen_pt_threshold)
        .filter_map(|gen| best_match(gen, reco_jets))
        .collect()
}

/// Find the reconstructed jet closest to a generator jet
///
/// Ties go to the first jet in scan order.
///
fn best_match(gen_jet: &GenJet, reco_jets: &[RecoJet]) -> Option<MatchResult> {
    let mut best: Option<MatchResult> = None;
    for (reco_index, reco) in reco_jets.iter().enumerate() {
        if reco.pt <= MATCH_RECO_PT_MIN {
            continue;
        }
        let dr = delta_r(gen_jet.eta, gen_jet.phi, reco.eta, reco.phi);
        if best.map_or(true, |b| dr < b.delta_r) {
            best = Some(MatchResult {
                gen_jet: *gen_jet,
                reco_index,
                reco_pt: reco.pt,
                delta_r: dr,
            });
        }
    }
    best
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reconstructed jet with only the kinematics that matter for matching
    pub(crate) fn reco(pt: Float, eta: Float, phi: Float) -> RecoJet {
        RecoJet {
            pt,
            eta,
            phi,
            energy: pt * eta.cosh(),
            mass: 0.,
            area: 0.5,
            constituents: 10,
            pileup: 0.,
        }
    }

    /// Generator jet
    pub(crate) fn gen(pt: Float, eta: Float, phi: Float) -> GenJet {
        GenJet { pt, eta, phi }
    }

    #[test]
    fn picks_the_nearest_jet() {
        let gens = [gen(50., 0.5, 1.0)];
        let recos = [reco(40., 0.5, 1.5), reco(45., 0.6, 1.0), reco(60., -1., 0.)];
        let matches = match_jets(&gens, &recos, 20.);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].reco_index, 1);
        assert_eq!(matches[0].reco_pt, 45.);
    }

    #[test]
    fn ties_go_to_the_first_jet() {
        let gens = [gen(50., 0., 0.)];
        let recos = [reco(30., 0.2, 0.), reco(80., -0.2, 0.)];
        let matches = match_jets(&gens, &recos, 20.);
        assert_eq!(matches[0].reco_index, 0);
    }

    #[test]
    fn soft_reco_jets_are_not_candidates() {
        let gens = [gen(50., 0., 0.)];
        let recos = [reco(10., 0., 0.), reco(9., 0.1, 0.)];
        assert!(match_jets(&gens, &recos, 20.).is_empty());

        let recos = [reco(10., 0., 0.), reco(11., 2., 0.)];
        let matches = match_jets(&gens, &recos, 20.);
        assert_eq!(matches[0].reco_index, 1);
    }

    #[test]
    fn generator_filters() {
        let recos = [reco(30., 0., 0.)];
        let gens = [
            gen(50., 6.5, 0.),
            gen(50., -6.0, 0.),
            gen(19.9, 0., 0.),
            gen(20., 0., 0.),
        ];
        let matches = match_jets(&gens, &recos, 20.);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].gen_jet.eta, -6.0);
        assert_eq!(matches[1].gen_jet.pt, 20.);
        assert!(match_jets(&gens, &[], 20.).is_empty());
    }

    #[test]
    fn matching_wraps_around_in_phi() {
        let gens = [gen(50., 0., 3.0)];
        let recos = [reco(30., 0., 2.5), reco(30., 0., -3.0)];
        let matches = match_jets(&gens, &recos, 20.);
        assert_eq!(matches[0].reco_index, 1);
        assert!(matches[0].delta_r < 0.3);
    }

    fn arb_reco() -> impl Strategy<Value = RecoJet> {
        (0.0..100.0, -5.0..5.0, -3.14..3.14)
            .prop_map(|(pt, eta, phi): (f64, f64, f64)| reco(pt as Float, eta as Float, phi as Float))
    }

    proptest! {
        #[test]
        fn match_is_minimal(
            gen_eta in -5.0..5.0,
            gen_phi in -3.14..3.14,
            recos in prop::collection::vec(arb_reco(), 0..12),
        ) {
            let gen_jet = gen(50., gen_eta as Float, gen_phi as Float);
            let matches = match_jets(&[gen_jet], &recos, 20.);
            let candidates: Vec<_> = recos.iter().filter(|r| r.pt > MATCH_RECO_PT_MIN).collect();
            prop_assert_eq!(matches.len(), usize::from(!candidates.is_empty()));
            if let Some(m) = matches.first() {
                for r in candidates {
                    let dr = delta_r(gen_jet.eta, gen_jet.phi, r.eta, r.phi);
                    prop_assert!(m.delta_r <= dr);
                }
            }
        }
    }
}
