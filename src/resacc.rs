//! This module allows accumulating analysis results across events
use crate::{
    analyzer::{AnalysisOptions, MissingInput},
    binning::{CentralityRange, EtaRegion, PtRange, RegionBounds},
    histogram::{Axis, Histo1D, Profile1D},
    matching::MatchResult,
    monitor::MonitorHistograms,
    numeric::Float,
    resfin::FinalResults,
};

/// Number of bins of the response histograms
pub const RESPONSE_BINS: usize = 90;

/// Upper edge of the response axis (the lower edge is zero)
pub const RESPONSE_MAX: Float = 2.;

/// Binning of the response vs log10(generator pT) profiles
const LOG10_PT_BINS: usize = 26;
const LOG10_PT_MIN: Float = 0.5;
const LOG10_PT_MAX: Float = 3.75;

/// Bin edges of the response vs generator eta profiles: coarse in the forward
/// region, 0.1 wide within |eta| < 3
#[rustfmt::skip]
const GEN_ETA_EDGES: [Float; 91] = [
    -6.0, -5.8, -5.6, -5.4, -5.2, -5.0, -4.8, -4.6, -4.4, -4.2,
    -4.0, -3.8, -3.6, -3.4, -3.2, -3.0, -2.9, -2.8, -2.7, -2.6,
    -2.5, -2.4, -2.3, -2.2, -2.1, -2.0, -1.9, -1.8, -1.7, -1.6,
    -1.5, -1.4, -1.3, -1.2, -1.1, -1.0, -0.9, -0.8, -0.7, -0.6,
    -0.5, -0.4, -0.3, -0.2, -0.1,
     0.0,  0.1,  0.2,  0.3,  0.4,  0.5,  0.6,  0.7,  0.8,  0.9,
     1.0,  1.1,  1.2,  1.3,  1.4,  1.5,  1.6,  1.7,  1.8,  1.9,
     2.0,  2.1,  2.2,  2.3,  2.4,  2.5,  2.6,  2.7,  2.8,  2.9,
     3.0,  3.2,  3.4,  3.6,  3.8,  4.0,  4.2,  4.4,  4.6,  4.8,
     5.0,  5.2,  5.4,  5.6,  5.8,  6.0,
];

/// Storage indexed by centrality class
pub type PerCentrality<T> = [T; CentralityRange::COUNT];

/// Build a 2D array of accumulators from their indices
fn grid_from_fn<T, const N: usize, const M: usize>(
    mut f: impl FnMut(usize, usize) -> T,
) -> [[T; M]; N] {
    std::array::from_fn(|i| std::array::from_fn(|j| f(i, j)))
}

/// Jet response accumulators, keyed by (region, generator pT range, centrality)
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseGrid {
    // ### CUTS ###
    /// Pseudorapidity region boundaries
    bounds: RegionBounds,

    /// Maximal distance between a generator jet and its reconstructed match
    r_threshold: Float,

    // ### ACCUMULATORS ###
    /// Response distributions
    buckets: [[PerCentrality<Histo1D>; PtRange::COUNT]; EtaRegion::COUNT],

    /// Response vs log10(generator pT), for any generator pT
    vs_gen_pt: [PerCentrality<Profile1D>; EtaRegion::COUNT],

    /// Response vs generator eta, for any eta within the acceptance
    vs_gen_eta: [PerCentrality<Profile1D>; PtRange::COUNT],

    /// Number of matches which passed the distance cut
    accepted_matches: usize,

    /// Number of matches which failed the distance cut
    rejected_matches: usize,
}
//
impl ResponseGrid {
    /// Book empty accumulators
    pub fn new(bounds: RegionBounds, r_threshold: Float) -> Self {
        let response_axis = Axis::uniform(RESPONSE_BINS, 0., RESPONSE_MAX);
        let log10_pt_axis = Axis::uniform(LOG10_PT_BINS, LOG10_PT_MIN, LOG10_PT_MAX);
        let eta_axis = Axis::variable(&GEN_ETA_EDGES[..]);
        Self {
            bounds,
            r_threshold,
            buckets: std::array::from_fn(|_| {
                grid_from_fn(|_, _| Histo1D::new(response_axis.clone()))
            }),
            vs_gen_pt: grid_from_fn(|_, _| Profile1D::new(log10_pt_axis.clone(), 0., RESPONSE_MAX)),
            vs_gen_eta: grid_from_fn(|_, _| Profile1D::new(eta_axis.clone(), 0., RESPONSE_MAX)),
            accepted_matches: 0,
            rejected_matches: 0,
        }
    }

    /// Record the response of one matched generator jet
    ///
    /// Matches beyond the distance cut are ignored. Each accumulator is only
    /// filled if every category it is keyed by could be determined. Returns
    /// whether the match passed the distance cut.
    ///
    pub fn accumulate(&mut self, matched: &MatchResult, hibin: i32) -> bool {
        if matched.delta_r >= self.r_threshold {
            self.rejected_matches += 1;
            return false;
        }
        self.accepted_matches += 1;

        let gen_pt = matched.gen_jet.pt;
        let gen_eta = matched.gen_jet.eta;
        assert!(
            gen_pt > 0.,
            "Generator jets should have positive pT, got {}",
            gen_pt
        );
        let response = matched.reco_pt / gen_pt;

        let region = self.bounds.classify(gen_eta);
        let Some(centrality) = CentralityRange::classify(hibin) else {
            return true;
        };
        let cent = centrality.index();

        if let Some(region) = region {
            self.vs_gen_pt[region.index()][cent].fill(gen_pt.log10(), response);
        }

        let Some(pt_range) = PtRange::classify(gen_pt) else {
            return true;
        };
        self.vs_gen_eta[pt_range.index()][cent].fill(gen_eta, response);
        if let Some(region) = region {
            self.buckets[region.index()][pt_range.index()][cent].fill(response);
        }
        true
    }

    /// Integrate the responses accumulated by another grid
    pub fn merge(&mut self, other: &Self) {
        assert_eq!(self.bounds, other.bounds, "Region boundaries should match");
        let their_buckets = other.buckets.iter().flatten().flatten();
        for (mine, theirs) in self.buckets.iter_mut().flatten().flatten().zip(their_buckets) {
            mine.merge(theirs);
        }
        let their_pt_profiles = other.vs_gen_pt.iter().flatten();
        for (mine, theirs) in self.vs_gen_pt.iter_mut().flatten().zip(their_pt_profiles) {
            mine.merge(theirs);
        }
        let their_eta_profiles = other.vs_gen_eta.iter().flatten();
        for (mine, theirs) in self.vs_gen_eta.iter_mut().flatten().zip(their_eta_profiles) {
            mine.merge(theirs);
        }
        self.accepted_matches += other.accepted_matches;
        self.rejected_matches += other.rejected_matches;
    }

    /// Response distribution of one cell
    pub fn bucket(&self, region: EtaRegion, pt_range: PtRange, centrality: CentralityRange) -> &Histo1D {
        &self.buckets[region.index()][pt_range.index()][centrality.index()]
    }

    /// Response vs log10(generator pT) profile of one (region, centrality) cell
    pub fn pt_profile(&self, region: EtaRegion, centrality: CentralityRange) -> &Profile1D {
        &self.vs_gen_pt[region.index()][centrality.index()]
    }

    /// Response vs generator eta profile of one (pT range, centrality) cell
    pub fn eta_profile(&self, pt_range: PtRange, centrality: CentralityRange) -> &Profile1D {
        &self.vs_gen_eta[pt_range.index()][centrality.index()]
    }

    /// Region boundaries in use
    pub fn bounds(&self) -> &RegionBounds {
        &self.bounds
    }

    /// Number of matches which passed and failed the distance cut
    pub fn match_counts(&self) -> (usize, usize) {
        (self.accepted_matches, self.rejected_matches)
    }
}

/// Event bookkeeping
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EventCounters {
    /// Events that went through the whole analysis
    pub processed: usize,

    /// Real collision events (no generator information)
    pub real_data: usize,

    /// Events abandoned because centrality was unavailable
    pub missing_centrality: usize,

    /// Events abandoned because reconstructed jets were unavailable
    pub missing_reco_jets: usize,

    /// Events abandoned because generator jets were unavailable
    pub missing_gen_jets: usize,
}
//
impl EventCounters {
    /// Account for an abandoned event
    pub fn record_skip(&mut self, reason: &MissingInput) {
        match reason {
            MissingInput::Centrality => self.missing_centrality += 1,
            MissingInput::RecoJets => self.missing_reco_jets += 1,
            MissingInput::GenJets => self.missing_gen_jets += 1,
        }
    }

    /// Number of abandoned events
    pub fn skipped(&self) -> usize {
        self.missing_centrality + self.missing_reco_jets + self.missing_gen_jets
    }

    /// Total number of events seen
    pub fn total(&self) -> usize {
        self.processed + self.skipped()
    }

    /// Integrate the counts of another set of counters
    fn merge(&mut self, other: &Self) {
        self.processed += other.processed;
        self.real_data += other.real_data;
        self.missing_centrality += other.missing_centrality;
        self.missing_reco_jets += other.missing_reco_jets;
        self.missing_gen_jets += other.missing_gen_jets;
    }
}

/// This struct accumulates every histogram of the analysis during the event
/// loop, and ultimately computes the final results (see FinalResults).
#[derive(Clone, Debug, PartialEq)]
pub struct ResultsAccumulator {
    /// Event bookkeeping
    pub counters: EventCounters,

    /// Jet response measurement
    pub response: ResponseGrid,

    /// Monitoring of the analysis inputs
    pub monitor: MonitorHistograms,
}
//
impl ResultsAccumulator {
    /// Book all histograms
    pub fn new(options: &AnalysisOptions) -> Self {
        Self {
            counters: EventCounters::default(),
            response: ResponseGrid::new(options.region_bounds, options.r_threshold),
            monitor: MonitorHistograms::new(options),
        }
    }

    /// Integrate the results of another ResultsAccumulator
    #[allow(clippy::needless_pass_by_value)]
    pub fn merge(&mut self, other: Self) {
        self.counters.merge(&other.counters);
        self.response.merge(&other.response);
        self.monitor.merge(&other.monitor);
    }

    /// Turn accumulated histograms into finalized results
    pub fn finalize(self) -> FinalResults {
        FinalResults::new(self)
    }
}
