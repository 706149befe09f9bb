//! This module contains everything that is needed to compute, store, and
//! display the final results: mean jet response and resolution per cell

use crate::{
    binning::{CentralityRange, EtaRegion, PtRange, RegionBounds},
    histogram::Profile1D,
    monitor::MonitorHistograms,
    numeric::Float,
    resacc::{EventCounters, ResultsAccumulator},
};

/// Response statistics of one (region, pT range, centrality) cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BucketSummary {
    pub region: EtaRegion,
    pub pt_range: PtRange,
    pub centrality: CentralityRange,

    /// Number of matched generator jets with a response inside the
    /// histogram range
    pub entries: usize,

    /// Mean response (jet energy scale), if any response is in range
    pub mean: Option<Float>,

    /// Spread of the response (jet energy resolution), if any response is
    /// in range
    pub rms: Option<Float>,

    /// Number of responses outside of the histogram range
    pub out_of_range: usize,
}

/// One non-empty bin of a response profile
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfileBin {
    /// Center of the bin along the profiled variable
    pub center: Float,

    /// Number of entries
    pub entries: usize,

    /// Mean response
    pub mean: Float,

    /// Spread of the response
    pub rms: Float,
}

/// Contents of a response profile
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileSummary {
    /// Human-readable identification of the profile
    pub label: String,

    /// Non-empty bins, in increasing order
    pub bins: Vec<ProfileBin>,
}
//
impl ProfileSummary {
    pub fn new(label: String, profile: &Profile1D) -> Self {
        let axis = profile.axis();
        let bins = (0..axis.num_bins())
            .filter_map(|bin| {
                Some(ProfileBin {
                    center: axis.bin_center(bin),
                    entries: profile.bin_entries(bin),
                    mean: profile.bin_mean(bin)?,
                    rms: profile.bin_rms(bin)?,
                })
            })
            .collect();
        Self { label, bins }
    }
}

/// Final results of the analysis
pub struct FinalResults {
    /// Event bookkeeping
    pub counters: EventCounters,

    /// Matches which passed and failed the distance cut
    pub match_counts: (usize, usize),

    /// Region boundaries which the results were computed with
    pub bounds: RegionBounds,

    /// Response cells which received at least one match, in or out of the
    /// histogram range
    pub buckets: Vec<BucketSummary>,

    /// Response vs log10(generator pT), for each (region, centrality)
    pub pt_profiles: Vec<ProfileSummary>,

    /// Response vs generator eta, for each (pT range, centrality)
    pub eta_profiles: Vec<ProfileSummary>,

    /// Monitoring histograms, as accumulated
    pub monitor: MonitorHistograms,
}
//
impl FinalResults {
    /// Compute the final results from the accumulated histograms
    pub fn new(acc: ResultsAccumulator) -> Self {
        let grid = &acc.response;
        let bounds = *grid.bounds();

        let mut buckets = Vec::new();
        for region in EtaRegion::ALL {
            for pt_range in PtRange::ALL {
                for centrality in CentralityRange::ALL {
                    let histo = grid.bucket(region, pt_range, centrality);
                    if histo.all_entries() == 0 {
                        continue;
                    }
                    let (underflow, overflow) = histo.out_of_range();
                    buckets.push(BucketSummary {
                        region,
                        pt_range,
                        centrality,
                        entries: histo.entries(),
                        mean: histo.mean(),
                        rms: histo.rms(),
                        out_of_range: underflow + overflow,
                    });
                }
            }
        }

        let mut pt_profiles = Vec::new();
        for region in EtaRegion::ALL {
            for centrality in CentralityRange::ALL {
                let label = format!(
                    "JER_vs_log10pt_{}_cent{}",
                    region.tag(),
                    centrality.tag()
                );
                pt_profiles.push(ProfileSummary::new(
                    label,
                    grid.pt_profile(region, centrality),
                ));
            }
        }

        let mut eta_profiles = Vec::new();
        for pt_range in PtRange::ALL {
            for centrality in CentralityRange::ALL {
                let label = format!("JER_vs_eta_pt{}_cent{}", pt_range.tag(), centrality.tag());
                eta_profiles.push(ProfileSummary::new(
                    label,
                    grid.eta_profile(pt_range, centrality),
                ));
            }
        }

        Self {
            counters: acc.counters,
            match_counts: grid.match_counts(),
            bounds,
            buckets,
            pt_profiles,
            eta_profiles,
            monitor: acc.monitor,
        }
    }

    /// Display the headline numbers on stdout
    pub fn display(&self) {
        let counters = &self.counters;
        let (accepted, rejected) = self.match_counts;

        println!();
        println!("Events seen        : {}", counters.total());
        println!("... fully analyzed : {}", counters.processed);
        println!("... real data      : {}", counters.real_data);
        println!(
            "... skipped        : {} (centrality {}, reco jets {}, gen jets {})",
            counters.skipped(),
            counters.missing_centrality,
            counters.missing_reco_jets,
            counters.missing_gen_jets
        );
        println!("Matched gen jets   : {} (+{} beyond dR cut)", accepted, rejected);
        if let Some(hf) = self.monitor.hf_energy.mean() {
            println!("Mean HF energy     : {:.1} GeV", hf);
        }

        println!();
        println!("region : pT range  : centrality : entries : <R>     : sigma(R) : outside");
        let fixed =
            |x: Option<Float>| x.map_or_else(|| "n/a".to_string(), |x| format!("{:.5}", x));
        for bucket in &self.buckets {
            println!(
                "{:<6} : {:<9} : {:<10} : {:>7} : {:<7} : {:<8} : {}",
                bucket.region.tag(),
                bucket.pt_range.tag(),
                bucket.centrality.tag(),
                bucket.entries,
                fixed(bucket.mean),
                fixed(bucket.rms),
                bucket.out_of_range
            );
        }
        println!();
    }
}
