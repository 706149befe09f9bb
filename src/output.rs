//! This module is in charge of outputting the final analysis results to the
//! standard output and to disk

use crate::{
    binning::EtaRegion,
    config::Configuration,
    histogram::Histo1D,
    jet::ParticleId,
    monitor::{MonitorHistograms, NUM_ETA_SLICES},
    numeric::Float,
    resfin::{FinalResults, ProfileSummary},
    Result,
};

use eyre::WrapErr;
use time::{format_description, OffsetDateTime};

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    time::Duration,
};

/// Name of the results file
const RESULTS_FILE: &str = "res.data";

/// Number of significant digits in file output
const SIG_DIGITS: usize = 6;

/// Output the analysis results to the console and to disk
pub fn dump_results(
    cfg: &Configuration,
    res_fin: &FinalResults,
    elapsed_time: Duration,
) -> Result<()> {
    res_fin.display();

    // Compute a timestamp of when the run ended
    let timestamp = format_timestamp(OffsetDateTime::now_utc())?;

    let dat_file = File::create(RESULTS_FILE)
        .wrap_err_with(|| format!("Failed to create {}", RESULTS_FILE))?;
    let mut dat_file = BufWriter::new(dat_file);
    write_report(&mut dat_file, cfg, res_fin, &timestamp, elapsed_time)
        .and_then(|()| dat_file.flush())
        .wrap_err_with(|| format!("Failed to write {}", RESULTS_FILE))?;

    log::info!("Results written to {}", RESULTS_FILE);
    Ok(())
}

/// Format the time at which a run ended, `%d-%b-%y   %T` style
fn format_timestamp(when: OffsetDateTime) -> Result<String> {
    let timestamp_format = format_description::parse_borrowed::<1>(
        "[day]-[month repr:short]-[year repr:last_two]   [hour]:[minute]:[second]",
    )
    .wrap_err("Bad timestamp format")?;
    when.format(&timestamp_format)
        .wrap_err("Failed to format the timestamp")
}

/// Write down the text report of an analysis run
fn write_report(
    out: &mut impl Write,
    cfg: &Configuration,
    res_fin: &FinalResults,
    timestamp: &str,
    elapsed_time: Duration,
) -> io::Result<()> {
    let counters = &res_fin.counters;
    let (accepted, rejected) = res_fin.match_counts;

    writeln_report(out, timestamp)?;
    writeln_report(out, ("Number of events", cfg.num_events))?;
    writeln_report(out, ("... fully analyzed", counters.processed))?;
    writeln_report(out, ("... real data", counters.real_data))?;
    writeln_report(out, ("... without centrality", counters.missing_centrality))?;
    writeln_report(out, ("... without reco jets", counters.missing_reco_jets))?;
    writeln_report(out, ("... without gen jets", counters.missing_gen_jets))?;
    writeln_report(out, ("Random seed", cfg.seed as usize))?;
    writeln_report(out, ("Reco jet pT threshold    (GeV)", cfg.reco_jet_pt_threshold))?;
    writeln_report(out, ("Gen jet pT threshold     (GeV)", cfg.match_gen_pt_threshold))?;
    writeln_report(out, ("Matching distance cut", cfg.r_threshold))?;
    for region in EtaRegion::ALL {
        let description = res_fin.bounds.describe(region);
        writeln_report(out, (region.tag(), &description[..]))?;
    }
    writeln_report(out, ("Particle flow fill", pf_fill_name(cfg.legacy_pf_fill)))?;
    writeln_report(out, "---------------------------------------------")?;
    writeln_report(out, ("Matches within distance cut", accepted))?;
    writeln_report(out, ("Matches beyond distance cut", rejected))?;
    writeln_report(out, ("Elapsed time             (s)", elapsed_time.as_secs_f64() as Float))?;
    writeln_report(out, "---------------------------------------------")?;

    // Per-cell response and resolution
    writeln!(out)?;
    writeln!(
        out,
        "{:>3}{:>9}{:>7}{:>9}{:>14}{:>14}{:>9}",
        "reg", "pT", "cent", "entries", "mean", "rms", "outside"
    )?;
    for bucket in &res_fin.buckets {
        write!(
            out,
            "{:>3}{:>9}{:>7}{:>9}",
            bucket.region.tag(),
            bucket.pt_range.tag(),
            bucket.centrality.tag(),
            bucket.entries,
        )?;
        for stat in [bucket.mean, bucket.rms] {
            match stat {
                Some(x) => write!(out, "{:>14}", EngineeringFloat(x))?,
                None => write!(out, "{:>14}", "n/a")?,
            }
        }
        writeln!(out, "{:>9}", bucket.out_of_range)?;
    }

    // Response profiles
    for profile in res_fin.pt_profiles.iter().chain(&res_fin.eta_profiles) {
        write_profile(out, profile)?;
    }

    write_monitoring(out, &res_fin.monitor)
}

/// Write down the mean values of the monitoring histograms
fn write_monitoring(out: &mut impl Write, monitor: &MonitorHistograms) -> io::Result<()> {
    let mean = |histo: &Histo1D| histo.mean().unwrap_or(0.);

    writeln!(out)?;
    writeln_report(out, "---------------------------------------------")?;
    writeln_report(out, ("Mean HF energy           (GeV)", mean(&monitor.hf_energy)))?;
    writeln_report(out, ("Mean reco jets per event", mean(&monitor.reco_jets.num_jets)))?;
    let num_hard_jets = mean(&monitor.reco_jets.num_hard_jets);
    writeln_report(out, ("Mean reco jets above 40 GeV", num_hard_jets))?;
    writeln_report(out, ("Mean reco jet pT         (GeV)", mean(&monitor.reco_jets.pt)))?;
    writeln_report(out, ("Mean gen jet pT          (GeV)", mean(&monitor.gen_jets.pt)))?;

    let pf = &monitor.pf_candidates;
    writeln_report(out, ("Mean PF candidates per event", mean(pf.num_candidates())))?;
    writeln_report(out, ("Mean PF candidate pT     (GeV)", mean(pf.pt())))?;
    writeln_report(out, ("Mean PF candidate eta", mean(pf.eta())))?;
    writeln_report(out, ("Mean PF candidate phi", mean(pf.phi())))?;
    writeln_report(out, ("Mean PF sum pT           (GeV)", mean(pf.sum_pt())))?;
    writeln_report(out, ("Mean PF sum pT^2       (GeV^2)", mean(pf.sum_squared_pt())))?;
    for slice in 0..NUM_ETA_SLICES {
        let label = format!("PF sum pT in eta slice {}", slice);
        writeln_report(out, (&label[..], mean(pf.slice_sum_pt(slice))))?;
    }

    writeln!(out)?;
    write!(out, "{:<14}", "species")?;
    for region in EtaRegion::ALL {
        write!(out, "{:>9}", region.tag())?;
    }
    writeln!(out, "{:>14}", "<pT>")?;
    for species in ParticleId::ALL {
        write!(out, "{:<14}", species.name())?;
        for region in EtaRegion::ALL {
            write!(out, "{:>9}", pf.pt_spectrum(species, region).entries())?;
        }
        let profile = pf.pt_vs_eta(species);
        let entries = profile.total_entries();
        let pt_sum: Float = (0..profile.axis().num_bins())
            .filter_map(|bin| Some(profile.bin_mean(bin)? * profile.bin_entries(bin) as Float))
            .sum();
        let mean_pt = if entries > 0 { pt_sum / entries as Float } else { 0. };
        writeln!(out, "{:>14}", EngineeringFloat(mean_pt))?;
    }

    let label = "HF energy vs PF sum pT".to_string();
    write_profile(out, &ProfileSummary::new(label, pf.hf_energy_vs_sum_pt()))
}

/// Write down the non-empty bins of a response profile
fn write_profile(out: &mut impl Write, profile: &ProfileSummary) -> io::Result<()> {
    if profile.bins.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln_report(out, &profile.label[..])?;
    for bin in &profile.bins {
        writeln!(
            out,
            "{:>14}{:>9}{:>14}{:>14}",
            EngineeringFloat(bin.center),
            bin.entries,
            EngineeringFloat(bin.mean),
            EngineeringFloat(bin.rms)
        )?;
    }
    Ok(())
}

/// Name of the particle flow species fill policy
fn pf_fill_name(legacy_pf_fill: bool) -> &'static str {
    if legacy_pf_fill {
        "cumulative"
    } else {
        "own species"
    }
}

/// Text output facility for key-value report lines
fn writeln_report(out: &mut impl Write, data: impl WriteReport) -> io::Result<()> {
    write!(out, " ")?;
    data.write(out)?;
    writeln!(out)
}

/// Trait implemented by things which can be written into the report
trait WriteReport: Sized {
    /// Write down `self` to the output using report styling
    fn write(self, out: &mut impl Write) -> io::Result<()>;
}

impl WriteReport for &str {
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl WriteReport for usize {
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl WriteReport for Float {
    // Close approximation of printf's %g
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", EngineeringFloat(self))
    }
}

impl<T: WriteReport> WriteReport for (&str, T) {
    // Key-value output that uses fixed-size columns for better readability
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{:<31}: ", self.0)?;
        self.1.write(out)
    }
}

/// Floating-point number displayed using "engineering" notation
///
/// Analogous to the %g format of the C printf function, this switches between
/// naive and scientific notation for floating-point numbers when the number
/// being printed becomes so small that printing leading zeroes could end up
/// larger than the scientific notation, or so large that we would be forced to
/// print more significant digits than requested.
///
struct EngineeringFloat(Float);
//
impl std::fmt::Display for EngineeringFloat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let x = self.0;
        let mut precision = SIG_DIGITS - 1;
        let text = if x == 0. {
            // Zero is special because you can't take its log
            "0".to_string()
        } else {
            let log_x = x.abs().log10();
            if (-3. ..=(SIG_DIGITS as Float)).contains(&log_x) {
                // Rust's precision controls the number of digits after the
                // decimal point, adjust it to keep the significant digits fixed
                precision = (precision as isize - log_x.floor() as isize).max(0) as usize;
                let str_with_zeros = format!("{:.1$}", x, precision);
                if str_with_zeros.contains('.') {
                    str_with_zeros
                        .trim_end_matches('0')
                        .trim_end_matches('.')
                        .to_string()
                } else {
                    str_with_zeros
                }
            } else {
                format!("{:.1$e}", x, precision)
            }
        };
        // Forward width and alignment to the padding logic
        f.pad(&text)
    }
}
