//! Mechanism for loading and sharing the analysis job configuration

use crate::{
    analyzer::{AnalysisOptions, PfFillPolicy},
    binning::RegionBounds,
    numeric::Float,
    Result,
};

use eyre::{ensure, eyre, WrapErr};

use std::{fs, str::FromStr};

/// Default name of the configuration file
pub const DEFAULT_CONFIG_FILE: &str = "jet_response.cfg";

/// Analysis job configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Number of events to be generated and analyzed
    pub num_events: usize,

    /// Seed of the event generator's random number generator
    pub seed: u64,

    /// Minimal pT of reconstructed jets in the monitoring spectra (GeV)
    pub reco_jet_pt_threshold: Float,

    /// Minimal pT of generator jets to be matched (GeV)
    pub match_gen_pt_threshold: Float,

    /// Maximal distance between a generator jet and its reconstructed match
    pub r_threshold: Float,

    /// Pseudorapidity region boundaries
    pub region_bounds: RegionBounds,

    /// Whether particle flow candidates should be recorded into every species
    /// histogram at or above their own, as historical plots did
    pub legacy_pf_fill: bool,
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and log it
    pub fn load(file_name: &str) -> Result<Self> {
        let config_str = fs::read_to_string(file_name)
            .wrap_err_with(|| format!("Could not read configuration file {}", file_name))?;
        let config = Self::parse(&config_str)?;
        config.print();
        Ok(config)
    }

    /// Decode and check the contents of a configuration file
    pub fn parse(config_str: &str) -> Result<Self> {
        // Configuration items are the first non-whitespace chunk of text on
        // each line, the rest is free-form commentary. Blank lines are ignored.
        let mut config_iter = config_str
            .lines()
            .filter_map(|line| line.split_whitespace().next());

        // Fetch the next configuration item, tagged with the name of the
        // configuration field which it is supposed to fill
        let mut next_item = |name: &'static str| -> Result<ConfigItem> {
            config_iter
                .next()
                .map(|data| ConfigItem::new(name, data))
                .ok_or_else(|| eyre!("Missing configuration of {}", name))
        };

        let config = Configuration {
            num_events: next_item("num_events")?.parse::<usize>()?,
            seed: next_item("seed")?.parse::<u64>()?,
            reco_jet_pt_threshold: next_item("reco_jet_pt_threshold")?.parse::<Float>()?,
            match_gen_pt_threshold: next_item("match_gen_pt_threshold")?.parse::<Float>()?,
            r_threshold: next_item("r_threshold")?.parse::<Float>()?,
            region_bounds: RegionBounds {
                barrel_eta: next_item("barrel_eta")?.parse::<Float>()?,
                endcap_eta: next_item("endcap_eta")?.parse::<Float>()?,
                forward_eta: next_item("forward_eta")?.parse::<Float>()?,
            },
            legacy_pf_fill: next_item("legacy_pf_fill")?.parse_bool()?,
        };

        // A sensible job must analyze at least one event
        ensure!(config.num_events > 0, "Please analyze at least one event");

        // Generator jets at the threshold are matched, and their pT divides
        // the reconstructed pT
        ensure!(
            config.match_gen_pt_threshold > 0.,
            "The generator jet pT threshold must be positive, got {}",
            config.match_gen_pt_threshold
        );

        ensure!(
            config.r_threshold > 0.,
            "The matching distance cut must be positive, got {}",
            config.r_threshold
        );

        let RegionBounds {
            barrel_eta,
            endcap_eta,
            forward_eta,
        } = config.region_bounds;
        ensure!(
            0. < barrel_eta && barrel_eta < endcap_eta && endcap_eta < forward_eta,
            "Pseudorapidity regions must satisfy 0 < barrel ({}) < endcap ({}) < forward ({})",
            barrel_eta,
            endcap_eta,
            forward_eta
        );

        Ok(config)
    }

    /// Analysis parameters derived from this configuration
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            reco_jet_pt_threshold: self.reco_jet_pt_threshold,
            match_gen_pt_threshold: self.match_gen_pt_threshold,
            r_threshold: self.r_threshold,
            region_bounds: self.region_bounds,
            pf_fill_policy: if self.legacy_pf_fill {
                PfFillPolicy::Cumulative
            } else {
                PfFillPolicy::OwnSpecies
            },
        }
    }

    /// Log the configuration
    pub fn print(&self) {
        log::info!("num_events             : {}", self.num_events);
        log::info!("seed                   : {}", self.seed);
        log::info!("reco_jet_pt_threshold  : {}", self.reco_jet_pt_threshold);
        log::info!("match_gen_pt_threshold : {}", self.match_gen_pt_threshold);
        log::info!("r_threshold            : {}", self.r_threshold);
        log::info!("barrel_eta             : {}", self.region_bounds.barrel_eta);
        log::info!("endcap_eta             : {}", self.region_bounds.endcap_eta);
        log::info!("forward_eta            : {}", self.region_bounds.forward_eta);
        log::info!("legacy_pf_fill         : {}", self.legacy_pf_fill);
    }
}

/// A value from the configuration file, tagged with the struct field which it
/// is supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: ::std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Parse this data using special logic which handles Fortran's bool syntax
    fn parse_bool(self) -> Result<bool> {
        match self.data.to_lowercase().as_str() {
            ".true." => Ok(true),
            ".false." => Ok(false),
            _ => self.parse::<bool>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "
        1000        num_events
        42          seed
        20.         reco_jet_pt_threshold (GeV)
        20.         match_gen_pt_threshold (GeV)

        0.3         r_threshold
        2.0         barrel_eta
        3.0         endcap_eta
        5.0         forward_eta
        .false.     legacy_pf_fill
    ";

    #[test]
    fn valid_configuration() {
        let config = Configuration::parse(VALID).unwrap();
        assert_eq!(config.num_events, 1000);
        assert_eq!(config.seed, 42);
        assert_eq!(config.r_threshold, 0.3);
        assert_eq!(config.region_bounds.endcap_eta, 3.0);
        assert!(!config.legacy_pf_fill);
        assert_eq!(config.analysis_options().pf_fill_policy, PfFillPolicy::OwnSpecies);
    }

    #[test]
    fn boolean_syntaxes() {
        let legacy = VALID.replace(".false.", ".TRUE.");
        let config = Configuration::parse(&legacy).unwrap();
        assert_eq!(config.analysis_options().pf_fill_policy, PfFillPolicy::Cumulative);
        assert!(Configuration::parse(&VALID.replace(".false.", "false")).is_ok());
        assert!(Configuration::parse(&VALID.replace(".false.", "maybe")).is_err());
    }

    #[test]
    fn rejects_zero_events() {
        let config = VALID.replacen("1000", "0", 1);
        assert!(Configuration::parse(&config).is_err());
    }

    #[test]
    fn rejects_non_positive_gen_threshold() {
        let with_threshold =
            |threshold: &str| VALID.replace("20.         match_gen", &format!("{} match_gen", threshold));
        let err = Configuration::parse(&with_threshold("0.")).unwrap_err();
        assert!(err.to_string().contains("generator jet pT threshold"));
        assert!(Configuration::parse(&with_threshold("-5.")).is_err());
        let config = Configuration::parse(&with_threshold("0.5")).unwrap();
        assert_eq!(config.match_gen_pt_threshold, 0.5);
        assert_eq!(config.reco_jet_pt_threshold, 20.);
    }

    #[test]
    fn rejects_inconsistent_regions() {
        let config = VALID.replace("3.0 ", "1.5 ");
        assert!(Configuration::parse(&config).is_err());
        let config = VALID.replace("2.0 ", "-1. ");
        assert!(Configuration::parse(&config).is_err());
    }

    #[test]
    fn missing_items_are_reported() {
        let truncated: String = VALID.lines().take(5).collect::<Vec<_>>().join("\n");
        let err = Configuration::parse(&truncated).unwrap_err();
        assert!(err.to_string().contains("r_threshold"));
    }
}
