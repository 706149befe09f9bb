//! This module defines the per-event inputs of the analysis: jets, particle
//! flow candidates and centrality information

use crate::numeric::Float;

/// Generator-level jet
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenJet {
    /// Transverse momentum (GeV)
    pub pt: Float,

    /// Pseudorapidity
    pub eta: Float,

    /// Azimuthal angle
    pub phi: Float,
}

/// Reconstructed jet
///
/// Only pt, eta and phi take part in the response measurement, the other
/// attributes are only used for monitoring.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecoJet {
    /// Transverse momentum (GeV)
    pub pt: Float,

    /// Pseudorapidity
    pub eta: Float,

    /// Azimuthal angle
    pub phi: Float,

    /// Energy (GeV)
    pub energy: Float,

    /// Invariant mass (GeV)
    pub mass: Float,

    /// Catchment area in (eta, phi) space
    pub area: Float,

    /// Number of constituents
    pub constituents: usize,

    /// Pile-up energy attributed to the jet (GeV)
    pub pileup: Float,
}
//
impl RecoJet {
    /// Momentum magnitude
    pub fn p(&self) -> Float {
        self.pt * self.eta.cosh()
    }
}

/// Species of a particle flow candidate
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParticleId {
    Unknown,
    ChargedHadron,
    Electron,
    Muon,
    Photon,
    NeutralHadron,
    HadronicHf,
    EmHf,
}
//
impl ParticleId {
    /// Number of species
    pub const COUNT: usize = 8;

    /// All species, in particle flow id order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Unknown,
        Self::ChargedHadron,
        Self::Electron,
        Self::Muon,
        Self::Photon,
        Self::NeutralHadron,
        Self::HadronicHf,
        Self::EmHf,
    ];

    /// Numerical particle flow id (0 to 7)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Species from a numerical particle flow id
    pub fn from_index(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    /// Name used in histogram titles
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::ChargedHadron => "ChargedHadron",
            Self::Electron => "electron",
            Self::Muon => "muon",
            Self::Photon => "photon",
            Self::NeutralHadron => "NeutralHadron",
            Self::HadronicHf => "HadE_inHF",
            Self::EmHf => "EME_inHF",
        }
    }
}

/// Particle flow candidate
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PfCandidate {
    /// Transverse momentum (GeV)
    pub pt: Float,

    /// Pseudorapidity
    pub eta: Float,

    /// Azimuthal angle
    pub phi: Float,

    /// Species
    pub id: ParticleId,
}

/// Output of the centrality determination for one event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Centrality {
    /// Centrality bin, 0 is the most central 0.5% of the events
    pub bin: i32,

    /// Transverse energy summed over the HF towers (GeV)
    pub hf_energy: Float,
}

/// Everything the analysis consumes for one event
///
/// Each collection is optional, as upstream producers may fail to provide it.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    /// Centrality information
    pub centrality: Option<Centrality>,

    /// Reconstructed jets
    pub reco_jets: Option<Vec<RecoJet>>,

    /// Generator-level jets (only meaningful for simulated events)
    pub gen_jets: Option<Vec<GenJet>>,

    /// Particle flow candidates
    pub pf_candidates: Option<Vec<PfCandidate>>,

    /// Truth that this event comes from real collisions, not simulation
    pub is_real_data: bool,
}
