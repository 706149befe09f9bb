//! Categorical axes of the response grid: pseudorapidity region, generator pT
//! range and centrality range
//!
//! Every classifier returns `None` for values outside the declared ranges, and
//! callers skip the accumulators keyed by that axis.

use crate::numeric::Float;

/// Detector pseudorapidity zone
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EtaRegion {
    Barrel,
    Endcap,
    Forward,
}
//
impl EtaRegion {
    /// Number of regions
    pub const COUNT: usize = 3;

    /// All regions, in storage order
    pub const ALL: [Self; Self::COUNT] = [Self::Barrel, Self::Endcap, Self::Forward];

    /// Storage index of this region
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-letter tag used in histogram names
    pub fn tag(self) -> &'static str {
        match self {
            Self::Barrel => "B",
            Self::Endcap => "E",
            Self::Forward => "F",
        }
    }
}

/// |eta| boundaries of the detector regions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionBounds {
    /// Upper |eta| edge of the barrel
    pub barrel_eta: Float,

    /// Upper |eta| edge of the endcaps
    pub endcap_eta: Float,

    /// Upper |eta| edge of the forward calorimeters
    pub forward_eta: Float,
}
//
impl RegionBounds {
    /// Classify a pseudorapidity, edges belong to the outer region
    pub fn classify(&self, eta: Float) -> Option<EtaRegion> {
        let abs_eta = eta.abs();
        if abs_eta < self.barrel_eta {
            Some(EtaRegion::Barrel)
        } else if abs_eta < self.endcap_eta {
            Some(EtaRegion::Endcap)
        } else if abs_eta < self.forward_eta {
            Some(EtaRegion::Forward)
        } else {
            None
        }
    }

    /// Human-readable |eta| interval of a region
    pub fn describe(&self, region: EtaRegion) -> String {
        match region {
            EtaRegion::Barrel => format!("|eta|<{:.2}", self.barrel_eta),
            EtaRegion::Endcap => format!("{:.2}<|eta|<{:.2}", self.barrel_eta, self.endcap_eta),
            EtaRegion::Forward => format!("{:.2}<|eta|<{:.2}", self.endcap_eta, self.forward_eta),
        }
    }
}

/// Generator-level transverse momentum range (GeV)
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PtRange {
    Pt20To30,
    Pt30To50,
    Pt50To80,
    Pt80To120,
    Pt120To180,
    Pt180To300,
    Pt300ToInf,
}
//
impl PtRange {
    /// Number of pT ranges
    pub const COUNT: usize = 7;

    /// All pT ranges, in increasing pT order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Pt20To30,
        Self::Pt30To50,
        Self::Pt50To80,
        Self::Pt80To120,
        Self::Pt120To180,
        Self::Pt180To300,
        Self::Pt300ToInf,
    ];

    /// Lower edges of the ranges, each range ends where the next one begins
    const LOWER_EDGES: [Float; Self::COUNT] = [20., 30., 50., 80., 120., 180., 300.];

    /// Find the range [lo, hi) containing pt, the last range is open-ended
    pub fn classify(pt: Float) -> Option<Self> {
        Self::ALL
            .iter()
            .rev()
            .zip(Self::LOWER_EDGES.iter().rev())
            .find(|&(_, &lo)| pt >= lo)
            .map(|(&range, _)| range)
    }

    /// Storage index of this range
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lower and (if any) upper edge of this range
    pub fn edges(self) -> (Float, Option<Float>) {
        let idx = self.index();
        (Self::LOWER_EDGES[idx], Self::LOWER_EDGES.get(idx + 1).copied())
    }

    /// Tag used in histogram names, e.g. "20_30" or "300_Inf"
    pub fn tag(self) -> String {
        match self.edges() {
            (lo, Some(hi)) => format!("{}_{}", lo, hi),
            (lo, None) => format!("{}_Inf", lo),
        }
    }
}

/// Collision centrality class
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CentralityRange {
    Cent0To10,
    Cent10To30,
    Cent30To50,
    Cent50To80,
}
//
impl CentralityRange {
    /// Number of centrality classes
    pub const COUNT: usize = 4;

    /// All centrality classes, from most central to most peripheral
    pub const ALL: [Self; Self::COUNT] = [
        Self::Cent0To10,
        Self::Cent10To30,
        Self::Cent30To50,
        Self::Cent50To80,
    ];

    /// Classify a centrality bin (0.5% granularity, 200 bins in total)
    ///
    /// Bins at or beyond 160 (the 20% most peripheral events) are not used.
    ///
    pub fn classify(hibin: i32) -> Option<Self> {
        match hibin {
            i32::MIN..=19 => Some(Self::Cent0To10),
            20..=59 => Some(Self::Cent10To30),
            60..=99 => Some(Self::Cent30To50),
            100..=159 => Some(Self::Cent50To80),
            _ => None,
        }
    }

    /// Storage index of this class
    pub fn index(self) -> usize {
        self as usize
    }

    /// Tag used in histogram names, e.g. "0_10"
    pub fn tag(self) -> &'static str {
        match self {
            Self::Cent0To10 => "0_10",
            Self::Cent10To30 => "10_30",
            Self::Cent30To50 => "30_50",
            Self::Cent50To80 => "50_80",
        }
    }
}
