//! Angular distances in (pseudorapidity, azimuth) space

use crate::numeric::{
    floats::consts::{PI, TAU},
    Float,
};
use prefix_num_ops::real::*;

/// Azimuthal difference phi1 - phi2, wrapped into (-pi, pi]
pub fn delta_phi(phi1: Float, phi2: Float) -> Float {
    let dphi = (phi1 - phi2).rem_euclid(TAU);
    if dphi > PI {
        dphi - TAU
    } else {
        dphi
    }
}

/// Angular separation sqrt(deta^2 + dphi^2), going the short way around in phi
pub fn delta_r(eta1: Float, phi1: Float, eta2: Float, phi2: Float) -> Float {
    let deta = eta1 - eta2;
    let dphi = delta_phi(phi1, phi2);
    sqrt(deta * deta + dphi * dphi)
}
