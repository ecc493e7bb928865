//! Per-axis knot topology for the trivariate spline.
//!
//! Each lattice axis carries an [`AxisKnots`] value built for one of four
//! boundary regimes. The stored knot array is deduplicated; basis evaluation
//! addresses knots through a regime-dependent theoretical Cox-de-Boor index
//! space that the `eff_map` folds onto stored entries. A second map,
//! `node_map`, folds theoretical basis indices onto grid nodes so periodic
//! and symmetric axes reuse control points across the seam.

use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance used to widen half-open knot intervals and snap near-zero knots.
const KNOT_EPS: f64 = 1.0e-12;

/// Zero guard for the basis recurrence denominators.
const BASIS_DENOM_EPS: f64 = 1.0e-15;

/// Boundary regime of one knot vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KnotRegime {
    /// Open curve pinned to the first and last grid node.
    Clamped,
    /// Open curve with free ends and a tolerance-widened last interval.
    Unclamped,
    /// Curve wraps across the seam with `C^(degree-1)` continuity.
    Periodic,
    /// Curve mirrors across both ends.
    Symmetric,
}

/// Knot topology of one lattice axis.
///
/// Built by [`AxisKnots::build`] from the axis regime, grid node count,
/// curve degree, and the axis range in the local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisKnots {
    regime: KnotRegime,
    degree: usize,
    node_count: usize,
    knots: Vec<f64>,
    eff_map: Vec<usize>,
    node_map: Vec<usize>,
}

impl AxisKnots {
    /// Builds the knot vector of one axis.
    ///
    /// `node_count` is the grid node count along the axis, `origin` and
    /// `span` delimit the axis range in the local frame. A degree outside
    /// `[1, node_count - 1]` is silently corrected.
    #[must_use]
    pub fn build(
        regime: KnotRegime,
        node_count: usize,
        degree: usize,
        origin: f64,
        span: f64,
    ) -> Self {
        let node_count = node_count.max(2);
        let capped = degree.clamp(1, node_count - 1);
        if capped != degree {
            warn!(
                regime = ?regime,
                requested = degree,
                capped,
                "curve degree corrected to the valid range"
            );
        }
        let degree = capped;

        let equinode = equispaced_nodes(regime, node_count, degree, origin, span);
        let (knots, eff_map) = match regime {
            KnotRegime::Clamped => clamped_knots(&equinode, node_count, degree),
            KnotRegime::Unclamped => unclamped_knots(&equinode, node_count, degree),
            KnotRegime::Periodic | KnotRegime::Symmetric => {
                wrapped_knots(&equinode, node_count, degree)
            }
        };
        let node_map = node_map(regime, node_count, degree);

        Self {
            regime,
            degree,
            node_count,
            knots,
            eff_map,
            node_map,
        }
    }

    /// Returns the axis regime.
    #[must_use]
    pub const fn regime(&self) -> KnotRegime {
        self.regime
    }

    /// Returns the curve degree.
    #[must_use]
    pub const fn degree(&self) -> usize {
        self.degree
    }

    /// Returns the grid node count of the axis.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns the stored knot values.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Returns the theoretical-to-stored index map.
    #[must_use]
    pub fn eff_map(&self) -> &[usize] {
        &self.eff_map
    }

    /// Returns the theoretical-basis-to-grid-node map.
    #[must_use]
    pub fn node_map(&self) -> &[usize] {
        &self.node_map
    }

    /// Maps a theoretical basis index to its grid node along the axis.
    #[must_use]
    pub fn node_of_basis(&self, basis: usize) -> usize {
        self.node_map[basis]
    }

    /// Finds the theoretical index of the knot interval containing `coord`.
    ///
    /// Out-of-range coordinates pin to the first or last interval.
    #[must_use]
    pub fn interval_of(&self, coord: f64) -> usize {
        let last = self.knots.len() - 1;
        let stored = if coord < self.knots[0] {
            0
        } else if coord >= self.knots[last] {
            last - 1
        } else {
            self.knots.partition_point(|&k| k <= coord) - 1
        };
        self.theoretical_of(stored)
    }

    /// Maps a stored knot index to the last theoretical index aliasing it.
    fn theoretical_of(&self, stored: usize) -> usize {
        self.eff_map
            .iter()
            .rposition(|&m| m == stored)
            .unwrap_or(stored)
    }

    /// Reads a knot through the theoretical index space.
    ///
    /// Indices outside the theoretical range clamp to its ends, so basis
    /// evaluation stays total for out-of-domain coordinates.
    fn knot_at(&self, theoretical: isize) -> f64 {
        #[allow(clippy::cast_possible_wrap)]
        let last = self.eff_map.len() as isize - 1;
        #[allow(clippy::cast_sign_loss)]
        let idx = theoretical.clamp(0, last) as usize;
        self.knots[self.eff_map[idx]]
    }

    /// Evaluates the `degree + 1` non-zero basis functions on an interval.
    ///
    /// `interval` is a theoretical index from [`Self::interval_of`]. Uses
    /// the inverse triangular scheme: basis values of increasing degree are
    /// built in place from `left`/`right` knot distances, without recursion.
    #[must_use]
    pub fn basis_at(&self, interval: usize, coord: f64) -> Vec<f64> {
        let order = self.degree + 1;
        let mut basis = vec![1.0; order];
        let mut left = vec![0.0; order];
        let mut right = vec![0.0; order];

        #[allow(clippy::cast_possible_wrap)]
        let k = interval as isize;
        for j in 1..order {
            #[allow(clippy::cast_possible_wrap)]
            let sj = j as isize;
            left[j] = coord - self.knot_at(k + 1 - sj);
            right[j] = self.knot_at(k + sj) - coord;

            let mut saved = 0.0;
            for r in 0..j {
                let denom = right[r + 1] + left[j - r];
                let tmp = if denom.abs() < BASIS_DENOM_EPS {
                    0.0
                } else {
                    basis[r] / denom
                };
                basis[r] = saved + right[r + 1] * tmp;
                saved = left[j - r] * tmp;
            }
            basis[j] = saved;
        }
        basis
    }
}

/// Computes the equispaced node abscissas feeding the knot averaging.
///
/// Periodic and symmetric regimes pad `degree - 1` extra abscissas so every
/// averaging window has enough neighbors across the seam.
fn equispaced_nodes(
    regime: KnotRegime,
    node_count: usize,
    degree: usize,
    origin: f64,
    span: f64,
) -> Vec<f64> {
    #[allow(clippy::cast_precision_loss)]
    let step = span / (node_count - 1) as f64;
    match regime {
        KnotRegime::Clamped | KnotRegime::Unclamped => (0..node_count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let offset = i as f64 * step;
                origin + offset
            })
            .collect(),
        KnotRegime::Periodic | KnotRegime::Symmetric => {
            let retro = (degree - 1).div_ceil(2);
            (0..node_count + degree - 1)
                .map(|i| {
                    #[allow(clippy::cast_precision_loss)]
                    let offset = (i as f64 - retro as f64) * step;
                    origin + offset
                })
                .collect()
        }
    }
}

/// Mean of `degree` consecutive node abscissas starting at `lo`.
fn window_mean(equinode: &[f64], lo: usize, degree: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let count = degree as f64;
    equinode[lo..lo + degree].iter().sum::<f64>() / count
}

/// Clamped regime: deduplicated array with ends pinned to the node extremes.
fn clamped_knots(equinode: &[f64], node_count: usize, degree: usize) -> (Vec<f64>, Vec<usize>) {
    let k_eff = node_count - degree + 1;
    let k_theo = node_count + degree + 1;

    let mut knots = vec![0.0; k_eff];
    knots[0] = equinode[0];
    knots[k_eff - 1] = equinode[node_count - 1];
    for i in 1..k_eff - 1 {
        knots[i] = window_mean(equinode, i, degree);
    }

    let mut eff_map = vec![0; k_theo];
    for (t, slot) in eff_map.iter_mut().enumerate().skip(degree) {
        *slot = (t - degree).min(k_eff - 1);
    }
    (knots, eff_map)
}

/// Unclamped regime: clamped construction widened by [`KNOT_EPS`] at the far
/// end, then both ends freed by extrapolating `degree` knots per side from
/// the opposite end's spacing.
fn unclamped_knots(equinode: &[f64], node_count: usize, degree: usize) -> (Vec<f64>, Vec<usize>) {
    let k_eff = node_count - degree + 1;
    let k_theo = node_count + degree + 1;
    let kend = degree + k_eff - 1;

    let mut knots = vec![0.0; k_theo];
    knots[degree] = equinode[0];
    knots[kend] = equinode[node_count - 1] + KNOT_EPS;
    for i in 1..k_eff - 1 {
        knots[degree + i] = window_mean(equinode, i, degree);
    }
    unclamp_ends(&mut knots, degree, kend);

    (knots, (0..k_theo).collect())
}

/// Periodic and symmetric regimes: averaged knots over the padded abscissas,
/// freed on both ends. The two regimes share the knot array and differ only
/// in the node map.
fn wrapped_knots(equinode: &[f64], node_count: usize, degree: usize) -> (Vec<f64>, Vec<usize>) {
    let k_eff = node_count;
    let k_theo = node_count + 2 * degree;
    let kend = degree + k_eff - 1;

    let mut knots = vec![0.0; k_theo];
    let first = window_mean(equinode, 0, degree);
    knots[degree] = if first.abs() < KNOT_EPS { 0.0 } else { first };
    for i in 1..k_eff {
        knots[degree + i] = window_mean(equinode, i, degree);
    }
    unclamp_ends(&mut knots, degree, kend);

    (knots, (0..k_theo).collect())
}

/// Extrapolates `degree` knots on each side using the opposite end spacing.
fn unclamp_ends(knots: &mut [f64], degree: usize, kend: usize) {
    for i in 0..degree {
        knots[degree - i - 1] = knots[degree - i] - (knots[kend - i] - knots[kend - i - 1]);
        knots[kend + 1 + i] = knots[kend + i] + (knots[degree + i + 1] - knots[degree + i]);
    }
}

/// Builds the theoretical-basis-to-grid-node map of one axis.
fn node_map(regime: KnotRegime, node_count: usize, degree: usize) -> Vec<usize> {
    let n = node_count;
    match regime {
        KnotRegime::Clamped | KnotRegime::Unclamped => (0..n).collect(),
        KnotRegime::Periodic => {
            let pre = (degree - 1).div_ceil(2);
            let post = degree - 1 - pre;
            let mut map = vec![0; n + degree];
            for i in 0..n {
                map[i + pre] = i;
            }
            for i in 0..pre {
                map[i] = (n - pre - 1) + i;
            }
            for i in 0..=post {
                map[pre + n + i] = 1 + i;
            }
            map
        }
        KnotRegime::Symmetric => {
            let pre = (degree - 1).div_ceil(2);
            let post = degree - 1 - pre;
            let mut map = vec![0; n + degree];
            for i in 0..n {
                map[i + pre] = i;
            }
            for i in 0..pre {
                map[pre - 1 - i] = (i + 1) % (n - 1);
            }
            for i in 0..=post {
                map[pre + n + i] = (n - 2 - i) % (n - 1);
            }
            map
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::needless_range_loop
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_clamped_bezier_reduces_to_two_knots() {
        let axis = AxisKnots::build(KnotRegime::Clamped, 3, 2, 0.0, 1.0);

        assert_eq!(axis.knots(), &[0.0, 1.0]);
        assert_eq!(axis.eff_map(), &[0, 0, 0, 1, 1, 1]);
        assert_eq!(axis.node_map(), &[0, 1, 2]);
    }

    #[test]
    fn test_clamped_interior_knot_averaging() {
        let axis = AxisKnots::build(KnotRegime::Clamped, 5, 2, -0.5, 1.0);

        let knots = axis.knots();
        assert_eq!(knots.len(), 4);
        assert_relative_eq!(knots[0], -0.5);
        assert_relative_eq!(knots[1], -0.125);
        assert_relative_eq!(knots[2], 0.125);
        assert_relative_eq!(knots[3], 0.5);
        assert_eq!(axis.eff_map(), &[0, 0, 0, 1, 2, 3, 3, 3]);
    }

    #[test]
    fn test_unclamped_widens_and_extrapolates() {
        let axis = AxisKnots::build(KnotRegime::Unclamped, 3, 1, -0.5, 1.0);

        let knots = axis.knots();
        assert_eq!(knots.len(), 5);
        assert_relative_eq!(knots[0], -1.0 - 1.0e-12);
        assert_relative_eq!(knots[1], -0.5);
        assert_relative_eq!(knots[2], 0.0);
        assert_relative_eq!(knots[3], 0.5 + 1.0e-12);
        assert_relative_eq!(knots[4], 1.0 + 1.0e-12);
        assert_eq!(axis.eff_map(), &[0, 1, 2, 3, 4]);
        assert_eq!(axis.node_map(), &[0, 1, 2]);
    }

    #[test]
    fn test_periodic_full_turn_knots() {
        let axis = AxisKnots::build(KnotRegime::Periodic, 5, 2, 0.0, TAU);

        let knots = axis.knots();
        assert_eq!(knots.len(), 9);
        for (i, knot) in knots.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let expected = (2.0 * i as f64 - 5.0) * PI / 4.0;
            assert_relative_eq!(*knot, expected, epsilon = 1.0e-12);
        }
        assert_eq!(axis.node_map(), &[3, 0, 1, 2, 3, 4, 1]);
    }

    #[test]
    fn test_symmetric_node_map_mirrors() {
        let axis = AxisKnots::build(KnotRegime::Symmetric, 5, 2, 0.0, TAU);

        assert_eq!(axis.node_map(), &[1, 0, 1, 2, 3, 4, 3]);
        // Same knot array as the periodic regime.
        let periodic = AxisKnots::build(KnotRegime::Periodic, 5, 2, 0.0, TAU);
        assert_eq!(axis.knots(), periodic.knots());
    }

    #[test]
    fn test_degree_capped_to_node_count() {
        let axis = AxisKnots::build(KnotRegime::Clamped, 3, 7, 0.0, 1.0);

        assert_eq!(axis.degree(), 2);
        assert_eq!(axis.knots().len(), 2);
    }

    #[test]
    fn test_interval_search_aliases_clamped_ends() {
        let axis = AxisKnots::build(KnotRegime::Clamped, 5, 2, -0.5, 1.0);

        // Stored knots [-0.5, -0.125, 0.125, 0.5].
        assert_eq!(axis.interval_of(-0.2), 2);
        assert_eq!(axis.interval_of(0.0), 3);
        assert_eq!(axis.interval_of(0.3), 4);
        // Out of range pins to first or last interval.
        assert_eq!(axis.interval_of(-0.7), 2);
        assert_eq!(axis.interval_of(0.6), 4);
    }

    #[test]
    fn test_basis_matches_bernstein_on_bezier_axis() {
        let axis = AxisKnots::build(KnotRegime::Clamped, 3, 2, 0.0, 1.0);

        let interval = axis.interval_of(0.3);
        assert_eq!(interval, 2);
        let basis = axis.basis_at(interval, 0.3);
        assert_relative_eq!(basis[0], 0.49, epsilon = 1.0e-12);
        assert_relative_eq!(basis[1], 0.42, epsilon = 1.0e-12);
        assert_relative_eq!(basis[2], 0.09, epsilon = 1.0e-12);
    }

    #[test]
    fn test_basis_partition_of_unity() {
        let regimes = [
            KnotRegime::Clamped,
            KnotRegime::Unclamped,
            KnotRegime::Periodic,
            KnotRegime::Symmetric,
        ];
        for regime in regimes {
            let axis = AxisKnots::build(regime, 7, 3, 0.0, TAU);
            for step in 0..20 {
                let coord = TAU * (f64::from(step) + 0.5) / 20.0;
                let basis = axis.basis_at(axis.interval_of(coord), coord);
                let sum: f64 = basis.iter().sum();
                assert_relative_eq!(sum, 1.0, epsilon = 1.0e-9);
            }
        }
    }

    #[test]
    fn test_basis_interpolates_clamped_ends() {
        let axis = AxisKnots::build(KnotRegime::Clamped, 5, 2, -0.5, 1.0);

        let basis = axis.basis_at(axis.interval_of(-0.5), -0.5);
        assert_relative_eq!(basis[0], 1.0, epsilon = 1.0e-12);
        assert_relative_eq!(basis[1], 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(basis[2], 0.0, epsilon = 1.0e-12);
    }

    #[test]
    fn test_out_of_domain_basis_stays_finite() {
        let axis = AxisKnots::build(KnotRegime::Periodic, 5, 2, 0.0, TAU);

        let below = axis.basis_at(axis.interval_of(-10.0), -10.0);
        let above = axis.basis_at(axis.interval_of(10.0), 10.0);
        assert!(below.iter().all(|b| b.is_finite()));
        assert!(above.iter().all(|b| b.is_finite()));
    }
}
