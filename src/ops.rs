use indexmap::IndexMap;
use num::Float;
use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, Result};
use crate::linspace::Linspace;
use crate::membership::Membership;
use crate::variable::Variable;

/// Upper bound on centroid samples, keeping a loaded config from requesting
/// an unbounded allocation.
pub const MAX_CENTROID_SAMPLES: usize = 1 << 20;

/// Method for defuzzificating the aggregated output terms of a Mamdani engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Defuzzification {
    /// Activation weighted mean of each activated term's peak
    #[default]
    CenterOfMaxima,
    /// Center of gravity of the aggregated output set, sampled at `samples`
    /// evenly spaced points over the output variable's support
    Centroid { samples: usize },
}

impl Defuzzification {
    pub(crate) fn validate(self) -> Result<Self> {
        match self {
            Self::Centroid { samples } if samples < 2 => Err(FuzzyError::InvalidParameters(format!(
                "centroid defuzzification needs at least 2 samples, got {samples}"
            ))),
            Self::Centroid { samples } if samples > MAX_CENTROID_SAMPLES => {
                Err(FuzzyError::InvalidParameters(format!(
                    "centroid defuzzification takes at most {MAX_CENTROID_SAMPLES} samples, got {samples}"
                )))
            },
            _ => Ok(self),
        }
    }

    /// `activations` must only name terms defined on `output`.
    pub(crate) fn call(self, output: &Variable, activations: &IndexMap<String, f64>) -> f64 {
        match self {
            Self::CenterOfMaxima => center_of_maxima(output, activations),
            Self::Centroid { samples } => {
                let Some((min_u, max_u)) = output.support() else {
                    return 0.;
                };
                if min_u == max_u {
                    return center_of_maxima(output, activations);
                }
                let clipped: Vec<_> = activations
                    .iter()
                    .filter(|(_, activation)| **activation > 0.)
                    .filter_map(|(label, activation)| Some((*activation, output.term(label)?)))
                    .collect();
                let universe: Vec<f64> = Linspace::new(min_u, max_u, samples).collect();
                let membership: Vec<f64> = universe
                    .iter()
                    .map(|x| {
                        clipped
                            .iter()
                            .map(|(activation, curve)| f64::min(*activation, curve.evaluate(*x)))
                            .fold(0., f64::max)
                    })
                    .collect();

                // A fired set that lands between samples has no sampled area
                if membership.iter().all(|m| *m == 0.) {
                    return center_of_maxima(output, activations);
                }

                center_of_gravity(&universe, &membership)
            },
        }
    }
}

fn center_of_maxima(output: &Variable, activations: &IndexMap<String, f64>) -> f64 {
    weighted_average(
        activations
            .iter()
            .filter(|(_, activation)| **activation > 0.)
            .filter_map(|(label, activation)| Some((*activation, output.term(label)?.peak()))),
    )
}

/// Weighted mean of `(weight, value)` pairs. Zero total weight yields zero,
/// which is how an engine with no firing rules resolves.
pub(crate) fn weighted_average<F: Float>(pairs: impl IntoIterator<Item = (F, F)>) -> F {
    let (weighted_sum, weight_total) = pairs
        .into_iter()
        .fold((F::zero(), F::zero()), |(sum, total), (w, z)| (sum + w * z, total + w));

    if weight_total == F::zero() {
        F::zero()
    } else {
        weighted_sum / weight_total
    }
}

/// Center of gravity of a sampled membership function, treating each pair of
/// neighbouring samples as a rectangle topped by a triangle.
pub(crate) fn center_of_gravity<F: Float>(universe: &[F], membership: &[F]) -> F {
    debug_assert_eq!(universe.len(), membership.len());

    let n_areas = universe.len().saturating_sub(1);
    let two = F::one() + F::one();
    let three = two + F::one();
    let mut den = F::zero();
    let mut num = F::zero();

    for i in 0..n_areas {
        let base = universe[i + 1] - universe[i];
        let area_rect = F::min(membership[i], membership[i + 1]) * base;
        let center_rect = universe[i] + base / two;
        let (area_tri, center_tri) = if membership[i + 1] == membership[i] {
            (F::zero(), F::zero())
        } else if membership[i + 1] > membership[i] {
            (
                base * F::abs(membership[i + 1] - membership[i]) / two,
                universe[i] + two / three * base,
            )
        } else {
            (
                base * F::abs(membership[i + 1] - membership[i]) / two,
                universe[i] + F::one() / three * base,
            )
        };

        den = den + area_rect + area_tri;
        num = num + area_rect * center_rect + area_tri * center_tri;
    }

    if den == F::zero() {
        F::zero()
    } else {
        num / den
    }
}

#[test]
fn test_weighted_average() {
    use approx::assert_abs_diff_eq;

    assert_abs_diff_eq!(weighted_average([(0.3, 0.), (0.7, 100.)]), 70., epsilon = 1e-9);
    assert_eq!(weighted_average([(0., 5.), (0., 10.)]), 0.);
    assert_eq!(weighted_average(std::iter::empty::<(f64, f64)>()), 0.);
}

#[test]
fn test_center_of_gravity() {
    use approx::assert_abs_diff_eq;

    let universe: Vec<f64> = Linspace::new(0., 10., 11).collect();
    let symmetric: Vec<f64> = universe.iter().map(|x: &f64| 1. - (*x - 5.).abs() / 5.).collect();

    assert_abs_diff_eq!(center_of_gravity(&universe, &symmetric), 5., epsilon = 1e-9);

    // A right angled triangle rising towards 3 has its centroid at 2
    let universe = [0., 3.];
    let rising = [0., 1.];

    assert_abs_diff_eq!(center_of_gravity(&universe, &rising), 2., epsilon = 1e-9);
    assert_eq!(center_of_gravity(&universe, &[0., 0.]), 0.);
    assert_eq!(center_of_gravity(&[1.], &[1.]), 0.);
}

#[test]
fn test_defuzzification_validate() {
    assert!(Defuzzification::Centroid { samples: 1 }.validate().is_err());
    assert_eq!(
        Defuzzification::Centroid { samples: 101 }.validate(),
        Ok(Defuzzification::Centroid { samples: 101 })
    );
    assert_eq!(Defuzzification::default(), Defuzzification::CenterOfMaxima);
    assert!(Defuzzification::Centroid { samples: usize::MAX }.validate().is_err());
    assert!(Defuzzification::Centroid { samples: MAX_CENTROID_SAMPLES }.validate().is_ok());
}

#[test]
fn test_centroid_of_zero_width_output() {
    use crate::membership::MembershipCurve;

    let spike = Variable::new("setting").with_term("exact", MembershipCurve::triangular(7., 7., 7.).unwrap());
    let activations: IndexMap<String, f64> = [("exact".to_string(), 0.6)].into_iter().collect();

    assert_eq!(Defuzzification::Centroid { samples: 64 }.call(&spike, &activations), 7.);
    assert_eq!(Defuzzification::CenterOfMaxima.call(&spike, &activations), 7.);

    // A narrow spike falling between samples of a wide support
    let narrow = spike.with_term("wide", MembershipCurve::triangular(0., 5., 100.).unwrap());

    assert_eq!(Defuzzification::Centroid { samples: 3 }.call(&narrow, &activations), 7.);
    assert_eq!(Defuzzification::Centroid { samples: 3 }.call(&narrow, &IndexMap::new()), 0.);
}
