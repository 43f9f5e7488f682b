use serde::Serialize;

use crate::error::{FuzzyError, Result};

/// Number of standard deviations treated as the effective support of a
/// gaussian curve when sampling.
const GAUSSIAN_SUPPORT_SIGMAS: f64 = 4.;

/// A membership function mapping the real line into `[0, 1]`.
pub trait Membership {
    fn evaluate(&self, x: f64) -> f64;

    /// The point used to represent the curve during center of maxima
    /// defuzzification.
    fn peak(&self) -> f64;

    /// Interval outside of which the curve is (effectively) zero.
    fn support(&self) -> (f64, f64);
}

fn check_finite(params: &[f64]) -> Result<()> {
    if params.iter().all(|p| p.is_finite()) {
        Ok(())
    } else {
        Err(FuzzyError::InvalidParameters(format!("non-finite parameter in {params:?}")))
    }
}

fn check_sorted(params: &[f64]) -> Result<()> {
    if params.windows(2).all(|w| w[0] <= w[1]) {
        Ok(())
    } else {
        Err(FuzzyError::InvalidParameters(format!("parameters must be non-decreasing, got {params:?}")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Triangular {
    a: f64,
    b: f64,
    c: f64,
}

impl Triangular {
    pub fn new(a: f64, b: f64, c: f64) -> Result<Self> {
        check_finite(&[a, b, c])?;
        check_sorted(&[a, b, c])?;

        Ok(Self { a, b, c })
    }

    pub fn params(&self) -> (f64, f64, f64) {
        (self.a, self.b, self.c)
    }
}

impl Membership for Triangular {
    fn evaluate(&self, x: f64) -> f64 {
        // The peak owns `b` even when a zero width slope puts it on an outer bound
        if x == self.b {
            return 1.;
        }
        if x.is_nan() || x <= self.a || x >= self.c {
            return 0.;
        }

        if x < self.b {
            (x - self.a) / (self.b - self.a)
        } else {
            (self.c - x) / (self.c - self.b)
        }
    }

    fn peak(&self) -> f64 {
        self.b
    }

    fn support(&self) -> (f64, f64) {
        (self.a, self.c)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Trapezoidal {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Trapezoidal {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        check_finite(&[a, b, c, d])?;
        check_sorted(&[a, b, c, d])?;

        Ok(Self { a, b, c, d })
    }

    pub fn params(&self) -> (f64, f64, f64, f64) {
        (self.a, self.b, self.c, self.d)
    }
}

impl Membership for Trapezoidal {
    fn evaluate(&self, x: f64) -> f64 {
        if self.b <= x && x <= self.c {
            return 1.;
        }
        if x.is_nan() || x <= self.a || x >= self.d {
            return 0.;
        }

        if x < self.b {
            (x - self.a) / (self.b - self.a)
        } else {
            (self.d - x) / (self.d - self.c)
        }
    }

    fn peak(&self) -> f64 {
        self.b
    }

    fn support(&self) -> (f64, f64) {
        (self.a, self.d)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Gaussian {
    mean: f64,
    sigma: f64,
}

impl Gaussian {
    pub fn new(mean: f64, sigma: f64) -> Result<Self> {
        check_finite(&[mean, sigma])?;

        if sigma == 0. {
            return Err(FuzzyError::InvalidParameters("gaussian sigma must be non-zero".into()));
        }

        Ok(Self { mean, sigma })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Membership for Gaussian {
    fn evaluate(&self, x: f64) -> f64 {
        if x.is_nan() {
            return 0.;
        }

        let z = (x - self.mean) / self.sigma;

        (-0.5 * z * z).exp()
    }

    fn peak(&self) -> f64 {
        self.mean
    }

    fn support(&self) -> (f64, f64) {
        let spread = GAUSSIAN_SUPPORT_SIGMAS * self.sigma.abs();

        (self.mean - spread, self.mean + spread)
    }
}

/// The closed set of curve shapes a term may use. Parameters are validated
/// once at construction and never change afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum MembershipCurve {
    Triangular(Triangular),
    Trapezoidal(Trapezoidal),
    Gaussian(Gaussian),
}

impl MembershipCurve {
    pub fn triangular(a: f64, b: f64, c: f64) -> Result<Self> {
        Triangular::new(a, b, c).map(Self::Triangular)
    }

    pub fn trapezoidal(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        Trapezoidal::new(a, b, c, d).map(Self::Trapezoidal)
    }

    pub fn gaussian(mean: f64, sigma: f64) -> Result<Self> {
        Gaussian::new(mean, sigma).map(Self::Gaussian)
    }
}

impl Membership for MembershipCurve {
    fn evaluate(&self, x: f64) -> f64 {
        match self {
            Self::Triangular(t) => t.evaluate(x),
            Self::Trapezoidal(t) => t.evaluate(x),
            Self::Gaussian(g) => g.evaluate(x),
        }
    }

    fn peak(&self) -> f64 {
        match self {
            Self::Triangular(t) => t.peak(),
            Self::Trapezoidal(t) => t.peak(),
            Self::Gaussian(g) => g.peak(),
        }
    }

    fn support(&self) -> (f64, f64) {
        match self {
            Self::Triangular(t) => t.support(),
            Self::Trapezoidal(t) => t.support(),
            Self::Gaussian(g) => g.support(),
        }
    }
}

impl From<Triangular> for MembershipCurve {
    fn from(t: Triangular) -> Self {
        Self::Triangular(t)
    }
}

impl From<Trapezoidal> for MembershipCurve {
    fn from(t: Trapezoidal) -> Self {
        Self::Trapezoidal(t)
    }
}

impl From<Gaussian> for MembershipCurve {
    fn from(g: Gaussian) -> Self {
        Self::Gaussian(g)
    }
}

#[test]
fn test_triangular() {
    use approx::assert_abs_diff_eq;

    let tri = MembershipCurve::triangular(0., 5., 10.).unwrap();

    assert_eq!(tri.evaluate(0.), 0.);
    assert_eq!(tri.evaluate(10.), 0.);
    assert_eq!(tri.evaluate(5.), 1.);
    assert_abs_diff_eq!(tri.evaluate(2.5), 0.5);
    assert_abs_diff_eq!(tri.evaluate(7.5), 0.5);
    assert_eq!(tri.evaluate(-3.), 0.);
    assert_eq!(tri.evaluate(12.), 0.);
    assert_eq!(tri.evaluate(f64::NAN), 0.);
    assert_eq!(tri.peak(), 5.);
}

#[test]
fn test_triangular_shoulders() {
    use approx::assert_abs_diff_eq;

    let low = MembershipCurve::triangular(0., 0., 200.).unwrap();
    let high = MembershipCurve::triangular(200., 400., 400.).unwrap();

    assert_eq!(low.evaluate(0.), 1.);
    assert_abs_diff_eq!(low.evaluate(100.), 0.5);
    assert_eq!(low.evaluate(200.), 0.);
    assert_eq!(low.evaluate(-1.), 0.);

    assert_eq!(high.evaluate(200.), 0.);
    assert_abs_diff_eq!(high.evaluate(300.), 0.5);
    assert_eq!(high.evaluate(400.), 1.);
    assert_eq!(high.evaluate(401.), 0.);
}

#[test]
fn test_trapezoidal() {
    use approx::assert_abs_diff_eq;

    let trap = MembershipCurve::trapezoidal(0., 2., 4., 8.).unwrap();

    assert_eq!(trap.evaluate(0.), 0.);
    assert_eq!(trap.evaluate(8.), 0.);
    assert_abs_diff_eq!(trap.evaluate(1.), 0.5);
    assert_eq!(trap.evaluate(2.), 1.);
    assert_eq!(trap.evaluate(3.), 1.);
    assert_eq!(trap.evaluate(4.), 1.);
    assert_abs_diff_eq!(trap.evaluate(6.), 0.5);
    assert_eq!(trap.peak(), 2.);
    assert_eq!(trap.support(), (0., 8.));
}

#[test]
fn test_gaussian() {
    use approx::assert_abs_diff_eq;

    let gauss = MembershipCurve::gaussian(50., 10.).unwrap();

    assert_eq!(gauss.evaluate(50.), 1.);
    assert_eq!(gauss.peak(), 50.);
    assert_abs_diff_eq!(gauss.evaluate(60.), (-0.5f64).exp());
    assert_abs_diff_eq!(gauss.evaluate(40.), gauss.evaluate(60.));
    assert!(gauss.evaluate(1e6) < 1e-12);
    assert_eq!(gauss.support(), (10., 90.));

    let negative = MembershipCurve::gaussian(50., -10.).unwrap();

    assert_abs_diff_eq!(negative.evaluate(60.), gauss.evaluate(60.));
    assert_eq!(negative.support(), (10., 90.));
}

#[test]
fn test_invalid_parameters() {
    assert!(matches!(
        MembershipCurve::triangular(3., 2., 1.),
        Err(FuzzyError::InvalidParameters(_))
    ));
    assert!(matches!(
        MembershipCurve::trapezoidal(0., 2., 1., 3.),
        Err(FuzzyError::InvalidParameters(_))
    ));
    assert!(matches!(
        MembershipCurve::gaussian(0., 0.),
        Err(FuzzyError::InvalidParameters(_))
    ));
    assert!(matches!(
        MembershipCurve::triangular(0., f64::NAN, 1.),
        Err(FuzzyError::InvalidParameters(_))
    ));
    assert!(MembershipCurve::triangular(1., 1., 1.).is_ok());
}
