use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use slotmap::{new_key_type, SlotMap};

use crate::error::{FuzzyError, Result};
use crate::membership::{Membership, MembershipCurve};

/// Membership degree of a crisp value in every term of a variable, in term
/// insertion order.
pub type Degrees = IndexMap<String, f64>;

/// Fuzzified degrees keyed by variable name.
pub type Fuzzified = HashMap<String, Degrees>;

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

/// A named axis partitioned into linguistic terms.
#[derive(Clone, Debug, Serialize)]
pub struct Variable {
    name: String,
    terms: IndexMap<String, MembershipCurve>,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            terms: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a term, overwriting (and returning) any curve previously
    /// registered under the same name. Callers are expected to keep term
    /// names unique.
    pub fn add_term(&mut self, name: impl Into<String>, curve: impl Into<MembershipCurve>) -> Option<MembershipCurve> {
        self.terms.insert(name.into(), curve.into())
    }

    pub fn with_term(mut self, name: impl Into<String>, curve: impl Into<MembershipCurve>) -> Self {
        self.add_term(name, curve);
        self
    }

    pub fn term(&self, name: &str) -> Option<&MembershipCurve> {
        self.terms.get(name)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &MembershipCurve)> {
        self.terms.iter().map(|(name, curve)| (name.as_str(), curve))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn fuzzify(&self, value: f64) -> Degrees {
        self.terms
            .iter()
            .map(|(name, curve)| (name.clone(), curve.evaluate(value)))
            .collect()
    }

    /// Union of the supports of every term, `None` for a variable without terms.
    pub fn support(&self) -> Option<(f64, f64)> {
        self.terms
            .values()
            .map(Membership::support)
            .reduce(|(lo, hi), (lo2, hi2)| (f64::min(lo, lo2), f64::max(hi, hi2)))
    }
}

/// Variables owned by an engine, addressable both by key and by name.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    slots: SlotMap<VariableKey, Variable>,
    by_name: HashMap<String, VariableKey>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, var: Variable) -> Result<VariableKey> {
        if self.by_name.contains_key(var.name()) {
            return Err(FuzzyError::DuplicateVariable(var.name.clone()));
        }

        let name = var.name.clone();
        let key = self.slots.insert(var);

        self.by_name.insert(name, key);

        Ok(key)
    }

    pub fn get(&self, key: VariableKey) -> Option<&Variable> {
        self.slots.get(key)
    }

    pub fn key_of(&self, name: &str) -> Option<VariableKey> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Variable> {
        self.key_of(name).and_then(|key| self.get(key))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableKey, &Variable)> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[test]
fn test_fuzzify() {
    use approx::assert_abs_diff_eq;

    let consumption = Variable::new("weekly_consumption")
        .with_term("low", MembershipCurve::triangular(0., 0., 200.).unwrap())
        .with_term("medium", MembershipCurve::triangular(150., 400., 600.).unwrap())
        .with_term("high", MembershipCurve::triangular(500., 700., 1000.).unwrap());

    let degrees = consumption.fuzzify(600.);
    let names: Vec<_> = degrees.keys().map(String::as_str).collect();

    assert_eq!(names, ["low", "medium", "high"]);
    assert_eq!(degrees["low"], 0.);
    assert_eq!(degrees["medium"], 0.);
    assert_abs_diff_eq!(degrees["high"], 0.5);

    // Overlapping terms are not normalized
    let degrees = consumption.fuzzify(175.);

    assert_abs_diff_eq!(degrees["low"], 0.125);
    assert_abs_diff_eq!(degrees["medium"], 0.1);
    assert_eq!(consumption.support(), Some((0., 1000.)));
}

#[test]
fn test_add_term_last_write_wins() {
    let first = MembershipCurve::triangular(0., 1., 2.).unwrap();
    let second = MembershipCurve::gaussian(1., 1.).unwrap();
    let mut var = Variable::new("x");

    assert_eq!(var.add_term("t", first), None);
    assert_eq!(var.add_term("t", second), Some(first));
    assert_eq!(var.len(), 1);
    assert_eq!(var.term("t"), Some(&second));
    assert_eq!(Variable::new("empty").support(), None);
}

#[test]
fn test_duplicate_variable() {
    let mut vars = Variables::new();
    let key = vars.insert(Variable::new("cost")).unwrap();

    assert_eq!(vars.key_of("cost"), Some(key));
    assert_eq!(vars.by_name("cost").map(Variable::name), Some("cost"));
    assert_eq!(
        vars.insert(Variable::new("cost")).unwrap_err(),
        FuzzyError::DuplicateVariable("cost".into())
    );
    assert_eq!(vars.len(), 1);
}
