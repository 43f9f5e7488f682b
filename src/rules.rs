use std::fmt;
use std::sync::Arc;

use crate::dsl::Condition;
use crate::error::{FuzzyError, Result};
use crate::inputs::Inputs;
use crate::variable::Fuzzified;

/// Functional (first order) Sugeno consequent over the full input mapping.
pub type ConsequentFn = Arc<dyn Fn(&Inputs) -> f64 + Send + Sync>;

#[derive(Clone)]
pub enum Consequent {
    /// Sugeno singleton
    Constant(f64),
    /// Sugeno functional consequent
    Function(ConsequentFn),
    /// Mamdani output term
    Term(Condition),
}

impl Consequent {
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    pub fn function(f: impl Fn(&Inputs) -> f64 + Send + Sync + 'static) -> Self {
        Self::Function(Arc::new(f))
    }

    pub fn term(variable: impl Into<String>, term: impl Into<String>) -> Self {
        Self::Term(Condition::new(variable, term))
    }

    pub fn kind(&self) -> ConsequentKind {
        match self {
            Self::Constant(_) => ConsequentKind::Constant,
            Self::Function(_) => ConsequentKind::Function,
            Self::Term(_) => ConsequentKind::Term,
        }
    }
}

impl fmt::Debug for Consequent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
            Self::Term(cond) => f.debug_tuple("Term").field(cond).finish(),
        }
    }
}

impl From<f64> for Consequent {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<Condition> for Consequent {
    fn from(cond: Condition) -> Self {
        Self::Term(cond)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConsequentKind {
    Constant,
    Function,
    Term,
}

impl ConsequentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Function => "function",
            Self::Term => "term",
        }
    }
}

/// A consequent resolved against a set of inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConsequentValue<'r> {
    Crisp(f64),
    /// Left for the engine to resolve against its output variable
    Term(&'r Condition),
}

/// A conjunction of conditions and the consequent it implies.
#[derive(Clone, Debug)]
pub struct Rule {
    premise: Vec<Condition>,
    consequent: Consequent,
}

impl Rule {
    pub fn new<C: Into<Condition>>(
        premise: impl IntoIterator<Item = C>,
        consequent: impl Into<Consequent>,
    ) -> Result<Self> {
        let premise: Vec<_> = premise.into_iter().map(Into::into).collect();

        if premise.is_empty() {
            return Err(FuzzyError::EmptyRule);
        }

        Ok(Self {
            premise,
            consequent: consequent.into(),
        })
    }

    pub fn premise(&self) -> &[Condition] {
        &self.premise
    }

    pub fn consequent(&self) -> &Consequent {
        &self.consequent
    }

    /// Firing strength: the minimum degree over all conditions.
    pub fn activation(&self, fuzzified: &Fuzzified) -> Result<f64> {
        self.premise.iter().try_fold(1.0f64, |strength, cond| -> Result<f64> {
            let degrees = fuzzified
                .get(&cond.variable)
                .ok_or_else(|| FuzzyError::UnknownVariable(cond.variable.clone()))?;
            let degree = degrees.get(&cond.term).ok_or_else(|| FuzzyError::UnknownTerm {
                variable: cond.variable.clone(),
                term: cond.term.clone(),
            })?;

            Ok(f64::min(strength, *degree))
        })
    }

    pub fn consequent_value(&self, inputs: &Inputs) -> ConsequentValue<'_> {
        match &self.consequent {
            Consequent::Constant(value) => ConsequentValue::Crisp(*value),
            Consequent::Function(f) => ConsequentValue::Crisp(f(inputs)),
            Consequent::Term(cond) => ConsequentValue::Term(cond),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Rules(pub(crate) Vec<Rule>);

impl Rules {
    pub fn new() -> Self {
        Rules(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Rules(Vec::with_capacity(capacity))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
fn cost_fuzzified(low: f64, high: f64) -> Fuzzified {
    let degrees: crate::variable::Degrees = [("low".to_string(), low), ("high".to_string(), high)]
        .into_iter()
        .collect();

    [("cost".to_string(), degrees)].into_iter().collect()
}

#[test]
fn test_activation_is_min() {
    let mut fuzzified = cost_fuzzified(0.25, 0.75);

    fuzzified.insert("trend".into(), [("up".to_string(), 0.5)].into_iter().collect());

    let rule = Rule::new([("cost", "high"), ("trend", "up")], 10.).unwrap();

    assert_eq!(rule.activation(&fuzzified), Ok(0.5));

    let rule = Rule::new([("cost", "low"), ("trend", "up")], 10.).unwrap();

    assert_eq!(rule.activation(&fuzzified), Ok(0.25));
}

#[test]
fn test_activation_unknowns() {
    let fuzzified = cost_fuzzified(0.25, 0.75);
    let rule = Rule::new([("cost", "medium")], 1.).unwrap();

    assert_eq!(
        rule.activation(&fuzzified),
        Err(FuzzyError::UnknownTerm {
            variable: "cost".into(),
            term: "medium".into()
        })
    );

    let rule = Rule::new([("budget", "low")], 1.).unwrap();

    assert_eq!(
        rule.activation(&fuzzified),
        Err(FuzzyError::UnknownVariable("budget".into()))
    );
}

#[test]
fn test_empty_rule() {
    let premise: [Condition; 0] = [];

    assert!(matches!(Rule::new(premise, 1.), Err(FuzzyError::EmptyRule)));
}

#[test]
fn test_consequent_values() {
    let inputs: Inputs = [("cost", 120.)].into_iter().collect();

    let rule = Rule::new([("cost", "low")], 42.).unwrap();
    assert_eq!(rule.consequent_value(&inputs), ConsequentValue::Crisp(42.));

    let rule = Rule::new(
        [("cost", "low")],
        Consequent::function(|inputs| 2. * inputs.get("cost").unwrap_or_default()),
    )
    .unwrap();
    assert_eq!(rule.consequent_value(&inputs), ConsequentValue::Crisp(240.));
    assert_eq!(rule.consequent().kind(), ConsequentKind::Function);

    let rule = Rule::new([("cost", "low")], Consequent::term("risk", "high")).unwrap();
    assert_eq!(
        rule.consequent_value(&inputs),
        ConsequentValue::Term(&Condition::new("risk", "high"))
    );
}
