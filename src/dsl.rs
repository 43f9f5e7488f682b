use std::fmt;

use serde::Serialize;

use crate::variable::Variable;

/// A single `variable IS term` proposition of a rule premise.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Condition {
    pub variable: String,
    pub term: String,
}

impl Condition {
    pub fn new(variable: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            term: term.into(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is {}", self.variable, self.term)
    }
}

impl<V: Into<String>, T: Into<String>> From<(V, T)> for Condition {
    fn from((variable, term): (V, T)) -> Self {
        Self::new(variable, term)
    }
}

impl Variable {
    pub fn is(&self, term: impl Into<String>) -> Condition {
        Condition::new(self.name(), term)
    }
}

#[test]
fn test_conditions() {
    let cost = Variable::new("cost");

    assert_eq!(cost.is("low"), Condition::new("cost", "low"));
    assert_eq!(Condition::from(("cost", "high")).to_string(), "cost is high");
}
