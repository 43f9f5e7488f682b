use std::collections::HashMap;

/// Crisp input values keyed by variable name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inputs(pub(crate) HashMap<String, f64>);

impl Inputs {
    pub fn new() -> Self {
        Inputs(HashMap::new())
    }

    pub fn add(&mut self, var: impl Into<String>, val: f64) -> &mut Self {
        self.0.insert(var.into(), val);
        self
    }

    pub fn get(&self, var: &str) -> Option<f64> {
        self.0.get(var).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, val)| (name.as_str(), *val))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Inputs(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<K: Into<String>> Extend<(K, f64)> for Inputs {
    fn extend<I: IntoIterator<Item = (K, f64)>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

#[test]
fn test_inputs() {
    let mut inputs: Inputs = [("cost", 100.)].into_iter().collect();

    inputs.add("budget", 4000.).add("cost", 150.);
    inputs.extend([("trend", -20.)]);

    assert_eq!(inputs.len(), 3);
    assert_eq!(inputs.get("cost"), Some(150.));
    assert_eq!(inputs.get("missing"), None);
}
