use indexmap::IndexMap;
use serde::Serialize;

use crate::inference::Mode;

/// Result of a single evaluation along with the intermediate values that
/// produced it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Outputs {
    mode: Mode,
    crisp: f64,
    firing_strengths: Vec<f64>,
    label_activations: IndexMap<String, f64>,
}

impl Outputs {
    pub(crate) fn new(
        mode: Mode,
        crisp: f64,
        firing_strengths: Vec<f64>,
        label_activations: IndexMap<String, f64>,
    ) -> Self {
        Self {
            mode,
            crisp,
            firing_strengths,
            label_activations,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn crisp(&self) -> f64 {
        self.crisp
    }

    /// Firing strength of every rule, in registration order.
    pub fn firing_strengths(&self) -> &[f64] {
        &self.firing_strengths
    }

    /// Max-aggregated activation per output term. Empty in Sugeno mode.
    pub fn label_activations(&self) -> &IndexMap<String, f64> {
        &self.label_activations
    }

    pub fn label_activation(&self, label: &str) -> Option<f64> {
        self.label_activations.get(label).copied()
    }

    /// The output term with the highest positive activation. Ties go to the
    /// label that was activated first.
    pub fn dominant_label(&self) -> Option<&str> {
        let mut dominant: Option<(&str, f64)> = None;

        for (label, activation) in &self.label_activations {
            if *activation > dominant.map_or(0., |(_, best)| best) {
                dominant = Some((label.as_str(), *activation));
            }
        }

        dominant.map(|(label, _)| label)
    }

    /// Whether any rule fired at all. When none did, `crisp` holds the zero
    /// fallback rather than a defuzzified value.
    pub fn fired(&self) -> bool {
        self.firing_strengths.iter().any(|w| *w > 0.)
    }
}

#[test]
fn test_dominant_label() {
    let activations = [("low".to_string(), 0.3), ("mid".to_string(), 0.7), ("high".to_string(), 0.7)]
        .into_iter()
        .collect();
    let outputs = Outputs::new(Mode::Mamdani, 42., vec![0.3, 0.7, 0.7], activations);

    assert_eq!(outputs.dominant_label(), Some("mid"));
    assert_eq!(outputs.label_activation("low"), Some(0.3));
    assert!(outputs.fired());

    let outputs = Outputs::new(Mode::Sugeno, 0., vec![0., 0.], IndexMap::new());

    assert_eq!(outputs.dominant_label(), None);
    assert!(!outputs.fired());
}
