use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{FuzzyError, Result};
use crate::inputs::Inputs;
use crate::ops::{weighted_average, Defuzzification};
use crate::outputs::Outputs;
use crate::rules::{Consequent, ConsequentKind, ConsequentValue, Rule, Rules};
use crate::variable::{Fuzzified, Variable, VariableKey, Variables};

/// Inference semantics of an engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Activation weighted average of crisp (constant or functional) consequents
    #[default]
    Sugeno,
    /// Max aggregation of output term activations followed by defuzzification
    Mamdani,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sugeno => "sugeno",
            Self::Mamdani => "mamdani",
        }
    }

    pub fn accepts(self, kind: ConsequentKind) -> bool {
        match self {
            Self::Sugeno => matches!(kind, ConsequentKind::Constant | ConsequentKind::Function),
            Self::Mamdani => kind == ConsequentKind::Term,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine settings a host application may load from its own configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mode: Mode,
    pub defuzzification: Defuzzification,
}

/// Collects variables and rules, validating each as it is registered, and
/// freezes them into an [`InferenceEngine`].
#[derive(Debug)]
pub struct EngineBuilder {
    mode: Mode,
    variables: Variables,
    output: Option<Variable>,
    rules: Rules,
    defuzzification: Defuzzification,
}

impl EngineBuilder {
    fn new(mode: Mode, output: Option<Variable>) -> Self {
        Self {
            mode,
            variables: Variables::new(),
            output,
            rules: Rules::new(),
            defuzzification: Defuzzification::default(),
        }
    }

    /// Registers an input variable.
    pub fn add_variable(&mut self, var: Variable) -> Result<VariableKey> {
        if self.output.as_ref().is_some_and(|out| out.name() == var.name()) {
            return Err(FuzzyError::DuplicateVariable(var.name().to_owned()));
        }

        self.variables.insert(var)
    }

    pub fn with_variable(mut self, var: Variable) -> Result<Self> {
        self.add_variable(var)?;
        Ok(self)
    }

    pub fn add_rule(&mut self, rule: Rule) -> Result<()> {
        let kind = rule.consequent().kind();

        if !self.mode.accepts(kind) {
            return Err(FuzzyError::InconsistentConsequentKind {
                mode: self.mode.as_str(),
                found: kind.as_str(),
            });
        }

        if let (Some(output), Consequent::Term(target)) = (&self.output, rule.consequent()) {
            if target.variable != output.name() {
                return Err(FuzzyError::AmbiguousOutputVariable(format!(
                    "rule targets '{}' but the output variable is '{}'",
                    target.variable,
                    output.name()
                )));
            }
        }

        self.rules.0.push(rule);

        Ok(())
    }

    pub fn with_rule(mut self, rule: Rule) -> Result<Self> {
        self.add_rule(rule)?;
        Ok(self)
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Result<Self> {
        for rule in rules {
            self.add_rule(rule)?;
        }
        Ok(self)
    }

    /// Only consulted in Mamdani mode.
    pub fn defuzzification(mut self, defuzzification: Defuzzification) -> Result<Self> {
        self.defuzzification = defuzzification.validate()?;
        Ok(self)
    }

    pub fn build(self) -> InferenceEngine {
        debug!(
            mode = self.mode.as_str(),
            variables = self.variables.len(),
            rules = self.rules.len(),
            "built inference engine"
        );

        InferenceEngine {
            mode: self.mode,
            variables: self.variables,
            output: self.output,
            rules: self.rules,
            defuzzification: self.defuzzification,
        }
    }
}

/// A frozen rule base. Evaluation never mutates the engine, so a shared
/// reference may be evaluated from several threads at once.
#[derive(Clone, Debug)]
pub struct InferenceEngine {
    mode: Mode,
    variables: Variables,
    output: Option<Variable>,
    rules: Rules,
    defuzzification: Defuzzification,
}

impl InferenceEngine {
    pub fn sugeno() -> EngineBuilder {
        EngineBuilder::new(Mode::Sugeno, None)
    }

    /// Mamdani consequents must all target `output`.
    pub fn mamdani(output: Variable) -> EngineBuilder {
        EngineBuilder::new(Mode::Mamdani, Some(output))
    }

    /// Starts a builder from loaded settings. Mamdani mode requires an output
    /// variable and Sugeno mode rejects one.
    pub fn from_config(config: EngineConfig, output: Option<Variable>) -> Result<EngineBuilder> {
        match (config.mode, output) {
            (Mode::Sugeno, None) => Ok(Self::sugeno()),
            (Mode::Mamdani, Some(output)) => Self::mamdani(output).defuzzification(config.defuzzification),
            (Mode::Sugeno, Some(output)) => Err(FuzzyError::AmbiguousOutputVariable(format!(
                "sugeno engines take no output variable, got '{}'",
                output.name()
            ))),
            (Mode::Mamdani, None) => Err(FuzzyError::AmbiguousOutputVariable(
                "mamdani engines need an output variable".into(),
            )),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn output(&self) -> Option<&Variable> {
        self.output.as_ref()
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn defuzzification(&self) -> Defuzzification {
        self.defuzzification
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            mode: self.mode,
            defuzzification: self.defuzzification,
        }
    }

    /// Fuzzifies every registered input variable against its crisp value.
    pub fn fuzzify(&self, inputs: &Inputs) -> Result<Fuzzified> {
        let mut fuzzified = Fuzzified::with_capacity(self.variables.len());

        for (_, var) in self.variables.iter() {
            let value = inputs
                .get(var.name())
                .ok_or_else(|| FuzzyError::MissingInput(var.name().to_owned()))?;

            fuzzified.insert(var.name().to_owned(), var.fuzzify(value));
        }

        for (name, _) in inputs.iter() {
            if !self.variables.contains(name) {
                debug!(variable = name, "ignoring input for unregistered variable");
            }
        }

        Ok(fuzzified)
    }

    pub fn evaluate(&self, inputs: &Inputs) -> Result<f64> {
        self.infer(inputs).map(|outputs| outputs.crisp())
    }

    /// Evaluates the rule base and keeps the per rule and per label
    /// intermediates alongside the crisp result.
    pub fn infer(&self, inputs: &Inputs) -> Result<Outputs> {
        let fuzzified = self.fuzzify(inputs)?;
        let firing_strengths = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| -> Result<f64> {
                let strength = rule.activation(&fuzzified)?;
                trace!(rule = i, strength, "rule activation");
                Ok(strength)
            })
            .collect::<Result<Vec<_>>>()?;

        let outputs = match self.mode {
            Mode::Sugeno => self.infer_sugeno(inputs, firing_strengths)?,
            Mode::Mamdani => self.infer_mamdani(inputs, firing_strengths)?,
        };

        if outputs.fired() {
            debug!(mode = self.mode.as_str(), crisp = outputs.crisp(), "evaluated");
        } else {
            debug!(mode = self.mode.as_str(), "no rule fired, output falls back to 0");
        }

        Ok(outputs)
    }

    fn infer_sugeno(&self, inputs: &Inputs, firing_strengths: Vec<f64>) -> Result<Outputs> {
        let mut weighted = Vec::with_capacity(firing_strengths.len());

        for (rule, w) in self.rules.iter().zip(firing_strengths.iter().copied()) {
            // Unfired rules contribute nothing, and their functions may be undefined here
            if w == 0. {
                continue;
            }

            match rule.consequent_value(inputs) {
                ConsequentValue::Crisp(z) => weighted.push((w, z)),
                ConsequentValue::Term(_) => {
                    return Err(FuzzyError::InconsistentConsequentKind {
                        mode: Mode::Sugeno.as_str(),
                        found: ConsequentKind::Term.as_str(),
                    })
                },
            }
        }

        Ok(Outputs::new(
            Mode::Sugeno,
            weighted_average(weighted),
            firing_strengths,
            IndexMap::new(),
        ))
    }

    fn infer_mamdani(&self, inputs: &Inputs, firing_strengths: Vec<f64>) -> Result<Outputs> {
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| FuzzyError::AmbiguousOutputVariable("mamdani engines need an output variable".into()))?;
        let mut label_activations = IndexMap::new();

        for (rule, w) in self.rules.iter().zip(firing_strengths.iter().copied()) {
            let target = match rule.consequent_value(inputs) {
                ConsequentValue::Term(target) => target,
                ConsequentValue::Crisp(_) => {
                    return Err(FuzzyError::InconsistentConsequentKind {
                        mode: Mode::Mamdani.as_str(),
                        found: rule.consequent().kind().as_str(),
                    })
                },
            };

            if output.term(&target.term).is_none() {
                return Err(FuzzyError::UnknownTerm {
                    variable: output.name().to_owned(),
                    term: target.term.clone(),
                });
            }

            let activation = label_activations.entry(target.term.clone()).or_insert(0.);
            *activation = f64::max(*activation, w);
        }

        let crisp = self.defuzzification.call(output, &label_activations);

        Ok(Outputs::new(Mode::Mamdani, crisp, firing_strengths, label_activations))
    }
}

#[cfg(test)]
fn tri(a: f64, b: f64, c: f64) -> crate::membership::MembershipCurve {
    crate::membership::MembershipCurve::triangular(a, b, c).unwrap()
}

#[cfg(test)]
fn budget_risk_engine(defuzzification: Defuzzification) -> InferenceEngine {
    let budget = Variable::new("budget")
        .with_term("low", tri(0., 1000., 2000.))
        .with_term("medium", tri(1000., 3000., 5000.))
        .with_term("high", tri(3000., 5000., 5000.));
    let cost = Variable::new("cost")
        .with_term("small", tri(0., 500., 1500.))
        .with_term("moderate", tri(500., 2500., 4500.))
        .with_term("large", tri(3500., 5000., 5000.));
    let risk = Variable::new("risk")
        .with_term("low", tri(0., 0., 40.))
        .with_term("medium", tri(30., 50., 70.))
        .with_term("high", tri(60., 100., 100.));
    let table = [
        ("low", "small", "low"),
        ("low", "moderate", "medium"),
        ("low", "large", "high"),
        ("medium", "small", "low"),
        ("medium", "moderate", "medium"),
        ("medium", "large", "high"),
        ("high", "small", "low"),
        ("high", "moderate", "low"),
        ("high", "large", "medium"),
    ];
    let rules = table
        .into_iter()
        .map(|(b, c, r)| Rule::new([budget.is(b), cost.is(c)], risk.is(r)).unwrap());

    InferenceEngine::mamdani(risk.clone())
        .with_variable(budget.clone())
        .unwrap()
        .with_variable(cost.clone())
        .unwrap()
        .with_rules(rules)
        .unwrap()
        .defuzzification(defuzzification)
        .unwrap()
        .build()
}

#[test]
fn test_budget_risk() {
    use approx::assert_abs_diff_eq;

    let engine = budget_risk_engine(Defuzzification::CenterOfMaxima);
    let inputs: Inputs = [("budget", 4000.), ("cost", 3000.)].into_iter().collect();
    let outputs = engine.infer(&inputs).unwrap();

    assert_abs_diff_eq!(outputs.crisp(), 25., epsilon = 1e-9);
    assert_eq!(outputs.label_activation("low"), Some(0.5));
    assert_eq!(outputs.label_activation("medium"), Some(0.5));
    assert_eq!(outputs.label_activation("high"), Some(0.));
    assert_eq!(outputs.dominant_label(), Some("low"));
    assert_eq!(outputs.firing_strengths().len(), 9);

    let centroid = budget_risk_engine(Defuzzification::Centroid { samples: 1001 })
        .evaluate(&inputs)
        .unwrap();

    assert!(centroid > 0. && centroid < 50., "centroid {centroid} outside the activated terms");
    assert!((centroid - 25.).abs() > 1e-3);
}

#[test]
fn test_builder_validation() {
    let cost = Variable::new("cost").with_term("low", tri(0., 0., 200.));
    let risk = Variable::new("risk").with_term("low", tri(0., 0., 40.));

    let mut sugeno = InferenceEngine::sugeno();
    sugeno.add_variable(cost.clone()).unwrap();

    assert_eq!(
        sugeno.add_variable(cost.clone()).unwrap_err(),
        FuzzyError::DuplicateVariable("cost".into())
    );
    assert_eq!(
        sugeno
            .add_rule(Rule::new([cost.is("low")], risk.is("low")).unwrap())
            .unwrap_err(),
        FuzzyError::InconsistentConsequentKind {
            mode: "sugeno",
            found: "term"
        }
    );

    let mut mamdani = InferenceEngine::mamdani(risk.clone());

    assert_eq!(
        mamdani.add_variable(risk.clone()).unwrap_err(),
        FuzzyError::DuplicateVariable("risk".into())
    );
    assert!(matches!(
        mamdani.add_rule(Rule::new([cost.is("low")], 1.).unwrap()),
        Err(FuzzyError::InconsistentConsequentKind { .. })
    ));
    assert!(matches!(
        mamdani.add_rule(Rule::new([cost.is("low")], Consequent::term("danger", "low")).unwrap()),
        Err(FuzzyError::AmbiguousOutputVariable(_))
    ));
    assert!(mamdani.add_rule(Rule::new([cost.is("low")], risk.is("low")).unwrap()).is_ok());
}

#[test]
fn test_from_config() {
    let risk = Variable::new("risk").with_term("low", tri(0., 0., 40.));
    let config: EngineConfig =
        serde_json::from_str(r#"{"mode": "mamdani", "defuzzification": {"method": "centroid", "samples": 64}}"#)
            .unwrap();

    let engine = InferenceEngine::from_config(config, Some(risk.clone())).unwrap().build();

    assert_eq!(engine.mode(), Mode::Mamdani);
    assert_eq!(engine.defuzzification(), Defuzzification::Centroid { samples: 64 });
    assert_eq!(engine.config(), config);
    assert!(InferenceEngine::from_config(EngineConfig::default(), Some(risk)).is_err());
    assert!(InferenceEngine::from_config(config, None).is_err());
    assert_eq!(EngineConfig::default().mode, Mode::Sugeno);
}
