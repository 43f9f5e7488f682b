use std::thread;

use approx::assert_abs_diff_eq;
use fuzzy_inference::{
    Consequent, Defuzzification, FuzzyError, InferenceEngine, Inputs, MembershipCurve, Mode, Rule, Variable,
};

fn tri(a: f64, b: f64, c: f64) -> MembershipCurve {
    MembershipCurve::triangular(a, b, c).unwrap()
}

fn inputs<const N: usize>(values: [(&str, f64); N]) -> Inputs {
    values.into_iter().collect()
}

fn cost_engine(high: MembershipCurve) -> InferenceEngine {
    let cost = Variable::new("cost")
        .with_term("low", tri(0., 0., 200.))
        .with_term("high", high);

    InferenceEngine::sugeno()
        .with_variable(cost.clone())
        .unwrap()
        .with_rule(Rule::new([cost.is("low")], 0.).unwrap())
        .unwrap()
        .with_rule(Rule::new([cost.is("high")], 100.).unwrap())
        .unwrap()
        .build()
}

fn consumption_and_trend() -> (Variable, Variable) {
    let consumption = Variable::new("weekly_consumption")
        .with_term("low", tri(0., 0., 200.))
        .with_term("medium", tri(150., 400., 600.))
        .with_term("high", tri(500., 700., 1000.));
    let trend = Variable::new("trend")
        .with_term("decreasing", tri(-500., -200., 0.))
        .with_term("stable", tri(-50., 0., 50.))
        .with_term("increasing", tri(0., 200., 500.));

    (consumption, trend)
}

#[test]
fn test_shoulder_fully_activates_high() {
    let engine = cost_engine(tri(200., 400., 400.));
    let outputs = engine.infer(&inputs([("cost", 400.)])).unwrap();

    assert_eq!(outputs.firing_strengths(), &[0., 1.]);
    assert_eq!(outputs.crisp(), 100.);
}

#[test]
fn test_half_and_half() {
    // With high = (200, 400, 400) only `low` overlaps 100, so the average
    // collapses onto its consequent
    let engine = cost_engine(tri(200., 400., 400.));

    assert_eq!(engine.evaluate(&inputs([("cost", 100.)])).unwrap(), 0.);

    let engine = cost_engine(tri(0., 200., 400.));
    let outputs = engine.infer(&inputs([("cost", 100.)])).unwrap();

    assert_eq!(outputs.firing_strengths(), &[0.5, 0.5]);
    assert_abs_diff_eq!(outputs.crisp(), 50., epsilon = 1e-9);
}

#[test]
fn test_mamdani_defuzzifies_peaks() {
    let on = tri(0., 10., 10.);
    let p = Variable::new("p").with_term("on", on);
    let q = Variable::new("q").with_term("on", on);
    let risk = Variable::new("risk")
        .with_term("low", tri(0., 0., 40.))
        .with_term("high", tri(60., 100., 100.));

    let engine = InferenceEngine::mamdani(risk.clone())
        .with_variable(p.clone())
        .unwrap()
        .with_variable(q.clone())
        .unwrap()
        .with_rule(Rule::new([p.is("on")], risk.is("low")).unwrap())
        .unwrap()
        .with_rule(Rule::new([q.is("on")], risk.is("high")).unwrap())
        .unwrap()
        .build();
    let outputs = engine.infer(&inputs([("p", 3.), ("q", 7.)])).unwrap();

    assert_abs_diff_eq!(outputs.label_activation("low").unwrap(), 0.3, epsilon = 1e-12);
    assert_abs_diff_eq!(outputs.label_activation("high").unwrap(), 0.7, epsilon = 1e-12);
    assert_abs_diff_eq!(outputs.crisp(), 70., epsilon = 1e-9);
    assert_eq!(outputs.dominant_label(), Some("high"));
    assert_eq!(outputs.mode(), Mode::Mamdani);
}

#[test]
fn test_unknown_term_fails_evaluation() {
    let cost = Variable::new("cost").with_term("low", tri(0., 0., 200.));
    let engine = InferenceEngine::sugeno()
        .with_variable(cost.clone())
        .unwrap()
        .with_rule(Rule::new([cost.is("medium")], 50.).unwrap())
        .unwrap()
        .build();

    assert_eq!(
        engine.evaluate(&inputs([("cost", 10.)])),
        Err(FuzzyError::UnknownTerm {
            variable: "cost".into(),
            term: "medium".into()
        })
    );
}

#[test]
fn test_unknown_output_term_fails_evaluation() {
    let cost = Variable::new("cost").with_term("low", tri(0., 0., 200.));
    let risk = Variable::new("risk").with_term("low", tri(0., 0., 40.));
    let engine = InferenceEngine::mamdani(risk.clone())
        .with_variable(cost.clone())
        .unwrap()
        .with_rule(Rule::new([cost.is("low")], risk.is("extreme")).unwrap())
        .unwrap()
        .build();

    assert!(matches!(
        engine.evaluate(&inputs([("cost", 10.)])),
        Err(FuzzyError::UnknownTerm { term, .. }) if term == "extreme"
    ));
}

#[test]
fn test_unknown_variable_fails_evaluation() {
    let cost = Variable::new("cost").with_term("low", tri(0., 0., 200.));
    let engine = InferenceEngine::sugeno()
        .with_variable(cost)
        .unwrap()
        .with_rule(Rule::new([("budget", "low")], 1.).unwrap())
        .unwrap()
        .build();

    assert_eq!(
        engine.evaluate(&inputs([("cost", 10.), ("budget", 10.)])),
        Err(FuzzyError::UnknownVariable("budget".into()))
    );
}

#[test]
fn test_missing_input() {
    let engine = cost_engine(tri(200., 400., 400.));

    assert_eq!(
        engine.evaluate(&Inputs::new()),
        Err(FuzzyError::MissingInput("cost".into()))
    );
}

#[test]
fn test_no_rule_fires() {
    let engine = cost_engine(tri(200., 400., 400.));
    let outputs = engine.infer(&inputs([("cost", 1000.)])).unwrap();

    assert_eq!(outputs.crisp(), 0.);
    assert!(!outputs.fired());

    let (consumption, trend) = consumption_and_trend();
    let alert = Variable::new("alert")
        .with_term("normal", tri(0., 0., 50.))
        .with_term("alert", tri(50., 100., 100.));
    let engine = InferenceEngine::mamdani(alert.clone())
        .with_variable(consumption.clone())
        .unwrap()
        .with_variable(trend.clone())
        .unwrap()
        .with_rule(Rule::new([consumption.is("high"), trend.is("increasing")], alert.is("alert")).unwrap())
        .unwrap()
        .build();
    let outputs = engine.infer(&inputs([("weekly_consumption", 0.), ("trend", 0.)])).unwrap();

    assert_eq!(outputs.crisp(), 0.);
    assert_eq!(outputs.dominant_label(), None);
}

#[test]
fn test_consumption_alert() {
    let (consumption, trend) = consumption_and_trend();
    let sugeno = InferenceEngine::sugeno()
        .with_variable(consumption.clone())
        .unwrap()
        .with_variable(trend.clone())
        .unwrap()
        .with_rule(Rule::new([consumption.is("high"), trend.is("increasing")], 100.).unwrap())
        .unwrap()
        .with_rule(Rule::new([consumption.is("low"), trend.is("decreasing")], 0.).unwrap())
        .unwrap()
        .build();
    let week = inputs([("weekly_consumption", 600.), ("trend", 150.)]);
    let outputs = sugeno.infer(&week).unwrap();

    assert_abs_diff_eq!(outputs.crisp(), 100., epsilon = 1e-9);
    assert_abs_diff_eq!(outputs.firing_strengths()[0], 0.5, epsilon = 1e-12);
    assert_eq!(outputs.firing_strengths()[1], 0.);

    let alert = Variable::new("alert")
        .with_term("normal", tri(0., 0., 50.))
        .with_term("alert", tri(50., 100., 100.));
    let mamdani = InferenceEngine::mamdani(alert.clone())
        .with_variable(consumption.clone())
        .unwrap()
        .with_variable(trend.clone())
        .unwrap()
        .with_rule(Rule::new([consumption.is("high"), trend.is("increasing")], alert.is("alert")).unwrap())
        .unwrap()
        .with_rule(Rule::new([consumption.is("low"), trend.is("decreasing")], alert.is("normal")).unwrap())
        .unwrap()
        .build();
    let outputs = mamdani.infer(&week).unwrap();

    assert_eq!(outputs.dominant_label(), Some("alert"));
    assert_abs_diff_eq!(outputs.crisp(), 100., epsilon = 1e-9);
}

#[test]
fn test_functional_consequent() {
    let (consumption, trend) = consumption_and_trend();
    let engine = InferenceEngine::sugeno()
        .with_variable(consumption.clone())
        .unwrap()
        .with_variable(trend.clone())
        .unwrap()
        .with_rule(
            Rule::new(
                [consumption.is("medium")],
                Consequent::function(|inputs| 0.1 * inputs.get("weekly_consumption").unwrap_or_default()),
            )
            .unwrap(),
        )
        .unwrap()
        .with_rule(
            Rule::new(
                [trend.is("stable")],
                Consequent::function(|inputs| {
                    inputs.get("trend").unwrap_or_default() + inputs.get("bias").unwrap_or_default()
                }),
            )
            .unwrap(),
        )
        .unwrap()
        .build();

    // medium(400) = 1 -> z = 40, stable(0) = 1 -> z = 0 + 20
    let outputs = engine
        .infer(&inputs([("weekly_consumption", 400.), ("trend", 0.), ("bias", 20.)]))
        .unwrap();

    assert_eq!(outputs.firing_strengths(), &[1., 1.]);
    assert_abs_diff_eq!(outputs.crisp(), 30., epsilon = 1e-9);
}

#[test]
fn test_mixed_consequents_are_rejected() {
    let cost = Variable::new("cost").with_term("low", tri(0., 0., 200.));
    let risk = Variable::new("risk").with_term("low", tri(0., 0., 40.));

    let result = InferenceEngine::sugeno()
        .with_variable(cost.clone())
        .unwrap()
        .with_rule(Rule::new([cost.is("low")], 1.).unwrap())
        .unwrap()
        .with_rule(Rule::new([cost.is("low")], Consequent::term("risk", "low")).unwrap());

    assert!(matches!(result, Err(FuzzyError::InconsistentConsequentKind { .. })));

    let result = InferenceEngine::mamdani(risk.clone())
        .with_variable(cost.clone())
        .unwrap()
        .with_rule(Rule::new([cost.is("low")], Consequent::function(|_| 1.)).unwrap());

    assert!(matches!(result, Err(FuzzyError::InconsistentConsequentKind { .. })));
}

#[test]
fn test_centroid_matches_symmetric_output() {
    let cost = Variable::new("cost").with_term("mid", tri(0., 50., 100.));
    let risk = Variable::new("risk").with_term("mid", tri(20., 50., 80.));
    let engine = InferenceEngine::mamdani(risk.clone())
        .with_variable(cost.clone())
        .unwrap()
        .with_rule(Rule::new([cost.is("mid")], risk.is("mid")).unwrap())
        .unwrap()
        .defuzzification(Defuzzification::Centroid { samples: 601 })
        .unwrap()
        .build();

    assert_abs_diff_eq!(engine.evaluate(&inputs([("cost", 25.)])).unwrap(), 50., epsilon = 1e-6);
}

#[test]
fn test_shared_engine_across_threads() {
    let (consumption, trend) = consumption_and_trend();
    let engine = InferenceEngine::sugeno()
        .with_variable(consumption.clone())
        .unwrap()
        .with_variable(trend.clone())
        .unwrap()
        .with_rule(Rule::new([consumption.is("high"), trend.is("increasing")], 100.).unwrap())
        .unwrap()
        .with_rule(Rule::new([consumption.is("medium"), trend.is("stable")], 50.).unwrap())
        .unwrap()
        .build();
    let expected = engine
        .evaluate(&inputs([("weekly_consumption", 550.), ("trend", 10.)]))
        .unwrap();

    thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| engine.evaluate(&inputs([("weekly_consumption", 550.), ("trend", 10.)]))))
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(expected));
        }
    });
}

#[test]
fn test_unfired_functional_rule_is_skipped() {
    let x = Variable::new("x")
        .with_term("lo", tri(0., 0., 10.))
        .with_term("hi", tri(10., 20., 20.));
    let engine = InferenceEngine::sugeno()
        .with_variable(x.clone())
        .unwrap()
        .with_rule(Rule::new([x.is("lo")], 5.).unwrap())
        .unwrap()
        .with_rule(
            Rule::new(
                [x.is("hi")],
                Consequent::function(|inputs| 1. / (inputs.get("x").unwrap_or_default() - 2.)),
            )
            .unwrap(),
        )
        .unwrap()
        .build();
    let outputs = engine.infer(&inputs([("x", 2.)])).unwrap();

    assert_abs_diff_eq!(outputs.firing_strengths()[0], 0.8, epsilon = 1e-12);
    assert_eq!(outputs.firing_strengths()[1], 0.);
    assert_eq!(outputs.crisp(), 5.);
}

fn trapezoid(a: f64, b: f64, c: f64, d: f64) -> MembershipCurve {
    MembershipCurve::trapezoidal(a, b, c, d).unwrap()
}

fn trapezoid_budget_cost(
    budget_terms: [MembershipCurve; 3],
    cost_terms: [MembershipCurve; 3],
) -> (Variable, Variable) {
    let [low, medium, high] = budget_terms;
    let budget = Variable::new("budget")
        .with_term("low", low)
        .with_term("medium", medium)
        .with_term("high", high);
    let [small, moderate, large] = cost_terms;
    let cost = Variable::new("cost")
        .with_term("small", small)
        .with_term("moderate", moderate)
        .with_term("large", large);

    (budget, cost)
}

const BUDGET_TERMS: [&str; 3] = ["low", "medium", "high"];
const COST_TERMS: [&str; 3] = ["small", "moderate", "large"];

#[test]
fn test_trapezoidal_sugeno_budget() {
    let (budget, cost) = trapezoid_budget_cost(
        [
            trapezoid(0., 0., 1000., 2000.),
            trapezoid(1000., 2500., 3500., 5000.),
            trapezoid(3000., 4500., 5000., 5000.),
        ],
        [
            trapezoid(0., 0., 500., 1500.),
            trapezoid(500., 2000., 3000., 4500.),
            trapezoid(3500., 4500., 5000., 5000.),
        ],
    );
    let risk = [[0., 50., 100.], [0., 50., 100.], [0., 0., 50.]];
    let mut rules = Vec::with_capacity(9);

    for (b, b_term) in BUDGET_TERMS.into_iter().enumerate() {
        for (c, c_term) in COST_TERMS.into_iter().enumerate() {
            rules.push(Rule::new([budget.is(b_term), cost.is(c_term)], risk[b][c]).unwrap());
        }
    }

    let engine = InferenceEngine::sugeno()
        .with_variable(budget)
        .unwrap()
        .with_variable(cost)
        .unwrap()
        .with_rules(rules)
        .unwrap()
        .build();

    // medium and high budget both sit at 2/3, moderate cost on its plateau
    assert_abs_diff_eq!(
        engine.evaluate(&inputs([("budget", 4000.), ("cost", 3000.)])).unwrap(),
        25.,
        epsilon = 1e-9
    );
}

#[test]
fn test_trapezoidal_mamdani_budget() {
    let (budget, cost) = trapezoid_budget_cost(
        [
            trapezoid(0., 0., 800., 2200.),
            trapezoid(1200., 2500., 3500., 4800.),
            trapezoid(3500., 4500., 5000., 5000.),
        ],
        [
            trapezoid(0., 0., 600., 1800.),
            trapezoid(800., 2000., 3000., 4200.),
            trapezoid(3200., 4200., 5000., 5000.),
        ],
    );
    let risk = Variable::new("risk")
        .with_term("low", trapezoid(0., 0., 20., 45.))
        .with_term("medium", trapezoid(30., 45., 55., 75.))
        .with_term("high", trapezoid(60., 85., 100., 100.));
    let table = [
        ["low", "medium", "high"],
        ["low", "medium", "high"],
        ["low", "low", "medium"],
    ];
    let mut rules = Vec::with_capacity(9);

    for (b, b_term) in BUDGET_TERMS.into_iter().enumerate() {
        for (c, c_term) in COST_TERMS.into_iter().enumerate() {
            rules.push(Rule::new([budget.is(b_term), cost.is(c_term)], risk.is(table[b][c])).unwrap());
        }
    }

    let engine = InferenceEngine::mamdani(risk)
        .with_variable(budget)
        .unwrap()
        .with_variable(cost)
        .unwrap()
        .with_rules(rules)
        .unwrap()
        .build();
    let outputs = engine.infer(&inputs([("budget", 4000.), ("cost", 3000.)])).unwrap();

    // medium fires at 8/13 (peak 45), low at 1/2 (peak 0)
    assert_abs_diff_eq!(outputs.label_activation("medium").unwrap(), 8. / 13., epsilon = 1e-12);
    assert_eq!(outputs.label_activation("low"), Some(0.5));
    assert_abs_diff_eq!(outputs.crisp(), 720. / 29., epsilon = 1e-9);
    assert_eq!(outputs.dominant_label(), Some("medium"));
}

#[test]
fn test_mamdani_trapezoidal_and_gaussian_peaks() {
    let demand = Variable::new("demand").with_term("light", MembershipCurve::gaussian(0., 10.).unwrap());
    let pressure = Variable::new("pressure").with_term("heavy", trapezoid(0., 10., 20., 30.));
    let risk = Variable::new("risk")
        .with_term("calm", MembershipCurve::gaussian(30., 5.).unwrap())
        .with_term("high", trapezoid(60., 85., 100., 100.));
    let engine = InferenceEngine::mamdani(risk.clone())
        .with_variable(demand.clone())
        .unwrap()
        .with_variable(pressure.clone())
        .unwrap()
        .with_rule(Rule::new([demand.is("light")], risk.is("calm")).unwrap())
        .unwrap()
        .with_rule(Rule::new([pressure.is("heavy")], risk.is("high")).unwrap())
        .unwrap()
        .build();

    // gaussian mean 30, trapezoid shoulder 85
    let both = engine.infer(&inputs([("demand", 0.), ("pressure", 15.)])).unwrap();

    assert_eq!(both.label_activation("calm"), Some(1.));
    assert_eq!(both.label_activation("high"), Some(1.));
    assert_abs_diff_eq!(both.crisp(), 57.5, epsilon = 1e-9);

    let calm_only = engine.infer(&inputs([("demand", 0.), ("pressure", 0.)])).unwrap();

    assert_eq!(calm_only.crisp(), 30.);

    let light = (-0.125f64).exp();
    let expected = (light * 30. + 0.5 * 85.) / (light + 0.5);

    assert_abs_diff_eq!(
        engine.evaluate(&inputs([("demand", 5.), ("pressure", 5.)])).unwrap(),
        expected,
        epsilon = 1e-9
    );
}
