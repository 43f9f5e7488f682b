use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fuzzy_inference::{Defuzzification, InferenceEngine, Inputs, MembershipCurve, Rule, Variable};

fn tri(a: f64, b: f64, c: f64) -> MembershipCurve {
    MembershipCurve::triangular(a, b, c).unwrap()
}

fn budget_risk(defuzzification: Defuzzification) -> InferenceEngine {
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
    let outcome = |b: usize, c: usize| ["low", "medium", "high"][(c + 2).saturating_sub(b).min(2)];
    let mut rules = Vec::with_capacity(9);

    for (b, b_term) in ["low", "medium", "high"].into_iter().enumerate() {
        for (c, c_term) in ["small", "moderate", "large"].into_iter().enumerate() {
            rules.push(Rule::new([budget.is(b_term), cost.is(c_term)], risk.is(outcome(b, c))).unwrap());
        }
    }

    InferenceEngine::mamdani(risk)
        .with_variable(budget)
        .unwrap()
        .with_variable(cost)
        .unwrap()
        .with_rules(rules)
        .unwrap()
        .defuzzification(defuzzification)
        .unwrap()
        .build()
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("mamdani_evaluate");
    let inputs: Inputs = [("budget", 4000.), ("cost", 3000.)].into_iter().collect();

    for (name, defuzzification) in [
        ("center_of_maxima", Defuzzification::CenterOfMaxima),
        ("centroid_256", Defuzzification::Centroid { samples: 256 }),
    ] {
        let engine = budget_risk(defuzzification);

        group.bench_with_input(BenchmarkId::from_parameter(name), &inputs, |b, inputs| {
            b.iter(|| engine.evaluate(black_box(inputs)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
