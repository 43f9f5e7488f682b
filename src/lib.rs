//! Sugeno and Mamdani fuzzy inference over named linguistic variables.
//!
//! ```
//! use fuzzy_inference::{InferenceEngine, Inputs, MembershipCurve, Rule, Variable};
//!
//! # fn main() -> fuzzy_inference::Result<()> {
//! let cost = Variable::new("cost")
//!     .with_term("low", MembershipCurve::triangular(0., 0., 200.)?)
//!     .with_term("high", MembershipCurve::triangular(0., 200., 400.)?);
//!
//! let engine = InferenceEngine::sugeno()
//!     .with_variable(cost.clone())?
//!     .with_rule(Rule::new([cost.is("low")], 0.)?)?
//!     .with_rule(Rule::new([cost.is("high")], 100.)?)?
//!     .build();
//!
//! let inputs: Inputs = [("cost", 100.)].into_iter().collect();
//!
//! assert_eq!(engine.evaluate(&inputs)?, 50.);
//! # Ok(())
//! # }
//! ```

mod dsl;
mod error;
mod inference;
mod inputs;
mod linspace;
mod membership;
mod ops;
mod outputs;
mod rules;
mod variable;

pub use dsl::Condition;
pub use error::{FuzzyError, Result};
pub use inference::{EngineBuilder, EngineConfig, InferenceEngine, Mode};
pub use inputs::Inputs;
pub use membership::{Gaussian, Membership, MembershipCurve, Trapezoidal, Triangular};
pub use ops::{Defuzzification, MAX_CENTROID_SAMPLES};
pub use outputs::Outputs;
pub use rules::{Consequent, ConsequentFn, ConsequentKind, ConsequentValue, Rule, Rules};
pub use variable::{Degrees, Fuzzified, Variable, VariableKey, Variables};
