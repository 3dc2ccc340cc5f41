//! Fuzzy-logic frequency mapper.
//!
//! * [`membership`] — Gaussian and triangular membership functions.
//! * [`variable`] — linguistic variables partitioned into low / medium / high.
//! * [`rules`] — the 27-entry rule table.
//! * [`engine`] — fuzzification, rule firing, aggregation and centroid
//!   defuzzification.

pub mod membership;
pub mod variable;
pub mod rules;
pub mod engine;

pub use engine::{CrispInputs, FuzzyEngine, Inference};
pub use membership::Membership;
pub use rules::{Rule, RULES};
pub use variable::{LinguisticVariable, Term, TermDegrees};
