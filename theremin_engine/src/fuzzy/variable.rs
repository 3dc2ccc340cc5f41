//! Linguistic variables: a scalar domain split into low / medium / high.

use std::ops::{Index, IndexMut};

use crate::config::{MembershipShape, Range};
use crate::error::ConfigError;
use super::membership::Membership;

// ════════════════════════════════════════════════════════════════════════════
// Term
// ════════════════════════════════════════════════════════════════════════════

/// Linguistic term shared by every variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Low,
    Medium,
    High,
}

impl Term {
    pub const ALL: [Term; 3] = [Term::Low, Term::Medium, Term::High];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One value per term, e.g. the fuzzified degrees of a crisp input or the
/// aggregated strength of each output set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TermDegrees(pub [f64; 3]);

impl TermDegrees {
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }
}

impl Index<Term> for TermDegrees {
    type Output = f64;
    fn index(&self, t: Term) -> &f64 { &self.0[t.index()] }
}

impl IndexMut<Term> for TermDegrees {
    fn index_mut(&mut self, t: Term) -> &mut f64 { &mut self.0[t.index()] }
}

// ════════════════════════════════════════════════════════════════════════════
// LinguisticVariable
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct LinguisticVariable {
    range: Range,
    sets:  [Membership; 3],
}

impl LinguisticVariable {
    /// Partition `range` into three sets.
    ///
    /// Gaussian: centers at 1/8, 1/2 and 7/8 of the span, sigma a quarter
    /// of the span.  Triangular: low `[0, 0, 1/4]`, medium `[1/8, 1/2, 5/8]`,
    /// high `[1/2, 1, 1]`, as fractions of the span.
    pub fn new(name: &'static str, range: Range, shape: MembershipShape) -> Result<Self, ConfigError> {
        range.validate(name)?;
        let (min, max, s) = (range.min, range.max, range.span());

        let sets = match shape {
            MembershipShape::Gaussian => {
                let sigma = 0.25 * s;
                [
                    Membership::Gaussian { center: min + 0.125 * s, sigma },
                    Membership::Gaussian { center: range.midpoint(), sigma },
                    Membership::Gaussian { center: max - 0.125 * s, sigma },
                ]
            }
            MembershipShape::Triangular => [
                Membership::Triangular { a: min, b: min, c: min + 0.25 * s },
                Membership::Triangular { a: min + 0.125 * s, b: range.midpoint(), c: min + 0.625 * s },
                Membership::Triangular { a: min + 0.5 * s, b: max, c: max },
            ],
        };

        Ok(LinguisticVariable { range, sets })
    }

    pub fn range(&self) -> Range { self.range }

    pub fn set(&self, term: Term) -> &Membership {
        &self.sets[term.index()]
    }

    /// Degree of `x` in each of the three sets.
    pub fn fuzzify(&self, x: f64) -> TermDegrees {
        TermDegrees(Term::ALL.map(|t| self.set(t).degree(x)))
    }

    /// Sample points covering the domain, `min` and (when the step divides
    /// the span) `max` included.
    pub fn universe(&self, step: f64) -> Vec<f64> {
        let n = (self.range.span() / step + 1e-9).floor() as usize;
        (0..=n).map(|i| self.range.min + i as f64 * step).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_centers_and_sigma() {
        let v = LinguisticVariable::new("openness", Range::new(20.0, 100.0), MembershipShape::Gaussian).unwrap();
        assert_eq!(*v.set(Term::Low),    Membership::Gaussian { center: 30.0, sigma: 20.0 });
        assert_eq!(*v.set(Term::Medium), Membership::Gaussian { center: 60.0, sigma: 20.0 });
        assert_eq!(*v.set(Term::High),   Membership::Gaussian { center: 90.0, sigma: 20.0 });
    }

    #[test]
    fn each_set_peaks_at_its_center() {
        for (min, max) in [(1.0, 25.0), (30.0, 250.0), (-5.0, 5.0), (0.0, 1e-3)] {
            let v = LinguisticVariable::new("v", Range::new(min, max), MembershipShape::Gaussian).unwrap();
            for t in Term::ALL {
                let peak = v.set(t).peak();
                assert!((v.fuzzify(peak)[t] - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn triangular_breakpoints() {
        let v = LinguisticVariable::new("v", Range::new(0.0, 80.0), MembershipShape::Triangular).unwrap();
        assert_eq!(*v.set(Term::Low),    Membership::Triangular { a: 0.0,  b: 0.0,  c: 20.0 });
        assert_eq!(*v.set(Term::Medium), Membership::Triangular { a: 10.0, b: 40.0, c: 50.0 });
        assert_eq!(*v.set(Term::High),   Membership::Triangular { a: 40.0, b: 80.0, c: 80.0 });
        // Between the low and medium supports nothing fires.
        assert_eq!(v.fuzzify(5.0)[Term::Medium], 0.0);
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let a = LinguisticVariable::new("frequency", Range::new(200.0, 600.0), MembershipShape::Gaussian).unwrap();
        let b = LinguisticVariable::new("frequency", Range::new(200.0, 600.0), MembershipShape::Gaussian).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fuzzify(333.0), b.fuzzify(333.0));
    }

    #[test]
    fn empty_domain_is_rejected() {
        let r = LinguisticVariable::new("proximity", Range::new(25.0, 1.0), MembershipShape::Gaussian);
        assert!(matches!(r, Err(ConfigError::EmptyRange { name: "proximity", .. })));
    }

    #[test]
    fn universe_is_inclusive() {
        let v = LinguisticVariable::new("frequency", Range::new(200.0, 600.0), MembershipShape::Gaussian).unwrap();
        let u = v.universe(1.0);
        assert_eq!(u.len(), 401);
        assert_eq!(u[0], 200.0);
        assert_eq!(*u.last().unwrap(), 600.0);
    }
}
