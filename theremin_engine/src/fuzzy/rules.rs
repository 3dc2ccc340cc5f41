//! The fixed rule base: every proximity × distance × openness combination
//! mapped to one frequency term.
//!
//! Broadly, a nearer (larger) hand lowers the pitch while a hand further to
//! the side or more open raises it, and evenly balanced combinations land
//! on medium.  The table is authoritative where it departs from that
//! reading: (low, low, medium) plays high and (high, high, medium) plays low.

use super::variable::Term::{self, High, Low, Medium};

/// `IF proximity AND distance AND openness THEN frequency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub proximity: Term,
    pub distance:  Term,
    pub openness:  Term,
    pub frequency: Term,
}

const fn rule(proximity: Term, distance: Term, openness: Term, frequency: Term) -> Rule {
    Rule { proximity, distance, openness, frequency }
}

/// Ordered proximity-major, then distance, then openness.
pub const RULES: [Rule; 27] = [
    // proximity low
    rule(Low,    Low,    Low,    Low),
    rule(Low,    Low,    Medium, High),
    rule(Low,    Low,    High,   High),
    rule(Low,    Medium, Low,    Medium),
    rule(Low,    Medium, Medium, High),
    rule(Low,    Medium, High,   High),
    rule(Low,    High,   Low,    High),
    rule(Low,    High,   Medium, High),
    rule(Low,    High,   High,   High),
    // proximity medium
    rule(Medium, Low,    Low,    Low),
    rule(Medium, Low,    Medium, Low),
    rule(Medium, Low,    High,   Medium),
    rule(Medium, Medium, Low,    Low),
    rule(Medium, Medium, Medium, Medium),
    rule(Medium, Medium, High,   High),
    rule(Medium, High,   Low,    Medium),
    rule(Medium, High,   Medium, High),
    rule(Medium, High,   High,   High),
    // proximity high
    rule(High,   Low,    Low,    Low),
    rule(High,   Low,    Medium, Low),
    rule(High,   Low,    High,   Low),
    rule(High,   Medium, Low,    Low),
    rule(High,   Medium, Medium, Low),
    rule(High,   Medium, High,   Medium),
    rule(High,   High,   Low,    Low),
    rule(High,   High,   Medium, Low),
    rule(High,   High,   High,   High),
];

/// The consequent for one antecedent combination.
pub fn consequent(proximity: Term, distance: Term, openness: Term) -> Term {
    RULES[proximity.index() * 9 + distance.index() * 3 + openness.index()].frequency
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_combination_once() {
        let mut i = 0;
        for p in Term::ALL {
            for d in Term::ALL {
                for o in Term::ALL {
                    let r = RULES[i];
                    assert_eq!((r.proximity, r.distance, r.openness), (p, d, o), "row {}", i);
                    i += 1;
                }
            }
        }
        assert_eq!(i, RULES.len());
    }

    #[test]
    fn every_consequent_matches_the_fixture() {
        #[rustfmt::skip]
        let expected = [
            // (proximity, distance, openness) → frequency
            ((Low, Low, Low), Low),          ((Low, Low, Medium), High),          ((Low, Low, High), High),
            ((Low, Medium, Low), Medium),    ((Low, Medium, Medium), High),       ((Low, Medium, High), High),
            ((Low, High, Low), High),        ((Low, High, Medium), High),         ((Low, High, High), High),
            ((Medium, Low, Low), Low),       ((Medium, Low, Medium), Low),        ((Medium, Low, High), Medium),
            ((Medium, Medium, Low), Low),    ((Medium, Medium, Medium), Medium),  ((Medium, Medium, High), High),
            ((Medium, High, Low), Medium),   ((Medium, High, Medium), High),      ((Medium, High, High), High),
            ((High, Low, Low), Low),         ((High, Low, Medium), Low),          ((High, Low, High), Low),
            ((High, Medium, Low), Low),      ((High, Medium, Medium), Low),       ((High, Medium, High), Medium),
            ((High, High, Low), Low),        ((High, High, Medium), Low),         ((High, High, High), High),
        ];
        assert_eq!(expected.len(), RULES.len());
        for ((p, d, o), f) in expected {
            assert_eq!(consequent(p, d, o), f, "({:?}, {:?}, {:?})", p, d, o);
        }
    }

    #[test]
    fn diagonal_follows_the_terms() {
        assert_eq!(consequent(Low, Low, Low), Low);
        assert_eq!(consequent(Medium, Medium, Medium), Medium);
        assert_eq!(consequent(High, High, High), High);
    }

    #[test]
    fn deliberate_deviations() {
        assert_eq!(consequent(Low, Low, Medium), High);
        assert_eq!(consequent(High, High, Medium), Low);
    }

    #[test]
    fn term_counts() {
        let count = |t: Term| RULES.iter().filter(|r| r.frequency == t).count();
        assert_eq!(count(Low), 11);
        assert_eq!(count(Medium), 5);
        assert_eq!(count(High), 11);
    }
}
