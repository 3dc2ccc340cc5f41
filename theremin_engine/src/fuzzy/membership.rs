//! Membership functions: crisp value → degree of truth in `[0, 1]`.

/// Shape of one fuzzy set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Membership {
    /// Bell curve normalised to peak 1 at `center`.
    Gaussian { center: f64, sigma: f64 },
    /// Triangle rising from `a` to a peak at `b` and falling to `c`.
    /// `a == b` (or `b == c`) makes a left (right) shoulder that is 1 at the
    /// edge itself.
    Triangular { a: f64, b: f64, c: f64 },
}

impl Membership {
    pub fn degree(&self, x: f64) -> f64 {
        match *self {
            Membership::Gaussian { center, sigma } => {
                let z = (x - center) / sigma;
                (-0.5 * z * z).exp()
            }
            Membership::Triangular { a, b, c } => {
                if x < a || x > c {
                    0.0
                } else if x < b {
                    (x - a) / (b - a)
                } else if x > b {
                    (c - x) / (c - b)
                } else {
                    1.0
                }
            }
        }
    }

    /// The point of full membership.
    pub fn peak(&self) -> f64 {
        match *self {
            Membership::Gaussian { center, .. } => center,
            Membership::Triangular { b, .. }    => b,
        }
    }
}
