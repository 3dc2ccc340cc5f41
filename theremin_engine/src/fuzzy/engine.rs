//! Mamdani inference over the rule base.
//!
//! Per frame: fuzzify the three crisp inputs, fire every rule with the
//! minimum of its antecedent degrees, aggregate each output term with the
//! maximum over its rules, and take the centroid of the aggregated output
//! set sampled over the frequency domain.

use crate::config::{FuzzyConfig, Implication, Range};
use crate::error::{ConfigError, InferenceError};
use crate::hand::HandFeatures;
use super::rules::RULES;
use super::variable::{LinguisticVariable, Term, TermDegrees};

/// The three crisp inputs after clamping and rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrispInputs {
    pub proximity: f64,
    pub distance:  f64,
    pub openness:  f64,
}

/// Everything one evaluation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub inputs:    CrispInputs,
    /// Aggregated firing strength of each output term.
    pub strengths: TermDegrees,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyEngine {
    proximity:   LinguisticVariable,
    distance:    LinguisticVariable,
    openness:    LinguisticVariable,
    frequency:   LinguisticVariable,
    implication: Implication,
    universe:    Vec<f64>,
}

impl FuzzyEngine {
    pub fn new(cfg: &FuzzyConfig, frequency: Range) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let proximity = LinguisticVariable::new("proximity", cfg.proximity, cfg.shape)?;
        let distance  = LinguisticVariable::new("distance",  cfg.distance,  cfg.shape)?;
        let openness  = LinguisticVariable::new("openness",  cfg.openness,  cfg.shape)?;
        let frequency = LinguisticVariable::new("frequency", frequency,     cfg.shape)?;
        let universe  = frequency.universe(cfg.resolution);

        Ok(FuzzyEngine {
            proximity,
            distance,
            openness,
            frequency,
            implication: cfg.implication,
            universe,
        })
    }

    /// Derive the crisp inputs from hand features: proximity is the box area
    /// as a percentage of the frame, distance the horizontal center,
    /// openness the fingertip spread.  Each is clamped to its domain and
    /// rounded to a whole number.
    pub fn crisp_inputs(&self, features: &HandFeatures, frame_width: f64, frame_height: f64) -> CrispInputs {
        let frame_area = frame_width * frame_height;
        let proximity = if frame_area > 0.0 {
            100.0 * features.area / frame_area
        } else {
            self.proximity.range().min
        };

        CrispInputs {
            proximity: self.proximity.range().clamp(proximity).round(),
            distance:  self.distance.range().clamp(features.horizontal_position).round(),
            openness:  self.openness.range().clamp(features.openness).round(),
        }
    }

    /// Aggregated strength of each output term.
    pub fn fire(&self, inputs: &CrispInputs) -> TermDegrees {
        let p = self.proximity.fuzzify(inputs.proximity);
        let d = self.distance.fuzzify(inputs.distance);
        let o = self.openness.fuzzify(inputs.openness);

        let mut out = TermDegrees::default();
        for r in &RULES {
            let strength = p[r.proximity].min(d[r.distance]).min(o[r.openness]);
            out[r.frequency] = out[r.frequency].max(strength);
        }
        out
    }

    /// Run the full pipeline.  Zero output mass is reported as
    /// [`InferenceError::NoCoverage`], never as a frequency of zero.
    pub fn infer(&self, inputs: CrispInputs) -> Result<Inference, InferenceError> {
        let strengths = self.fire(&inputs);
        let no_coverage = || InferenceError::NoCoverage {
            proximity: inputs.proximity,
            distance:  inputs.distance,
            openness:  inputs.openness,
        };
        if strengths.max() <= 0.0 {
            return Err(no_coverage());
        }

        let mut moment = 0.0;
        let mut mass   = 0.0;
        for &x in &self.universe {
            let mu = Term::ALL.iter()
                .map(|&t| self.implicate(strengths[t], self.frequency.set(t).degree(x)))
                .fold(0.0, f64::max);
            moment += x * mu;
            mass   += mu;
        }
        if mass <= 0.0 {
            return Err(no_coverage());
        }

        Ok(Inference { inputs, strengths, frequency: moment / mass })
    }

    fn implicate(&self, strength: f64, degree: f64) -> f64 {
        match self.implication {
            Implication::Minimum => strength.min(degree),
            Implication::Product => strength * degree,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
