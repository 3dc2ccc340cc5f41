//! Weighted-sum mapping from hand area and openness to frequency.

use crate::config::{CrispConfig, Range};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub struct CrispMapper {
    cfg:       CrispConfig,
    frequency: Range,
}

impl CrispMapper {
    pub fn new(cfg: CrispConfig, frequency: Range) -> Result<Self, ConfigError> {
        cfg.validate()?;
        frequency.validate("frequency")?;
        Ok(CrispMapper { cfg, frequency })
    }

    /// Area as a fraction of a "full-size" hand, saturating at 1.
    pub fn area_norm(&self, area: f64, frame_width: f64, frame_height: f64) -> f64 {
        let max_area = self.cfg.frame_area_fraction * frame_width * frame_height;
        if max_area <= 0.0 {
            return 0.0;
        }
        (area / max_area).clamp(0.0, 1.0)
    }

    pub fn openness_norm(&self, openness: f64) -> f64 {
        (openness / self.cfg.openness_scale).clamp(0.0, 1.0)
    }

    /// Blend the two terms.  Each term is `f_min + norm · f_max`, so the
    /// output spans `[f_min, f_min + f_max]` and is not re-clamped.
    pub fn frequency(&self, area: f64, openness: f64, frame_width: f64, frame_height: f64) -> f64 {
        let (f_min, f_max) = (self.frequency.min, self.frequency.max);
        let freq_area = f_min + self.area_norm(area, frame_width, frame_height) * f_max;
        let freq_open = f_min + self.openness_norm(openness) * f_max;
        self.cfg.area_weight * freq_area + self.cfg.openness_weight * freq_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CrispMapper {
        CrispMapper::new(CrispConfig::default(), Range::new(200.0, 600.0)).unwrap()
    }

    #[test]
    fn area_dominates_the_blend() {
        // 40000 / (0.25·800·600) = 1/3, 50 / 150 = 1/3
        let f = mapper().frequency(40_000.0, 50.0, 800.0, 600.0);
        let expected = 200.0 + (1.0 / 3.0) * 600.0 * 0.75 + (1.0 / 3.0) * 600.0 * 0.25;
        assert!((f - expected).abs() < 1e-9);
    }

    #[test]
    fn norms_saturate() {
        let m = mapper();
        assert_eq!(m.area_norm(1e9, 800.0, 600.0), 1.0);
        assert_eq!(m.openness_norm(1e9), 1.0);
        assert_eq!(m.area_norm(0.0, 800.0, 600.0), 0.0);
    }

    #[test]
    fn output_bounds() {
        let m = mapper();
        assert_eq!(m.frequency(0.0, 0.0, 800.0, 600.0), 200.0);
        assert_eq!(m.frequency(1e9, 1e9, 800.0, 600.0), 800.0);
    }

    #[test]
    fn empty_frame_contributes_nothing() {
        assert_eq!(mapper().area_norm(500.0, 0.0, 600.0), 0.0);
    }

    #[test]
    fn tuned_constants_apply() {
        let cfg = CrispConfig { openness_scale: 100.0, area_weight: 0.0, openness_weight: 1.0, ..Default::default() };
        let m = CrispMapper::new(cfg, Range::new(200.0, 600.0)).unwrap();
        assert_eq!(m.frequency(1e9, 50.0, 800.0, 600.0), 500.0);
    }
}
