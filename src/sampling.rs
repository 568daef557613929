// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Randomized manufacturing deviations and dimension resolution

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::model::{LayerSpec, OverhangRange};

/// Hard lower clamp for every resolved dimension axis
pub const MIN_DIMENSION: f64 = 0.001;

/// Edge-bend angle pair in degrees, drawn once per electrode instance
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BendAngles {
    pub x_pos: f64,
    pub x_neg: f64,
}

/// Randomized offsets of one plate instance
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Deviation {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub x_position: f64,
    pub y_position: f64,
    pub bend: BendAngles,
}

/// Resolved dimension triple of one plate instance
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// Per-session random source for all deviation draws.
///
/// Owns the only RNG of an export session; draws are strictly sequential,
/// so a fixed seed reproduces a run bit for bit.
pub struct DeviationSampler {
    rng: StdRng,
    x_variation: f64,
    y_variation: f64,
    min_angle: f64,
    max_angle: f64,
}

impl DeviationSampler {
    pub fn new(
        x_variation: f64,
        y_variation: f64,
        min_angle: f64,
        max_angle: f64,
        seed: Option<u64>,
    ) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            rng,
            x_variation,
            y_variation,
            min_angle,
            max_angle,
        }
    }

    /// Draw one deviation record for a plate instance.
    pub fn sample(&mut self, spec: &LayerSpec) -> Deviation {
        Deviation {
            length: self.normal(spec.length_tol),
            width: self.normal(spec.width_tol),
            height: self.normal(spec.height_tol),
            x_position: self.normal(self.x_variation),
            y_position: self.normal(self.y_variation),
            bend: BendAngles {
                x_pos: self.uniform_angle(),
                x_neg: self.uniform_angle(),
            },
        }
    }

    /// Draw the overhang shared by the whole anode family of one export
    /// iteration.
    pub fn sample_overhang(&mut self, range: OverhangRange) -> f64 {
        if range.min >= range.max {
            return range.min;
        }
        self.rng.gen_range(range.min..range.max)
    }

    /// Zero-mean normal draw; a zero std-dev yields exactly 0.0 without
    /// consuming random state.
    fn normal(&mut self, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return 0.0;
        }
        // std_dev is validated non-negative, so construction cannot fail
        let normal = Normal::new(0.0, std_dev).unwrap_or_else(|_| Normal::new(0.0, 1.0).unwrap());
        normal.sample(&mut self.rng)
    }

    fn uniform_angle(&mut self) -> f64 {
        if self.min_angle >= self.max_angle {
            return self.min_angle;
        }
        self.rng.gen_range(self.min_angle..self.max_angle)
    }
}

/// Combine nominal size, deviation and the optional shared overhang into
/// the final dimension triple.
///
/// The floor is a clamp, never a rejection; out-of-range deviations are
/// absorbed silently.
pub fn resolve_dimensions(
    spec: &LayerSpec,
    deviation: &Deviation,
    overhang: Option<f64>,
) -> Dimensions {
    Dimensions {
        length: MIN_DIMENSION.max(spec.length + deviation.length + overhang.unwrap_or(0.0)),
        width: MIN_DIMENSION.max(spec.width + deviation.width),
        height: MIN_DIMENSION.max(spec.height + deviation.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rgba;

    const GRAY: Rgba = [0.5, 0.5, 0.5, 1.0];

    fn spec(length_tol: f64) -> LayerSpec {
        LayerSpec {
            length: 0.1015,
            width: 0.050,
            height: 0.001,
            length_tol,
            width_tol: 0.0,
            height_tol: 0.0,
            overhang: None,
            amount: 10,
            color: GRAY,
        }
    }

    fn sampler(seed: u64) -> DeviationSampler {
        DeviationSampler::new(1e-3, 1e-3, -15.0, 15.0, Some(seed))
    }

    #[test]
    fn test_zero_tolerance_yields_zero_offsets() {
        let mut sampler = sampler(7);
        let deviation = sampler.sample(&spec(0.0));

        assert_eq!(deviation.length, 0.0);
        assert_eq!(deviation.width, 0.0);
        assert_eq!(deviation.height, 0.0);
        // Lateral jitter still draws
        assert!(deviation.x_position != 0.0 || deviation.y_position != 0.0);
    }

    #[test]
    fn test_bend_angles_within_configured_range() {
        let mut sampler = sampler(11);
        for _ in 0..200 {
            let deviation = sampler.sample(&spec(0.0));
            assert!(deviation.bend.x_pos >= -15.0 && deviation.bend.x_pos <= 15.0);
            assert!(deviation.bend.x_neg >= -15.0 && deviation.bend.x_neg <= 15.0);
        }
    }

    #[test]
    fn test_same_seed_reproduces_draws() {
        let mut a = sampler(42);
        let mut b = sampler(42);
        for _ in 0..32 {
            let da = a.sample(&spec(1e-4));
            let db = b.sample(&spec(1e-4));
            assert_eq!(da.length, db.length);
            assert_eq!(da.x_position, db.x_position);
            assert_eq!(da.bend.x_pos, db.bend.x_pos);
        }
        let range = OverhangRange {
            min: 0.0023,
            max: 0.0068,
        };
        assert_eq!(a.sample_overhang(range), b.sample_overhang(range));
    }

    #[test]
    fn test_overhang_within_range() {
        let mut sampler = sampler(3);
        let range = OverhangRange {
            min: 0.0023,
            max: 0.0068,
        };
        for _ in 0..100 {
            let overhang = sampler.sample_overhang(range);
            assert!(overhang >= range.min && overhang < range.max);
        }
    }

    #[test]
    fn test_dimension_floor_clamp() {
        let deviation = Deviation {
            length: -1.0,
            width: -1.0,
            height: -1.0,
            x_position: 0.0,
            y_position: 0.0,
            bend: BendAngles {
                x_pos: 0.0,
                x_neg: 0.0,
            },
        };
        let dims = resolve_dimensions(&spec(0.0), &deviation, None);
        assert_eq!(dims.length, MIN_DIMENSION);
        assert_eq!(dims.width, MIN_DIMENSION);
        assert_eq!(dims.height, MIN_DIMENSION);
    }

    #[test]
    fn test_overhang_extends_length_only() {
        let deviation = Deviation {
            length: 0.0,
            width: 0.0,
            height: 0.0,
            x_position: 0.0,
            y_position: 0.0,
            bend: BendAngles {
                x_pos: 0.0,
                x_neg: 0.0,
            },
        };
        let dims = resolve_dimensions(&spec(0.0), &deviation, Some(0.005));
        assert_eq!(dims.length, 0.1015 + 0.005);
        assert_eq!(dims.width, 0.050);
        assert_eq!(dims.height, 0.001);
    }
}
