// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Edge-bend model
//!
//! Each plate carries two independent bend zones at the ends of its local
//! length axis. A zone is folded about a Y-parallel axis anchored at the
//! zone's inner boundary, at the height of the owning electrode. Coatings
//! never sample their own bend pair; they fold with the angles of their
//! co-indexed electrode.

use nalgebra::Point3;
use std::f64::consts::PI;

use crate::sampling::{BendAngles, Dimensions};

/// Trailing bend zone as a fraction of the length axis
pub const TRAILING_ZONE: (f64, f64) = (0.97, 1.0);
/// Leading bend zone as a fraction of the length axis
pub const LEADING_ZONE: (f64, f64) = (0.0, 0.03);

/// Amplification applied to sampled degree values, carried over from the
/// reference tooling. Label files store the unscaled degree values.
pub const BEND_ANGLE_SCALE: f64 = 360.0 / 45.0;

/// Mesh subdivision cuts applied before bending
pub const BEND_SUBDIVISION_CUTS: u32 = 50;
/// Decimation ratio applied after bending
pub const BEND_DECIMATE_RATIO: f64 = 0.1;

/// Sampled degrees to applied radians
pub fn applied_angle_rad(angle_deg: f64) -> f64 {
    angle_deg * PI / 180.0 * BEND_ANGLE_SCALE
}

/// One zone fold ready to hand to the mesh engine
#[derive(Debug, Clone, Copy)]
pub struct BendPlan {
    /// Fractional range of the length axis the fold acts on
    pub zone: (f64, f64),
    /// Anchor of the fold axis in world coordinates
    pub origin: Point3<f64>,
    pub angle_rad: f64,
}

impl BendPlan {
    /// Both edge folds of one plate instance.
    ///
    /// `center_x` is the plate's world x center, `electrode_z` the center
    /// height of the owning electrode (the plate's own z for electrodes,
    /// the parent's for coatings).
    pub fn edge_bends(
        dims: &Dimensions,
        center_x: f64,
        electrode_z: f64,
        angles: &BendAngles,
    ) -> [BendPlan; 2] {
        let min_x = center_x - dims.length / 2.0;
        let anchor = |fraction: f64| Point3::new(min_x + fraction * dims.length, 0.0, electrode_z);

        [
            BendPlan {
                zone: TRAILING_ZONE,
                origin: anchor(TRAILING_ZONE.0),
                angle_rad: applied_angle_rad(angles.x_pos),
            },
            BendPlan {
                zone: LEADING_ZONE,
                origin: anchor(LEADING_ZONE.1),
                angle_rad: applied_angle_rad(angles.x_neg),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_angle_amplification() {
        // 15 degrees sampled, amplified by 360/45
        assert_relative_eq!(applied_angle_rad(15.0), 15.0 * PI / 180.0 * 8.0);
        assert_relative_eq!(applied_angle_rad(0.0), 0.0);
        assert!(applied_angle_rad(-15.0) < 0.0);
    }

    #[test]
    fn test_zones_are_disjoint() {
        assert!(LEADING_ZONE.1 < TRAILING_ZONE.0);
    }

    #[test]
    fn test_anchor_sits_on_zone_boundary() {
        let dims = Dimensions {
            length: 0.1,
            width: 0.05,
            height: 0.001,
        };
        let angles = BendAngles {
            x_pos: 10.0,
            x_neg: -5.0,
        };
        let [trailing, leading] = BendPlan::edge_bends(&dims, 0.002, 0.052, &angles);

        // Trailing anchor at 97% of the length, measured from min x
        assert_relative_eq!(trailing.origin.x, 0.002 - 0.05 + 0.097);
        // Leading anchor at 3%
        assert_relative_eq!(leading.origin.x, 0.002 - 0.05 + 0.003);
        assert_relative_eq!(trailing.origin.z, 0.052);
        assert_relative_eq!(leading.origin.z, 0.052);
    }
}
