//! # Pose
//!
//! The pose of the platform in 4 degrees of freedom: three linear axes plus
//! heading. The same type doubles as a velocity command, in which case each
//! field is the rate demand for its axis.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use util::maths::{ang_diff_deg, wrap_deg};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and heading) of the platform.
///
/// When used as a velocity command the linear fields are rates along each
/// axis and `yaw_deg` is the turn rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position along the X axis.
    ///
    /// Units: arbitrary linear unit, consistent across all linear axes
    pub x: f64,

    /// Position along the Y axis.
    pub y: f64,

    /// Position along the Z axis (altitude).
    pub z: f64,

    /// Heading about the Z axis.
    ///
    /// Units: degrees, normalised to (-180, 180]
    pub yaw_deg: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// Create a new pose, normalising the heading into (-180, 180].
    pub fn new(x: f64, y: f64, z: f64, yaw_deg: f64) -> Self {
        Self {
            x,
            y,
            z,
            yaw_deg: wrap_deg(yaw_deg)
        }
    }

    /// Compare two poses within a tolerance.
    ///
    /// The heading comparison is circular, so 179.9 and -179.9 degrees are
    /// 0.2 degrees apart, not 359.8.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        (self.x - other.x).abs() <= tol
            && (self.y - other.y).abs() <= tol
            && (self.z - other.z).abs() <= tol
            && ang_diff_deg(self.yaw_deg, other.yaw_deg).abs() <= tol
    }

    /// True if any field of the pose is NaN or infinite.
    pub fn is_degenerate(&self) -> bool {
        !(self.x.is_finite()
            && self.y.is_finite()
            && self.z.is_finite()
            && self.yaw_deg.is_finite())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
