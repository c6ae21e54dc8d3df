use nalgebra::{Matrix3, Point3, Vector3};

/// Lateral offset between the hip-yaw and hip-pitch frames.
pub const HIP_OFFSET: f64 = 0.0335;
/// Length of the upper link.
pub const L1: f64 = 0.08;
/// Length of the lower link.
pub const L2: f64 = 0.11;

/// Joint angles in radians, ordered hip-yaw, hip-pitch, knee-pitch.
pub type JointAngles = Vector3<f64>;

/// End-effector position in the base frame.
pub type Position = Point3<f64>;

/// Partial derivatives of the end-effector position, entry `(i, j)` is
/// `d position_i / d angle_j`.
pub type Jacobian = Matrix3<f64>;

/// Fixed link geometry of the arm.
///
/// All lengths share the unit of the resulting positions.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct LinkGeometry {
    /// Lateral offset between the first and second rotation frames.
    pub hip_offset: f64,
    /// Length of the first link.
    pub l1: f64,
    /// Length of the second link.
    pub l2: f64,
}

impl Default for LinkGeometry {
    fn default() -> Self {
        Self {
            hip_offset: HIP_OFFSET,
            l1: L1,
            l2: L2,
        }
    }
}

impl LinkGeometry {
    /// Construct a new link geometry.
    pub fn new(hip_offset: f64, l1: f64, l2: f64) -> Self {
        Self { hip_offset, l1, l2 }
    }

    /// Check the geometry describes a physical arm.
    pub fn validate(&self) -> crate::Result<()> {
        let lengths = [self.hip_offset, self.l1, self.l2];
        if lengths.iter().any(|v| !v.is_finite()) {
            return Err(crate::Error::InvalidGeometry("lengths must be finite"));
        }
        if self.l1 <= 0.0 || self.l2 <= 0.0 {
            return Err(crate::Error::InvalidGeometry(
                "link lengths must be positive",
            ));
        }
        if self.hip_offset < 0.0 {
            return Err(crate::Error::InvalidGeometry(
                "hip offset must not be negative",
            ));
        }

        Ok(())
    }

    /// Largest distance between the base origin and the end-effector.
    pub fn max_reach(&self) -> f64 {
        (self.hip_offset.powi(2) + (self.l1 + self.l2).powi(2)).sqrt()
    }

    /// Smallest distance between the base origin and the end-effector.
    pub fn min_reach(&self) -> f64 {
        (self.hip_offset.powi(2) + (self.l1 - self.l2).powi(2)).sqrt()
    }

    /// Test whether a position lies within `tolerance` of the workspace.
    ///
    /// The hip-yaw joint sweeps the pitch plane around the Z axis at a fixed
    /// lateral offset, so the horizontal radius can never drop below the hip
    /// offset. Within the pitch plane the two links reach any distance
    /// between `|l1 - l2|` and `l1 + l2`.
    pub fn is_reachable(&self, position: &Position, tolerance: f64) -> bool {
        let radius_sq = position.x.powi(2) + position.y.powi(2);
        if radius_sq.sqrt() < self.hip_offset - tolerance {
            return false;
        }

        let planar = ((radius_sq - self.hip_offset.powi(2)).max(0.0) + position.z.powi(2)).sqrt();

        planar >= (self.l1 - self.l2).abs() - tolerance && planar <= self.l1 + self.l2 + tolerance
    }
}

impl std::fmt::Display for LinkGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Hip offset={:.4} L1={:.4} L2={:.4}",
            self.hip_offset, self.l1, self.l2
        )
    }
}
